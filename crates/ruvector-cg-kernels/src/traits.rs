//! Fused product trait.
//!
//! Every matrix view implements [`FusedCgProduct`]. The CG driver holds any
//! implementor (usually a [`SparseMatrixView`](crate::formats::SparseMatrixView))
//! and calls [`pipelined_cg_prod`](FusedCgProduct::pipelined_cg_prod) once per
//! iteration.

use tracing::{debug, trace};

use crate::reduction::ProductSums;
use crate::types::{CgScalar, KernelConfig, SparseFormat};

/// A sparse matrix that can compute `Ap = A * p` fused with the `(Ap, Ap)`
/// and `(p, Ap)` reductions.
///
/// # Preconditions
///
/// Not checked outside debug builds:
///
/// * `p.len() == cols()` and `ap.len() == rows()`.
/// * `rows() == cols()`. The `(p, Ap)` sum reads `p[row]`, which is only the
///   CG inner product for a square system matrix.
/// * Every stored index is in range. An out-of-range index panics.
pub trait FusedCgProduct<T: CgScalar>: Sync {
    /// Storage encoding of this matrix.
    fn format(&self) -> SparseFormat;

    /// Number of rows `M`.
    fn rows(&self) -> usize;

    /// Number of columns `N`.
    fn cols(&self) -> usize;

    /// Number of stored entries, padding slots included.
    fn nnz(&self) -> usize;

    /// Overwrite `ap` with `A * p` and return the two fused sums.
    ///
    /// Every one of the `rows()` entries of `ap` is written; nothing is
    /// accumulated into its previous contents.
    fn fused_product(&self, p: &[T], ap: &mut [T], config: &KernelConfig) -> ProductSums<T>;

    /// Compute `Ap = A * p` and write `(Ap, Ap)` at offset `B` and `(p, Ap)`
    /// at offset `2B` of `buffer`, where `B = buffer.len() / 3`.
    ///
    /// Offset `0` of the buffer is never touched.
    fn pipelined_cg_prod(&self, p: &[T], ap: &mut [T], buffer: &mut [T], config: &KernelConfig) {
        debug_assert_eq!(p.len(), self.cols(), "p length must equal cols");
        debug_assert_eq!(ap.len(), self.rows(), "Ap length must equal rows");

        if config.parallel_unavailable() {
            debug!("parallel policy requested without the `parallel` feature; running sequentially");
        }
        trace!(
            "fused cg prod: format={}, rows={}, nnz={}, parallel={}",
            self.format(),
            self.rows(),
            self.nnz(),
            self.format().supports_row_partitioning() && config.wants_parallel(self.rows()),
        );

        self.fused_product(p, ap, config).store(buffer);
    }
}
