//! Coordinate format.
//!
//! `coords` interleaves `(row, col)` pairs: entry `k` sits at
//! `coords[2k], coords[2k + 1]`. No ordering is assumed, so the product cannot
//! fold its reductions into the scatter. It zeroes `Ap`, scatters every
//! triple, and then reduces over `Ap` in a second pass.
//!
//! The scatter writes arbitrary rows, so this kernel always runs on the
//! calling thread.

use tracing::debug;

use crate::error::KernelError;
use crate::formats::expect_len;
use crate::reduction::ProductSums;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, ExecutionPolicy, KernelConfig, SparseFormat};

/// Borrowed COO matrix.
#[derive(Debug, Clone, Copy)]
pub struct CooView<'a, T> {
    rows: usize,
    cols: usize,
    coords: &'a [u32],
    values: &'a [T],
}

impl<'a, T: CgScalar> CooView<'a, T> {
    /// Wrap COO arrays.
    ///
    /// # Errors
    ///
    /// [`KernelError::DimensionMismatch`] if `coords.len() != 2 * values.len()`.
    pub fn new(rows: usize, cols: usize, coords: &'a [u32], values: &'a [T]) -> Result<Self, KernelError> {
        expect_len("coords", coords.len(), 2 * values.len())?;
        debug_assert!(
            coords
                .chunks_exact(2)
                .all(|rc| (rc[0] as usize) < rows && (rc[1] as usize) < cols),
            "coordinate out of range for a {rows}x{cols} matrix"
        );

        Ok(Self {
            rows,
            cols,
            coords,
            values,
        })
    }

    /// Interleaved `(row, col)` pairs.
    pub fn coords(&self) -> &'a [u32] {
        self.coords
    }

    /// Value of every stored entry.
    pub fn values(&self) -> &'a [T] {
        self.values
    }
}

impl<'a, T: CgScalar> FusedCgProduct<T> for CooView<'a, T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::Coo
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn fused_product(&self, p: &[T], ap: &mut [T], config: &KernelConfig) -> ProductSums<T> {
        if config.policy == ExecutionPolicy::Parallel {
            debug!("coo product runs sequentially: scatter targets are not row-disjoint");
        }

        let ap = &mut ap[..self.rows];

        // Ap may hold the previous iteration's product.
        ap.fill(T::zero());

        for (rc, &v) in self.coords.chunks_exact(2).zip(self.values) {
            ap[rc[0] as usize] += v * p[rc[1] as usize];
        }

        // p is indexed by row, as in the row-oriented formats.
        let mut sums = ProductSums::zero();
        for (row, &ap_row) in ap.iter().enumerate() {
            sums.accumulate(p[row], ap_row);
        }
        sums
    }
}
