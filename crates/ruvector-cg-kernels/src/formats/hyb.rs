//! Hybrid ELL + CSR.
//!
//! The regular part of each row lives in an ELL block (`internal_ellnnz`
//! slots at stride `internal_size1`, zero padded). Entries beyond the ELL
//! width live in a CSR overflow block. A row's product is the ELL sum
//! continued over its overflow range in the same accumulator.

use crate::error::KernelError;
use crate::formats::{
    check_internal_size1, check_row_ptr, csr_row_dot, debug_check_columns, ell_row_dot, expect_len,
};
use crate::partition::fused_rows;
use crate::reduction::ProductSums;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, KernelConfig, SparseFormat};

/// Borrowed HYB matrix.
#[derive(Debug, Clone, Copy)]
pub struct HybView<'a, T> {
    rows: usize,
    cols: usize,
    internal_size1: usize,
    internal_ellnnz: usize,
    ell_col_idx: &'a [u32],
    ell_values: &'a [T],
    csr_row_ptr: &'a [u32],
    csr_col_idx: &'a [u32],
    csr_values: &'a [T],
}

impl<'a, T: CgScalar> HybView<'a, T> {
    /// Wrap HYB arrays.
    ///
    /// # Errors
    ///
    /// * [`KernelError::ParameterOutOfRange`] if `internal_size1 < rows`.
    /// * [`KernelError::DimensionMismatch`] if the ELL arrays are not
    ///   `internal_size1 * internal_ellnnz` long, `csr_row_ptr` is not
    ///   `rows + 1` long, or the overflow arrays differ in length.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rows: usize,
        cols: usize,
        internal_size1: usize,
        internal_ellnnz: usize,
        ell_col_idx: &'a [u32],
        ell_values: &'a [T],
        csr_row_ptr: &'a [u32],
        csr_col_idx: &'a [u32],
        csr_values: &'a [T],
    ) -> Result<Self, KernelError> {
        check_internal_size1(internal_size1, rows)?;
        let slots = internal_size1 * internal_ellnnz;
        expect_len("ell_values", ell_values.len(), slots)?;
        expect_len("ell_col_idx", ell_col_idx.len(), slots)?;
        expect_len("csr_col_idx", csr_col_idx.len(), csr_values.len())?;
        check_row_ptr("csr_row_ptr", csr_row_ptr, rows, csr_values.len())?;
        debug_check_columns(ell_col_idx, ell_values, cols, true);
        debug_check_columns(csr_col_idx, csr_values, cols, false);

        Ok(Self {
            rows,
            cols,
            internal_size1,
            internal_ellnnz,
            ell_col_idx,
            ell_values,
            csr_row_ptr,
            csr_col_idx,
            csr_values,
        })
    }

    /// Padded row count of the ELL part.
    pub fn internal_size1(&self) -> usize {
        self.internal_size1
    }

    /// Slots per row in the ELL part.
    pub fn internal_ellnnz(&self) -> usize {
        self.internal_ellnnz
    }

    /// Number of entries in the CSR overflow part.
    pub fn overflow_nnz(&self) -> usize {
        self.csr_values.len()
    }
}

impl<'a, T: CgScalar> FusedCgProduct<T> for HybView<'a, T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::Hyb
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nnz(&self) -> usize {
        self.ell_values.len() + self.csr_values.len()
    }

    fn fused_product(&self, p: &[T], ap: &mut [T], config: &KernelConfig) -> ProductSums<T> {
        fused_rows(&mut ap[..self.rows], p, config, |row| {
            let ell = ell_row_dot(
                self.ell_col_idx,
                self.ell_values,
                self.internal_size1,
                self.internal_ellnnz,
                row,
                p,
                T::zero(),
            );
            csr_row_dot(self.csr_row_ptr, self.csr_col_idx, self.csr_values, row, p, ell)
        })
    }
}
