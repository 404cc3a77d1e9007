//! Compressed sparse row.
//!
//! Row `i` spans `row_ptr[i]..row_ptr[i + 1]` in `col_idx`/`values`. Only
//! stored entries are visited, so there is no padding to skip.

use crate::error::KernelError;
use crate::formats::{check_row_ptr, csr_row_dot, debug_check_columns, expect_len};
use crate::partition::fused_rows;
use crate::reduction::ProductSums;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, KernelConfig, SparseFormat};

/// Borrowed CSR matrix.
#[derive(Debug, Clone, Copy)]
pub struct CsrView<'a, T> {
    rows: usize,
    cols: usize,
    row_ptr: &'a [u32],
    col_idx: &'a [u32],
    values: &'a [T],
}

impl<'a, T: CgScalar> CsrView<'a, T> {
    /// Wrap CSR arrays.
    ///
    /// # Errors
    ///
    /// [`KernelError::DimensionMismatch`] if `row_ptr.len() != rows + 1` or
    /// `col_idx` and `values` differ in length.
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: &'a [u32],
        col_idx: &'a [u32],
        values: &'a [T],
    ) -> Result<Self, KernelError> {
        expect_len("col_idx", col_idx.len(), values.len())?;
        check_row_ptr("row_ptr", row_ptr, rows, values.len())?;
        debug_check_columns(col_idx, values, cols, false);

        Ok(Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Row offsets.
    pub fn row_ptr(&self) -> &'a [u32] {
        self.row_ptr
    }

    /// Column index of every stored entry.
    pub fn col_idx(&self) -> &'a [u32] {
        self.col_idx
    }

    /// Value of every stored entry.
    pub fn values(&self) -> &'a [T] {
        self.values
    }
}

impl<'a, T: CgScalar> FusedCgProduct<T> for CsrView<'a, T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::Csr
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
        fused_rows(&mut ap[..self.rows], p, config, |row| {
            csr_row_dot(self.row_ptr, self.col_idx, self.values, row, p, T::zero())
        })
    }
}
