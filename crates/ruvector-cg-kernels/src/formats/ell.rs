//! Fixed-width ELLPACK.
//!
//! Every row owns `internal_maxnnz` slots. Slot `k` of row `r` is stored at
//! `r + k * internal_size1`, where `internal_size1 >= rows` is the padded row
//! count. Unused slots hold the value zero; their column index is not read.

use crate::error::KernelError;
use crate::formats::{check_internal_size1, debug_check_columns, ell_row_dot, expect_len};
use crate::partition::fused_rows;
use crate::reduction::ProductSums;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, KernelConfig, SparseFormat};

/// Borrowed ELL matrix.
#[derive(Debug, Clone, Copy)]
pub struct EllView<'a, T> {
    rows: usize,
    cols: usize,
    internal_size1: usize,
    internal_maxnnz: usize,
    col_idx: &'a [u32],
    values: &'a [T],
}

impl<'a, T: CgScalar> EllView<'a, T> {
    /// Wrap ELL arrays.
    ///
    /// # Errors
    ///
    /// * [`KernelError::ParameterOutOfRange`] if `internal_size1 < rows`.
    /// * [`KernelError::DimensionMismatch`] if `col_idx` or `values` is not
    ///   `internal_size1 * internal_maxnnz` long.
    pub fn new(
        rows: usize,
        cols: usize,
        internal_size1: usize,
        internal_maxnnz: usize,
        col_idx: &'a [u32],
        values: &'a [T],
    ) -> Result<Self, KernelError> {
        check_internal_size1(internal_size1, rows)?;
        let slots = internal_size1 * internal_maxnnz;
        expect_len("values", values.len(), slots)?;
        expect_len("col_idx", col_idx.len(), slots)?;
        debug_check_columns(col_idx, values, cols, true);

        Ok(Self {
            rows,
            cols,
            internal_size1,
            internal_maxnnz,
            col_idx,
            values,
        })
    }

    /// Padded row count (slot stride).
    pub fn internal_size1(&self) -> usize {
        self.internal_size1
    }

    /// Slots per row.
    pub fn internal_maxnnz(&self) -> usize {
        self.internal_maxnnz
    }

    /// Column index of every slot.
    pub fn col_idx(&self) -> &'a [u32] {
        self.col_idx
    }

    /// Value of every slot; zero marks padding.
    pub fn values(&self) -> &'a [T] {
        self.values
    }
}

impl<'a, T: CgScalar> FusedCgProduct<T> for EllView<'a, T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::Ell
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
            ell_row_dot(
                self.col_idx,
                self.values,
                self.internal_size1,
                self.internal_maxnnz,
                row,
                p,
                T::zero(),
            )
        })
    }
}
