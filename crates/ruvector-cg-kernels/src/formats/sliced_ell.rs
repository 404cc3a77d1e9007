//! Sliced ELLPACK.
//!
//! Rows are grouped into blocks of `rows_per_block`. Block `b` has its own
//! width `columns_per_block[b]` and starts at `block_start[b]` in the shared
//! `col_idx`/`values` arrays, laid out column-major within the block: slot `k`
//! of block-row `i` is at `block_start[b] + k * rows_per_block + i`.
//!
//! There are `ceil(rows / rows_per_block)` blocks. The last one may overhang
//! the matrix; its phantom rows are computed into the block scratch and then
//! discarded, never written to `Ap` or counted in the sums.

use crate::error::KernelError;
use crate::formats::{debug_check_columns, expect_len};
use crate::partition::fused_blocks;
use crate::reduction::ProductSums;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, KernelConfig, SparseFormat};

/// Borrowed sliced ELL matrix.
#[derive(Debug, Clone, Copy)]
pub struct SlicedEllView<'a, T> {
    rows: usize,
    cols: usize,
    rows_per_block: usize,
    columns_per_block: &'a [u32],
    block_start: &'a [u32],
    col_idx: &'a [u32],
    values: &'a [T],
}

impl<'a, T: CgScalar> SlicedEllView<'a, T> {
    /// Wrap sliced ELL arrays.
    ///
    /// `columns_per_block` and `block_start` need at least one entry per
    /// block; a trailing `block_start` sentinel is allowed.
    ///
    /// # Errors
    ///
    /// * [`KernelError::ParameterOutOfRange`] if `rows_per_block == 0`.
    /// * [`KernelError::DimensionMismatch`] if the per-block arrays are too
    ///   short or `col_idx` and `values` differ in length.
    pub fn new(
        rows: usize,
        cols: usize,
        rows_per_block: usize,
        columns_per_block: &'a [u32],
        block_start: &'a [u32],
        col_idx: &'a [u32],
        values: &'a [T],
    ) -> Result<Self, KernelError> {
        if rows_per_block == 0 {
            return Err(KernelError::ParameterOutOfRange {
                name: "rows_per_block".into(),
                value: "0".into(),
                expected: ">= 1".into(),
            });
        }
        let num_blocks = rows.div_ceil(rows_per_block);
        if columns_per_block.len() < num_blocks {
            return Err(KernelError::length("columns_per_block", columns_per_block.len(), num_blocks));
        }
        if block_start.len() < num_blocks {
            return Err(KernelError::length("block_start", block_start.len(), num_blocks));
        }
        expect_len("col_idx", col_idx.len(), values.len())?;
        debug_assert!(
            (0..num_blocks).all(|b| {
                block_start[b] as usize + columns_per_block[b] as usize * rows_per_block <= values.len()
            }),
            "a block extends past the end of values"
        );
        debug_check_columns(col_idx, values, cols, true);

        Ok(Self {
            rows,
            cols,
            rows_per_block,
            columns_per_block,
            block_start,
            col_idx,
            values,
        })
    }

    /// Rows per block.
    pub fn rows_per_block(&self) -> usize {
        self.rows_per_block
    }

    /// Number of blocks, including an overhanging last block.
    pub fn num_blocks(&self) -> usize {
        self.rows.div_ceil(self.rows_per_block)
    }

    /// Width of each block.
    pub fn columns_per_block(&self) -> &'a [u32] {
        self.columns_per_block
    }

    /// Offset of each block into `col_idx`/`values`.
    pub fn block_start(&self) -> &'a [u32] {
        self.block_start
    }

    /// Column index of every slot.
    pub fn col_idx(&self) -> &'a [u32] {
        self.col_idx
    }

    /// Value of every slot; zero marks padding.
    pub fn values(&self) -> &'a [T] {
        self.values
    }

    /// Accumulate all `rows_per_block` rows of `block` into `scratch`.
    #[inline]
    fn fill_block(&self, block: usize, p: &[T], scratch: &mut [T]) {
        let rpb = self.rows_per_block;
        let start = self.block_start[block] as usize;
        let width = self.columns_per_block[block] as usize;

        for slot in 0..width {
            let stride_start = start + slot * rpb;
            let vals = &self.values[stride_start..stride_start + rpb];
            let cols = &self.col_idx[stride_start..stride_start + rpb];
            for ((acc, &v), &c) in scratch.iter_mut().zip(vals).zip(cols) {
                if !v.is_zero() {
                    *acc += p[c as usize] * v;
                }
            }
        }
    }
}

impl<'a, T: CgScalar> FusedCgProduct<T> for SlicedEllView<'a, T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::SlicedEll
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
        fused_blocks(&mut ap[..self.rows], p, self.rows_per_block, config, |block, scratch| {
            self.fill_block(block, p, scratch)
        })
    }
}
