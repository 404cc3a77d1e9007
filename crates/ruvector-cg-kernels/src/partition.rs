//! Row-partitioned execution of the fused products.
//!
//! Every row-oriented format (CSR, ELL, HYB) reduces to "compute one value per
//! row, write it to `Ap`, fold it into two sums", and sliced ELL reduces to
//! the same thing per block. This module owns that loop so the format modules
//! only describe how a row (or block) is evaluated.
//!
//! With the `parallel` feature, `Ap` is split into disjoint chunks of
//! [`KernelConfig::chunk_len`] rows. Each chunk keeps its own partial sums;
//! partials are collected in chunk order and combined sequentially, so the
//! combine step is deterministic for a fixed chunk length.

use crate::reduction::ProductSums;
use crate::types::{CgScalar, KernelConfig};

/// Fold a row-ordered sequence of partial sums.
#[cfg(feature = "parallel")]
#[inline]
fn combine_ordered<T: CgScalar>(partials: impl IntoIterator<Item = ProductSums<T>>) -> ProductSums<T> {
    partials
        .into_iter()
        .fold(ProductSums::zero(), ProductSums::combine)
}

/// Evaluate rows `first_row..first_row + ap.len()` into `ap`.
#[inline]
fn rows_into<T, F>(first_row: usize, ap: &mut [T], p: &[T], row_value: &F, sums: &mut ProductSums<T>)
where
    T: CgScalar,
    F: Fn(usize) -> T,
{
    for (offset, out) in ap.iter_mut().enumerate() {
        let row = first_row + offset;
        let value = row_value(row);
        *out = value;
        sums.accumulate(p[row], value);
    }
}

/// Fused row pass: `ap[row] = row_value(row)` for every row, returning
/// `(Ap, Ap)` and `(p, Ap)` with `p` indexed by row.
pub(crate) fn fused_rows<T, F>(ap: &mut [T], p: &[T], config: &KernelConfig, row_value: F) -> ProductSums<T>
where
    T: CgScalar,
    F: Fn(usize) -> T + Sync,
{
    if config.wants_parallel(ap.len()) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let chunk_len = config.chunk_len;
            let partials: Vec<ProductSums<T>> = ap
                .par_chunks_mut(chunk_len)
                .enumerate()
                .map(|(chunk, out)| {
                    let mut sums = ProductSums::zero();
                    rows_into(chunk * chunk_len, out, p, &row_value, &mut sums);
                    sums
                })
                .collect();
            return combine_ordered(partials);
        }
    }

    let mut sums = ProductSums::zero();
    rows_into(0, ap, p, &row_value, &mut sums);
    sums
}

/// Flush one block's scratch accumulator into `ap`.
///
/// `out` is the slice of `ap` owned by the block. It is shorter than `scratch`
/// for an overhanging last block; the extra scratch rows are dropped here and
/// never reach `ap` or the sums.
#[inline]
fn flush_block<T: CgScalar>(first_row: usize, out: &mut [T], scratch: &[T], p: &[T], sums: &mut ProductSums<T>) {
    for (offset, (dst, &value)) in out.iter_mut().zip(scratch).enumerate() {
        *dst = value;
        sums.accumulate(p[first_row + offset], value);
    }
}

/// Fused block pass for blocked layouts.
///
/// `fill_block(block, scratch)` accumulates all `rows_per_block` rows of
/// `block` into a zeroed `scratch`. Sums run block by block, row by row within
/// a block.
pub(crate) fn fused_blocks<T, F>(
    ap: &mut [T],
    p: &[T],
    rows_per_block: usize,
    config: &KernelConfig,
    fill_block: F,
) -> ProductSums<T>
where
    T: CgScalar,
    F: Fn(usize, &mut [T]) + Sync,
{
    debug_assert!(rows_per_block > 0, "rows_per_block must be positive");

    let run_block = |block: usize, out: &mut [T], scratch: &mut [T], sums: &mut ProductSums<T>| {
        scratch.fill(T::zero());
        fill_block(block, scratch);
        flush_block(block * rows_per_block, out, scratch, p, sums);
    };

    if config.wants_parallel(ap.len()) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            // Never more blocks per task than the matrix has, so the task
            // length cannot overflow for a huge `chunk_len`.
            let num_blocks = ap.len().div_ceil(rows_per_block).max(1);
            let blocks_per_task = config.chunk_len.div_ceil(rows_per_block).clamp(1, num_blocks);
            let partials: Vec<ProductSums<T>> = ap
                .par_chunks_mut(blocks_per_task * rows_per_block)
                .enumerate()
                .map_init(
                    || vec![T::zero(); rows_per_block],
                    |scratch, (task, out)| {
                        let mut sums = ProductSums::zero();
                        for (i, block_out) in out.chunks_mut(rows_per_block).enumerate() {
                            run_block(task * blocks_per_task + i, block_out, scratch, &mut sums);
                        }
                        sums
                    },
                )
                .collect();
            return combine_ordered(partials);
        }
    }

    let mut scratch = vec![T::zero(); rows_per_block];
    let mut sums = ProductSums::zero();
    for (block, block_out) in ap.chunks_mut(rows_per_block).enumerate() {
        run_block(block, block_out, &mut scratch, &mut sums);
    }
    sums
}
