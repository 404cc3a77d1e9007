//! Borrowed sparse matrix views and their fused CG products.
//!
//! One module per encoding. All of them satisfy the same
//! [`FusedCgProduct`] contract; only the traversal differs:
//!
//! | Format     | Traversal                                   | Padding           |
//! |------------|---------------------------------------------|-------------------|
//! | CSR        | row by row over `row_ptr` ranges            | none              |
//! | COO        | zero `Ap`, scatter all triples, then reduce | none              |
//! | ELL        | row by row over fixed slots                 | skip-if-zero      |
//! | sliced ELL | block by block into a scratch accumulator   | skip-if-zero      |
//! | HYB        | ELL slots, then CSR overflow, per row       | ELL part only     |
//!
//! # Padding sentinel
//!
//! The ELL family marks unused slots with a stored value of exactly zero and
//! the column index of such a slot may be garbage. The zero test therefore
//! happens *before* the column index is read. A structurally present
//! coefficient that is exactly zero is indistinguishable from padding and is
//! skipped too; it contributes nothing either way.

pub mod coo;
pub mod csr;
pub mod ell;
pub mod hyb;
pub mod sliced_ell;

pub use coo::CooView;
pub use csr::CsrView;
pub use ell::EllView;
pub use hyb::HybView;
pub use sliced_ell::SlicedEllView;

use crate::error::KernelError;
use crate::reduction::ProductSums;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, KernelConfig, SparseFormat};

// ---------------------------------------------------------------------------
// Shared indexing helpers
// ---------------------------------------------------------------------------

/// Sum `values[k] * p[col_idx[k]]` over `row_ptr[row]..row_ptr[row + 1]`,
/// starting from `acc`.
#[inline]
pub(crate) fn csr_row_dot<T: CgScalar>(
    row_ptr: &[u32],
    col_idx: &[u32],
    values: &[T],
    row: usize,
    p: &[T],
    acc: T,
) -> T {
    let start = row_ptr[row] as usize;
    let end = row_ptr[row + 1] as usize;
    values[start..end]
        .iter()
        .zip(&col_idx[start..end])
        .fold(acc, |sum, (&v, &c)| sum + v * p[c as usize])
}

/// Sum the `width` column-major ELL slots of `row`, skipping padding, starting
/// from `acc`. Slot `k` of `row` lives at `row + k * stride`.
#[inline]
pub(crate) fn ell_row_dot<T: CgScalar>(
    col_idx: &[u32],
    values: &[T],
    stride: usize,
    width: usize,
    row: usize,
    p: &[T],
    acc: T,
) -> T {
    let mut sum = acc;
    for slot in 0..width {
        let offset = row + slot * stride;
        let v = values[offset];
        if !v.is_zero() {
            sum += p[col_idx[offset] as usize] * v;
        }
    }
    sum
}

/// Length check for a slice paired with a required length.
#[inline]
pub(crate) fn expect_len(what: &str, got: usize, expected: usize) -> Result<(), KernelError> {
    if got != expected {
        return Err(KernelError::length(what, got, expected));
    }
    Ok(())
}

/// `row_ptr` must hold `rows + 1` offsets ending at or before `nnz`.
pub(crate) fn check_row_ptr(what: &str, row_ptr: &[u32], rows: usize, nnz: usize) -> Result<(), KernelError> {
    expect_len(what, row_ptr.len(), rows + 1)?;
    debug_assert!(
        row_ptr.windows(2).all(|w| w[0] <= w[1]),
        "{what} is not monotonically non-decreasing"
    );
    debug_assert!(
        row_ptr[rows] as usize <= nnz,
        "{what} ends at {} past {nnz} stored entries",
        row_ptr[rows]
    );
    Ok(())
}

/// Padded row count of an ELL block must cover every logical row.
pub(crate) fn check_internal_size1(internal_size1: usize, rows: usize) -> Result<(), KernelError> {
    if internal_size1 < rows {
        return Err(KernelError::ParameterOutOfRange {
            name: "internal_size1".into(),
            value: internal_size1.to_string(),
            expected: format!(">= rows ({rows})"),
        });
    }
    Ok(())
}

/// Debug-only: every non-padding slot's column index must be below `cols`.
#[inline]
pub(crate) fn debug_check_columns<T: CgScalar>(col_idx: &[u32], values: &[T], cols: usize, skip_zero: bool) {
    debug_assert!(
        col_idx
            .iter()
            .zip(values)
            .all(|(&c, v)| (skip_zero && v.is_zero()) || (c as usize) < cols),
        "column index out of range for {cols} columns"
    );
}

// ---------------------------------------------------------------------------
// SparseMatrixView
// ---------------------------------------------------------------------------

/// Any of the five encodings behind one type.
///
/// Lets a CG driver hold a single matrix handle while the product still runs
/// the format-specific kernel.
#[derive(Debug, Clone, Copy)]
pub enum SparseMatrixView<'a, T> {
    /// Compressed sparse row.
    Csr(CsrView<'a, T>),
    /// Coordinate triplets.
    Coo(CooView<'a, T>),
    /// Fixed-width ELL.
    Ell(EllView<'a, T>),
    /// Sliced ELL.
    SlicedEll(SlicedEllView<'a, T>),
    /// ELL plus CSR overflow.
    Hyb(HybView<'a, T>),
}

impl<'a, T: CgScalar> SparseMatrixView<'a, T> {
    fn inner(&self) -> &dyn FusedCgProduct<T> {
        match self {
            SparseMatrixView::Csr(m) => m,
            SparseMatrixView::Coo(m) => m,
            SparseMatrixView::Ell(m) => m,
            SparseMatrixView::SlicedEll(m) => m,
            SparseMatrixView::Hyb(m) => m,
        }
    }
}

impl<'a, T: CgScalar> FusedCgProduct<T> for SparseMatrixView<'a, T> {
    fn format(&self) -> SparseFormat {
        match self {
            SparseMatrixView::Csr(_) => SparseFormat::Csr,
            SparseMatrixView::Coo(_) => SparseFormat::Coo,
            SparseMatrixView::Ell(_) => SparseFormat::Ell,
            SparseMatrixView::SlicedEll(_) => SparseFormat::SlicedEll,
            SparseMatrixView::Hyb(_) => SparseFormat::Hyb,
        }
    }

    fn rows(&self) -> usize {
        self.inner().rows()
    }

    fn cols(&self) -> usize {
        self.inner().cols()
    }

    fn nnz(&self) -> usize {
        self.inner().nnz()
    }

    fn fused_product(&self, p: &[T], ap: &mut [T], config: &KernelConfig) -> ProductSums<T> {
        match self {
            SparseMatrixView::Csr(m) => m.fused_product(p, ap, config),
            SparseMatrixView::Coo(m) => m.fused_product(p, ap, config),
            SparseMatrixView::Ell(m) => m.fused_product(p, ap, config),
            SparseMatrixView::SlicedEll(m) => m.fused_product(p, ap, config),
            SparseMatrixView::Hyb(m) => m.fused_product(p, ap, config),
        }
    }
}

impl<'a, T> From<CsrView<'a, T>> for SparseMatrixView<'a, T> {
    fn from(m: CsrView<'a, T>) -> Self {
        SparseMatrixView::Csr(m)
    }
}

impl<'a, T> From<CooView<'a, T>> for SparseMatrixView<'a, T> {
    fn from(m: CooView<'a, T>) -> Self {
        SparseMatrixView::Coo(m)
    }
}

impl<'a, T> From<EllView<'a, T>> for SparseMatrixView<'a, T> {
    fn from(m: EllView<'a, T>) -> Self {
        SparseMatrixView::Ell(m)
    }
}

impl<'a, T> From<SlicedEllView<'a, T>> for SparseMatrixView<'a, T> {
    fn from(m: SlicedEllView<'a, T>) -> Self {
        SparseMatrixView::SlicedEll(m)
    }
}

impl<'a, T> From<HybView<'a, T>> for SparseMatrixView<'a, T> {
    fn from(m: HybView<'a, T>) -> Self {
        SparseMatrixView::Hyb(m)
    }
}
