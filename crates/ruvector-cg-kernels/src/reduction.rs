//! Reduction buffer layout.
//!
//! A single caller-owned buffer of length `3 * B` carries the three inner
//! products of one pipelined CG iteration:
//!
//! | Offset | Written by           | Value          |
//! |--------|----------------------|----------------|
//! | `0`    | vector update        | `(r, r)`       |
//! | `B`    | fused product        | `(Ap, Ap)`     |
//! | `2B`   | fused product        | `(p, Ap)`      |
//!
//! The two kernels never write each other's slot, so one buffer can be shared
//! across an iteration. Only the first entry of each segment is written; the
//! remaining `B - 1` entries are left alone.

use crate::error::KernelError;
use crate::types::CgScalar;

/// Number of reduction segments in the buffer.
pub const REDUCTION_SEGMENTS: usize = 3;

/// Offsets into a reduction buffer of a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReductionLayout {
    width: usize,
}

impl ReductionLayout {
    /// Layout for a buffer of `len` entries; the per-vector width is `len / 3`.
    #[inline]
    pub fn for_len(len: usize) -> Self {
        Self {
            width: len / REDUCTION_SEGMENTS,
        }
    }

    /// Layout check used by the `try_*` entry points.
    pub fn checked(len: usize) -> Result<Self, KernelError> {
        if len == 0 || len % REDUCTION_SEGMENTS != 0 {
            return Err(KernelError::InvalidReductionBuffer { len });
        }
        Ok(Self::for_len(len))
    }

    /// Per-vector width `B`.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Offset of `(r, r)`.
    #[inline]
    pub fn r_r(&self) -> usize {
        0
    }

    /// Offset of `(Ap, Ap)`.
    #[inline]
    pub fn ap_ap(&self) -> usize {
        self.width
    }

    /// Offset of `(p, Ap)`.
    #[inline]
    pub fn p_ap(&self) -> usize {
        2 * self.width
    }
}

/// Allocate a zeroed reduction buffer of width `width`.
pub fn reduction_buffer<T: CgScalar>(width: usize) -> Vec<T> {
    vec![T::zero(); REDUCTION_SEGMENTS * width]
}

/// Write the two fused-product sums into their slots.
#[inline]
pub(crate) fn store_product_sums<T: CgScalar>(buffer: &mut [T], ap_ap: T, p_ap: T) {
    debug_assert!(
        buffer.len() >= REDUCTION_SEGMENTS,
        "reduction buffer too short: {}",
        buffer.len()
    );
    let layout = ReductionLayout::for_len(buffer.len());
    buffer[layout.ap_ap()] = ap_ap;
    buffer[layout.p_ap()] = p_ap;
}

/// Running `(Ap, Ap)` and `(p, Ap)` sums of a fused product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductSums<T> {
    /// Sum of `Ap[row]^2`.
    pub ap_ap: T,
    /// Sum of `p[row] * Ap[row]`.
    pub p_ap: T,
}

impl<T: CgScalar> ProductSums<T> {
    /// Both sums zero.
    #[inline]
    pub fn zero() -> Self {
        Self {
            ap_ap: T::zero(),
            p_ap: T::zero(),
        }
    }

    /// Fold one finished row into the sums.
    #[inline]
    pub fn accumulate(&mut self, p_row: T, ap_row: T) {
        self.ap_ap += ap_row * ap_row;
        self.p_ap += p_row * ap_row;
    }

    /// Add another partition's partial sums.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        Self {
            ap_ap: self.ap_ap + other.ap_ap,
            p_ap: self.p_ap + other.p_ap,
        }
    }

    /// Write both sums into their reduction buffer slots.
    #[inline]
    pub fn store(self, buffer: &mut [T]) {
        store_product_sums(buffer, self.ap_ap, self.p_ap);
    }
}

/// The three inner products of one pipelined CG iteration.
///
/// The caller derives the next step sizes from these:
///
/// ```text
/// alpha = r_r / p_ap
/// beta  = alpha^2 * ap_ap / r_r - 1
/// ```
///
/// where `r_r` is the value from the *previous* vector update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerProducts<T> {
    /// `(r, r)` from the vector update.
    pub r_r: T,
    /// `(Ap, Ap)` from the fused product.
    pub ap_ap: T,
    /// `(p, Ap)` from the fused product.
    pub p_ap: T,
}

impl<T: CgScalar> InnerProducts<T> {
    /// Read the three slots back out of a reduction buffer.
    pub fn from_buffer(buffer: &[T]) -> Self {
        let layout = ReductionLayout::for_len(buffer.len());
        Self {
            r_r: buffer[layout.r_r()],
            ap_ap: buffer[layout.ap_ap()],
            p_ap: buffer[layout.p_ap()],
        }
    }
}
