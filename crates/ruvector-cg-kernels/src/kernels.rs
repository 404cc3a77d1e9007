//! Kernel facade.
//!
//! [`CgKernels`] bundles a [`KernelConfig`] with the two per-iteration
//! primitives of pipelined CG. The plain methods are the hot path and assume
//! the caller's buffers are congruent. The `try_*` methods check lengths and
//! the reduction buffer layout first.

use crate::error::KernelError;
use crate::reduction::ReductionLayout;
use crate::traits::FusedCgProduct;
use crate::types::{CgScalar, KernelConfig};
use crate::vector_update::pipelined_cg_vector_update;

/// Pipelined CG kernels with a fixed scheduling configuration.
///
/// Stateless apart from the configuration; one instance can serve any number
/// of solves and any element type.
#[derive(Debug, Clone, Default)]
pub struct CgKernels {
    config: KernelConfig,
}

impl CgKernels {
    /// Create kernels with the given configuration.
    pub fn new(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Create kernels after validating the configuration.
    pub fn try_new(config: KernelConfig) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The scheduling configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// `result += alpha*p; r -= alpha*Ap; p = r + beta*p`, writing `(r, r)` at
    /// buffer offset `0`.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn vector_update<T: CgScalar>(
        &self,
        result: &mut [T],
        alpha: T,
        p: &mut [T],
        r: &mut [T],
        ap: &[T],
        beta: T,
        buffer: &mut [T],
    ) {
        pipelined_cg_vector_update(result, alpha, p, r, ap, beta, buffer, &self.config);
    }

    /// `Ap = A*p`, writing `(Ap, Ap)` at offset `B` and `(p, Ap)` at offset
    /// `2B`.
    #[inline]
    pub fn prod<T, M>(&self, a: &M, p: &[T], ap: &mut [T], buffer: &mut [T])
    where
        T: CgScalar,
        M: FusedCgProduct<T> + ?Sized,
    {
        a.pipelined_cg_prod(p, ap, buffer, &self.config);
    }

    /// Checked [`vector_update`](Self::vector_update).
    ///
    /// # Errors
    ///
    /// * [`KernelError::DimensionMismatch`] if the four vectors differ in
    ///   length.
    /// * [`KernelError::InvalidReductionBuffer`] if `buffer` is not a non-zero
    ///   multiple of 3 long.
    #[allow(clippy::too_many_arguments)]
    pub fn try_vector_update<T: CgScalar>(
        &self,
        result: &mut [T],
        alpha: T,
        p: &mut [T],
        r: &mut [T],
        ap: &[T],
        beta: T,
        buffer: &mut [T],
    ) -> Result<(), KernelError> {
        let n = result.len();
        for (what, len) in [("p", p.len()), ("r", r.len()), ("Ap", ap.len())] {
            if len != n {
                return Err(KernelError::length(what, len, n));
            }
        }
        ReductionLayout::checked(buffer.len())?;

        self.vector_update(result, alpha, p, r, ap, beta, buffer);
        Ok(())
    }

    /// Checked [`prod`](Self::prod).
    ///
    /// Squareness of `a` is not checked; `p` is indexed by row for the
    /// `(p, Ap)` sum, which a non-square matrix with more rows than columns
    /// turns into a panic.
    ///
    /// # Errors
    ///
    /// * [`KernelError::DimensionMismatch`] if `p.len() != a.cols()` or
    ///   `ap.len() != a.rows()`.
    /// * [`KernelError::InvalidReductionBuffer`] if `buffer` is not a non-zero
    ///   multiple of 3 long.
    pub fn try_prod<T, M>(&self, a: &M, p: &[T], ap: &mut [T], buffer: &mut [T]) -> Result<(), KernelError>
    where
        T: CgScalar,
        M: FusedCgProduct<T> + ?Sized,
    {
        if p.len() != a.cols() {
            return Err(KernelError::length("p", p.len(), a.cols()));
        }
        if ap.len() != a.rows() {
            return Err(KernelError::length("Ap", ap.len(), a.rows()));
        }
        ReductionLayout::checked(buffer.len())?;

        self.prod(a, p, ap, buffer);
        Ok(())
    }
}
