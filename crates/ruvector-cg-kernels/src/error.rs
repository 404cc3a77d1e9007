//! Error types for the kernel crate.
//!
//! The kernels themselves never fail: they run on preconditions the caller
//! guarantees. Errors only come out of the checked boundary, i.e. view
//! constructors, [`KernelConfig::validate`](crate::types::KernelConfig::validate)
//! and the `try_*` entry points on [`CgKernels`](crate::kernels::CgKernels).

/// Errors raised while checking kernel inputs.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// A slice length disagrees with the dimensions it is paired with.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The reduction buffer cannot be split into three equal segments.
    #[error("reduction buffer of length {len} is not a non-zero multiple of 3")]
    InvalidReductionBuffer {
        /// Length of the offending buffer.
        len: usize,
    },

    /// A scalar parameter is outside its valid range.
    #[error("parameter out of range: {name} = {value} (expected {expected})")]
    ParameterOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The invalid value.
        value: String,
        /// Human-readable description of the valid range.
        expected: String,
    },
}

impl KernelError {
    /// Shorthand for a [`KernelError::DimensionMismatch`] on a named slice.
    pub(crate) fn length(what: &str, got: usize, expected: usize) -> Self {
        KernelError::DimensionMismatch(format!(
            "{what} has length {got}, expected {expected}"
        ))
    }
}
