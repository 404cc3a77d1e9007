//! Core types shared by the fused CG kernels.
//!
//! Provides the [`CgScalar`] element bound, the [`SparseFormat`] tag, and the
//! execution configuration ([`KernelConfig`], [`ExecutionPolicy`]).

use std::fmt::Debug;

use num_traits::{Float, NumAssign};
use serde::{Deserialize, Serialize};

use crate::error::KernelError;

// ---------------------------------------------------------------------------
// Element type
// ---------------------------------------------------------------------------

/// Floating-point element type accepted by every kernel.
///
/// Blanket-implemented, so `f32` and `f64` both qualify. A single `T` is fixed
/// per matrix/vector instantiation; kernels never mix precisions.
pub trait CgScalar: Float + NumAssign + Send + Sync + Debug + 'static {}

impl<T> CgScalar for T where T: Float + NumAssign + Send + Sync + Debug + 'static {}

// ---------------------------------------------------------------------------
// SparseFormat
// ---------------------------------------------------------------------------

/// Physical encoding of a sparse matrix.
///
/// All variants describe the same logical `(row, col) -> value` mapping; they
/// differ only in layout, and therefore in traversal order and in the order in
/// which the fused reductions are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SparseFormat {
    /// Compressed sparse row.
    Csr,
    /// Coordinate triplets, no ordering assumed.
    Coo,
    /// Fixed-width ELLPACK, zero padded.
    Ell,
    /// Sliced ELLPACK: row blocks with per-block width.
    SlicedEll,
    /// ELL part plus a CSR overflow part.
    Hyb,
}

impl SparseFormat {
    /// Whether the encoding carries zero-valued padding slots that must be
    /// skipped before their column index is read.
    #[inline]
    pub fn is_zero_padded(self) -> bool {
        matches!(self, SparseFormat::Ell | SparseFormat::SlicedEll | SparseFormat::Hyb)
    }

    /// Whether the fused product can be split across workers without
    /// write conflicts on `Ap`.
    #[inline]
    pub fn supports_row_partitioning(self) -> bool {
        !matches!(self, SparseFormat::Coo)
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SparseFormat::Csr => write!(f, "csr"),
            SparseFormat::Coo => write!(f, "coo"),
            SparseFormat::Ell => write!(f, "ell"),
            SparseFormat::SlicedEll => write!(f, "sliced-ell"),
            SparseFormat::Hyb => write!(f, "hyb"),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution configuration
// ---------------------------------------------------------------------------

/// How a kernel schedules its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionPolicy {
    /// Single pass on the calling thread.
    Sequential,
    /// Always partition across the rayon pool (when the `parallel` feature is
    /// enabled).
    Parallel,
    /// Partition only when the problem reaches
    /// [`KernelConfig::parallel_threshold`].
    #[default]
    Auto,
}

/// Default minimum length before [`ExecutionPolicy::Auto`] goes parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 5000;

/// Default number of rows handed to one worker task.
pub const DEFAULT_CHUNK_LEN: usize = 2048;

/// Scheduling configuration for the fused kernels.
///
/// The chunk length, not the thread count, determines how partial sums are
/// grouped, so two runs with the same configuration produce bit-identical
/// reductions on any pool size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Scheduling policy.
    pub policy: ExecutionPolicy,
    /// Row count (or vector length) at which `Auto` switches to parallel.
    pub parallel_threshold: usize,
    /// Rows per worker task. Sliced ELL rounds this up to whole blocks.
    pub chunk_len: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            policy: ExecutionPolicy::Auto,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            chunk_len: DEFAULT_CHUNK_LEN,
        }
    }
}

impl KernelConfig {
    /// Configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        Self {
            policy: ExecutionPolicy::Sequential,
            ..Self::default()
        }
    }

    /// Configuration that always partitions, regardless of size.
    pub fn parallel() -> Self {
        Self {
            policy: ExecutionPolicy::Parallel,
            ..Self::default()
        }
    }

    /// Set the scheduling policy.
    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the `Auto` threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Set the number of rows per worker task.
    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len;
        self
    }

    /// Reject configurations the partitioner cannot honour.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.chunk_len == 0 {
            return Err(KernelError::ParameterOutOfRange {
                name: "chunk_len".into(),
                value: "0".into(),
                expected: ">= 1".into(),
            });
        }
        Ok(())
    }

    /// Whether `Parallel` was requested in a build that cannot honour it.
    #[inline]
    pub fn parallel_unavailable(&self) -> bool {
        !cfg!(feature = "parallel") && self.policy == ExecutionPolicy::Parallel
    }

    /// Decide whether a problem of `len` rows should be partitioned.
    ///
    /// Always `false` when the crate is built without the `parallel` feature.
    #[inline]
    pub fn wants_parallel(&self, len: usize) -> bool {
        if !cfg!(feature = "parallel") || self.chunk_len == 0 {
            return false;
        }
        match self.policy {
            ExecutionPolicy::Sequential => false,
            ExecutionPolicy::Parallel => true,
            ExecutionPolicy::Auto => len >= self.parallel_threshold,
        }
    }
}
