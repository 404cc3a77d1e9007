//! Fused CG vector update.
//!
//! One pass over `result`, `p`, `r` and `Ap` computes
//!
//! ```text
//! result += alpha * p
//! r      -= alpha * Ap
//! p       = r + beta * p
//! ```
//!
//! together with `(r, r)` of the updated residual. Per element the order is
//! fixed: `result` and the new `p` both use the *old* `p[i]`, while the new
//! `p[i]` and the reduction use the *new* `r[i]`. Reordering changes the
//! numbers.

use tracing::{debug, trace};

use crate::reduction::ReductionLayout;
use crate::types::{CgScalar, KernelConfig};

/// Update one contiguous range and return its `(r, r)` contribution.
#[inline]
fn update_range<T: CgScalar>(result: &mut [T], alpha: T, p: &mut [T], r: &mut [T], ap: &[T], beta: T) -> T {
    let mut r_r = T::zero();
    for (((x, p_i), r_i), &ap_i) in result.iter_mut().zip(p.iter_mut()).zip(r.iter_mut()).zip(ap) {
        let old_p = *p_i;

        *x += alpha * old_p;
        let new_r = *r_i - alpha * ap_i;
        let new_p = new_r + beta * old_p;
        r_r += new_r * new_r;

        *p_i = new_p;
        *r_i = new_r;
    }
    r_r
}

/// Apply the CG recurrence in place and write `(r, r)` at offset `0` of
/// `buffer`.
///
/// `Ap` is read only. Offsets `B` and `2B` of the buffer are never touched, so
/// the fused product's sums from the same iteration survive this call.
///
/// # Preconditions
///
/// `result`, `p`, `r` and `ap` have the same length and `buffer` is not empty.
/// Only checked in debug builds.
#[allow(clippy::too_many_arguments)]
pub fn pipelined_cg_vector_update<T: CgScalar>(
    result: &mut [T],
    alpha: T,
    p: &mut [T],
    r: &mut [T],
    ap: &[T],
    beta: T,
    buffer: &mut [T],
    config: &KernelConfig,
) {
    let n = result.len();
    debug_assert_eq!(p.len(), n, "p length must equal result length");
    debug_assert_eq!(r.len(), n, "r length must equal result length");
    debug_assert_eq!(ap.len(), n, "Ap length must equal result length");
    debug_assert!(!buffer.is_empty(), "reduction buffer is empty");

    if config.parallel_unavailable() {
        debug!("parallel policy requested without the `parallel` feature; running sequentially");
    }
    let parallel = config.wants_parallel(n);
    trace!("cg vector update: n={}, parallel={}", n, parallel);

    let r_r = if parallel {
        update_parallel(result, alpha, p, r, ap, beta, config.chunk_len)
    } else {
        update_range(result, alpha, p, r, ap, beta)
    };

    buffer[ReductionLayout::for_len(buffer.len()).r_r()] = r_r;
}

#[cfg(feature = "parallel")]
fn update_parallel<T: CgScalar>(
    result: &mut [T],
    alpha: T,
    p: &mut [T],
    r: &mut [T],
    ap: &[T],
    beta: T,
    chunk_len: usize,
) -> T {
    use rayon::prelude::*;

    let partials: Vec<T> = result
        .par_chunks_mut(chunk_len)
        .zip(p.par_chunks_mut(chunk_len))
        .zip(r.par_chunks_mut(chunk_len))
        .zip(ap.par_chunks(chunk_len))
        .map(|(((x, p), r), ap)| update_range(x, alpha, p, r, ap, beta))
        .collect();

    partials.into_iter().fold(T::zero(), |acc, part| acc + part)
}

#[cfg(not(feature = "parallel"))]
#[inline]
fn update_parallel<T: CgScalar>(
    result: &mut [T],
    alpha: T,
    p: &mut [T],
    r: &mut [T],
    ap: &[T],
    beta: T,
    _chunk_len: usize,
) -> T {
    update_range(result, alpha, p, r, ap, beta)
}
