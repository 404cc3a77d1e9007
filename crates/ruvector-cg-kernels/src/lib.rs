//! Fused kernels for pipelined Conjugate Gradient in the ruvector ecosystem.
//!
//! A pipelined CG iteration needs two primitives, each a single pass over
//! memory:
//!
//! * a vector update `result += alpha*p; r -= alpha*Ap; p = r + beta*p` fused
//!   with `(r, r)`, see [`vector_update`];
//! * a sparse product `Ap = A*p` fused with `(Ap, Ap)` and `(p, Ap)`,
//!   specialised per storage format, see [`formats`].
//!
//! Both write their sums into one caller-owned reduction buffer (see
//! [`reduction`]). Step sizes, convergence checks and the iteration loop stay
//! with the caller.
//!
//! # Supported formats
//!
//! | View | Format |
//! |------|--------|
//! | [`CsrView`](formats::CsrView) | compressed sparse row |
//! | [`CooView`](formats::CooView) | coordinate |
//! | [`EllView`](formats::EllView) | fixed-width ELL |
//! | [`SlicedEllView`](formats::SlicedEllView) | sliced ELL |
//! | [`HybView`](formats::HybView) | ELL + CSR overflow |
//!
//! # Example
//!
//! ```rust
//! use ruvector_cg_kernels::formats::{CsrView, SparseMatrixView};
//! use ruvector_cg_kernels::kernels::CgKernels;
//! use ruvector_cg_kernels::reduction::{reduction_buffer, InnerProducts};
//!
//! // 1x1 matrix [5]
//! let (row_ptr, col_idx, values) = ([0u32, 1], [0u32], [5.0f64]);
//! let a: SparseMatrixView<'_, f64> = CsrView::new(1, 1, &row_ptr, &col_idx, &values)
//!     .unwrap()
//!     .into();
//!
//! let kernels = CgKernels::default();
//! let p = [3.0];
//! let mut ap = [0.0];
//! let mut buffer = reduction_buffer::<f64>(1);
//! kernels.prod(&a, &p, &mut ap, &mut buffer);
//!
//! let sums = InnerProducts::from_buffer(&buffer);
//! assert_eq!(ap, [15.0]);
//! assert_eq!(sums.ap_ap, 225.0);
//! assert_eq!(sums.p_ap, 45.0);
//! ```
//!
//! # Feature flags
//!
//! * `parallel` (default): partition rows across the rayon pool; see
//!   [`types::KernelConfig`].

pub mod error;
pub mod formats;
pub mod kernels;
mod partition;
pub mod reduction;
pub mod traits;
pub mod types;
pub mod vector_update;

pub use error::KernelError;
pub use formats::SparseMatrixView;
pub use kernels::CgKernels;
pub use traits::FusedCgProduct;
pub use types::{CgScalar, ExecutionPolicy, KernelConfig, SparseFormat};
