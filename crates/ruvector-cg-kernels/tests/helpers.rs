//! Shared test helpers for the ruvector-cg-kernels integration test suite.
//!
//! Provides a deterministic random generator, logical test matrices, builders
//! that lay a logical matrix out in each of the five storage formats, a dense
//! reference product, and a small pipelined CG driver that exercises both
//! kernels end to end.

#![allow(dead_code)]

use ruvector_cg_kernels::formats::{
    CooView, CsrView, EllView, HybView, SlicedEllView, SparseMatrixView,
};
use ruvector_cg_kernels::kernels::CgKernels;
use ruvector_cg_kernels::reduction::{reduction_buffer, InnerProducts};
use ruvector_cg_kernels::traits::FusedCgProduct;
use ruvector_cg_kernels::types::CgScalar;

/// Column index stored in padding slots. Any read of it would panic.
pub const PAD_COL: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// A minimal linear congruential generator for deterministic test data.
///
/// Uses the Knuth MMIX multiplier and increment. Not cryptographically
/// secure, but adequate for reproducible sparsity patterns and values.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a new LCG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next u64 value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Generate a uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform f64 in [lo, hi).
    pub fn next_f64_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Generate a uniform index in [0, n).
    pub fn next_below(&mut self, n: usize) -> usize {
        (self.next_u64() >> 33) as usize % n
    }
}

/// A non-zero value in `[-1, -0.1] U [0.1, 1]`.
fn nonzero_value(rng: &mut Lcg) -> f64 {
    let magnitude = rng.next_f64_range(0.1, 1.0);
    if rng.next_u64() & 1 == 0 {
        magnitude
    } else {
        -magnitude
    }
}

// ---------------------------------------------------------------------------
// Logical matrices
// ---------------------------------------------------------------------------

/// A logical sparse matrix as distinct `(row, col, value)` triplets.
#[derive(Debug, Clone)]
pub struct TripletMatrix<T> {
    pub rows: usize,
    pub cols: usize,
    pub entries: Vec<(usize, usize, T)>,
}

impl<T: CgScalar> TripletMatrix<T> {
    /// Collect the non-zero entries of a dense row-major matrix.
    pub fn from_dense(dense: &[Vec<T>]) -> Self {
        let rows = dense.len();
        let cols = dense.first().map_or(0, Vec::len);
        let entries = dense
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_zero())
                    .map(move |(c, &v)| (r, c, v))
            })
            .collect();
        Self { rows, cols, entries }
    }

    /// Number of logical non-zeros.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Entries grouped per row, sorted by column.
    pub fn by_row(&self) -> Vec<Vec<(u32, T)>> {
        let mut rows = vec![Vec::new(); self.rows];
        for &(r, c, v) in &self.entries {
            rows[r].push((c as u32, v));
        }
        for row in &mut rows {
            row.sort_by_key(|&(c, _)| c);
        }
        rows
    }

    /// Reference product `y = A * x`.
    pub fn matvec(&self, x: &[T]) -> Vec<T> {
        let mut y = vec![T::zero(); self.rows];
        for &(r, c, v) in &self.entries {
            y[r] += v * x[c];
        }
        y
    }

    /// Convert the element type.
    pub fn cast<U: CgScalar>(&self) -> TripletMatrix<U> {
        TripletMatrix {
            rows: self.rows,
            cols: self.cols,
            entries: self
                .entries
                .iter()
                .map(|&(r, c, v)| (r, c, num_traits::cast(v).unwrap()))
                .collect(),
        }
    }
}

/// Random square matrix with up to `per_row` distinct entries per row.
pub fn random_sparse(n: usize, per_row: usize, seed: u64) -> TripletMatrix<f64> {
    let mut rng = Lcg::new(seed);
    let mut entries = Vec::new();
    for r in 0..n {
        let count = rng.next_below(per_row + 1);
        let mut cols: Vec<usize> = (0..count).map(|_| rng.next_below(n)).collect();
        cols.sort_unstable();
        cols.dedup();
        for c in cols {
            entries.push((r, c, nonzero_value(&mut rng)));
        }
    }
    TripletMatrix {
        rows: n,
        cols: n,
        entries,
    }
}

/// Random symmetric, strictly diagonally dominant matrix with a positive
/// diagonal (hence SPD).
pub fn random_spd(n: usize, per_row: usize, seed: u64) -> TripletMatrix<f64> {
    let mut rng = Lcg::new(seed);
    let mut dense = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for _ in 0..per_row / 2 {
            let j = rng.next_below(n);
            if i != j {
                let v = nonzero_value(&mut rng);
                dense[i][j] = v;
                dense[j][i] = v;
            }
        }
    }
    for i in 0..n {
        let off_diag: f64 = dense[i].iter().map(|v| v.abs()).sum();
        dense[i][i] = off_diag + 1.0 + rng.next_f64();
    }
    TripletMatrix::from_dense(&dense)
}

/// Symmetric tridiagonal matrix with `4` on the diagonal and `-1` beside it.
pub fn tridiagonal(n: usize) -> TripletMatrix<f64> {
    let mut entries = Vec::with_capacity(3 * n);
    for i in 0..n {
        if i > 0 {
            entries.push((i, i - 1, -1.0));
        }
        entries.push((i, i, 4.0));
        if i + 1 < n {
            entries.push((i, i + 1, -1.0));
        }
    }
    TripletMatrix {
        rows: n,
        cols: n,
        entries,
    }
}

/// Deterministic random vector of length `n`.
pub fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|_| rng.next_f64_range(-1.0, 1.0)).collect()
}

// ---------------------------------------------------------------------------
// Storage builders
// ---------------------------------------------------------------------------

/// Owned CSR arrays.
pub struct CsrStorage<T> {
    pub rows: usize,
    pub cols: usize,
    pub row_ptr: Vec<u32>,
    pub col_idx: Vec<u32>,
    pub values: Vec<T>,
}

impl<T: CgScalar> CsrStorage<T> {
    pub fn from_triplets(m: &TripletMatrix<T>) -> Self {
        let mut row_ptr = vec![0u32];
        let mut col_idx = Vec::with_capacity(m.nnz());
        let mut values = Vec::with_capacity(m.nnz());
        for row in m.by_row() {
            for (c, v) in row {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(values.len() as u32);
        }
        Self {
            rows: m.rows,
            cols: m.cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn view(&self) -> CsrView<'_, T> {
        CsrView::new(self.rows, self.cols, &self.row_ptr, &self.col_idx, &self.values).unwrap()
    }
}

/// Owned COO arrays, entries in shuffled order.
pub struct CooStorage<T> {
    pub rows: usize,
    pub cols: usize,
    pub coords: Vec<u32>,
    pub values: Vec<T>,
}

impl<T: CgScalar> CooStorage<T> {
    pub fn from_triplets(m: &TripletMatrix<T>, shuffle_seed: u64) -> Self {
        let mut entries = m.entries.clone();
        let mut rng = Lcg::new(shuffle_seed);
        for i in (1..entries.len()).rev() {
            let j = rng.next_below(i + 1);
            entries.swap(i, j);
        }
        let mut coords = Vec::with_capacity(2 * entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for (r, c, v) in entries {
            coords.push(r as u32);
            coords.push(c as u32);
            values.push(v);
        }
        Self {
            rows: m.rows,
            cols: m.cols,
            coords,
            values,
        }
    }

    pub fn view(&self) -> CooView<'_, T> {
        CooView::new(self.rows, self.cols, &self.coords, &self.values).unwrap()
    }
}

/// Owned ELL arrays with padded rows and `extra_slots` padding slots per row.
pub struct EllStorage<T> {
    pub rows: usize,
    pub cols: usize,
    pub internal_size1: usize,
    pub internal_maxnnz: usize,
    pub col_idx: Vec<u32>,
    pub values: Vec<T>,
}

/// Fill `width` column-major ELL slots at stride `size1` from `rows`.
fn ell_arrays<T: CgScalar>(rows: &[Vec<(u32, T)>], size1: usize, width: usize) -> (Vec<u32>, Vec<T>) {
    let mut col_idx = vec![PAD_COL; size1 * width];
    let mut values = vec![T::zero(); size1 * width];
    for (r, row) in rows.iter().enumerate() {
        for (k, &(c, v)) in row.iter().take(width).enumerate() {
            col_idx[r + k * size1] = c;
            values[r + k * size1] = v;
        }
    }
    (col_idx, values)
}

impl<T: CgScalar> EllStorage<T> {
    pub fn from_triplets(m: &TripletMatrix<T>, extra_slots: usize) -> Self {
        let rows = m.by_row();
        let internal_size1 = m.rows.div_ceil(4) * 4;
        let internal_maxnnz = rows.iter().map(Vec::len).max().unwrap_or(0) + extra_slots;
        let (col_idx, values) = ell_arrays(&rows, internal_size1, internal_maxnnz);
        Self {
            rows: m.rows,
            cols: m.cols,
            internal_size1,
            internal_maxnnz,
            col_idx,
            values,
        }
    }

    pub fn view(&self) -> EllView<'_, T> {
        EllView::new(
            self.rows,
            self.cols,
            self.internal_size1,
            self.internal_maxnnz,
            &self.col_idx,
            &self.values,
        )
        .unwrap()
    }
}

/// Owned sliced ELL arrays.
pub struct SlicedEllStorage<T> {
    pub rows: usize,
    pub cols: usize,
    pub rows_per_block: usize,
    pub columns_per_block: Vec<u32>,
    pub block_start: Vec<u32>,
    pub col_idx: Vec<u32>,
    pub values: Vec<T>,
}

impl<T: CgScalar> SlicedEllStorage<T> {
    pub fn from_triplets(m: &TripletMatrix<T>, rows_per_block: usize, extra_slots: usize) -> Self {
        let rows = m.by_row();
        let num_blocks = m.rows.div_ceil(rows_per_block);
        let mut columns_per_block = Vec::with_capacity(num_blocks);
        let mut block_start = Vec::with_capacity(num_blocks + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();

        for block in 0..num_blocks {
            let first = block * rows_per_block;
            let last = (first + rows_per_block).min(m.rows);
            let width = rows[first..last].iter().map(Vec::len).max().unwrap_or(0) + extra_slots;
            columns_per_block.push(width as u32);
            block_start.push(values.len() as u32);

            for k in 0..width {
                for i in 0..rows_per_block {
                    match rows.get(first + i).and_then(|row| row.get(k)) {
                        Some(&(c, v)) => {
                            col_idx.push(c);
                            values.push(v);
                        }
                        None => {
                            col_idx.push(PAD_COL);
                            values.push(T::zero());
                        }
                    }
                }
            }
        }
        block_start.push(values.len() as u32);

        Self {
            rows: m.rows,
            cols: m.cols,
            rows_per_block,
            columns_per_block,
            block_start,
            col_idx,
            values,
        }
    }

    pub fn view(&self) -> SlicedEllView<'_, T> {
        SlicedEllView::new(
            self.rows,
            self.cols,
            self.rows_per_block,
            &self.columns_per_block,
            &self.block_start,
            &self.col_idx,
            &self.values,
        )
        .unwrap()
    }
}

/// Owned HYB arrays: the first `ell_width` entries of each row go to the ELL
/// part, the rest to the CSR overflow.
pub struct HybStorage<T> {
    pub rows: usize,
    pub cols: usize,
    pub internal_size1: usize,
    pub internal_ellnnz: usize,
    pub ell_col_idx: Vec<u32>,
    pub ell_values: Vec<T>,
    pub csr_row_ptr: Vec<u32>,
    pub csr_col_idx: Vec<u32>,
    pub csr_values: Vec<T>,
}

impl<T: CgScalar> HybStorage<T> {
    pub fn from_triplets(m: &TripletMatrix<T>, ell_width: usize) -> Self {
        let rows = m.by_row();
        let internal_size1 = m.rows + 1;
        let (ell_col_idx, ell_values) = ell_arrays(&rows, internal_size1, ell_width);

        let mut csr_row_ptr = vec![0u32];
        let mut csr_col_idx = Vec::new();
        let mut csr_values = Vec::new();
        for row in &rows {
            for &(c, v) in row.iter().skip(ell_width) {
                csr_col_idx.push(c);
                csr_values.push(v);
            }
            csr_row_ptr.push(csr_values.len() as u32);
        }

        Self {
            rows: m.rows,
            cols: m.cols,
            internal_size1,
            internal_ellnnz: ell_width,
            ell_col_idx,
            ell_values,
            csr_row_ptr,
            csr_col_idx,
            csr_values,
        }
    }

    pub fn view(&self) -> HybView<'_, T> {
        HybView::new(
            self.rows,
            self.cols,
            self.internal_size1,
            self.internal_ellnnz,
            &self.ell_col_idx,
            &self.ell_values,
            &self.csr_row_ptr,
            &self.csr_col_idx,
            &self.csr_values,
        )
        .unwrap()
    }
}

/// One logical matrix laid out in all five formats.
pub struct AllFormats<T> {
    pub csr: CsrStorage<T>,
    pub coo: CooStorage<T>,
    pub ell: EllStorage<T>,
    pub sliced_ell: SlicedEllStorage<T>,
    pub hyb: HybStorage<T>,
}

impl<T: CgScalar> AllFormats<T> {
    /// Default layouts: one padding slot in ELL and sliced ELL, blocks of 4
    /// rows, HYB ELL width 2.
    pub fn build(m: &TripletMatrix<T>) -> Self {
        Self::build_with(m, 4, 1, 2)
    }

    pub fn build_with(m: &TripletMatrix<T>, rows_per_block: usize, extra_slots: usize, hyb_width: usize) -> Self {
        Self {
            csr: CsrStorage::from_triplets(m),
            coo: CooStorage::from_triplets(m, 0x5eed),
            ell: EllStorage::from_triplets(m, extra_slots),
            sliced_ell: SlicedEllStorage::from_triplets(m, rows_per_block, extra_slots),
            hyb: HybStorage::from_triplets(m, hyb_width),
        }
    }

    pub fn views(&self) -> Vec<SparseMatrixView<'_, T>> {
        vec![
            self.csr.view().into(),
            self.coo.view().into(),
            self.ell.view().into(),
            self.sliced_ell.view().into(),
            self.hyb.view().into(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Floating-point utilities
// ---------------------------------------------------------------------------

/// Dot product.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "vectors must have same length");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2 norm.
pub fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// `(Ap, Ap)` and `(p, Ap)` computed from a reference product.
pub fn reference_sums(ap: &[f64], p: &[f64]) -> (f64, f64) {
    (dot(ap, ap), dot(p, ap))
}

// ---------------------------------------------------------------------------
// Pipelined CG driver
// ---------------------------------------------------------------------------

/// Outcome of [`pipelined_cg`].
pub struct CgOutcome {
    pub solution: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Pipelined CG on `A x = b` from `x = 0`, using only the fused kernels for
/// vector work and inner products.
///
/// ```text
/// alpha = rr / pAp
/// beta  = (alpha^2 * ApAp - rr) / rr
/// ```
pub fn pipelined_cg<M>(kernels: &CgKernels, a: &M, b: &[f64], tolerance: f64, max_iter: usize) -> CgOutcome
where
    M: FusedCgProduct<f64> + ?Sized,
{
    let n = b.len();
    let mut x = vec![0.0; n];
    let mut r = b.to_vec();
    let mut p = b.to_vec();
    let mut ap = vec![0.0; n];
    let mut buffer = reduction_buffer::<f64>(1);

    let b_norm = l2_norm(b);
    let mut r_r = dot(&r, &r);

    kernels.prod(a, &p, &mut ap, &mut buffer);
    let first = InnerProducts::from_buffer(&buffer);
    let mut alpha = r_r / first.p_ap;
    let mut beta = (alpha * alpha * first.ap_ap - r_r) / r_r;

    for iteration in 1..=max_iter {
        kernels.vector_update(&mut x, alpha, &mut p, &mut r, &ap, beta, &mut buffer);
        kernels.prod(a, &p, &mut ap, &mut buffer);

        let sums = InnerProducts::from_buffer(&buffer);
        r_r = sums.r_r;
        if r_r.sqrt() <= tolerance * b_norm {
            return CgOutcome {
                solution: x,
                iterations: iteration,
                converged: true,
            };
        }

        alpha = r_r / sums.p_ap;
        beta = (alpha * alpha * sums.ap_ap - r_r) / r_r;
    }

    CgOutcome {
        solution: x,
        iterations: max_iter,
        converged: false,
    }
}
