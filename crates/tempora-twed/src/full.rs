//! Full-matrix TWED: materializes the whole `(n+1) x (m+1)` cost table.

use std::ops::Index;

use crate::cost::{Kernel, LocalCosts, Scalar, Vector, min3};
use crate::error::{TwedError, check_finite};
use crate::params::{Boundary, TwedParams};
use crate::series::SeriesView;

/// Dense TWED cost table, stored row-major.
///
/// Row and column 0 hold the empty-prefix costs; cell `(i, j)` is the
/// cheapest alignment of the first `i` samples of A with the first `j`
/// samples of B. The distance is the bottom-right cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Return the number of rows (`n + 1`).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns (`m + 1`).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the cumulative cost at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows()` or `j >= n_cols()`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.offset(i, j)]
    }

    fn offset(&self, i: usize, j: usize) -> usize {
        assert!(i < self.n_rows, "row index {i} out of bounds for {} rows", self.n_rows);
        assert!(j < self.n_cols, "column index {j} out of bounds for {} columns", self.n_cols);
        i * self.n_cols + j
    }

    /// Return row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Return the raw bottom-right cell, which may be non-finite.
    #[must_use]
    pub fn final_cost(&self) -> f64 {
        self.data[self.data.len() - 1]
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[self.offset(i, j)]
    }
}

/// Compute the full TWED cost table for two validated views of equal dimension.
pub(crate) fn cost_matrix(a: SeriesView<'_>, b: SeriesView<'_>, params: &TwedParams) -> CostMatrix {
    if a.dim() == 1 {
        fill::<Scalar>(&LocalCosts::new(a, b, params), params.boundary())
    } else {
        fill::<Vector>(&LocalCosts::new(a, b, params), params.boundary())
    }
}

fn fill<K: Kernel>(costs: &LocalCosts<'_, K>, boundary: Boundary) -> CostMatrix {
    let n = costs.n();
    let m = costs.m();
    let w = m + 1;
    let mut d = vec![0.0; (n + 1) * w];

    // Row 0 and column 0: empty-prefix costs.
    for j in 1..=m {
        d[j] = match boundary {
            Boundary::Deletion => d[j - 1] + costs.delete_b(j),
            Boundary::Infinite => f64::INFINITY,
        };
    }
    for i in 1..=n {
        d[i * w] = match boundary {
            Boundary::Deletion => d[(i - 1) * w] + costs.delete_a(i),
            Boundary::Infinite => f64::INFINITY,
        };
    }

    for i in 1..=n {
        let del_a = costs.delete_a(i);
        for j in 1..=m {
            let above = d[(i - 1) * w + j] + del_a;
            let left = d[i * w + j - 1] + costs.delete_b(j);
            let diag = d[(i - 1) * w + j - 1] + costs.matching(i, j);
            d[i * w + j] = min3(above, left, diag);
        }
    }

    CostMatrix {
        n_rows: n + 1,
        n_cols: w,
        data: d,
    }
}

/// Compute the TWED distance between two scalar sequences with the full cost matrix.
///
/// `a` and `b` are sample values, `timestamps_a` and `timestamps_b` their
/// (non-decreasing) timestamps. Allocates `(n+1) * (m+1)` cells; use
/// [`twed_compact`][crate::twed_compact] for the same value in `O(min(n, m))` memory.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TwedError::InvalidStiffness`] / [`TwedError::InvalidPenalty`] / [`TwedError::InvalidDegree`] | Invalid parameter |
/// | [`TwedError::EmptySequence`] | Either sequence is empty |
/// | [`TwedError::LengthMismatch`] | Values and timestamps differ in length |
/// | [`TwedError::NonFiniteTimestamp`] / [`TwedError::NonMonotonicTimestamps`] | Invalid time axis |
/// | [`TwedError::NumericOverflow`] / [`TwedError::NanResult`] | Non-finite accumulated cost |
pub fn twed_full(
    a: &[f64],
    b: &[f64],
    timestamps_a: &[f64],
    timestamps_b: &[f64],
    nu: f64,
    lambda: f64,
    degree: f64,
) -> Result<f64, TwedError> {
    let params = TwedParams::new(nu, lambda, degree)?;
    let a = SeriesView::new(a, timestamps_a)?;
    let b = SeriesView::new(b, timestamps_b)?;
    check_finite(cost_matrix(a, b, &params).final_cost())
}
