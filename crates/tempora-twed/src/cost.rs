//! Local TWED costs shared by the full-matrix and rolling-buffer variants.
//!
//! Both sequences are read through a virtual origin sample at padded index 0
//! (value zero, timestamp 0); real sample `k` sits at padded index `k + 1`.
//! The origin is the predecessor used by the first deletion and by the
//! "previous pair" term of the first match.
//!
//! Keeping every cost formula in this module fixes the floating-point
//! evaluation order, so both variants produce bit-identical tables.

use std::marker::PhantomData;

use crate::params::{Boundary, Degree, TwedParams};
use crate::series::SeriesView;

/// Elementwise sample distance `sum_k |x_k - y_k|^degree`.
pub(crate) trait Kernel {
    fn dist(x: &[f64], y: &[f64], degree: Degree) -> f64;
}

/// Kernel for `dim == 1`; skips the coordinate loop.
pub(crate) struct Scalar;

impl Kernel for Scalar {
    #[inline(always)]
    fn dist(x: &[f64], y: &[f64], degree: Degree) -> f64 {
        degree.term(x[0] - y[0])
    }
}

/// Kernel for any dimension.
pub(crate) struct Vector;

impl Kernel for Vector {
    #[inline(always)]
    fn dist(x: &[f64], y: &[f64], degree: Degree) -> f64 {
        x.iter()
            .zip(y)
            .fold(0.0, |acc, (&p, &q)| acc + degree.term(p - q))
    }
}

/// Minimum of three candidates that propagates NaN instead of discarding it.
///
/// `f64::min` returns the non-NaN operand, which would silently hide a NaN
/// produced by malformed samples.
#[inline(always)]
pub(crate) fn min3(a: f64, b: f64, c: f64) -> f64 {
    if a.is_nan() || b.is_nan() || c.is_nan() {
        f64::NAN
    } else {
        a.min(b).min(c)
    }
}

/// Local cost evaluator over a pair of sequences with padded indexing.
pub(crate) struct LocalCosts<'a, K: Kernel> {
    a: SeriesView<'a>,
    b: SeriesView<'a>,
    origin: Vec<f64>,
    nu: f64,
    lambda: f64,
    degree: Degree,
    _kernel: PhantomData<K>,
}

impl<'a, K: Kernel> LocalCosts<'a, K> {
    /// Both views must share the same dimension.
    pub(crate) fn new(a: SeriesView<'a>, b: SeriesView<'a>, params: &TwedParams) -> Self {
        debug_assert_eq!(a.dim(), b.dim());
        Self {
            a,
            b,
            origin: vec![0.0; a.dim()],
            nu: params.nu(),
            lambda: params.lambda(),
            degree: params.degree(),
            _kernel: PhantomData,
        }
    }

    /// Number of real samples in A (rows of the table minus one).
    pub(crate) fn n(&self) -> usize {
        self.a.len()
    }

    /// Number of real samples in B (columns of the table minus one).
    pub(crate) fn m(&self) -> usize {
        self.b.len()
    }

    #[inline(always)]
    fn sample<'s>(&'s self, s: &SeriesView<'a>, i: usize) -> &'s [f64] {
        if i == 0 { &self.origin } else { s.sample(i - 1) }
    }

    #[inline(always)]
    fn time(s: &SeriesView<'_>, i: usize) -> f64 {
        if i == 0 { 0.0 } else { s.timestamp(i - 1) }
    }

    /// Cost of deleting padded sample `i` (`i >= 1`) of A.
    #[inline]
    pub(crate) fn delete_a(&self, i: usize) -> f64 {
        self.deletion(&self.a, i)
    }

    /// Cost of deleting padded sample `j` (`j >= 1`) of B.
    #[inline]
    pub(crate) fn delete_b(&self, j: usize) -> f64 {
        self.deletion(&self.b, j)
    }

    #[inline(always)]
    fn deletion(&self, s: &SeriesView<'a>, i: usize) -> f64 {
        let value = K::dist(self.sample(s, i - 1), self.sample(s, i), self.degree);
        let gap = (Self::time(s, i) - Self::time(s, i - 1)).abs();
        value + self.nu * gap + self.lambda
    }

    /// Cost of matching padded samples `i` of A and `j` of B (`i, j >= 1`),
    /// including the previous pair `(i - 1, j - 1)`.
    #[inline]
    pub(crate) fn matching(&self, i: usize, j: usize) -> f64 {
        let current = K::dist(self.sample(&self.a, i), self.sample(&self.b, j), self.degree);
        let previous = K::dist(
            self.sample(&self.a, i - 1),
            self.sample(&self.b, j - 1),
            self.degree,
        );
        let gaps = (Self::time(&self.a, i) - Self::time(&self.b, j)).abs()
            + (Self::time(&self.a, i - 1) - Self::time(&self.b, j - 1)).abs();
        current + previous + self.nu * gaps
    }

    /// Cost of one fixed alignment, accumulated in recurrence order.
    ///
    /// With deletion edges the path runs along row 0 then down column `m`;
    /// with infinite edges it matches `(1, 1)`, runs down column 1 and then
    /// along row `n`. The final cell never exceeds this value, and it is NaN
    /// exactly when some cost on the path is NaN, which then reaches the
    /// final cell too.
    pub(crate) fn path_bound(&self, boundary: Boundary) -> f64 {
        let (n, m) = (self.n(), self.m());
        match boundary {
            Boundary::Deletion => {
                let mut total = 0.0;
                for j in 1..=m {
                    total += self.delete_b(j);
                }
                for i in 1..=n {
                    total += self.delete_a(i);
                }
                total
            }
            Boundary::Infinite => {
                let mut total = 0.0 + self.matching(1, 1);
                for i in 2..=n {
                    total += self.delete_a(i);
                }
                for j in 2..=m {
                    total += self.delete_b(j);
                }
                total
            }
        }
    }

    /// Return true if every timestamp difference, origin included, is finite.
    pub(crate) fn gaps_are_finite(&self) -> bool {
        let (ta, tb) = (self.a.timestamps(), self.b.timestamps());
        let hi = ta[ta.len() - 1].max(tb[tb.len() - 1]).max(0.0);
        let lo = ta[0].min(tb[0]).min(0.0);
        (hi - lo).is_finite()
    }
}
