//! TWED calculator: variant selection, cutoff queries and batch operations.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::compact::{Rolling, rolling};
use crate::distance::TwedDistance;
use crate::error::{TwedError, check_finite};
use crate::full::{CostMatrix, cost_matrix};
use crate::matrix::DistanceMatrix;
use crate::params::TwedParams;
use crate::series::{SeriesView, TimestampedSeries, check_dims};

/// Algorithm used to evaluate the TWED recurrence. Both return the same value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    /// Materialize the whole `(n+1) x (m+1)` table. `O(n * m)` memory.
    Full,

    /// Two rolling rows over the shorter sequence. `O(min(n, m))` memory.
    #[default]
    Compact,
}

/// Immutable TWED configuration. Thread-safe and copyable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Twed {
    params: TwedParams,
    variant: Variant,
}

impl Twed {
    /// Create a calculator using the rolling-buffer variant.
    #[must_use]
    pub fn new(params: TwedParams) -> Self {
        Self {
            params,
            variant: Variant::Compact,
        }
    }

    /// Create a calculator using the full-matrix variant.
    #[must_use]
    pub fn full(params: TwedParams) -> Self {
        Self::new(params).with_variant(Variant::Full)
    }

    /// Set the evaluation variant.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Return the parameters.
    #[must_use]
    pub fn params(&self) -> &TwedParams {
        &self.params
    }

    /// Return the evaluation variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Compute the TWED distance between two sequences.
    ///
    /// Runs in `O(n * m)` time with either variant.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TwedError::DimensionMismatch`] | `a.dim() != b.dim()` |
    /// | [`TwedError::NumericOverflow`] | The accumulated cost is infinite |
    /// | [`TwedError::NanResult`] | The accumulated cost is NaN |
    #[instrument(skip(self, a, b), fields(n = a.len(), m = b.len(), variant = ?self.variant))]
    pub fn distance(
        &self,
        a: SeriesView<'_>,
        b: SeriesView<'_>,
    ) -> Result<TwedDistance, TwedError> {
        check_dims(a, b)?;
        let raw = match self.variant {
            Variant::Full => cost_matrix(a, b, &self.params).final_cost(),
            Variant::Compact => match rolling(a, b, &self.params, None)? {
                Rolling::Complete(cost) => cost,
                Rolling::Abandoned => unreachable!("no cutoff was given"),
            },
        };
        check_finite(raw).map(TwedDistance::new)
    }

    /// Compute the TWED distance with early abandoning.
    ///
    /// Returns [`TwedDistance::INFINITY`] once the distance is known to exceed
    /// `cutoff`; otherwise the exact value of [`distance`][Self::distance].
    /// Always uses the rolling-buffer variant. Inputs whose distance could be
    /// NaN or infinite are never abandoned, so they fail exactly as
    /// [`distance`][Self::distance] does.
    ///
    /// # Errors
    ///
    /// Same conditions as [`distance`][Self::distance].
    #[instrument(skip(self, a, b), fields(n = a.len(), m = b.len()))]
    pub fn distance_with_cutoff(
        &self,
        a: SeriesView<'_>,
        b: SeriesView<'_>,
        cutoff: f64,
    ) -> Result<TwedDistance, TwedError> {
        check_dims(a, b)?;
        match rolling(a, b, &self.params, Some(cutoff))? {
            Rolling::Complete(cost) => check_finite(cost).map(TwedDistance::new),
            Rolling::Abandoned => Ok(TwedDistance::INFINITY),
        }
    }

    /// Compute the full cost table, regardless of the configured variant.
    ///
    /// # Errors
    ///
    /// Returns [`TwedError::DimensionMismatch`] if `a.dim() != b.dim()`.
    /// The table itself may contain non-finite cells; no finiteness check is applied.
    #[instrument(skip(self, a, b), fields(n = a.len(), m = b.len()))]
    pub fn cost_matrix(
        &self,
        a: SeriesView<'_>,
        b: SeriesView<'_>,
    ) -> Result<CostMatrix, TwedError> {
        check_dims(a, b)?;
        Ok(cost_matrix(a, b, &self.params))
    }

    /// Compute the distance from `query` to every candidate.
    ///
    /// Parallelized across candidates with rayon; output order matches `candidates`.
    ///
    /// # Errors
    ///
    /// Returns the first [`TwedError`] encountered.
    #[instrument(skip(self, query, candidates), fields(n = query.len(), k = candidates.len()))]
    pub fn one_to_many(
        &self,
        query: SeriesView<'_>,
        candidates: &[TimestampedSeries],
    ) -> Result<Vec<TwedDistance>, TwedError> {
        candidates
            .par_iter()
            .map(|c| self.distance(query, c.as_view()))
            .collect()
    }

    /// Find the candidate closest to `query`.
    ///
    /// Candidates are scanned in order with the best distance so far as the
    /// early-abandoning cutoff. Ties go to the lower index. Returns `None` when
    /// `candidates` is empty.
    ///
    /// # Errors
    ///
    /// Returns the first [`TwedError`] encountered.
    #[instrument(skip(self, query, candidates), fields(n = query.len(), k = candidates.len()))]
    pub fn nearest(
        &self,
        query: SeriesView<'_>,
        candidates: &[TimestampedSeries],
    ) -> Result<Option<(usize, TwedDistance)>, TwedError> {
        let mut best: Option<(usize, TwedDistance)> = None;
        let mut abandoned = 0usize;

        for (idx, candidate) in candidates.iter().enumerate() {
            let cutoff = best.map_or(f64::INFINITY, |(_, d)| d.value());
            let d = self.distance_with_cutoff(query, candidate.as_view(), cutoff)?;
            if !d.is_finite() {
                abandoned += 1;
                continue;
            }
            if best.is_none_or(|(_, b)| d < b) {
                best = Some((idx, d));
            }
        }

        debug!(abandoned, best = ?best.map(|(i, _)| i), "nearest-neighbour scan complete");
        Ok(best)
    }

    /// Compute pairwise distances for a collection of sequences.
    ///
    /// Returns a symmetric [`DistanceMatrix`] over all unique pairs.
    /// Computation is parallelized across pairs using rayon.
    ///
    /// # Errors
    ///
    /// Returns the first [`TwedError`] encountered.
    #[instrument(skip(self, series), fields(n = series.len()))]
    pub fn pairwise(&self, series: &[TimestampedSeries]) -> Result<DistanceMatrix, TwedError> {
        let n = series.len();
        let total_pairs = n * n.saturating_sub(1) / 2;
        let views: Vec<SeriesView<'_>> = series.iter().map(TimestampedSeries::as_view).collect();

        let lower: Vec<TwedDistance> = (0..total_pairs)
            .into_par_iter()
            .map(|flat| {
                let (i, j) = DistanceMatrix::unflatten(flat);
                self.distance(views[i], views[j])
            })
            .collect::<Result<_, _>>()?;

        debug!(pairs = total_pairs, "pairwise distances complete");
        Ok(DistanceMatrix::from_lower(n, lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Boundary;

    fn series(values: &[f64]) -> TimestampedSeries {
        TimestampedSeries::with_unit_timestamps(values.to_vec()).unwrap()
    }

    fn params() -> TwedParams {
        TwedParams::new(0.5, 1.0, 2.0).unwrap()
    }

    #[test]
    fn variants_agree() {
        let a = series(&[1.0, 3.0, 5.0, 2.0, 0.0]);
        let b = series(&[2.0, 4.0, 1.0]);
        let full = Twed::full(params()).distance(a.as_view(), b.as_view()).unwrap();
        let compact = Twed::new(params()).distance(a.as_view(), b.as_view()).unwrap();
        assert_eq!(full.value().to_bits(), compact.value().to_bits());
    }

    #[test]
    fn default_variant_is_compact() {
        assert_eq!(Twed::default().variant(), Variant::Compact);
        assert_eq!(Twed::full(params()).variant(), Variant::Full);
    }

    #[test]
    fn vector_valued_identity() {
        let a = TimestampedSeries::from_vectors(
            vec![vec![1.0, 0.0], vec![2.0, -1.0], vec![0.5, 0.5]],
            vec![0.0, 0.5, 2.0],
        )
        .unwrap();
        let d = Twed::new(params()).distance(a.as_view(), a.as_view()).unwrap();
        assert_eq!(d, TwedDistance::ZERO);
    }

    #[test]
    fn vector_distance_sums_coordinates() {
        // Single sample each: match cost is sum of squared coordinate differences.
        let a = TimestampedSeries::from_vectors(vec![vec![1.0, 2.0]], vec![0.0]).unwrap();
        let b = TimestampedSeries::from_vectors(vec![vec![4.0, 6.0]], vec![0.0]).unwrap();
        let twed = Twed::new(TwedParams::new(0.0, 100.0, 2.0).unwrap());
        assert_eq!(twed.distance(a.as_view(), b.as_view()).unwrap().value(), 25.0);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let a = series(&[1.0, 2.0]);
        let b = TimestampedSeries::from_vectors(vec![vec![1.0, 2.0]], vec![0.0]).unwrap();
        let result = Twed::new(params()).distance(a.as_view(), b.as_view());
        assert!(matches!(result, Err(TwedError::DimensionMismatch { a: 1, b: 2 })));
    }

    #[test]
    fn cost_matrix_final_cell_is_distance() {
        let a = series(&[0.0, 1.0, 4.0]);
        let b = series(&[1.0, 1.0]);
        let twed = Twed::new(params());
        let table = twed.cost_matrix(a.as_view(), b.as_view()).unwrap();
        let d = twed.distance(a.as_view(), b.as_view()).unwrap();
        assert_eq!(table.final_cost(), d.value());
    }

    #[test]
    fn cutoff_matches_exact_distance() {
        let a = series(&[0.0, 1.0, 0.0, 1.0]);
        let b = series(&[1.0, 0.0, 1.0]);
        let twed = Twed::new(params());
        let d = twed.distance(a.as_view(), b.as_view()).unwrap().value();

        let above = twed.distance_with_cutoff(a.as_view(), b.as_view(), d + 0.001).unwrap();
        assert_eq!(above.value(), d);
    }

    #[test]
    fn cutoff_abandons_distant_pair() {
        let a = series(&[0.0; 6]);
        let b = series(&[10.0; 6]);
        let twed = Twed::new(params());
        let d = twed.distance_with_cutoff(a.as_view(), b.as_view(), 1.0).unwrap();
        assert_eq!(d, TwedDistance::INFINITY);
    }

    #[test]
    fn cutoff_reports_nan_distance() {
        let q = series(&[0.0, 0.0, 0.0, 0.0]);
        let bad = series(&[100.0, 100.0, 100.0, 100.0, f64::NAN]);
        let twed = Twed::new(TwedParams::new(0.5, 1.0, 1.0).unwrap());
        assert!(matches!(twed.distance(q.as_view(), bad.as_view()), Err(TwedError::NanResult)));
        assert!(matches!(
            twed.distance_with_cutoff(q.as_view(), bad.as_view(), 1.0),
            Err(TwedError::NanResult)
        ));
    }

    #[test]
    fn cutoff_reports_overflow() {
        let q = series(&[0.0, 0.0, 0.0, 0.0]);
        let over = series(&[5.0, 5.0, 5.0, 5.0, 1e200]);
        let twed = Twed::new(params());
        assert!(matches!(
            twed.distance_with_cutoff(q.as_view(), over.as_view(), 1.0),
            Err(TwedError::NumericOverflow)
        ));
    }

    #[test]
    fn nearest_reports_bad_candidate_in_any_position() {
        let q = series(&[0.0, 0.0, 0.0, 0.0]);
        let good = series(&[0.0, 0.0, 0.0, 0.0]);
        let nan = series(&[100.0, 100.0, 100.0, 100.0, f64::NAN]);
        let over = series(&[1e200, 1e200, 1e200, 1e200]);
        let late_over = series(&[5.0, 5.0, 5.0, 5.0, 1e200]);
        let twed = Twed::new(params());

        for candidates in [vec![nan.clone(), good.clone()], vec![good.clone(), nan.clone()]] {
            let result = twed.nearest(q.as_view(), &candidates);
            assert!(matches!(result, Err(TwedError::NanResult)), "{result:?}");
        }
        for bad in [over, late_over] {
            for candidates in [vec![bad.clone(), good.clone()], vec![good.clone(), bad.clone()]] {
                let result = twed.nearest(q.as_view(), &candidates);
                assert!(matches!(result, Err(TwedError::NumericOverflow)), "{result:?}");
            }
        }
    }

    #[test]
    fn one_to_many_matches_individual() {
        let q = series(&[1.0, 2.0, 3.0]);
        let candidates = vec![series(&[1.0, 2.0, 3.0]), series(&[3.0, 2.0, 1.0]), series(&[0.0])];
        let twed = Twed::new(params());
        let batch = twed.one_to_many(q.as_view(), &candidates).unwrap();
        assert_eq!(batch.len(), 3);
        for (c, d) in candidates.iter().zip(&batch) {
            assert_eq!(*d, twed.distance(q.as_view(), c.as_view()).unwrap());
        }
        assert_eq!(batch[0], TwedDistance::ZERO);
    }

    #[test]
    fn nearest_finds_closest() {
        let q = series(&[1.0, 2.0, 3.0, 4.0]);
        let candidates = vec![
            series(&[9.0, 9.0, 9.0, 9.0]),
            series(&[1.0, 2.0, 3.5, 4.0]),
            series(&[1.0, 2.0, 3.0, 4.0, 8.0]),
            series(&[-5.0, 0.0, 5.0]),
        ];
        let twed = Twed::new(params());
        let (idx, d) = twed.nearest(q.as_view(), &candidates).unwrap().unwrap();
        let all = twed.one_to_many(q.as_view(), &candidates).unwrap();
        let expected = all
            .iter()
            .enumerate()
            .min_by(|x, y| x.1.total_cmp(y.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(idx, expected);
        assert_eq!(d, all[expected]);
    }

    #[test]
    fn nearest_of_empty_set_is_none() {
        let q = series(&[1.0]);
        assert!(Twed::new(params()).nearest(q.as_view(), &[]).unwrap().is_none());
    }

    #[test]
    fn pairwise_matches_individual() {
        let all = vec![series(&[1.0, 2.0, 3.0]), series(&[4.0, 5.0, 6.0]), series(&[1.0, 3.0])];
        let twed = Twed::new(params());
        let matrix = twed.pairwise(&all).unwrap();
        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            for j in 0..3 {
                let direct = twed.distance(all[i].as_view(), all[j].as_view()).unwrap();
                assert_eq!(matrix.get(i, j), direct, "pair ({i}, {j})");
            }
        }
    }

    #[test]
    fn pairwise_of_empty_set() {
        let matrix = Twed::new(params()).pairwise(&[]).unwrap();
        assert!(matrix.is_empty());
    }

    #[test]
    fn pairwise_propagates_errors() {
        let all = vec![
            series(&[1.0, 2.0]),
            TimestampedSeries::from_vectors(vec![vec![1.0, 2.0]], vec![0.0]).unwrap(),
        ];
        let result = Twed::new(params()).pairwise(&all);
        assert!(matches!(result, Err(TwedError::DimensionMismatch { .. })));
    }

    #[test]
    fn infinite_boundary_forces_first_match() {
        // Deletion edges let B skip its leading zero (which equals the origin)
        // for free; infinite edges force matching 10 against 0 first.
        let a = series(&[10.0]);
        let b = series(&[0.0, 10.0]);
        let p = TwedParams::new(0.0, 0.0, 1.0).unwrap();
        let deletion = Twed::new(p).distance(a.as_view(), b.as_view()).unwrap();
        let infinite = Twed::new(p.with_boundary(Boundary::Infinite))
            .distance(a.as_view(), b.as_view())
            .unwrap();
        assert_eq!(deletion.value(), 0.0);
        assert_eq!(infinite.value(), 20.0);
    }
}
