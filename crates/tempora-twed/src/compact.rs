//! Rolling-buffer TWED: the same recurrence as [`full`][crate::full] in
//! `O(min(n, m))` memory.

use crate::cost::{Kernel, LocalCosts, Scalar, Vector, min3};
use crate::error::{TwedError, check_finite};
use crate::params::{Boundary, TwedParams};
use crate::series::SeriesView;

/// Outcome of a rolling computation.
pub(crate) enum Rolling {
    /// The raw bottom-right cell (may be non-finite).
    Complete(f64),
    /// A completed row exceeded the cutoff; the final cost is larger.
    Abandoned,
}

/// Rolling TWED over two validated views of equal dimension.
///
/// The shorter sequence becomes the inner (column) dimension. TWED is
/// symmetric and every local cost is bit-symmetric in its arguments, so the
/// transposed table yields exactly the same final cell.
pub(crate) fn rolling(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    params: &TwedParams,
    cutoff: Option<f64>,
) -> Result<Rolling, TwedError> {
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if outer.dim() == 1 {
        rows::<Scalar>(&LocalCosts::new(outer, inner, params), params.boundary(), cutoff)
    } else {
        rows::<Vector>(&LocalCosts::new(outer, inner, params), params.boundary(), cutoff)
    }
}

/// Two-row sweep over the cost table.
///
/// Buffer layout, for row `i` of the logical table `D`:
/// - `prev[j]` holds `D[i-1][j]`, the fully computed previous row
/// - `curr[j]` holds `D[i][j]` once column `j` of row `i` has been written
/// - `del_b[j]` holds `delete_b(j)`, which does not depend on `i` (`del_b[0]` unused)
///
/// Column `j` reads `prev[j]` (above), `prev[j-1]` (diagonal) and
/// `curr[j-1]` (left), so the row is written left to right and the two
/// buffers swap roles before advancing `i`. After the last swap `prev`
/// holds row `n`.
fn rows<K: Kernel>(
    costs: &LocalCosts<'_, K>,
    boundary: Boundary,
    cutoff: Option<f64>,
) -> Result<Rolling, TwedError> {
    let n = costs.n();
    let m = costs.m();

    // Abandon only when the final cell is known to be finite, so a NaN or
    // overflowing distance is reported whatever the cutoff.
    let cutoff = match cutoff {
        Some(c) => {
            let bound = costs.path_bound(boundary);
            if bound.is_nan() {
                return Err(TwedError::NanResult);
            }
            (bound.is_finite() && costs.gaps_are_finite()).then_some(c)
        }
        None => None,
    };

    let mut del_b = vec![0.0; m + 1];
    for (j, slot) in del_b.iter_mut().enumerate().skip(1) {
        *slot = costs.delete_b(j);
    }

    // Row 0: empty prefix of the outer sequence.
    let mut prev = vec![0.0; m + 1];
    for j in 1..=m {
        prev[j] = match boundary {
            Boundary::Deletion => prev[j - 1] + del_b[j],
            Boundary::Infinite => f64::INFINITY,
        };
    }
    let mut curr = vec![0.0; m + 1];

    for i in 1..=n {
        let del_a = costs.delete_a(i);

        // Column 0: empty prefix of the inner sequence.
        curr[0] = match boundary {
            Boundary::Deletion => prev[0] + del_a,
            Boundary::Infinite => f64::INFINITY,
        };
        let mut row_min = curr[0];

        for j in 1..=m {
            let above = prev[j] + del_a;
            let left = curr[j - 1] + del_b[j];
            let diag = prev[j - 1] + costs.matching(i, j);
            let val = min3(above, left, diag);
            curr[j] = val;
            row_min = row_min.min(val);
        }

        // Every local cost is non-negative and every alignment crosses each
        // row, so a row minimum bounds the final cost from below. The last
        // row is excluded: its minimum need not be the final cell.
        if let Some(c) = cutoff
            && i < n
            && row_min > c
        {
            return Ok(Rolling::Abandoned);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    Ok(Rolling::Complete(prev[m]))
}

/// Compute the TWED distance between two scalar sequences with rolling buffers.
///
/// Returns exactly the value of [`twed_full`][crate::twed_full] while keeping
/// only two rows of length `min(n, m) + 1`.
///
/// # Errors
///
/// Same conditions as [`twed_full`][crate::twed_full].
pub fn twed_compact(
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
    match rolling(a, b, &params, None)? {
        Rolling::Complete(cost) => check_finite(cost),
        Rolling::Abandoned => unreachable!("no cutoff was given"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::full::cost_matrix;

    fn complete(r: Result<Rolling, TwedError>) -> f64 {
        match r.unwrap() {
            Rolling::Complete(c) => c,
            Rolling::Abandoned => panic!("unexpected abandon"),
        }
    }

    #[test]
    fn hand_computed_2x2() {
        let d = twed_compact(&[0.0, 5.0], &[0.0, 0.0], &[0.0, 1.0], &[0.0, 1.0], 0.0, 1.0, 2.0)
            .unwrap();
        assert_eq!(d, 25.0);
    }

    #[test]
    fn matches_full_matrix_both_orientations() {
        let av = [0.5, 2.0, -1.0, 3.5, 0.0];
        let at = [0.0, 1.0, 1.5, 4.0, 4.5];
        let bv = [1.0, -0.5, 2.5];
        let bt = [0.5, 2.0, 3.0];
        let a = SeriesView::new(&av, &at).unwrap();
        let b = SeriesView::new(&bv, &bt).unwrap();

        for boundary in [Boundary::Deletion, Boundary::Infinite] {
            let params = TwedParams::new(0.3, 0.7, 2.0).unwrap().with_boundary(boundary);
            let full_ab = cost_matrix(a, b, &params).final_cost();
            let full_ba = cost_matrix(b, a, &params).final_cost();
            let ab = complete(rolling(a, b, &params, None));
            let ba = complete(rolling(b, a, &params, None));
            assert_eq!(ab.to_bits(), full_ab.to_bits(), "{boundary:?}");
            assert_eq!(ba.to_bits(), full_ba.to_bits(), "{boundary:?}");
            assert_eq!(ab.to_bits(), ba.to_bits(), "{boundary:?}");
        }
    }

    #[test]
    fn scalar_and_vector_kernels_agree() {
        let av = [0.25, 1.75, -3.0, 0.5];
        let at = [0.0, 0.5, 1.0, 3.0];
        let bv = [1.0, 0.0, -2.5];
        let bt = [0.0, 1.0, 2.0];
        let a = SeriesView::new(&av, &at).unwrap();
        let b = SeriesView::new(&bv, &bt).unwrap();
        let params = TwedParams::new(0.5, 0.25, 1.5).unwrap();

        let scalar = complete(rows::<Scalar>(&LocalCosts::new(a, b, &params), params.boundary(), None));
        let vector = complete(rows::<Vector>(&LocalCosts::new(a, b, &params), params.boundary(), None));
        assert_eq!(scalar.to_bits(), vector.to_bits());
    }

    #[test]
    fn abandons_above_cutoff() {
        let av = [0.0, 0.0, 0.0, 0.0, 0.0];
        let bv = [10.0, 10.0, 10.0, 10.0, 10.0];
        let t = [1.0, 2.0, 3.0, 4.0, 5.0];
        let a = SeriesView::new(&av, &t).unwrap();
        let b = SeriesView::new(&bv, &t).unwrap();
        let params = TwedParams::new(1.0, 1.0, 1.0).unwrap();
        assert!(matches!(rolling(a, b, &params, Some(1.0)), Ok(Rolling::Abandoned)));
    }

    #[test]
    fn generous_cutoff_is_exact() {
        let av = [0.0, 1.0, 0.0, 2.0];
        let bv = [1.0, 0.0, 2.0];
        let at = [0.0, 1.0, 2.0, 3.0];
        let bt = [0.0, 1.0, 2.0];
        let a = SeriesView::new(&av, &at).unwrap();
        let b = SeriesView::new(&bv, &bt).unwrap();
        let params = TwedParams::default();
        let exact = complete(rolling(a, b, &params, None));
        let cut = complete(rolling(a, b, &params, Some(exact + 1e-9)));
        assert_eq!(exact.to_bits(), cut.to_bits());
    }

    #[test]
    fn nan_aborts_under_cutoff() {
        let av = [1.0, f64::NAN, 2.0];
        let at = [0.0, 1.0, 2.0];
        let a = SeriesView::new(&av, &at).unwrap();
        let params = TwedParams::default();
        assert!(matches!(
            rolling(a, a, &params, Some(1e12)),
            Err(TwedError::NanResult)
        ));
    }

    #[test]
    fn cutoff_never_hides_late_overflow() {
        // Early rows exceed the cutoff; the last sample overflows every alignment.
        let av = [5.0, 5.0, 5.0, 5.0, 1e200];
        let at = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bv = [0.0, 0.0, 0.0, 0.0];
        let a = SeriesView::new(&av, &at).unwrap();
        let b = SeriesView::new(&bv, &at[..4]).unwrap();
        let params = TwedParams::new(0.5, 1.0, 2.0).unwrap();
        let cost = complete(rolling(a, b, &params, Some(0.5)));
        assert_eq!(cost, f64::INFINITY);
    }

    #[test]
    fn nan_in_late_row_is_reported_under_cutoff() {
        let av = [100.0, 100.0, 100.0, 100.0, f64::NAN];
        let at = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bv = [0.0, 0.0, 0.0, 0.0];
        let a = SeriesView::new(&av, &at).unwrap();
        let b = SeriesView::new(&bv, &at[..4]).unwrap();
        let params = TwedParams::new(0.5, 1.0, 1.0).unwrap();
        assert!(matches!(rolling(a, b, &params, Some(1.0)), Err(TwedError::NanResult)));
        assert!(matches!(rolling(b, a, &params, Some(1.0)), Err(TwedError::NanResult)));
    }

    #[test]
    fn rejects_negative_lambda() {
        let result = twed_compact(&[1.0], &[1.0], &[0.0], &[0.0], 0.0, -1.0, 1.0);
        assert!(matches!(result, Err(TwedError::InvalidPenalty { .. })));
    }
}
