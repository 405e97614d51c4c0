//! Pairwise TWED distances for a collection of sequences.

use crate::distance::TwedDistance;

/// Symmetric pairwise distance matrix with a zero diagonal.
///
/// Only the strict lower triangle is stored: the distance between series
/// `row > col` lives at `row * (row - 1) / 2 + col`.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    lower: Vec<TwedDistance>,
}

impl DistanceMatrix {
    /// `lower` must contain `n * (n - 1) / 2` distances in flat lower-triangular order.
    pub(crate) fn from_lower(n: usize, lower: Vec<TwedDistance>) -> Self {
        debug_assert_eq!(lower.len(), n * n.saturating_sub(1) / 2);
        Self { n, lower }
    }

    /// Map a flat lower-triangular index back to `(row, col)` with `row > col`.
    pub(crate) fn unflatten(flat: usize) -> (usize, usize) {
        // Largest row with row * (row - 1) / 2 <= flat.
        let mut row = ((1.0 + (1.0 + 8.0 * flat as f64).sqrt()) / 2.0).floor() as usize;
        while row * (row - 1) / 2 > flat {
            row -= 1;
        }
        while (row + 1) * row / 2 <= flat {
            row += 1;
        }
        (row, flat - row * (row - 1) / 2)
    }

    /// Return the number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix covers no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the distance between series `i` and `j`; zero on the diagonal.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()` or `j >= len()`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> TwedDistance {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds for {} series", self.n);
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => TwedDistance::ZERO,
            std::cmp::Ordering::Greater => self.lower[i * (i - 1) / 2 + j],
            std::cmp::Ordering::Less => self.lower[j * (j - 1) / 2 + i],
        }
    }

    /// Iterate over all unique pairs `(i, j, distance)` with `i > j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TwedDistance)> + '_ {
        self.lower.iter().enumerate().map(|(flat, &d)| {
            let (i, j) = Self::unflatten(flat);
            (i, j, d)
        })
    }

    /// Return the distances from series `i` to every series, including itself.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<TwedDistance> {
        (0..self.n).map(|j| self.get(i, j)).collect()
    }

    /// Return the closest other series to `i`, or `None` if there is no other series.
    /// Ties go to the lower index.
    #[must_use]
    pub fn nearest_to(&self, i: usize) -> Option<(usize, TwedDistance)> {
        (0..self.n)
            .filter(|&j| j != i)
            .map(|j| (j, self.get(i, j)))
            .min_by(|x, y| x.1.total_cmp(&y.1).then(x.0.cmp(&y.0)))
    }
}
