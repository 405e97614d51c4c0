//! Timestamped sequence types with validation guarantees.

use crate::error::TwedError;

/// Owned, validated timestamped sequence.
///
/// Samples are scalars (`dim == 1`) or vectors of a fixed dimension, stored
/// flat in row-major order. Guaranteed non-empty, with exactly one finite
/// timestamp per sample and non-decreasing timestamps. Sample values are not
/// checked; non-finite values surface as an error from the distance itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedSeries {
    values: Vec<f64>,
    timestamps: Vec<f64>,
    dim: usize,
}

impl TimestampedSeries {
    /// Create a scalar-valued sequence.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TwedError::EmptySequence`] | `values` is empty |
    /// | [`TwedError::LengthMismatch`] | `values.len() != timestamps.len()` |
    /// | [`TwedError::NonFiniteTimestamp`] | Any timestamp is NaN or infinite |
    /// | [`TwedError::NonMonotonicTimestamps`] | A timestamp is smaller than its predecessor |
    pub fn new(values: Vec<f64>, timestamps: Vec<f64>) -> Result<Self, TwedError> {
        Self::from_flat(values, timestamps, 1)
    }

    /// Create a scalar-valued sequence sampled at times `1, 2, ..., n`.
    ///
    /// # Errors
    ///
    /// Returns [`TwedError::EmptySequence`] if `values` is empty.
    pub fn with_unit_timestamps(values: Vec<f64>) -> Result<Self, TwedError> {
        let timestamps = (1..=values.len()).map(|t| t as f64).collect();
        Self::new(values, timestamps)
    }

    /// Create a vector-valued sequence from one `Vec` per sample.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TwedError::EmptySequence`] | `samples` is empty |
    /// | [`TwedError::ZeroDimension`] | The first sample is empty |
    /// | [`TwedError::InconsistentDimension`] | A sample differs in length from the first |
    /// | [`TwedError::LengthMismatch`] | `samples.len() != timestamps.len()` |
    /// | [`TwedError::NonFiniteTimestamp`] | Any timestamp is NaN or infinite |
    /// | [`TwedError::NonMonotonicTimestamps`] | A timestamp is smaller than its predecessor |
    pub fn from_vectors(samples: Vec<Vec<f64>>, timestamps: Vec<f64>) -> Result<Self, TwedError> {
        let Some(first) = samples.first() else {
            return Err(TwedError::EmptySequence);
        };
        let dim = first.len();
        if dim == 0 {
            return Err(TwedError::ZeroDimension);
        }
        if let Some((index, s)) = samples.iter().enumerate().find(|(_, s)| s.len() != dim) {
            return Err(TwedError::InconsistentDimension {
                index,
                expected: dim,
                found: s.len(),
            });
        }
        Self::from_flat(samples.concat(), timestamps, dim)
    }

    /// Create a sequence from a flat row-major buffer of `dim`-dimensional samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TwedError::ZeroDimension`] | `dim == 0` |
    /// | [`TwedError::RaggedValues`] | `values.len()` is not a multiple of `dim` |
    /// | [`TwedError::LengthMismatch`] | Sample count differs from `timestamps.len()` |
    /// | [`TwedError::EmptySequence`] | No samples |
    /// | [`TwedError::NonFiniteTimestamp`] | Any timestamp is NaN or infinite |
    /// | [`TwedError::NonMonotonicTimestamps`] | A timestamp is smaller than its predecessor |
    pub fn from_flat(values: Vec<f64>, timestamps: Vec<f64>, dim: usize) -> Result<Self, TwedError> {
        validate(&values, &timestamps, dim)?;
        Ok(Self {
            values,
            timestamps,
            dim,
        })
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SeriesView<'_> {
        SeriesView::new_unchecked(&self.values, &self.timestamps, self.dim)
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Return true if the sequence has no samples.
    ///
    /// Always `false` for a constructed sequence; provided for the
    /// `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Return the sample dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the flat row-major value buffer.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the timestamps.
    #[must_use]
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }
}

/// Borrowed, validated view into a timestamped sequence. Zero-copy.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    values: &'a [f64],
    timestamps: &'a [f64],
    dim: usize,
}

impl<'a> SeriesView<'a> {
    /// Create a scalar-valued view.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TimestampedSeries::new`].
    pub fn new(values: &'a [f64], timestamps: &'a [f64]) -> Result<Self, TwedError> {
        Self::from_flat(values, timestamps, 1)
    }

    /// Create a view over a flat row-major buffer of `dim`-dimensional samples.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TimestampedSeries::from_flat`].
    pub fn from_flat(
        values: &'a [f64],
        timestamps: &'a [f64],
        dim: usize,
    ) -> Result<Self, TwedError> {
        validate(values, timestamps, dim)?;
        Ok(Self::new_unchecked(values, timestamps, dim))
    }

    /// Create a view without validation. For internal use where data is already validated.
    pub(crate) fn new_unchecked(values: &'a [f64], timestamps: &'a [f64], dim: usize) -> Self {
        Self {
            values,
            timestamps,
            dim,
        }
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Return true if the view has no samples. Always `false` for a validated view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Return the sample dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the values of sample `index` as a slice of length `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn sample(&self, index: usize) -> &'a [f64] {
        &self.values[index * self.dim..(index + 1) * self.dim]
    }

    /// Return the timestamp of sample `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn timestamp(&self, index: usize) -> f64 {
        self.timestamps[index]
    }

    /// Return the flat row-major value buffer.
    #[must_use]
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Return the timestamps.
    #[must_use]
    pub fn timestamps(&self) -> &'a [f64] {
        self.timestamps
    }
}

impl<'a> From<&'a TimestampedSeries> for SeriesView<'a> {
    fn from(series: &'a TimestampedSeries) -> Self {
        series.as_view()
    }
}

/// Check that two views can be compared.
pub(crate) fn check_dims(a: SeriesView<'_>, b: SeriesView<'_>) -> Result<(), TwedError> {
    if a.dim() != b.dim() {
        return Err(TwedError::DimensionMismatch {
            a: a.dim(),
            b: b.dim(),
        });
    }
    Ok(())
}

fn validate(values: &[f64], timestamps: &[f64], dim: usize) -> Result<(), TwedError> {
    if dim == 0 {
        return Err(TwedError::ZeroDimension);
    }
    if values.len() % dim != 0 {
        return Err(TwedError::RaggedValues {
            len: values.len(),
            dim,
        });
    }
    let samples = values.len() / dim;
    if samples != timestamps.len() {
        return Err(TwedError::LengthMismatch {
            samples,
            timestamps: timestamps.len(),
        });
    }
    if samples == 0 {
        return Err(TwedError::EmptySequence);
    }
    if let Some(index) = timestamps.iter().position(|t| !t.is_finite()) {
        return Err(TwedError::NonFiniteTimestamp { index });
    }
    if let Some(index) = (1..timestamps.len()).find(|&i| timestamps[i] < timestamps[i - 1]) {
        return Err(TwedError::NonMonotonicTimestamps {
            index,
            previous: timestamps[index - 1],
            current: timestamps[index],
        });
    }
    Ok(())
}
