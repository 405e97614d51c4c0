//! Error types for TWED computation and input validation.

/// Coarse classification of a [`TwedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied a sequence or parameter that violates the contract.
    InvalidArgument,
    /// The accumulated cost overflowed to infinity.
    NumericOverflow,
    /// The accumulated cost is NaN.
    NanResult,
}

/// Errors from TWED distance computation and sequence/parameter validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TwedError {
    /// Returned when a sequence has no samples.
    #[error("sequence must be non-empty")]
    EmptySequence,

    /// Returned when the number of samples and timestamps differ.
    #[error("sequence has {samples} samples but {timestamps} timestamps")]
    LengthMismatch {
        /// Number of samples in the value buffer.
        samples: usize,
        /// Number of timestamps provided.
        timestamps: usize,
    },

    /// Returned when a sample dimension of zero is requested.
    #[error("sample dimension must be at least 1")]
    ZeroDimension,

    /// Returned when a flat value buffer cannot be split into samples of `dim` values.
    #[error("value buffer of length {len} is not a multiple of dimension {dim}")]
    RaggedValues {
        /// Length of the flat value buffer.
        len: usize,
        /// Requested sample dimension.
        dim: usize,
    },

    /// Returned when a vector sample differs in dimension from the first sample.
    #[error("sample {index} has dimension {found}, expected {expected}")]
    InconsistentDimension {
        /// Position of the offending sample.
        index: usize,
        /// Dimension of the first sample.
        expected: usize,
        /// Dimension of the offending sample.
        found: usize,
    },

    /// Returned when the two compared sequences have different sample dimensions.
    #[error("cannot compare sequences of dimension {a} and {b}")]
    DimensionMismatch {
        /// Sample dimension of the first sequence.
        a: usize,
        /// Sample dimension of the second sequence.
        b: usize,
    },

    /// Returned when a timestamp is NaN or infinite.
    #[error("timestamp at index {index} is not finite")]
    NonFiniteTimestamp {
        /// Position of the first non-finite timestamp.
        index: usize,
    },

    /// Returned when a timestamp is smaller than its predecessor.
    #[error("timestamps must be non-decreasing, but t[{index}] = {current} follows {previous}")]
    NonMonotonicTimestamps {
        /// Position of the offending timestamp.
        index: usize,
        /// Timestamp at `index - 1`.
        previous: f64,
        /// Timestamp at `index`.
        current: f64,
    },

    /// Returned when the stiffness `nu` is negative or not finite.
    #[error("nu must be finite and >= 0, got {nu}")]
    InvalidStiffness {
        /// The invalid stiffness value.
        nu: f64,
    },

    /// Returned when the deletion penalty `lambda` is negative or not finite.
    #[error("lambda must be finite and >= 0, got {lambda}")]
    InvalidPenalty {
        /// The invalid penalty value.
        lambda: f64,
    },

    /// Returned when the cost exponent is below 1 or not finite.
    #[error("degree must be finite and >= 1, got {degree}")]
    InvalidDegree {
        /// The invalid degree value.
        degree: f64,
    },

    /// Returned when the accumulated cost is infinite.
    #[error("TWED cost overflowed to infinity")]
    NumericOverflow,

    /// Returned when the accumulated cost is NaN, typically from NaN or infinite sample values.
    #[error("TWED cost is NaN; the sequences contain non-finite values")]
    NanResult,
}

impl TwedError {
    /// Return the coarse error class.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NumericOverflow => ErrorKind::NumericOverflow,
            Self::NanResult => ErrorKind::NanResult,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Map a finished accumulated cost to a result, surfacing non-finite values.
pub(crate) fn check_finite(cost: f64) -> Result<f64, TwedError> {
    if cost.is_nan() {
        Err(TwedError::NanResult)
    } else if cost.is_infinite() {
        Err(TwedError::NumericOverflow)
    } else {
        Ok(cost)
    }
}
