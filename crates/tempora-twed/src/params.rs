//! TWED parameters: stiffness, deletion penalty, cost exponent and boundary convention.

use serde::{Deserialize, Serialize};

use crate::error::TwedError;

/// Exponent of the elementwise value cost `|x - y|^degree`.
///
/// Always finite and at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Degree(f64);

impl Degree {
    /// Create a degree, validating that it is finite and `>= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`TwedError::InvalidDegree`] if `degree` is below 1, NaN or infinite.
    pub fn new(degree: f64) -> Result<Self, TwedError> {
        if !degree.is_finite() || degree < 1.0 {
            return Err(TwedError::InvalidDegree { degree });
        }
        Ok(Self(degree))
    }

    /// Return the raw exponent.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Cost contribution of one coordinate difference.
    ///
    /// Degrees 1 and 2 avoid `powf`. Every caller goes through this function,
    /// so all variants see identical bits.
    #[inline]
    pub(crate) fn term(self, diff: f64) -> f64 {
        if self.0 == 1.0 {
            diff.abs()
        } else if self.0 == 2.0 {
            diff * diff
        } else {
            diff.abs().powf(self.0)
        }
    }
}

impl Default for Degree {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Cost of the empty-prefix cells in row 0 and column 0 of the cost table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Cumulative deletion costs: `D[i][0] = D[i-1][0] + delete_a(i)`.
    #[default]
    Deletion,

    /// `D[i][0] = D[0][j] = +inf` for `i, j > 0`, as in Marteau's reference code.
    /// Every alignment must then start by matching the first samples.
    Infinite,
}

/// Validated TWED parameters. Immutable and copyable.
///
/// Construct via [`TwedParams::new`], then chain [`with_boundary`][Self::with_boundary].
///
/// # Defaults
///
/// | Parameter  | Default              |
/// |------------|----------------------|
/// | `nu`       | 0.5                  |
/// | `lambda`   | 0.001                |
/// | `degree`   | 1                    |
/// | `boundary` | `Boundary::Deletion` |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct TwedParams {
    nu: f64,
    lambda: f64,
    degree: Degree,
    boundary: Boundary,
}

impl TwedParams {
    /// Default stiffness.
    pub const DEFAULT_NU: f64 = 0.5;
    /// Default deletion penalty.
    pub const DEFAULT_LAMBDA: f64 = 0.001;

    /// Create parameters with the given stiffness, deletion penalty and cost exponent.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TwedError::InvalidStiffness`] | `nu < 0` or not finite |
    /// | [`TwedError::InvalidPenalty`] | `lambda < 0` or not finite |
    /// | [`TwedError::InvalidDegree`] | `degree < 1` or not finite |
    pub fn new(nu: f64, lambda: f64, degree: f64) -> Result<Self, TwedError> {
        if !nu.is_finite() || nu < 0.0 {
            return Err(TwedError::InvalidStiffness { nu });
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(TwedError::InvalidPenalty { lambda });
        }
        Ok(Self {
            nu,
            lambda,
            degree: Degree::new(degree)?,
            boundary: Boundary::Deletion,
        })
    }

    /// Set the empty-prefix boundary convention.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Return the stiffness (time-mismatch penalty).
    #[must_use]
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Return the deletion penalty.
    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Return the cost exponent.
    #[must_use]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Return the boundary convention.
    #[must_use]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }
}

impl Default for TwedParams {
    fn default() -> Self {
        Self {
            nu: Self::DEFAULT_NU,
            lambda: Self::DEFAULT_LAMBDA,
            degree: Degree::default(),
            boundary: Boundary::Deletion,
        }
    }
}

/// Unvalidated mirror of [`TwedParams`]; missing fields take the defaults.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawParams {
    nu: f64,
    lambda: f64,
    degree: f64,
    boundary: Boundary,
}

impl Default for RawParams {
    fn default() -> Self {
        Self {
            nu: TwedParams::DEFAULT_NU,
            lambda: TwedParams::DEFAULT_LAMBDA,
            degree: 1.0,
            boundary: Boundary::Deletion,
        }
    }
}

impl TryFrom<RawParams> for TwedParams {
    type Error = TwedError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.nu, raw.lambda, raw.degree)?.with_boundary(raw.boundary))
    }
}
