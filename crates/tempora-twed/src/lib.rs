//! Time-Warped Edit Distance (Marteau 2009) between timestamped sequences.
//!
//! Pure math library with no I/O. Provides TWED over scalar or vector-valued
//! samples in two interchangeable variants: a full cost matrix for
//! inspection and a rolling two-row buffer for `O(min(n, m))` memory, plus
//! early-abandoning, one-to-many, nearest-neighbour and pairwise queries.

mod compact;
mod cost;
mod distance;
mod error;
mod full;
mod matrix;
mod params;
mod series;
mod twed;

pub use compact::twed_compact;
pub use distance::TwedDistance;
pub use error::{ErrorKind, TwedError};
pub use full::{CostMatrix, twed_full};
pub use matrix::DistanceMatrix;
pub use params::{Boundary, Degree, TwedParams};
pub use series::{SeriesView, TimestampedSeries};
pub use twed::{Twed, Variant};
