//! Weekly grid regularization.
//!
//! Resamples a (cluster, country) series onto a uniform 7-day grid, fills
//! gaps by linear interpolation, and tags every grid row as original and/or
//! interpolated.

pub mod diff;
pub mod grid;
pub mod interpolate;
pub mod types;

pub use diff::boundary_diff;
pub use grid::{build_grid, validate_index};
pub use interpolate::{interpolate_linear, regularize};
pub use types::{RegularizedRow, SeriesColumns, WeeklyObservation};
