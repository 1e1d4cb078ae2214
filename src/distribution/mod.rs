//! Frequency conversion and per-cluster distribution merging.
//!
//! Each country's regularized rows are turned into frequencies and folded
//! into one [`ClusterDistribution`] per cluster, keyed by week.

pub mod frequency;
pub mod merge;
pub mod types;

pub use frequency::{frequency, to_frequency_rows};
pub use merge::ClusterDistribution;
pub use types::{ClusterOutput, FrequencyRow, WeekEntry};
