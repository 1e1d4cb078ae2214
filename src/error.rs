//! Error types for series regularization.

use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a single (cluster, country) series cannot be regularized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// No observations, or the parallel columns disagree in length.
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    /// Week values must be strictly increasing.
    #[error("weeks not strictly increasing: {current} follows {previous}")]
    NonMonotonicWeek {
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// A week that does not sit a whole number of 7-day steps after the first week.
    #[error("week {week} is not aligned to the 7-day grid starting at {start}")]
    MisalignedWeek { start: NaiveDate, week: NaiveDate },
}

/// A [`SeriesError`] tagged with the unit it came from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cluster {cluster}, country {country}: {source}")]
pub struct UnitError {
    pub cluster: String,
    pub country: String,
    #[source]
    pub source: SeriesError,
}

impl UnitError {
    pub fn new(cluster: &str, country: &str, source: SeriesError) -> Self {
        Self {
            cluster: cluster.to_string(),
            country: country.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_error_names_the_unit() {
        let err = UnitError::new(
            "20A.EU1",
            "Spain",
            SeriesError::InvalidSeries("no observations".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("20A.EU1"));
        assert!(msg.contains("Spain"));
        assert!(msg.contains("no observations"));
    }
}
