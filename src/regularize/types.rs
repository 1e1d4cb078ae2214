//! Data types used by the regularization engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// Calendar format of week values in cluster tables.
pub const WEEK_FORMAT: &str = "%Y-%m-%d";

/// One observed week for a (cluster, country) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyObservation {
    pub week: NaiveDate,
    pub cluster_sequences: u64,
    pub total_sequences: u64,
}

/// Parallel columns for one country inside a cluster table.
///
/// This is the shape the upstream pipeline writes:
/// ```json
/// {
///   "week": ["2021-01-06", "2021-01-20"],
///   "cluster_sequences": [10, 20],
///   "total_sequences": [100, 100]
/// }
/// ```
/// Count cells may be `null`. Weeks are kept as raw strings and parsed by
/// [`SeriesColumns::parse_weeks`], so a malformed date fails only its own series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumns {
    pub week: Vec<String>,
    pub cluster_sequences: Vec<Option<f64>>,
    pub total_sequences: Vec<Option<f64>>,
}

impl SeriesColumns {
    /// Checks that the columns are non-empty and all the same length.
    pub fn check_shape(&self) -> Result<(), SeriesError> {
        if self.week.is_empty() {
            return Err(SeriesError::InvalidSeries("no observations".into()));
        }
        let n = self.week.len();
        if self.cluster_sequences.len() != n || self.total_sequences.len() != n {
            return Err(SeriesError::InvalidSeries(format!(
                "column lengths differ: week={}, cluster_sequences={}, total_sequences={}",
                n,
                self.cluster_sequences.len(),
                self.total_sequences.len()
            )));
        }
        Ok(())
    }

    /// Parses the week column as `YYYY-MM-DD` dates.
    pub fn parse_weeks(&self) -> Result<Vec<NaiveDate>, SeriesError> {
        self.week
            .iter()
            .map(|week| {
                NaiveDate::parse_from_str(week, WEEK_FORMAT).map_err(|e| {
                    SeriesError::InvalidSeries(format!("malformed week {week:?}: {e}"))
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.week.len()
    }
}

impl From<Vec<WeeklyObservation>> for SeriesColumns {
    fn from(observations: Vec<WeeklyObservation>) -> Self {
        let mut columns = SeriesColumns::default();
        for obs in observations {
            columns.week.push(obs.week.format(WEEK_FORMAT).to_string());
            columns.cluster_sequences.push(Some(obs.cluster_sequences as f64));
            columns.total_sequences.push(Some(obs.total_sequences as f64));
        }
        columns
    }
}

/// A single row on the regular weekly grid.
///
/// `orig` is false only for weeks absent from the source series. `interp` is
/// true for those weeks and for their immediate grid neighbours. Counts are
/// `None` where no value could be observed or interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizedRow {
    pub week: NaiveDate,
    pub cluster_sequences: Option<f64>,
    pub total_sequences: Option<f64>,
    pub interp: bool,
    pub orig: bool,
}
