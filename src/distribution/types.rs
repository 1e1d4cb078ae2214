//! Data types for merged cluster distributions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::distribution::merge::ClusterDistribution;

/// Frequency of a cluster in one country for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub week: NaiveDate,
    pub country: String,
    pub frequency: f64,
    pub interp: bool,
    pub orig: bool,
}

/// Per-country values for a single week of a cluster distribution.
///
/// A country with no data for the week has no key in any of the maps.
/// Field order is alphabetical to match the sorted-key JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub frequencies: BTreeMap<String, f64>,
    pub interp: BTreeMap<String, bool>,
    pub orig: BTreeMap<String, bool>,
    pub week: NaiveDate,
}

impl WeekEntry {
    pub fn new(week: NaiveDate) -> Self {
        Self {
            frequencies: BTreeMap::new(),
            interp: BTreeMap::new(),
            orig: BTreeMap::new(),
            week,
        }
    }
}

/// One cluster's merged distribution, as written to `perClusterData.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutput {
    pub cluster: String,
    pub distribution: ClusterDistribution,
}
