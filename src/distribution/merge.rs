//! Week-keyed upsert of country frequencies into a cluster distribution.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::distribution::types::{FrequencyRow, WeekEntry};

/// Ordered sequence of [`WeekEntry`] values, one per distinct week.
///
/// Entries keep the order in which their week was first seen, which is not
/// necessarily chronological: a country folded later may introduce an
/// earlier week, and it lands at the end. Call
/// [`ClusterDistribution::sort_by_week`] for chronological order.
///
/// Serializes as a plain JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WeekEntry>", into = "Vec<WeekEntry>")]
pub struct ClusterDistribution {
    entries: Vec<WeekEntry>,
    positions: HashMap<NaiveDate, usize>,
}

impl ClusterDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts one row keyed by its week.
    ///
    /// An existing entry for the week gets this country's values written
    /// into its maps, replacing any earlier values for the same country.
    /// Otherwise a new entry is appended.
    pub fn upsert(&mut self, row: &FrequencyRow) {
        let index = match self.positions.get(&row.week) {
            Some(&index) => index,
            None => {
                self.entries.push(WeekEntry::new(row.week));
                let index = self.entries.len() - 1;
                self.positions.insert(row.week, index);
                index
            }
        };

        let entry = &mut self.entries[index];
        entry.frequencies.insert(row.country.clone(), row.frequency);
        entry.interp.insert(row.country.clone(), row.interp);
        entry.orig.insert(row.country.clone(), row.orig);
    }

    /// Folds one country's rows into the distribution.
    pub fn merge(&mut self, rows: &[FrequencyRow]) {
        for row in rows {
            self.upsert(row);
        }
    }

    /// Reorders entries chronologically.
    pub fn sort_by_week(&mut self) {
        self.entries.sort_by_key(|entry| entry.week);
        self.reindex();
    }

    pub fn get(&self, week: &NaiveDate) -> Option<&WeekEntry> {
        self.positions.get(week).map(|&index| &self.entries[index])
    }

    pub fn entries(&self) -> &[WeekEntry] {
        &self.entries
    }

    pub fn weeks(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.iter().map(|entry| entry.week)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reindex(&mut self) {
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.week, index))
            .collect();
    }
}

/// Repeated weeks are folded into their first entry, later maps winning per country.
impl From<Vec<WeekEntry>> for ClusterDistribution {
    fn from(entries: Vec<WeekEntry>) -> Self {
        let mut distribution = Self::new();
        for entry in entries {
            match distribution.positions.get(&entry.week) {
                Some(&index) => {
                    let existing = &mut distribution.entries[index];
                    existing.frequencies.extend(entry.frequencies);
                    existing.interp.extend(entry.interp);
                    existing.orig.extend(entry.orig);
                }
                None => {
                    distribution
                        .positions
                        .insert(entry.week, distribution.entries.len());
                    distribution.entries.push(entry);
                }
            }
        }
        distribution
    }
}

impl From<ClusterDistribution> for Vec<WeekEntry> {
    fn from(distribution: ClusterDistribution) -> Self {
        distribution.entries
    }
}
