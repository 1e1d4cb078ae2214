//! Per-country view of all clusters.
//!
//! Reshapes the per-country columns into one record per week with the
//! cluster counts nested under `cluster_counts`, and collects the set of
//! cluster names seen across all countries.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SeriesError;

/// First and last week shown on the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottingDates {
    pub max_date: NaiveDate,
    pub min_date: NaiveDate,
}

/// Columns for one country: `week`, `total_sequences`, and one column per cluster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryColumns {
    pub week: Vec<NaiveDate>,
    pub total_sequences: Vec<Value>,
    #[serde(flatten)]
    pub clusters: BTreeMap<String, Vec<Value>>,
}

/// Contents of `EUClusters_data.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountriesInput {
    pub plotting_dates: PlottingDates,
    pub countries: BTreeMap<String, CountryColumns>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryWeek {
    pub cluster_counts: BTreeMap<String, Value>,
    pub total_sequences: Value,
    pub week: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDistribution {
    pub country: String,
    pub distribution: Vec<CountryWeek>,
}

/// Contents of `perCountryData.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerCountryOutput {
    pub cluster_names: Vec<String>,
    pub distributions: Vec<CountryDistribution>,
}

/// Turns one country's columns into per-week records.
pub fn wrap_country_data(columns: &CountryColumns) -> Result<Vec<CountryWeek>, SeriesError> {
    let n = columns.week.len();
    if columns.total_sequences.len() != n {
        return Err(SeriesError::InvalidSeries(format!(
            "column lengths differ: week={}, total_sequences={}",
            n,
            columns.total_sequences.len()
        )));
    }
    if let Some((name, values)) = columns.clusters.iter().find(|(_, v)| v.len() != n) {
        return Err(SeriesError::InvalidSeries(format!(
            "column lengths differ: week={}, {}={}",
            n,
            name,
            values.len()
        )));
    }

    let weeks = (0..n)
        .map(|i| CountryWeek {
            cluster_counts: columns
                .clusters
                .iter()
                .map(|(name, values)| (name.clone(), values[i].clone()))
                .collect(),
            total_sequences: columns.total_sequences[i].clone(),
            week: columns.week[i],
        })
        .collect();

    Ok(weeks)
}

/// Builds the per-country output for every country in `input`, in sorted country order.
pub fn convert_per_country_data(input: &CountriesInput) -> Result<PerCountryOutput> {
    let mut cluster_names = BTreeSet::new();
    let mut distributions = Vec::with_capacity(input.countries.len());

    for (country, columns) in &input.countries {
        let distribution =
            wrap_country_data(columns).with_context(|| format!("country {country}"))?;
        cluster_names.extend(columns.clusters.keys().cloned());
        distributions.push(CountryDistribution {
            country: country.clone(),
            distribution,
        });
    }

    Ok(PerCountryOutput {
        cluster_names: cluster_names.into_iter().collect(),
        distributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_input() -> CountriesInput {
        serde_json::from_value(json!({
            "plotting_dates": {"min_date": "2020-06-01", "max_date": "2021-03-01"},
            "countries": {
                "Spain": {
                    "week": ["2021-01-04", "2021-01-11"],
                    "total_sequences": [100, 80],
                    "20A.EU1": [10, null],
                    "20A.EU2": [1, 2]
                },
                "Belgium": {
                    "week": ["2021-01-04"],
                    "total_sequences": [50],
                    "S:N439K": [5]
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_convert_per_country_data() {
        let output = convert_per_country_data(&sample_input()).unwrap();

        assert_eq!(output.cluster_names, vec!["20A.EU1", "20A.EU2", "S:N439K"]);
        assert_eq!(output.distributions.len(), 2);
        assert_eq!(output.distributions[0].country, "Belgium");

        let spain = &output.distributions[1];
        assert_eq!(spain.distribution.len(), 2);
        let second = &spain.distribution[1];
        assert_eq!(second.total_sequences, json!(80));
        assert_eq!(second.cluster_counts["20A.EU1"], Value::Null);
        assert_eq!(second.cluster_counts["20A.EU2"], json!(2));
    }

    #[test]
    fn test_wrapped_week_serializes_nested_counts() {
        let output = convert_per_country_data(&sample_input()).unwrap();
        let value = serde_json::to_value(&output.distributions[0].distribution[0]).unwrap();
        assert_eq!(
            value,
            json!({"cluster_counts": {"S:N439K": 5}, "total_sequences": 50, "week": "2021-01-04"})
        );
    }

    #[test]
    fn test_wrap_country_data_length_mismatch() {
        let mut input = sample_input();
        input
            .countries
            .get_mut("Spain")
            .unwrap()
            .clusters
            .insert("20B".into(), vec![json!(1)]);

        let err = convert_per_country_data(&input).unwrap_err();
        assert!(format!("{err:#}").contains("Spain"));
        assert!(format!("{err:#}").contains("20B=1"));
    }
}
