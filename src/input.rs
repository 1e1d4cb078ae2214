//! Loaders for the JSON tables produced by the upstream pipeline.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::per_country::CountriesInput;
use crate::regularize::SeriesColumns;

/// Per-country series for one cluster, iterated in sorted country order.
pub type ClusterTable = BTreeMap<String, SeriesColumns>;

/// File holding the per-country counts for every cluster.
pub const COUNTRIES_INPUT_FILE: &str = "EUClusters_data.json";

/// Location of the table for a cluster with the given build name.
pub fn cluster_table_path(tables_dir: &Path, build_name: &str) -> PathBuf {
    tables_dir.join(format!("{build_name}_data.json"))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

/// Loads a cluster table, `{country: {week, cluster_sequences, total_sequences}}`.
pub fn load_cluster_table(path: &Path) -> Result<ClusterTable> {
    let table: ClusterTable = read_json(path)?;
    debug!(path = %path.display(), countries = table.len(), "Cluster table loaded");
    Ok(table)
}

/// Loads the per-country input together with its plotting dates.
pub fn load_countries_input(path: &Path) -> Result<CountriesInput> {
    let input: CountriesInput = read_json(path)?;
    debug!(path = %path.display(), countries = input.countries.len(), "Country input loaded");
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_cluster_table_path() {
        let path = cluster_table_path(Path::new("cluster_tables"), "20A.EU1");
        assert_eq!(path, Path::new("cluster_tables/20A.EU1_data.json"));
    }

    #[test]
    fn test_load_cluster_table_sorted_countries() {
        let path = temp_path("cluster_distributions_test_table.json");
        fs::write(
            &path,
            r#"{
                "Spain": {"week": ["2021-01-06"], "cluster_sequences": [1], "total_sequences": [2]},
                "Belgium": {"week": ["2021-01-06"], "cluster_sequences": [3], "total_sequences": [4]}
            }"#,
        )
        .unwrap();

        let table = load_cluster_table(&path).unwrap();
        let countries: Vec<_> = table.keys().cloned().collect();
        assert_eq!(countries, vec!["Belgium", "Spain"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_cluster_table_missing_file() {
        let err = load_cluster_table(Path::new("/nonexistent/cluster_table.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cluster_table.json"));
    }

    #[test]
    fn test_load_cluster_table_defers_week_parsing() {
        let path = temp_path("cluster_distributions_test_bad_date.json");
        fs::write(
            &path,
            r#"{
                "Spain": {"week": ["06/01/2021"], "cluster_sequences": [1], "total_sequences": [2]},
                "Belgium": {"week": ["2021-01-06"], "cluster_sequences": [3], "total_sequences": [4]}
            }"#,
        )
        .unwrap();

        let table = load_cluster_table(&path).unwrap();
        assert!(table["Spain"].parse_weeks().is_err());
        assert!(table["Belgium"].parse_weeks().is_ok());

        fs::remove_file(&path).unwrap();
    }
}
