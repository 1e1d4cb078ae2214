//! Batch conversion of cluster tables into chart-ready distributions.

use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, warn};

use crate::distribution::{ClusterDistribution, ClusterOutput, to_frequency_rows};
use crate::error::UnitError;
use crate::input::{
    COUNTRIES_INPUT_FILE, ClusterTable, cluster_table_path, load_cluster_table,
    load_countries_input,
};
use crate::output::{RegularizedRecord, append_records, copy_if_exists, write_json};
use crate::per_country::{PlottingDates, convert_per_country_data};
use crate::registry::{ClusterDef, ClusterRegistry};
use crate::regularize::regularize;

/// Contents of `perClusterData.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerClusterOutput {
    pub country_names: Vec<String>,
    pub distributions: Vec<ClusterOutput>,
}

/// Contents of `clusters.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ClustersOutput {
    pub clusters: Vec<ClusterDef>,
}

/// Settings for a full conversion run.
#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub tables_dir: PathBuf,
    pub output_dir: PathBuf,
    pub registry_path: PathBuf,
    pub exclude: Vec<String>,
    pub sort_by_week: bool,
    pub concurrency: usize,
    pub gzip: bool,
}

/// Counts reported at the end of a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertSummary {
    pub countries: usize,
    pub clusters: usize,
}

/// Regularizes every country of one cluster and folds them into a single distribution.
///
/// Countries are folded in the table's sorted order. The first failing
/// country aborts the cluster and is reported by name.
pub fn build_cluster_distribution(
    cluster: &str,
    table: &ClusterTable,
    sort_by_week: bool,
) -> Result<ClusterDistribution, UnitError> {
    let mut distribution = ClusterDistribution::new();

    for (country, series) in table {
        let rows = regularize(series).map_err(|e| UnitError::new(cluster, country, e))?;
        let filled = rows.iter().filter(|r| !r.orig).count();
        debug!(
            cluster,
            country = %country,
            observed = series.len(),
            rows = rows.len(),
            filled,
            "Series regularized"
        );
        distribution.merge(&to_frequency_rows(country, &rows));
    }

    if sort_by_week {
        distribution.sort_by_week();
    }

    Ok(distribution)
}

struct ClusterBuild {
    distribution: ClusterDistribution,
    countries: Vec<String>,
}

fn process_cluster(name: &str, path: &Path, sort_by_week: bool) -> Result<ClusterBuild> {
    let table = load_cluster_table(path)?;
    let distribution = build_cluster_distribution(name, &table, sort_by_week)?;
    info!(
        countries = table.len(),
        weeks = distribution.len(),
        "Cluster distribution built"
    );
    Ok(ClusterBuild {
        distribution,
        countries: table.into_keys().collect(),
    })
}

async fn process_cluster_task(
    semaphore: Arc<Semaphore>,
    name: String,
    path: PathBuf,
    sort_by_week: bool,
) -> Result<ClusterBuild> {
    let _permit = semaphore.acquire_owned().await?;
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        process_cluster(&name, &path, sort_by_week)
    })
    .await?
}

/// Builds distributions for every cluster in `registry`.
///
/// Clusters run in parallel, up to `concurrency` at a time, and results are
/// collected in registry order. If any cluster fails, every failure is
/// logged and an error is returned instead of a partial result.
#[tracing::instrument(skip(registry, tables_dir), fields(clusters = registry.len()))]
pub async fn convert_per_cluster_data(
    registry: &ClusterRegistry,
    tables_dir: &Path,
    concurrency: usize,
    sort_by_week: bool,
) -> Result<PerClusterOutput> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut tasks = Vec::with_capacity(registry.len());
    for def in registry.clusters() {
        let cluster_span = tracing::info_span!(
            "process_cluster",
            cluster = %def.name,
            build_name = %def.build_name,
        );
        let task = tokio::spawn(
            process_cluster_task(
                semaphore.clone(),
                def.name.clone(),
                cluster_table_path(tables_dir, &def.build_name),
                sort_by_week,
            )
            .instrument(cluster_span),
        );
        tasks.push(task);
    }

    let mut country_names = BTreeSet::new();
    let mut distributions = Vec::with_capacity(tasks.len());
    let mut failed = Vec::new();

    for (def, task) in registry.clusters().iter().zip(tasks) {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(build) => {
                country_names.extend(build.countries);
                distributions.push(ClusterOutput {
                    cluster: def.display_name.clone(),
                    distribution: build.distribution,
                });
            }
            Err(e) => {
                error!(cluster = %def.name, error = %format!("{e:#}"), "Cluster conversion failed");
                failed.push(def.name.clone());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} cluster(s) failed to convert: {}",
            failed.len(),
            failed.join(", ")
        );
    }

    Ok(PerClusterOutput {
        country_names: country_names.into_iter().collect(),
        distributions,
    })
}

/// Names in `exclude` that match no registered cluster.
pub fn unknown_exclusions<'a>(registry: &ClusterRegistry, exclude: &'a [String]) -> Vec<&'a str> {
    exclude
        .iter()
        .filter(|name| registry.get(name).is_none())
        .map(String::as_str)
        .collect()
}

/// Runs the full batch: per-country data, plotting params, per-cluster
/// distributions, the cluster list, and static assets.
#[tracing::instrument(skip_all, fields(tables_dir = %settings.tables_dir.display(), output_dir = %settings.output_dir.display()))]
pub async fn convert(settings: &ConvertSettings) -> Result<ConvertSummary> {
    let full_registry = ClusterRegistry::load(&settings.registry_path)?;
    let unknown = unknown_exclusions(&full_registry, &settings.exclude);
    if !unknown.is_empty() {
        warn!(?unknown, "Excluded clusters not found in registry");
    }
    let registry = full_registry.without(&settings.exclude);
    info!(
        clusters = registry.len(),
        excluded = ?settings.exclude,
        "Cluster registry loaded"
    );

    std::fs::create_dir_all(&settings.output_dir)?;
    let out = |name: &str| settings.output_dir.join(name);

    let countries_input = load_countries_input(&settings.tables_dir.join(COUNTRIES_INPUT_FILE))?;
    let per_country = convert_per_country_data(&countries_input)?;
    write_json(&out("perCountryData.json"), &per_country, settings.gzip)?;
    info!(
        countries = per_country.distributions.len(),
        cluster_names = per_country.cluster_names.len(),
        "Per-country data written"
    );

    let params: &PlottingDates = &countries_input.plotting_dates;
    write_json(&out("params.json"), params, settings.gzip)?;

    let per_cluster = convert_per_cluster_data(
        &registry,
        &settings.tables_dir,
        settings.concurrency,
        settings.sort_by_week,
    )
    .await?;
    write_json(&out("perClusterData.json"), &per_cluster, settings.gzip)?;
    info!(
        clusters = per_cluster.distributions.len(),
        countries = per_cluster.country_names.len(),
        "Per-cluster data written"
    );

    let cluster_list = ClustersOutput {
        clusters: registry.clusters().to_vec(),
    };
    write_json(&out("clusters.json"), &cluster_list, settings.gzip)?;

    copy_if_exists(
        &settings.tables_dir.join("countryStyles.json"),
        &out("countryStyles.json"),
    )?;
    copy_if_exists(
        &settings.tables_dir.join("perVariant_countries_toPlot.json"),
        &out("countriesToPlot.json"),
    )?;

    Ok(ConvertSummary {
        countries: per_country.distributions.len(),
        clusters: per_cluster.distributions.len(),
    })
}

/// Regularizes every country of one cluster table and appends the rows to a CSV file.
///
/// Returns the number of rows written.
#[tracing::instrument(skip_all, fields(cluster = %cluster, table = %table_path.display(), output = %output.display()))]
pub fn inspect(cluster: &str, table_path: &Path, output: &Path) -> Result<usize> {
    let table = load_cluster_table(table_path)?;

    let mut records = Vec::new();
    for (country, series) in &table {
        let rows = regularize(series).map_err(|e| UnitError::new(cluster, country, e))?;
        for (row, freq) in rows.iter().zip(to_frequency_rows(country, &rows)) {
            records.push(RegularizedRecord {
                cluster: cluster.to_string(),
                country: country.clone(),
                week: row.week,
                cluster_sequences: row.cluster_sequences,
                total_sequences: row.total_sequences,
                frequency: freq.frequency,
                interp: row.interp,
                orig: row.orig,
            });
        }
    }

    append_records(output, &records)?;
    info!(rows = records.len(), "Regularized rows written");
    Ok(records.len())
}
