use crate::distribution::types::FrequencyRow;
use crate::regularize::RegularizedRow;

/// Computes `cluster_sequences / total_sequences`.
///
/// Returns 0.0 when the total is zero or either count is missing.
pub fn frequency(cluster_sequences: Option<f64>, total_sequences: Option<f64>) -> f64 {
    match (cluster_sequences, total_sequences) {
        (Some(cluster), Some(total)) if total != 0.0 => cluster / total,
        _ => 0.0,
    }
}

/// Converts one country's regularized rows into frequency rows.
pub fn to_frequency_rows(country: &str, rows: &[RegularizedRow]) -> Vec<FrequencyRow> {
    rows.iter()
        .map(|row| FrequencyRow {
            week: row.week,
            country: country.to_string(),
            frequency: frequency(row.cluster_sequences, row.total_sequences),
            interp: row.interp,
            orig: row.orig,
        })
        .collect()
}
