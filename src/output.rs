//! Output formatting and persistence.
//!
//! JSON files are written pretty-printed with sorted keys, optionally with
//! a gzip-compressed copy alongside. Regularized rows can be appended to a
//! CSV file for inspection.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One regularized, frequency-annotated row as written to CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegularizedRecord {
    pub cluster: String,
    pub country: String,
    pub week: NaiveDate,
    pub cluster_sequences: Option<f64>,
    pub total_sequences: Option<f64>,
    pub frequency: f64,
    pub interp: bool,
    pub orig: bool,
}

/// Serializes `value` as pretty JSON with sorted object keys.
pub fn to_sorted_json(value: &impl Serialize) -> Result<Vec<u8>> {
    // Round-tripping through `Value` sorts every object's keys.
    let value = serde_json::to_value(value)?;
    let mut body = serde_json::to_vec_pretty(&value)?;
    body.push(b'\n');
    Ok(body)
}

/// Writes `value` as JSON to `path`, plus `<path>.gz` when `gzip` is set.
pub fn write_json(path: &Path, value: &impl Serialize, gzip: bool) -> Result<()> {
    let body = to_sorted_json(value)?;
    fs::write(path, &body).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), bytes = body.len(), "JSON written");

    if gzip {
        let gz_path = gz_path(path);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body)?;
        let compressed = encoder.finish()?;
        fs::write(&gz_path, &compressed)
            .with_context(|| format!("writing {}", gz_path.display()))?;
        debug!(path = %gz_path.display(), bytes = compressed.len(), "Gzip copy written");
    }

    Ok(())
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Copies `src` to `dst` if it exists. Returns whether a copy happened.
pub fn copy_if_exists(src: &Path, dst: &Path) -> Result<bool> {
    if !src.exists() {
        warn!(path = %src.display(), "Static asset not found, skipping copy");
        return Ok(false);
    }
    fs::copy(src, dst)
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    info!(from = %src.display(), to = %dst.display(), "Static asset copied");
    Ok(true)
}

/// Appends records as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &Path, records: &[RegularizedRecord]) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::env;
    use std::io::Read;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn record() -> RegularizedRecord {
        RegularizedRecord {
            cluster: "20A.EU1".into(),
            country: "Spain".into(),
            week: NaiveDate::from_ymd_opt(2021, 1, 13).unwrap(),
            cluster_sequences: Some(15.0),
            total_sequences: None,
            frequency: 0.0,
            interp: true,
            orig: false,
        }
    }

    #[test]
    fn test_to_sorted_json_sorts_keys() {
        #[derive(Serialize)]
        struct Unsorted {
            zeta: u8,
            alpha: u8,
        }
        let body = to_sorted_json(&Unsorted { zeta: 1, alpha: 2 }).unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
        assert!(text.contains("\n  \"alpha\": 2"));
    }

    #[test]
    fn test_write_json_with_gzip_copy() {
        let path = temp_path("cluster_distributions_test_output.json");
        let gz = gz_path(&path);
        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(&gz);

        let value = json!({"b": [1, 2], "a": null});
        write_json(&path, &value, true).unwrap();

        let plain = fs::read_to_string(&path).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(&gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(plain, decoded);
        assert_eq!(serde_json::from_str::<serde_json::Value>(&plain).unwrap(), value);

        fs::remove_file(&path).unwrap();
        fs::remove_file(&gz).unwrap();
    }

    #[test]
    fn test_copy_if_exists_missing_source() {
        let dst = temp_path("cluster_distributions_test_copy_dst.json");
        let copied = copy_if_exists(Path::new("/nonexistent/countryStyles.json"), &dst).unwrap();
        assert!(!copied);
        assert!(!dst.exists());
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("cluster_distributions_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[record()]).unwrap();
        append_records(&path, &[record(), record()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 3 data rows
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "cluster,country,week,cluster_sequences,total_sequences,frequency,interp,orig"
        );
        assert_eq!(lines[1], "20A.EU1,Spain,2021-01-13,15.0,,0.0,true,false");

        fs::remove_file(&path).unwrap();
    }
}
