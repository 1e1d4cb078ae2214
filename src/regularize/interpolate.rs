//! Reindexing onto the weekly grid and linear gap filling.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::error::SeriesError;
use crate::regularize::diff::boundary_diff;
use crate::regularize::grid::{build_grid, validate_index};
use crate::regularize::types::{RegularizedRow, SeriesColumns};

/// Regularizes one country's series onto a complete weekly grid.
///
/// Missing weeks get linearly interpolated counts and `orig = false`. Every
/// missing week and its immediate grid neighbours get `interp = true`. Rows
/// come back in ascending week order. A single-week series yields one row.
///
/// # Errors
///
/// Returns [`SeriesError`] if the series is empty, its columns disagree in
/// length, a week is not a valid date, or its weeks are not strictly increasing on a 7-day cadence.
pub fn regularize(series: &SeriesColumns) -> Result<Vec<RegularizedRow>, SeriesError> {
    series.check_shape()?;
    let weeks = series.parse_weeks()?;
    validate_index(&weeks)?;

    let grid = build_grid(&weeks)?;

    let cluster_sequences = interpolate_linear(&reindex(
        &weeks,
        &series.cluster_sequences,
        &grid,
    ));
    let total_sequences = interpolate_linear(&reindex(
        &weeks,
        &series.total_sequences,
        &grid,
    ));

    let interp: BTreeSet<NaiveDate> = boundary_diff(&grid, &weeks, true)
        .into_iter()
        .collect();
    let missing: BTreeSet<NaiveDate> = boundary_diff(&grid, &weeks, false)
        .into_iter()
        .collect();

    let rows = grid
        .into_iter()
        .zip(cluster_sequences)
        .zip(total_sequences)
        .map(|((week, cluster_sequences), total_sequences)| RegularizedRow {
            week,
            cluster_sequences,
            total_sequences,
            interp: interp.contains(&week),
            orig: !missing.contains(&week),
        })
        .collect();

    Ok(rows)
}

/// Places `values` (keyed by `index`) onto `grid`, leaving `None` for absent weeks.
fn reindex(index: &[NaiveDate], values: &[Option<f64>], grid: &[NaiveDate]) -> Vec<Option<f64>> {
    let by_week: BTreeMap<NaiveDate, Option<f64>> =
        index.iter().copied().zip(values.iter().copied()).collect();

    grid.iter()
        .map(|week| by_week.get(week).copied().flatten())
        .collect()
}

/// Fills interior `None` runs by linear interpolation between the nearest
/// known values on either side.
///
/// Points are treated as equally spaced. Leading and trailing `None`s are
/// left untouched since nothing is extrapolated. Note this differs from a
/// pandas `interpolate(method="linear")` pass, which carries the last valid
/// value forward into trailing gaps; here those stay `None` and later
/// degrade to frequency 0.
pub fn interpolate_linear(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut filled = values.to_vec();
    let mut last_known: Option<(usize, f64)> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(y1) = *value else {
            continue;
        };

        if let Some((i0, y0)) = last_known {
            let span = (i - i0) as f64;
            for (k, slot) in filled.iter_mut().enumerate().take(i).skip(i0 + 1) {
                let t = (k - i0) as f64 / span;
                *slot = Some(y0 + (y1 - y0) * t);
            }
        }

        last_known = Some((i, y1));
    }

    filled
}
