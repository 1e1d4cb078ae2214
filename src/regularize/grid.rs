//! Weekly grid construction.

use chrono::{Days, NaiveDate};

use crate::error::SeriesError;

/// Spacing between consecutive grid weeks.
pub const WEEK_STEP_DAYS: u64 = 7;

/// Checks that `index` is strictly increasing and that every week sits a
/// whole number of steps after the first one.
pub fn validate_index(index: &[NaiveDate]) -> Result<(), SeriesError> {
    let Some(&start) = index.first() else {
        return Err(SeriesError::InvalidSeries("no observations".into()));
    };

    for pair in index.windows(2) {
        if pair[1] <= pair[0] {
            return Err(SeriesError::NonMonotonicWeek {
                previous: pair[0],
                current: pair[1],
            });
        }
    }

    for &week in index {
        if (week - start).num_days() % WEEK_STEP_DAYS as i64 != 0 {
            return Err(SeriesError::MisalignedWeek { start, week });
        }
    }

    Ok(())
}

/// Builds the complete weekly grid from the first to the last week of `index`, inclusive.
///
/// `index` is assumed sorted; see [`validate_index`].
pub fn build_grid(index: &[NaiveDate]) -> Result<Vec<NaiveDate>, SeriesError> {
    let (Some(&first), Some(&last)) = (index.first(), index.last()) else {
        return Err(SeriesError::InvalidSeries("no observations".into()));
    };

    let span = (last - first).num_days().max(0) as u64;
    let mut grid = Vec::with_capacity((span / WEEK_STEP_DAYS) as usize + 1);

    let mut week = first;
    while week <= last {
        grid.push(week);
        match week.checked_add_days(Days::new(WEEK_STEP_DAYS)) {
            Some(next) => week = next,
            None => break,
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_build_grid_empty_is_invalid() {
        assert!(matches!(
            build_grid(&[]),
            Err(SeriesError::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_build_grid_single_week() {
        let grid = build_grid(&[date("2021-03-01")]).unwrap();
        assert_eq!(grid, vec![date("2021-03-01")]);
    }

    #[test]
    fn test_build_grid_fills_gaps() {
        let index = [date("2020-12-28"), date("2021-01-04"), date("2021-02-01")];
        let grid = build_grid(&index).unwrap();

        // (2021-02-01 - 2020-12-28) / 7 days + 1
        assert_eq!(grid.len(), 35 / 7 + 1);
        assert_eq!(grid.first(), index.first());
        assert_eq!(grid.last(), index.last());
        for week in index {
            assert!(grid.contains(&week));
        }
        for pair in grid.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 7);
        }
    }

    #[test]
    fn test_validate_index_rejects_duplicates() {
        let index = [date("2021-01-06"), date("2021-01-06")];
        assert!(matches!(
            validate_index(&index),
            Err(SeriesError::NonMonotonicWeek { .. })
        ));
    }

    #[test]
    fn test_validate_index_rejects_decreasing() {
        let index = [date("2021-01-13"), date("2021-01-06")];
        assert_eq!(
            validate_index(&index),
            Err(SeriesError::NonMonotonicWeek {
                previous: date("2021-01-13"),
                current: date("2021-01-06"),
            })
        );
    }

    #[test]
    fn test_validate_index_rejects_shifted_weekday() {
        let index = [date("2021-01-06"), date("2021-01-14")];
        assert_eq!(
            validate_index(&index),
            Err(SeriesError::MisalignedWeek {
                start: date("2021-01-06"),
                week: date("2021-01-14"),
            })
        );
    }

    #[test]
    fn test_validate_index_accepts_gapped_series() {
        let index = [date("2021-01-06"), date("2021-01-20"), date("2021-03-03")];
        assert!(validate_index(&index).is_ok());
    }
}
