//! Season identifiers ("2025-26").
//!
//! The rest of the crate treats season ids as opaque strings; these helpers
//! only exist to pick defaults and to walk back through history.

use chrono::{Datelike, NaiveDate};

/// Month the regular season starts in
const SEASON_START_MONTH: u32 = 10;

/// Season id for a calendar date. October onwards belongs to the new season.
pub fn current_season(date: NaiveDate) -> String {
    let start_year = if date.month() >= SEASON_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    };
    season_id(start_year)
}

fn season_id(start_year: i32) -> String {
    format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100))
}

fn start_year(season: &str) -> Option<i32> {
    let (start, end) = season.trim().split_once('-')?;
    let start: i32 = start.parse().ok()?;
    let end: i32 = end.parse().ok()?;
    if end != (start + 1).rem_euclid(100) {
        return None;
    }
    Some(start)
}

/// `n` season ids, newest first, beginning with `season`.
///
/// An id that doesn't look like "YYYY-YY" is returned alone.
pub fn previous_seasons(season: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    match start_year(season) {
        Some(start) => (0..n as i32).map(|i| season_id(start - i)).collect(),
        None => vec![season.to_string()],
    }
}
