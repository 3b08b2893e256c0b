//! `YYYY-MM` month strings: normalization, calendar arithmetic and the
//! month picker range.
//!
//! Months stay plain strings throughout the app because `YYYY-MM` sorts
//! lexicographically in calendar order and is what the database stores.

use chrono::{Datelike, NaiveDate};

/// Canonicalizes a month-like string into `YYYY-MM`.
///
/// - blank or absent input gives `None`
/// - anything starting with `YYYY-MM` is cut to its first 7 characters
/// - `Y-M` style input with two numeric leading parts is zero-padded
/// - anything else is returned trimmed but otherwise unchanged; it will
///   simply never compare equal to a real month
pub fn normalize_month(raw: Option<&str>) -> Option<String> {
    let m = raw?.trim();
    if m.is_empty() {
        return None;
    }

    if starts_with_year_month(m) {
        return Some(m[..7].to_string());
    }

    let mut parts = m.split('-');
    if let (Some(y), Some(mm)) = (parts.next(), parts.next()) {
        if is_digits(y) && is_digits(mm) {
            if let (Ok(y), Ok(mm)) = (y.parse::<u32>(), mm.parse::<u32>()) {
                return Some(format!("{y:04}-{mm:02}"));
            }
        }
    }

    Some(m.to_string())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn starts_with_year_month(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
}

/// Month of `date` as `YYYY-MM`.
pub fn month_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parses a strict `YYYY-MM` into a running month index (`year * 12 + month0`).
pub fn month_index(ym: &str) -> Option<i32> {
    if ym.len() != 7 || !starts_with_year_month(ym) {
        return None;
    }
    let year: i32 = ym[..4].parse().ok()?;
    let month: i32 = ym[5..7].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(year * 12 + (month - 1))
}

fn format_index(idx: i32) -> String {
    let year = idx.div_euclid(12);
    let month = idx.rem_euclid(12) + 1;
    format!("{year:04}-{month:02}")
}

pub fn is_valid_month(ym: &str) -> bool {
    month_index(ym).is_some()
}

/// Months offered by month pickers, ascending and inclusive.
///
/// The range runs from the later of `start_from` and `months_back` before
/// the month of `today`, up to `months_ahead` after it. An unparseable
/// `start_from` is ignored.
pub fn months_options(
    today: NaiveDate,
    start_from: &str,
    months_back: u32,
    months_ahead: u32,
) -> Vec<String> {
    let current = today.year() * 12 + today.month0() as i32;
    let back = current - months_back as i32;
    let end = current + months_ahead as i32;

    let start = normalize_month(Some(start_from))
        .as_deref()
        .and_then(month_index)
        .map_or(back, |from| from.max(back));

    (start..=end).map(format_index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalize_pads_short_forms_and_truncates_days() {
        assert_eq!(normalize_month(Some("2025-7-4")).as_deref(), Some("2025-07"));
        assert_eq!(normalize_month(Some("2025-07-15")).as_deref(), Some("2025-07"));
        assert_eq!(normalize_month(Some(" 2025-07 ")).as_deref(), Some("2025-07"));
        assert_eq!(normalize_month(Some("25-1")).as_deref(), Some("0025-01"));
        assert_eq!(
            normalize_month(Some("2025-07")),
            normalize_month(Some("2025-07-15"))
        );
    }

    #[test]
    fn normalize_blank_is_none() {
        assert_eq!(normalize_month(None), None);
        assert_eq!(normalize_month(Some("")), None);
        assert_eq!(normalize_month(Some("   ")), None);
    }

    #[test]
    fn normalize_passes_unknown_formats_through() {
        assert_eq!(normalize_month(Some("July")).as_deref(), Some("July"));
        assert_eq!(normalize_month(Some("2025/07")).as_deref(), Some("2025/07"));
        assert_eq!(normalize_month(Some("2025-jul")).as_deref(), Some("2025-jul"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["2025-7", "2025-07-31", "1999-12", "2025-1-1", "nope"] {
            let once = normalize_month(Some(raw));
            let twice = normalize_month(once.as_deref());
            assert_eq!(once, twice, "input {raw}");
        }
    }

    #[test]
    fn options_start_at_later_of_start_from_and_back() {
        let months = months_options(day(2025, 9, 10), "2025-07", 1, 12);
        assert_eq!(months.first().map(String::as_str), Some("2025-08"));
        assert_eq!(months.last().map(String::as_str), Some("2026-09"));
        assert_eq!(months.len(), 14);
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn options_honor_start_from_when_later() {
        let months = months_options(day(2025, 7, 1), "2025-07", 12, 2);
        assert_eq!(months, vec!["2025-07", "2025-08", "2025-09"]);
    }

    #[test]
    fn options_roll_over_year_boundaries() {
        let months = months_options(day(2026, 1, 15), "2000-01", 2, 1);
        assert_eq!(months, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);

        let months = months_options(day(2025, 12, 31), "2000-01", 0, 1);
        assert_eq!(months, vec!["2025-12", "2026-01"]);
    }

    #[test]
    fn options_ignore_garbage_start_from() {
        let months = months_options(day(2025, 9, 1), "soon", 1, 0);
        assert_eq!(months, vec!["2025-08", "2025-09"]);
    }
}
