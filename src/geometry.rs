use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, ParseError};

use crate::domain::Item;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DATE_RANGE_MIN_WIDTH: f64 = 50.0;

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Converts a horizontal pixel delta into a fractional day delta.
pub fn pixels_to_days(delta_px: f64, day_width: f64) -> f64 {
    delta_px / day_width
}

/// Moves `anchor` by a fractional number of days at millisecond resolution.
/// `None` when the result leaves the representable calendar.
pub fn shift_by_days(anchor: NaiveDateTime, delta_days: f64) -> Option<NaiveDateTime> {
    let millis = (delta_days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = Duration::try_milliseconds(millis as i64)?;
    anchor.checked_add_signed(delta)
}

/// Drops the time of day, keeping the calendar date the instant falls on.
pub fn normalize_day(at: NaiveDateTime) -> NaiveDate {
    at.date()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpan {
    pub left: f64,
    pub width: f64,
}

impl ItemSpan {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Horizontal extent of an item box; the end date is inclusive.
pub fn item_span(item: &Item, origin: NaiveDate, day_width: f64) -> ItemSpan {
    let days_from_origin = days_between(origin, item.start);
    let covered_days = days_between(item.start, item.end) + 1;
    ItemSpan {
        left: days_from_origin as f64 * day_width,
        width: covered_days as f64 * day_width,
    }
}

pub fn shows_date_range(item: &Item, day_width: f64) -> bool {
    day_width * days_between(item.start, item.end) as f64 > DATE_RANGE_MIN_WIDTH
}

/// Row under a vertical pointer position, clamped to the existing lanes.
pub fn lane_at(y: f64, container_top: f64, lane_height: f64, lane_count: usize) -> Option<usize> {
    if lane_count == 0 {
        return None;
    }

    let row = ((y - container_top) / lane_height).floor();
    if !row.is_finite() || row < 0.0 {
        return Some(0);
    }
    Some((row as usize).min(lane_count - 1))
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        return start.format("%b %-d, %Y").to_string();
    }

    if start.year() == end.year() && start.month() == end.month() {
        return format!("{} - {}, {}", start.format("%b %-d"), end.day(), end.year());
    }

    if start.year() == end.year() {
        return format!(
            "{} - {}, {}",
            start.format("%b %-d"),
            end.format("%b %-d"),
            end.year()
        );
    }

    format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use crate::domain::Item;

    use super::{
        format_date_range, item_span, lane_at, midnight, normalize_day, parse_day, shift_by_days,
        shows_date_range,
    };

    fn day(raw: &str) -> NaiveDate {
        parse_day(raw).expect("valid test date")
    }

    #[test]
    fn shifts_by_fractional_days() {
        let shifted = shift_by_days(midnight(day("2024-01-10")), -0.5).expect("in range");
        assert_eq!(normalize_day(shifted), day("2024-01-09"));
        assert_eq!(shifted.hour(), 12);

        let forward = shift_by_days(midnight(day("2024-01-10")), 2.25).expect("in range");
        assert_eq!(normalize_day(forward), day("2024-01-12"));
        assert_eq!(forward.hour(), 6);
    }

    #[test]
    fn shift_rejects_non_finite_deltas() {
        assert!(shift_by_days(midnight(day("2024-01-10")), f64::NAN).is_none());
        assert!(shift_by_days(midnight(day("2024-01-10")), f64::INFINITY).is_none());
        assert!(shift_by_days(midnight(day("2024-01-10")), 1e300).is_none());
    }

    #[test]
    fn span_covers_inclusive_end_day() {
        let item = Item::new(1, "Build", day("2024-01-03"), day("2024-01-05"));
        let span = item_span(&item, day("2024-01-01"), 24.0);
        assert_eq!(span.left, 48.0);
        assert_eq!(span.width, 72.0);
        assert_eq!(span.right(), 120.0);
    }

    #[test]
    fn date_range_needs_enough_width() {
        let item = Item::new(1, "Build", day("2024-01-01"), day("2024-01-03"));
        assert!(!shows_date_range(&item, 24.0));
        assert!(shows_date_range(&item, 36.0));
    }

    #[test]
    fn lane_row_is_clamped() {
        assert_eq!(lane_at(10.0, 100.0, 56.0, 3), Some(0));
        assert_eq!(lane_at(100.0, 100.0, 56.0, 3), Some(0));
        assert_eq!(lane_at(160.0, 100.0, 56.0, 3), Some(1));
        assert_eq!(lane_at(1_000.0, 100.0, 56.0, 3), Some(2));
        assert_eq!(lane_at(1_000.0, 100.0, 56.0, 0), None);
    }

    #[test]
    fn formats_ranges_by_shared_calendar_parts() {
        assert_eq!(format_date_range(day("2024-01-05"), day("2024-01-05")), "Jan 5, 2024");
        assert_eq!(format_date_range(day("2024-01-05"), day("2024-01-09")), "Jan 5 - 9, 2024");
        assert_eq!(
            format_date_range(day("2024-01-05"), day("2024-02-03")),
            "Jan 5 - Feb 3, 2024"
        );
        assert_eq!(
            format_date_range(day("2023-12-30"), day("2024-01-02")),
            "Dec 30, 2023 - Jan 2, 2024"
        );
    }
}
