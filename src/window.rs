use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::domain::Item;
use crate::geometry::days_between;

/// Days of empty space kept before the earliest and after the latest date.
pub const PAD_DAYS: i64 = 5;
pub const DEFAULT_BASE_DAY_WIDTH: f64 = 24.0;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.5;

const DAY_LABEL_MIN_SCALE: f64 = 1.5;
const DAY_LABEL_EVERY_DAY_SCALE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineWindow {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub total_days: i64,
    pub day_width: f64,
}

impl TimelineWindow {
    pub fn total_width(&self) -> f64 {
        self.total_days as f64 * self.day_width
    }

    pub fn offset_of(&self, date: NaiveDate) -> f64 {
        days_between(self.min_date, date) as f64 * self.day_width
    }
}

/// Visible date range and day width for a non-empty item collection.
///
/// Panics when `items` is empty; callers check emptiness first.
pub fn compute_window(items: &[Item], base_day_width: f64, scale: f64) -> TimelineWindow {
    let earliest = items
        .iter()
        .map(|item| item.start.min(item.end))
        .min()
        .expect("timeline window requires at least one item");
    let latest = items
        .iter()
        .map(|item| item.start.max(item.end))
        .max()
        .expect("timeline window requires at least one item");

    let min_date = earliest - Duration::days(PAD_DAYS);
    let max_date = latest + Duration::days(PAD_DAYS);

    TimelineWindow {
        min_date,
        max_date,
        total_days: days_between(min_date, max_date),
        day_width: base_day_width * scale,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    scale: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Zoom {
    pub fn clamped(scale: f64) -> Self {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale * ZOOM_STEP).min(MAX_SCALE);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale / ZOOM_STEP).max(MIN_SCALE);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderLabel {
    pub date: NaiveDate,
    pub position: f64,
}

pub fn month_labels(window: &TimelineWindow) -> Vec<HeaderLabel> {
    let mut labels = Vec::new();
    let mut cursor = first_of_month(window.min_date);
    while cursor <= window.max_date {
        if cursor >= window.min_date {
            labels.push(HeaderLabel {
                date: cursor,
                position: window.offset_of(cursor),
            });
        }
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    labels
}

pub fn day_labels(window: &TimelineWindow, scale: f64) -> Vec<HeaderLabel> {
    if scale < DAY_LABEL_MIN_SCALE {
        return Vec::new();
    }

    window
        .min_date
        .iter_days()
        .take_while(|date| *date <= window.max_date)
        .filter(|date| scale >= DAY_LABEL_EVERY_DAY_SCALE || date.day() % 2 == 0)
        .map(|date| HeaderLabel {
            date,
            position: window.offset_of(date),
        })
        .collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use crate::domain::Item;
    use crate::geometry::parse_day;

    use super::{MAX_SCALE, MIN_SCALE, Zoom, compute_window, day_labels, month_labels};

    fn day(raw: &str) -> NaiveDate {
        parse_day(raw).expect("valid test date")
    }

    #[test]
    fn pads_the_item_range_by_five_days() {
        let items = vec![
            Item::new(1, "A", day("2024-01-10"), day("2024-01-12")),
            Item::new(2, "B", day("2024-01-03"), day("2024-01-20")),
        ];

        let window = compute_window(&items, 24.0, 1.5);
        assert_eq!(window.min_date, day("2023-12-29"));
        assert_eq!(window.max_date, day("2024-01-25"));
        assert_eq!(window.total_days, 27);
        assert_eq!(window.day_width, 36.0);
        assert_eq!(window.total_width(), 27.0 * 36.0);
        assert_eq!(window.offset_of(day("2024-01-03")), 5.0 * 36.0);
    }

    #[test]
    #[should_panic(expected = "at least one item")]
    fn empty_collection_is_a_caller_bug() {
        compute_window(&[], 24.0, 1.0);
    }

    #[test]
    fn zoom_steps_stay_within_bounds() {
        let mut zoom = Zoom::default();
        zoom.zoom_in();
        assert_eq!(zoom.scale(), 1.5);
        zoom.zoom_in();
        zoom.zoom_in();
        assert_eq!(zoom.scale(), MAX_SCALE);

        let mut zoom = Zoom::default();
        zoom.zoom_out();
        zoom.zoom_out();
        assert_eq!(zoom.scale(), MIN_SCALE);

        assert_eq!(Zoom::clamped(9.0).scale(), MAX_SCALE);
        assert_eq!(Zoom::clamped(f64::NAN).scale(), 1.0);
    }

    #[test]
    fn month_labels_mark_first_days_inside_the_window() {
        let items = vec![Item::new(1, "A", day("2024-01-20"), day("2024-03-02"))];
        let window = compute_window(&items, 24.0, 1.0);

        let labels = month_labels(&window);
        let dates = labels.iter().map(|label| label.date).collect::<Vec<_>>();
        assert_eq!(dates, vec![day("2024-02-01"), day("2024-03-01")]);
        assert_eq!(labels[0].position, 17.0 * 24.0);
    }

    #[test]
    fn day_labels_thin_out_at_low_zoom() {
        let items = vec![Item::new(1, "A", day("2024-01-10"), day("2024-01-10"))];
        let window = compute_window(&items, 24.0, 1.0);

        assert!(day_labels(&window, 1.0).is_empty());
        let even = day_labels(&window, 1.5);
        assert!(!even.is_empty());
        assert!(even.iter().all(|label| label.date.day() % 2 == 0));
        assert_eq!(day_labels(&window, 2.25).len(), 11);
    }
}
