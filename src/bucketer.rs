//! Date bucketing
//!
//! Assigns events to calendar days. Two window shapes are used:
//! - [`DayWindow`]: N whole calendar days ending at a reference day (inclusive)
//! - [`ReportWindow`]: an exact timestamp span, inclusive at both ends
//!
//! Day equality is by calendar date only.

use crate::error::InsightError;
use crate::types::{DayBucket, Event};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A span of time that can decide whether a timestamp falls inside it
pub trait TimeWindow {
    fn contains(&self, timestamp: NaiveDateTime) -> bool;
}

/// Consecutive calendar days ending at a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    first: NaiveDate,
    last: NaiveDate,
}

impl DayWindow {
    /// The `days` calendar days ending at `reference`, reference included
    pub fn trailing(reference: NaiveDate, days: u32) -> Result<Self, InsightError> {
        if days == 0 {
            return Err(InsightError::InvalidWindow(
                "window must span at least one day".to_string(),
            ));
        }
        let first = reference
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| {
                InsightError::InvalidWindow(format!("{days} days before {reference} is out of range"))
            })?;

        Ok(Self {
            first,
            last: reference,
        })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn num_days(&self) -> usize {
        (self.last - self.first).num_days() as usize + 1
    }

    /// Days of the window, oldest first
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.num_days())
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

impl TimeWindow for DayWindow {
    fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.contains_date(timestamp.date())
    }
}

/// Exact timestamp span used by the weekly report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, InsightError> {
        if start > end {
            return Err(InsightError::InvalidWindow(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The span of `days` days ending exactly at `end`
    pub fn ending_at(end: NaiveDateTime, days: u32) -> Result<Self, InsightError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                InsightError::InvalidWindow(format!("{days} days before {end} is out of range"))
            })?;
        Self::new(start, end)
    }

    /// Whole days between start and end, at least one
    pub fn span_days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days()).unwrap_or(u32::MAX).max(1)
    }
}

impl TimeWindow for ReportWindow {
    fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Groups events into day buckets
pub struct DateBucketer;

impl DateBucketer {
    /// Bucket events by calendar day.
    ///
    /// Returns exactly one bucket per day of the window, oldest first. Events
    /// without a date or outside the window are left out.
    pub fn bucket<'a>(events: &'a [Event], window: &DayWindow) -> Vec<DayBucket<'a>> {
        let mut buckets: Vec<DayBucket<'a>> = window
            .days()
            .map(|date| DayBucket {
                date,
                events: Vec::new(),
            })
            .collect();

        for event in events {
            let Some(date) = event.date() else {
                continue;
            };
            if !window.contains_date(date) {
                continue;
            }
            let index = (date - window.first_day()).num_days() as usize;
            buckets[index].events.push(event);
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Meal, Workout};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal_on(date: Option<NaiveDate>, hour: u32, calories: f64) -> Event {
        Event::Meal(Meal {
            timestamp: date.map(|d| d.and_hms_opt(hour, 0, 0).unwrap()),
            calories,
            ..Default::default()
        })
    }

    #[test]
    fn test_trailing_window_includes_reference() {
        let window = DayWindow::trailing(day(2024, 1, 7), 7).unwrap();
        assert_eq!(window.first_day(), day(2024, 1, 1));
        assert_eq!(window.last_day(), day(2024, 1, 7));
        assert_eq!(window.num_days(), 7);

        let days: Vec<NaiveDate> = window.days().collect();
        assert_eq!(days.first(), Some(&day(2024, 1, 1)));
        assert_eq!(days.last(), Some(&day(2024, 1, 7)));
    }

    #[test]
    fn test_zero_day_window_is_invalid() {
        assert!(DayWindow::trailing(day(2024, 1, 7), 0).is_err());
    }

    #[test]
    fn test_bucket_always_returns_every_day() {
        let window = DayWindow::trailing(day(2024, 3, 1), 7).unwrap();
        let buckets = DateBucketer::bucket(&[], &window);

        assert_eq!(buckets.len(), 7);
        // Crosses the leap day
        assert_eq!(buckets[0].date, day(2024, 2, 24));
        assert_eq!(buckets[5].date, day(2024, 2, 29));
        assert!(buckets.iter().all(|b| b.events.is_empty()));
    }

    #[test]
    fn test_bucket_by_calendar_date() {
        let events = vec![
            meal_on(Some(day(2024, 1, 7)), 0, 100.0),
            meal_on(Some(day(2024, 1, 7)), 23, 200.0),
            meal_on(Some(day(2024, 1, 1)), 12, 300.0),
            meal_on(Some(day(2023, 12, 31)), 23, 400.0),
            meal_on(Some(day(2024, 1, 8)), 0, 500.0),
            meal_on(None, 0, 600.0),
        ];
        let window = DayWindow::trailing(day(2024, 1, 7), 7).unwrap();
        let buckets = DateBucketer::bucket(&events, &window);

        assert_eq!(buckets[0].events.len(), 1);
        assert_eq!(buckets[6].events.len(), 2);
        let placed: usize = buckets.iter().map(|b| b.events.len()).sum();
        assert_eq!(placed, 3);
    }

    #[test]
    fn test_mixed_variants_share_buckets() {
        let events = vec![
            meal_on(Some(day(2024, 1, 3)), 8, 100.0),
            Event::Workout(Workout {
                timestamp: day(2024, 1, 3).and_hms_opt(18, 0, 0),
                duration_minutes: 30.0,
                ..Default::default()
            }),
        ];
        let window = DayWindow::trailing(day(2024, 1, 7), 7).unwrap();
        let buckets = DateBucketer::bucket(&events, &window);
        assert_eq!(buckets[2].events.len(), 2);
    }

    #[test]
    fn test_report_window_is_inclusive() {
        let end = day(2024, 1, 8).and_hms_opt(6, 0, 0).unwrap();
        let window = ReportWindow::ending_at(end, 7).unwrap();

        assert_eq!(window.start, day(2024, 1, 1).and_hms_opt(6, 0, 0).unwrap());
        assert!(window.contains(window.start));
        assert!(window.contains(end));
        assert!(!window.contains(day(2024, 1, 1).and_hms_opt(5, 59, 59).unwrap()));
        assert!(!window.contains(day(2024, 1, 8).and_hms_opt(6, 0, 1).unwrap()));
    }

    #[test]
    fn test_report_window_rejects_inverted_span() {
        let a = day(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        let b = day(2024, 1, 2).and_hms_opt(0, 0, 0).unwrap();
        assert!(ReportWindow::new(b, a).is_err());
        assert!(ReportWindow::new(a, b).is_ok());
    }
}
