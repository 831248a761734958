//! Aggregation
//!
//! This module computes statistics from normalized events:
//! - Counts, sums and means over a window ([`AggregateSummary`])
//! - Per-day series over bucketed days ([`WeeklySeries`])
//!
//! Means and sums over zero records fall back to the configured constants and
//! are flagged as fallbacks.

use crate::bucketer::{ReportWindow, TimeWindow};
use crate::config::{AggregatorConfig, TotalsScope};
use crate::types::{AggregateSummary, DailyValue, DayBucket, Event, Metric, WeeklySeries};

/// Aggregator for computing summaries and weekly series
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Summarize the events admitted by the configured totals scope
    pub fn summarize<W: TimeWindow + ?Sized>(&self, events: &[Event], window: &W) -> AggregateSummary {
        self.summarize_in_scope(events, window, self.config.totals_scope)
    }

    /// Summarize with an explicit totals scope
    pub fn summarize_in_scope<W: TimeWindow + ?Sized>(
        &self,
        events: &[Event],
        window: &W,
        scope: TotalsScope,
    ) -> AggregateSummary {
        let mut acc = SummaryAccumulator::default();
        for event in events
            .iter()
            .filter(|e| scope.admits(e.timestamp(), window))
        {
            acc.add(event);
        }

        let avg_sleep_hours = if acc.sleep_sessions > 0 {
            Metric::measured(acc.sleep_hours / acc.sleep_sessions as f64)
        } else {
            Metric::fallback(self.config.sleep_fallback_hours)
        };

        let total_calories = if acc.meals > 0 {
            Metric::measured(acc.meal_calories)
        } else {
            Metric::fallback(self.config.calorie_fallback)
        };

        tracing::debug!(
            scope = scope.as_str(),
            workouts = acc.workouts,
            meals = acc.meals,
            sleeps = acc.sleep_sessions,
            "summarized events"
        );

        AggregateSummary {
            total_workouts: acc.workouts,
            total_meals: acc.meals,
            total_sleep_sessions: acc.sleep_sessions,
            total_workout_minutes: acc.workout_minutes,
            total_calories_burned: acc.calories_burned,
            total_sleep_hours: acc.sleep_hours,
            avg_sleep_hours,
            total_calories,
        }
    }

    /// Per-day sums for each bucket: workout minutes, meal calories, sleep hours
    pub fn weekly_series(&self, buckets: &[DayBucket<'_>]) -> WeeklySeries {
        let mut series = WeeklySeries {
            workout_minutes: Vec::with_capacity(buckets.len()),
            calories: Vec::with_capacity(buckets.len()),
            sleep_hours: Vec::with_capacity(buckets.len()),
        };

        for bucket in buckets {
            let mut acc = SummaryAccumulator::default();
            for event in &bucket.events {
                acc.add(event);
            }

            let label = bucket.date.format("%a").to_string();
            let point = |value: f64| DailyValue {
                date: bucket.date,
                label: label.clone(),
                value,
            };
            series.workout_minutes.push(point(acc.workout_minutes));
            series.calories.push(point(acc.meal_calories));
            series.sleep_hours.push(point(acc.sleep_hours));
        }

        series
    }

    /// Measured meal calories spread over every day of `window`.
    ///
    /// Divides by the window length even when only some days have meals logged,
    /// so sparse logging reads as a low daily average.
    pub fn avg_daily_calories(&self, summary: &AggregateSummary, window: &ReportWindow) -> f64 {
        let total = summary.total_calories.measured_value().unwrap_or(0.0);
        total / f64::from(window.span_days())
    }
}

/// Running totals over a set of events
#[derive(Debug, Default)]
struct SummaryAccumulator {
    workouts: usize,
    meals: usize,
    sleep_sessions: usize,
    workout_minutes: f64,
    calories_burned: f64,
    meal_calories: f64,
    sleep_hours: f64,
}

impl SummaryAccumulator {
    fn add(&mut self, event: &Event) {
        match event {
            Event::Workout(w) => {
                self.workouts += 1;
                self.workout_minutes += w.duration_minutes;
                self.calories_burned += w.calories_burned;
            }
            Event::Meal(m) => {
                self.meals += 1;
                self.meal_calories += m.calories;
            }
            Event::Sleep(s) => {
                self.sleep_sessions += 1;
                self.sleep_hours += s.duration_hours;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketer::{DateBucketer, DayWindow};
    use crate::types::{Meal, SleepSession, Workout};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn workout(d: Option<u32>, minutes: f64) -> Event {
        Event::Workout(Workout {
            timestamp: d.map(|d| day(d).and_hms_opt(7, 0, 0).unwrap()),
            workout_type: "Running".to_string(),
            duration_minutes: minutes,
            calories_burned: minutes * 10.0,
            ..Default::default()
        })
    }

    fn meal(d: Option<u32>, calories: f64) -> Event {
        Event::Meal(Meal {
            timestamp: d.map(|d| day(d).and_hms_opt(12, 0, 0).unwrap()),
            calories,
            ..Default::default()
        })
    }

    fn sleep(d: Option<u32>, hours: f64) -> Event {
        Event::Sleep(SleepSession {
            start: d.map(|d| day(d).and_hms_opt(23, 0, 0).unwrap()),
            duration_hours: hours,
            ..Default::default()
        })
    }

    fn week_ending(d: u32) -> DayWindow {
        DayWindow::trailing(day(d), 7).unwrap()
    }

    #[test]
    fn test_empty_summary_uses_fallbacks() {
        let aggregator = Aggregator::default();
        let summary = aggregator.summarize(&[], &week_ending(7));

        assert_eq!(summary.total_workouts, 0);
        assert_eq!(summary.avg_sleep_hours, Metric::fallback(7.0));
        assert_eq!(summary.total_calories, Metric::fallback(2000.0));
        assert_eq!(summary.avg_sleep_hours.measured_value(), None);
    }

    #[test]
    fn test_fallbacks_are_injected() {
        let config = AggregatorConfig {
            sleep_fallback_hours: 6.0,
            calorie_fallback: 1500.0,
            ..AggregatorConfig::default()
        };
        let summary = Aggregator::new(config).summarize(&[], &week_ending(7));

        assert_eq!(summary.avg_sleep_hours.value, 6.0);
        assert_eq!(summary.total_calories.value, 1500.0);
    }

    #[test]
    fn test_single_sleep_mean_is_exact() {
        let events = vec![sleep(Some(1), 8.0)];
        let summary = Aggregator::default().summarize(&events, &week_ending(7));

        assert_eq!(summary.avg_sleep_hours, Metric::measured(8.0));
        assert_eq!(summary.total_sleep_sessions, 1);
    }

    #[test]
    fn test_summary_counts_and_sums() {
        let events = vec![
            workout(Some(2), 30.0),
            workout(Some(3), 45.0),
            meal(Some(2), 700.0),
            meal(Some(4), 800.0),
            sleep(Some(2), 6.0),
            sleep(Some(3), 7.5),
        ];
        let summary = Aggregator::default().summarize(&events, &week_ending(7));

        assert_eq!(summary.total_workouts, 2);
        assert_eq!(summary.total_meals, 2);
        assert_eq!(summary.total_sleep_sessions, 2);
        assert_eq!(summary.total_workout_minutes, 75.0);
        assert_eq!(summary.total_calories_burned, 750.0);
        assert_eq!(summary.total_calories, Metric::measured(1500.0));
        assert_eq!(summary.avg_sleep_hours, Metric::measured(6.75));
    }

    #[test]
    fn test_totals_scope_controls_filtering() {
        // Day 20 is outside the week ending on the 7th; one record has no date
        let events = vec![
            meal(Some(5), 500.0),
            meal(Some(20), 900.0),
            meal(None, 300.0),
        ];
        let window = week_ending(7);
        let aggregator = Aggregator::default();

        let windowed = aggregator.summarize_in_scope(&events, &window, TotalsScope::Window);
        assert_eq!(windowed.total_meals, 1);
        assert_eq!(windowed.total_calories.value, 500.0);

        let lenient =
            aggregator.summarize_in_scope(&events, &window, TotalsScope::WindowAndUndated);
        assert_eq!(lenient.total_meals, 2);
        assert_eq!(lenient.total_calories.value, 800.0);

        let all = aggregator.summarize_in_scope(&events, &window, TotalsScope::AllHistory);
        assert_eq!(all.total_meals, 3);
        assert_eq!(all.total_calories.value, 1700.0);
    }

    #[test]
    fn test_weekly_series_shape_and_labels() {
        let events = vec![
            workout(Some(1), 20.0),
            workout(Some(1), 25.0),
            meal(Some(3), 600.0),
            sleep(Some(7), 8.0),
            sleep(None, 9.0),
        ];
        let window = week_ending(7);
        let buckets = DateBucketer::bucket(&events, &window);
        let series = Aggregator::default().weekly_series(&buckets);

        assert_eq!(series.workout_minutes.len(), 7);
        assert_eq!(series.calories.len(), 7);
        assert_eq!(series.sleep_hours.len(), 7);

        // 2024-01-01 was a Monday
        let labels: Vec<&str> = series.workout_minutes.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);

        let minutes: Vec<f64> = series.workout_minutes.iter().map(|p| p.value).collect();
        assert_eq!(minutes, vec![45.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(series.calories[2].value, 600.0);
        assert_eq!(series.sleep_hours[6].value, 8.0);
        assert_eq!(series.sleep_hours.iter().map(|p| p.value).sum::<f64>(), 8.0);
    }

    #[test]
    fn test_empty_weekly_series_is_all_zero() {
        let window = week_ending(7);
        let buckets = DateBucketer::bucket(&[], &window);
        let series = Aggregator::default().weekly_series(&buckets);

        assert_eq!(series.calories.len(), 7);
        assert!(series.calories.iter().all(|p| p.value == 0.0));
        assert_eq!(series.calories[0].date, day(1));
        assert_eq!(series.calories[6].date, day(7));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let events = vec![workout(Some(2), 30.0), meal(Some(2), 1200.0), sleep(Some(6), 7.0)];
        let snapshot = events.clone();
        let window = week_ending(7);
        let aggregator = Aggregator::default();

        let first = aggregator.summarize(&events, &window);
        let second = aggregator.summarize(&events, &window);
        assert_eq!(first, second);

        let series_a = aggregator.weekly_series(&DateBucketer::bucket(&events, &window));
        let series_b = aggregator.weekly_series(&DateBucketer::bucket(&events, &window));
        assert_eq!(series_a, series_b);
        assert_eq!(events, snapshot);
    }

    #[test]
    fn test_avg_daily_calories_divides_by_window() {
        let events = vec![meal(Some(3), 1000.0), meal(Some(4), 400.0)];
        let aggregator = Aggregator::default();
        let summary = aggregator.summarize(&events, &week_ending(7));
        let end = NaiveDate::from_ymd_opt(2024, 1, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let week = ReportWindow::ending_at(end, 7).unwrap();
        assert_eq!(aggregator.avg_daily_calories(&summary, &week), 200.0);

        let fortnight = ReportWindow::ending_at(end, 14).unwrap();
        assert_eq!(aggregator.avg_daily_calories(&summary, &fortnight), 100.0);

        // The calorie fallback never leaks into the report average
        let empty = aggregator.summarize(&[], &week_ending(7));
        assert_eq!(aggregator.avg_daily_calories(&empty, &week), 0.0);
    }
}
