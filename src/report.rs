//! Weekly report data
//!
//! Builds the statistics and table rows consumed by the external report
//! renderer. Nothing here produces markup.

use crate::aggregator::Aggregator;
use crate::bucketer::ReportWindow;
use crate::config::{TotalsScope, WINDOW_DAYS};
use crate::error::InsightError;
use crate::types::{
    Event, MealRow, NormalizedHistory, ReportStats, WeeklyReport, WorkoutRow,
};
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Closing note printed at the bottom of every report
pub const REPORT_NOTE: &str = "Keep up the good work! Small consistent actions win.";

/// Layout of dates in report tables and headers
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parameters of a single report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub user_id: String,
    /// Address looked up by the caller; a placeholder is used when absent
    pub recipient: Option<String>,
    pub window: ReportWindow,
    pub generated_on: NaiveDateTime,
}

impl ReportRequest {
    /// Report over the week ending at `generated_on`
    pub fn weekly(user_id: impl Into<String>, generated_on: NaiveDateTime) -> Result<Self, InsightError> {
        Ok(Self {
            user_id: user_id.into(),
            recipient: None,
            window: ReportWindow::ending_at(generated_on, WINDOW_DAYS)?,
            generated_on,
        })
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }
}

/// Builder for weekly report data
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    aggregator: Aggregator,
}

impl ReportBuilder {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    /// Assemble report data for the requested window
    pub fn build(&self, history: &NormalizedHistory, request: &ReportRequest) -> WeeklyReport {
        // Records strictly outside the window never reach a report
        let scope = match self.aggregator.config().totals_scope {
            TotalsScope::AllHistory => TotalsScope::WindowAndUndated,
            scope => scope,
        };

        let in_scope: Vec<Event> = history
            .events
            .iter()
            .filter(|e| scope.admits(e.timestamp(), &request.window))
            .cloned()
            .collect();

        let summary = self
            .aggregator
            .summarize_in_scope(&in_scope, &request.window, scope);

        let stats = ReportStats {
            total_workouts: summary.total_workouts,
            total_meals: summary.total_meals,
            total_sleep_sessions: summary.total_sleep_sessions,
            avg_sleep_hours: summary.avg_sleep_hours.measured_value(),
            total_calories: summary.total_calories.measured_value().unwrap_or(0.0),
            avg_daily_calories: self.aggregator.avg_daily_calories(&summary, &request.window),
        };

        let mut workouts = Vec::new();
        let mut meals = Vec::new();
        for event in &in_scope {
            match event {
                Event::Workout(w) => workouts.push(WorkoutRow {
                    date: display_date(w.timestamp),
                    workout_type: w.workout_type.clone(),
                    duration_minutes: w.duration_minutes,
                    calories_burned: w.calories_burned,
                }),
                Event::Meal(m) => meals.push(MealRow {
                    date: display_date(m.timestamp),
                    name: m.name.clone(),
                    calories: m.calories,
                }),
                Event::Sleep(_) => {}
            }
        }

        let recipient = request
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_recipient(&request.user_id));

        if !history.failed_sources.is_empty() {
            tracing::warn!(
                user_id = %request.user_id,
                failed = ?history.failed_sources,
                "building report with incomplete sources"
            );
        }

        WeeklyReport {
            report_id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            recipient,
            subject: report_subject(&request.window),
            window_start: request.window.start,
            window_end: request.window.end,
            stats,
            workouts,
            meals,
            note: REPORT_NOTE.to_string(),
            generated_on: request.generated_on,
            incomplete_sources: history.failed_sources.clone(),
        }
    }
}

/// Placeholder address used when no e-mail is known for the user
pub fn default_recipient(user_id: &str) -> String {
    format!("user+{user_id}@example.com")
}

pub fn report_subject(window: &ReportWindow) -> String {
    format!(
        "Your Weekly FitTrackAI Report — {} → {}",
        window.start.date(),
        window.end.date()
    )
}

fn display_date(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .map(|ts| ts.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregatorConfig;
    use crate::types::{EventKind, Meal, SleepSession, Workout};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn request() -> ReportRequest {
        ReportRequest::weekly("123", at(8, 6)).unwrap()
    }

    fn history() -> NormalizedHistory {
        NormalizedHistory {
            events: vec![
                Event::Workout(Workout {
                    id: Some(1),
                    timestamp: Some(at(3, 7)),
                    workout_type: "Cycling".to_string(),
                    duration_minutes: 60.0,
                    calories_burned: 550.0,
                }),
                Event::Workout(Workout {
                    timestamp: Some(at(1, 5)),
                    workout_type: "Too early".to_string(),
                    ..Default::default()
                }),
                Event::Meal(Meal {
                    timestamp: Some(at(2, 12)),
                    name: "Lunch".to_string(),
                    calories: 900.0,
                    ..Default::default()
                }),
                Event::Meal(Meal {
                    timestamp: Some(at(5, 19)),
                    name: "Dinner".to_string(),
                    calories: 500.0,
                    ..Default::default()
                }),
                Event::Meal(Meal {
                    timestamp: None,
                    name: "Undated".to_string(),
                    calories: 350.0,
                    ..Default::default()
                }),
                Event::Sleep(SleepSession {
                    start: Some(at(4, 23)),
                    duration_hours: 6.5,
                    ..Default::default()
                }),
            ],
            failed_sources: vec![],
        }
    }

    #[test]
    fn test_report_stats_and_rows() {
        let report = ReportBuilder::default().build(&history(), &request());

        assert_eq!(
            report.stats,
            ReportStats {
                total_workouts: 1,
                total_meals: 2,
                total_sleep_sessions: 1,
                avg_sleep_hours: Some(6.5),
                total_calories: 1400.0,
                avg_daily_calories: 200.0,
            }
        );
        assert_eq!(
            report.workouts,
            vec![WorkoutRow {
                date: "2024-01-03 07:00".to_string(),
                workout_type: "Cycling".to_string(),
                duration_minutes: 60.0,
                calories_burned: 550.0,
            }]
        );
        let meal_names: Vec<&str> = report.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(meal_names, vec!["Lunch", "Dinner"]);
    }

    #[test]
    fn test_daily_average_follows_request_window() {
        let weekly = ReportBuilder::default().build(&history(), &request());
        assert_eq!(weekly.stats.avg_daily_calories, 200.0);

        let fortnight = ReportRequest {
            window: ReportWindow::ending_at(at(8, 6), 14).unwrap(),
            ..request()
        };
        let report = ReportBuilder::default().build(&history(), &fortnight);
        assert_eq!(report.stats.total_calories, 1400.0);
        assert_eq!(report.stats.avg_daily_calories, 100.0);
    }

    #[test]
    fn test_report_envelope() {
        let report = ReportBuilder::default().build(&history(), &request());

        assert_eq!(report.user_id, "123");
        assert_eq!(report.recipient, "user+123@example.com");
        assert_eq!(report.subject, "Your Weekly FitTrackAI Report — 2024-01-01 → 2024-01-08");
        assert_eq!(report.window_start, at(1, 6));
        assert_eq!(report.window_end, at(8, 6));
        assert_eq!(report.note, REPORT_NOTE);
        assert!(report.incomplete_sources.is_empty());

        let named = ReportBuilder::default()
            .build(&history(), &request().with_recipient("  ana@example.org "));
        assert_eq!(named.recipient, "ana@example.org");
    }

    #[test]
    fn test_undated_records_follow_scope() {
        let config = AggregatorConfig::default().with_totals_scope(TotalsScope::AllHistory);
        let builder = ReportBuilder::new(Aggregator::new(config));
        let report = builder.build(&history(), &request());

        // Undated meal counts, the workout before the window still does not
        assert_eq!(report.stats.total_meals, 3);
        assert_eq!(report.stats.total_workouts, 1);
        assert_eq!(report.meals[2].date, "");
        assert_eq!(report.stats.total_calories, 1750.0);
    }

    #[test]
    fn test_empty_history_report() {
        let mut empty = NormalizedHistory::default();
        empty.failed_sources = vec![EventKind::Meal];
        let report = ReportBuilder::default().build(&empty, &request());

        assert!(report.workouts.is_empty());
        assert!(report.meals.is_empty());
        assert_eq!(report.stats.avg_sleep_hours, None);
        assert_eq!(report.stats.total_calories, 0.0);
        assert_eq!(report.stats.avg_daily_calories, 0.0);
        assert_eq!(report.incomplete_sources, vec![EventKind::Meal]);
    }
}
