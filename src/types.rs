//! Core types for the FitTrack Insights pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized events, day buckets, aggregate summaries, recommendations
//! and report data.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event variant, also used to name the upstream collection it was fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Workout,
    Meal,
    Sleep,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Workout, EventKind::Meal, EventKind::Sleep];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Workout => "workout",
            EventKind::Meal => "meal",
            EventKind::Sleep => "sleep",
        }
    }

    /// Key of the collection in a history document (`workouts`, `meals`, `sleeps`)
    pub fn collection_key(&self) -> &'static str {
        match self {
            EventKind::Workout => "workouts",
            EventKind::Meal => "meals",
            EventKind::Sleep => "sleeps",
        }
    }

    /// Field holding the event timestamp in upstream records
    pub fn timestamp_field(&self) -> &'static str {
        match self {
            EventKind::Workout | EventKind::Meal => "date",
            EventKind::Sleep => "sleepStart",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection_key())
    }
}

/// A logged workout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Option<i64>,
    /// Wall-clock time as written upstream; `None` when absent or unparsable
    pub timestamp: Option<NaiveDateTime>,
    pub workout_type: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

/// A logged meal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Option<i64>,
    pub timestamp: Option<NaiveDateTime>,
    pub name: String,
    pub calories: f64,
}

/// A logged sleep session, keyed by when it started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: Option<i64>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub duration_hours: f64,
}

/// A single normalized health event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Event {
    Workout(Workout),
    Meal(Meal),
    Sleep(SleepSession),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Workout(_) => EventKind::Workout,
            Event::Meal(_) => EventKind::Meal,
            Event::Sleep(_) => EventKind::Sleep,
        }
    }

    /// Timestamp used for bucketing (`sleepStart` for sleep sessions)
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Event::Workout(w) => w.timestamp,
            Event::Meal(m) => m.timestamp,
            Event::Sleep(s) => s.start,
        }
    }

    /// Calendar date of the event; time of day and offsets are ignored
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date())
    }
}

/// All events of one user after normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHistory {
    pub events: Vec<Event>,
    /// Collections whose fetch failed and were replaced by empty collections
    pub failed_sources: Vec<EventKind>,
}

impl NormalizedHistory {
    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.events.iter().filter_map(|e| match e {
            Event::Workout(w) => Some(w),
            _ => None,
        })
    }

    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        self.events.iter().filter_map(|e| match e {
            Event::Meal(m) => Some(m),
            _ => None,
        })
    }

    pub fn sleeps(&self) -> impl Iterator<Item = &SleepSession> {
        self.events.iter().filter_map(|e| match e {
            Event::Sleep(s) => Some(s),
            _ => None,
        })
    }
}

/// Events attributed to one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a Event>,
}

/// A statistic that may have been substituted by a configured fallback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: f64,
    /// True when no records were available and `value` is the fallback
    pub is_fallback: bool,
}

impl Metric {
    pub fn measured(value: f64) -> Self {
        Self {
            value,
            is_fallback: false,
        }
    }

    pub fn fallback(value: f64) -> Self {
        Self {
            value,
            is_fallback: true,
        }
    }

    /// The value only if it was computed from records
    pub fn measured_value(&self) -> Option<f64> {
        (!self.is_fallback).then_some(self.value)
    }
}

/// Scalar statistics over an event window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_workouts: usize,
    pub total_meals: usize,
    pub total_sleep_sessions: usize,
    pub total_workout_minutes: f64,
    pub total_calories_burned: f64,
    pub total_sleep_hours: f64,
    /// Mean sleep duration, or the sleep fallback when there are no sessions
    pub avg_sleep_hours: Metric,
    /// Meal calorie sum, or the calorie fallback when there are no meals
    pub total_calories: Metric,
}

/// One day of a weekly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    /// Short weekday name (`Mon`, `Tue`, ...)
    pub label: String,
    pub value: f64,
}

/// Per-day breakdown across the window, oldest day first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub workout_minutes: Vec<DailyValue>,
    pub calories: Vec<DailyValue>,
    pub sleep_hours: Vec<DailyValue>,
}

/// Suggested workout category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestedWorkout {
    #[serde(rename = "Cardio")]
    Cardio,
    #[serde(rename = "Light Yoga")]
    LightYoga,
}

impl SuggestedWorkout {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedWorkout::Cardio => "Cardio",
            SuggestedWorkout::LightYoga => "Light Yoga",
        }
    }
}

/// Recommended daily calorie intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalorieTarget {
    Standard,
    Active,
}

impl CalorieTarget {
    pub fn kcal(&self) -> u32 {
        match self {
            CalorieTarget::Standard => 1800,
            CalorieTarget::Active => 2200,
        }
    }
}

/// Diet tip derived from calorie intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietTip {
    #[serde(rename = "Increase protein intake")]
    IncreaseProtein,
    #[serde(rename = "Maintain current diet")]
    MaintainDiet,
}

impl DietTip {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietTip::IncreaseProtein => "Increase protein intake",
            DietTip::MaintainDiet => "Maintain current diet",
        }
    }
}

/// Sleep advice derived from average sleep duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepAdvice {
    #[serde(rename = "Great job!")]
    GreatJob,
    #[serde(rename = "Try to sleep at least 7 hours daily")]
    SleepMore,
}

impl SleepAdvice {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepAdvice::GreatJob => "Great job!",
            SleepAdvice::SleepMore => "Try to sleep at least 7 hours daily",
        }
    }
}

/// Rule-based recommendation for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub suggested_workout: SuggestedWorkout,
    pub recommended_calories: CalorieTarget,
    pub diet_tip: DietTip,
    pub sleep_advice: SleepAdvice,
    pub weekly: WeeklySeries,
}

/// Summary scalars shown at the top of the weekly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub total_workouts: usize,
    pub total_meals: usize,
    pub total_sleep_sessions: usize,
    /// `None` when no sleep was logged in the window
    pub avg_sleep_hours: Option<f64>,
    pub total_calories: f64,
    /// Total calories over the window length, regardless of logged days
    pub avg_daily_calories: f64,
}

/// Workout table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRow {
    /// `YYYY-MM-DD HH:MM`, empty when the record carried no usable date
    pub date: String,
    pub workout_type: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

/// Meal table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRow {
    pub date: String,
    pub name: String,
    pub calories: f64,
}

/// Everything the external renderer needs for one weekly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub report_id: Uuid,
    pub user_id: String,
    pub recipient: String,
    pub subject: String,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub stats: ReportStats,
    pub workouts: Vec<WorkoutRow>,
    pub meals: Vec<MealRow>,
    pub note: String,
    pub generated_on: NaiveDateTime,
    /// Collections that could not be fetched; their rows are missing, not empty
    pub incomplete_sources: Vec<EventKind>,
}
