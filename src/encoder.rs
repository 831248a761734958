//! Response encoding
//!
//! This module encodes recommendations and reports into the JSON shapes expected
//! by the API caller and the report renderer. Values are kept at full precision
//! until here; report figures are rounded to two decimals on the way out.

use crate::error::InsightError;
use crate::report::DISPLAY_DATE_FORMAT;
use crate::types::{DailyValue, EventKind, Recommendation, WeeklyReport};
use serde::Serialize;

/// `{"recommendations": {...}}` response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationEnvelope {
    pub recommendations: RecommendationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    pub suggested_workout: &'static str,
    pub recommended_calories: u32,
    pub diet_tip: &'static str,
    pub sleep_advice: &'static str,
    pub weekly_workouts: Vec<WorkoutPoint>,
    pub weekly_calories: Vec<CaloriePoint>,
    pub weekly_sleep: Vec<SleepPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutPoint {
    pub day: String,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaloriePoint {
    pub day: String,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepPoint {
    pub day: String,
    pub hours: f64,
}

/// Template context handed to the report renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub report_id: String,
    pub user_email: String,
    pub subject: String,
    pub start_date: String,
    pub end_date: String,
    pub total_workouts: usize,
    pub total_meals: usize,
    pub avg_sleep_hours: Option<f64>,
    pub avg_daily_calories: f64,
    pub workouts: Vec<WorkoutRowPayload>,
    pub meals: Vec<MealRowPayload>,
    pub note: String,
    pub generated_on: String,
    pub incomplete_sources: Vec<EventKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRowPayload {
    pub date: String,
    #[serde(rename = "type")]
    pub workout_type: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealRowPayload {
    pub date: String,
    pub name: String,
    pub calories: f64,
}

/// Encoder for API and renderer payloads
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn encode_recommendation(rec: &Recommendation) -> RecommendationEnvelope {
        let points = |series: &[DailyValue]| -> Vec<(String, f64)> {
            series.iter().map(|p| (p.label.clone(), p.value)).collect()
        };

        RecommendationEnvelope {
            recommendations: RecommendationPayload {
                suggested_workout: rec.suggested_workout.as_str(),
                recommended_calories: rec.recommended_calories.kcal(),
                diet_tip: rec.diet_tip.as_str(),
                sleep_advice: rec.sleep_advice.as_str(),
                weekly_workouts: points(&rec.weekly.workout_minutes)
                    .into_iter()
                    .map(|(day, duration)| WorkoutPoint { day, duration })
                    .collect(),
                weekly_calories: points(&rec.weekly.calories)
                    .into_iter()
                    .map(|(day, calories)| CaloriePoint { day, calories })
                    .collect(),
                weekly_sleep: points(&rec.weekly.sleep_hours)
                    .into_iter()
                    .map(|(day, hours)| SleepPoint { day, hours })
                    .collect(),
            },
        }
    }

    pub fn recommendation_to_json(rec: &Recommendation) -> Result<String, InsightError> {
        serde_json::to_string(&Self::encode_recommendation(rec))
            .map_err(|e| InsightError::EncodingError(e.to_string()))
    }

    pub fn encode_report(report: &WeeklyReport) -> ReportPayload {
        ReportPayload {
            report_id: report.report_id.to_string(),
            user_email: report.recipient.clone(),
            subject: report.subject.clone(),
            start_date: report.window_start.format(DISPLAY_DATE_FORMAT).to_string(),
            end_date: report.window_end.format(DISPLAY_DATE_FORMAT).to_string(),
            total_workouts: report.stats.total_workouts,
            total_meals: report.stats.total_meals,
            avg_sleep_hours: report.stats.avg_sleep_hours.map(round2),
            avg_daily_calories: round2(report.stats.avg_daily_calories),
            workouts: report
                .workouts
                .iter()
                .map(|w| WorkoutRowPayload {
                    date: w.date.clone(),
                    workout_type: w.workout_type.clone(),
                    duration_minutes: w.duration_minutes,
                    calories_burned: w.calories_burned,
                })
                .collect(),
            meals: report
                .meals
                .iter()
                .map(|m| MealRowPayload {
                    date: m.date.clone(),
                    name: m.name.clone(),
                    calories: m.calories,
                })
                .collect(),
            note: report.note.clone(),
            generated_on: report.generated_on.format(DISPLAY_DATE_FORMAT).to_string(),
            incomplete_sources: report.incomplete_sources.clone(),
        }
    }

    pub fn report_to_json(report: &WeeklyReport, pretty: bool) -> Result<String, InsightError> {
        let payload = Self::encode_report(report);
        let encoded = if pretty {
            serde_json::to_string_pretty(&payload)
        } else {
            serde_json::to_string(&payload)
        };
        encoded.map_err(|e| InsightError::EncodingError(e.to_string()))
    }
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
