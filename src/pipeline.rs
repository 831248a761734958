//! Pipeline orchestration
//!
//! This module provides the public API for FitTrack Insights.
//! It runs raw history through normalization, bucketing and aggregation, then
//! hands the statistics to the rule engine or the report builder.

use crate::aggregator::Aggregator;
use crate::bucketer::{DateBucketer, DayWindow};
use crate::config::{AggregatorConfig, WINDOW_DAYS};
use crate::encoder::ResponseEncoder;
use crate::error::InsightError;
use crate::normalizer::Normalizer;
use crate::recommender::RuleEngine;
use crate::report::{ReportBuilder, ReportRequest};
use crate::schema::RawHistory;
use crate::source::{load_history, HistorySource};
use crate::types::{NormalizedHistory, Recommendation, WeeklyReport};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};

/// Convert a raw history JSON document to a recommendation response.
///
/// # Arguments
/// * `raw_json` - `{"workouts": [...], "meals": [...], "sleeps": [...]}`
/// * `today` - Last day of the trailing week
///
/// # Returns
/// The `{"recommendations": {...}}` JSON body
///
/// # Example
/// ```ignore
/// let body = recommend_from_json(history_json, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap())?;
/// ```
pub fn recommend_from_json(raw_json: &str, today: NaiveDate) -> Result<String, InsightError> {
    let raw = RawHistory::from_json(raw_json)?;
    let recommendation = InsightEngine::default().recommend(&raw, today)?;
    ResponseEncoder::recommendation_to_json(&recommendation)
}

/// Stateless engine holding the aggregation constants.
///
/// Every call works on its own input snapshot; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    aggregator: Aggregator,
}

impl InsightEngine {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            aggregator: Aggregator::new(config),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        self.aggregator.config()
    }

    /// Recommendation over the trailing window ending at `today`.
    ///
    /// Pipeline stages:
    /// 1. Normalizer - Typed events with defaulted fields
    /// 2. DateBucketer - One bucket per day of the window
    /// 3. Aggregator - Summary and weekly series
    /// 4. RuleEngine - Threshold rules
    pub fn recommend(&self, raw: &RawHistory, today: NaiveDate) -> Result<Recommendation, InsightError> {
        let history = Normalizer::normalize(raw);
        self.recommend_normalized(&history, today)
    }

    pub fn recommend_normalized(
        &self,
        history: &NormalizedHistory,
        today: NaiveDate,
    ) -> Result<Recommendation, InsightError> {
        let window = DayWindow::trailing(today, WINDOW_DAYS)?;
        let buckets = DateBucketer::bucket(&history.events, &window);

        let summary = self.aggregator.summarize(&history.events, &window);
        let weekly = self.aggregator.weekly_series(&buckets);

        let recommendation = RuleEngine::recommend(&summary, weekly);
        tracing::debug!(
            today = %today,
            suggested_workout = recommendation.suggested_workout.as_str(),
            sleep_fallback = summary.avg_sleep_hours.is_fallback,
            calorie_fallback = summary.total_calories.is_fallback,
            "computed recommendation"
        );
        Ok(recommendation)
    }

    /// Recommendation for today on the server's local clock
    pub fn recommend_now(&self, raw: &RawHistory) -> Result<Recommendation, InsightError> {
        self.recommend(raw, Local::now().date_naive())
    }

    /// Report data for the request's window
    pub fn weekly_report(&self, raw: &RawHistory, request: &ReportRequest) -> WeeklyReport {
        let history = Normalizer::normalize(raw);
        ReportBuilder::new(self.aggregator.clone()).build(&history, request)
    }

    /// Fetch a user's history and build a recommendation
    pub fn recommend_for_user(
        &self,
        source: &dyn HistorySource,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Recommendation, InsightError> {
        let raw = load_history(source, user_id);
        self.recommend(&raw, today)
    }

    /// Fetch a user's history and build the report for the week ending at `end`
    pub fn report_for_user(
        &self,
        source: &dyn HistorySource,
        user_id: &str,
        recipient: Option<String>,
        end: NaiveDateTime,
    ) -> Result<WeeklyReport, InsightError> {
        let raw = load_history(source, user_id);
        let mut request = ReportRequest::weekly(user_id, end)?;
        request.recipient = recipient;
        Ok(self.weekly_report(&raw, &request))
    }

    /// Report for the week ending now (UTC)
    pub fn report_for_user_now(
        &self,
        source: &dyn HistorySource,
        user_id: &str,
        recipient: Option<String>,
    ) -> Result<WeeklyReport, InsightError> {
        self.report_for_user(source, user_id, recipient, Utc::now().naive_utc())
    }
}
