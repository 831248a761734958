//! Configuration
//!
//! Fallback constants and filtering semantics are injected into the aggregator
//! through [`AggregatorConfig`]. [`InsightConfig`] reads them, together with the
//! data directory, from `FITTRACK_*` environment variables.

use crate::bucketer::TimeWindow;
use crate::error::InsightError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Average sleep assumed when no sleep sessions are in scope
pub const DEFAULT_SLEEP_FALLBACK_HOURS: f64 = 7.0;

/// Calorie total assumed when no meals are in scope
pub const DEFAULT_CALORIE_FALLBACK: f64 = 2000.0;

/// Length of the recommendation and report windows in days
pub const WINDOW_DAYS: u32 = 7;

/// Which records contribute to totals and means
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsScope {
    /// Only dated records inside the window
    #[default]
    Window,
    /// Dated records inside the window plus records without a usable date
    WindowAndUndated,
    /// Every record regardless of its date
    AllHistory,
}

impl TotalsScope {
    /// Whether a record with this timestamp counts toward totals
    pub fn admits<W: TimeWindow + ?Sized>(&self, timestamp: Option<NaiveDateTime>, window: &W) -> bool {
        match (self, timestamp) {
            (TotalsScope::AllHistory, _) => true,
            (TotalsScope::WindowAndUndated, None) => true,
            (TotalsScope::Window, None) => false,
            (_, Some(ts)) => window.contains(ts),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TotalsScope::Window => "window",
            TotalsScope::WindowAndUndated => "window_and_undated",
            TotalsScope::AllHistory => "all_history",
        }
    }
}

impl FromStr for TotalsScope {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" => Ok(TotalsScope::Window),
            "window_and_undated" => Ok(TotalsScope::WindowAndUndated),
            "all_history" | "unfiltered" => Ok(TotalsScope::AllHistory),
            other => Err(InsightError::Config(format!(
                "unknown totals scope '{other}' (expected window, window_and_undated or all_history)"
            ))),
        }
    }
}

/// Constants the aggregator applies when computing summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub sleep_fallback_hours: f64,
    pub calorie_fallback: f64,
    pub totals_scope: TotalsScope,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sleep_fallback_hours: DEFAULT_SLEEP_FALLBACK_HOURS,
            calorie_fallback: DEFAULT_CALORIE_FALLBACK,
            totals_scope: TotalsScope::default(),
        }
    }
}

impl AggregatorConfig {
    /// Zero fallbacks: an empty history is judged on what was measured
    pub fn measured_only() -> Self {
        Self {
            sleep_fallback_hours: 0.0,
            calorie_fallback: 0.0,
            ..Self::default()
        }
    }

    pub fn with_totals_scope(mut self, scope: TotalsScope) -> Self {
        self.totals_scope = scope;
        self
    }
}

/// Runtime configuration for the library entry points and the CLI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightConfig {
    /// Root of a directory source (`<root>/<collection>/<user>.json`)
    pub data_dir: Option<PathBuf>,
    pub aggregator: AggregatorConfig,
}

impl InsightConfig {
    pub fn from_env() -> Result<Self, InsightError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read configuration through `get`, so tests never touch the process
    /// environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, InsightError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut aggregator = AggregatorConfig::default();

        if let Some(v) = get("FITTRACK_SLEEP_FALLBACK_HOURS") {
            aggregator.sleep_fallback_hours = parse_number("FITTRACK_SLEEP_FALLBACK_HOURS", &v)?;
        }
        if let Some(v) = get("FITTRACK_CALORIE_FALLBACK") {
            aggregator.calorie_fallback = parse_number("FITTRACK_CALORIE_FALLBACK", &v)?;
        }
        if let Some(v) = get("FITTRACK_TOTALS_SCOPE") {
            aggregator.totals_scope = v.parse()?;
        }

        let data_dir = get("FITTRACK_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            data_dir,
            aggregator,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, InsightError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| InsightError::Config(format!("{key} must be a non-negative number, got '{value}'")))
}
