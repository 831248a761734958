//! FitTrack Insights - Weekly aggregation and recommendations for logged health events
//!
//! Insights turns a user's workouts, meals and sleep sessions into rule-based
//! recommendations and weekly report data through a deterministic pipeline:
//! record normalization → date bucketing → aggregation → rules or report data
//! → encoding.
//!
//! ## Modules
//!
//! - **Recommendations**: trailing 7-day summary mapped to fixed threshold rules
//! - **Weekly report**: statistics and table rows for an external renderer

pub mod aggregator;
pub mod bucketer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod recommender;
pub mod report;
pub mod schema;
pub mod source;
pub mod types;

pub use config::{AggregatorConfig, InsightConfig, TotalsScope};
pub use error::InsightError;
pub use pipeline::{recommend_from_json, InsightEngine};
pub use report::ReportRequest;
pub use source::{load_history, DirectorySource, HistorySource, StaticSource};

// Schema exports
pub use schema::{validate_history, RawHistory, ValidationReport};

/// Crate version reported by the CLI
pub const INSIGHTS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "fittrack-insights";
