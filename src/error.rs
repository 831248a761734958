//! Error types for FitTrack Insights
//!
//! The aggregation stages themselves are total; these errors only surface at the
//! I/O and configuration boundaries.

use thiserror::Error;

/// Errors that can occur while loading history or building outputs
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse history payload: {0}")]
    ParseError(String),

    #[error("Invalid date window: {0}")]
    InvalidWindow(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to fetch {collection} for user {user_id}: {reason}")]
    SourceUnavailable {
        collection: String,
        user_id: String,
        reason: String,
    },

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
