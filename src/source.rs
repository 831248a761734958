//! History sources
//!
//! The data service that owns workouts, meals and sleep sessions sits behind the
//! [`HistorySource`] trait. A failed fetch is logged and replaced by an empty
//! collection, and the failure is recorded on the resulting [`RawHistory`].

use crate::error::InsightError;
use crate::schema::RawHistory;
use crate::types::EventKind;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for per-user collection fetchers
pub trait HistorySource {
    /// Fetch one collection for a user as untyped records
    fn fetch(&self, kind: EventKind, user_id: &str) -> Result<Vec<Value>, InsightError>;
}

/// Fetch all three collections, substituting empty collections for failures
pub fn load_history(source: &dyn HistorySource, user_id: &str) -> RawHistory {
    let mut history = RawHistory::default();

    for kind in EventKind::ALL {
        match source.fetch(kind, user_id) {
            Ok(records) => {
                tracing::debug!(user_id, collection = kind.collection_key(), records = records.len(), "fetched");
                history.set_collection(kind, records);
            }
            Err(e) => {
                tracing::warn!(user_id, collection = kind.collection_key(), error = %e, "fetch failed, using empty collection");
                history.mark_failed(kind);
            }
        }
    }

    history
}

/// Directory laid out like the data service's routes:
/// `<root>/<workout|meal|sleep>/<user_id>.json`, each file a JSON array
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, kind: EventKind, user_id: &str) -> PathBuf {
        self.root.join(kind.as_str()).join(format!("{user_id}.json"))
    }
}

impl HistorySource for DirectorySource {
    fn fetch(&self, kind: EventKind, user_id: &str) -> Result<Vec<Value>, InsightError> {
        let unavailable = |reason: String| InsightError::SourceUnavailable {
            collection: kind.collection_key().to_string(),
            user_id: user_id.to_string(),
            reason,
        };

        if user_id.is_empty() || !user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(unavailable("user id must be alphanumeric".to_string()));
        }

        let path = self.collection_path(kind, user_id);
        let contents = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("{}: {e}", path.display())))?;

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) => Err(unavailable(format!("{} is not a JSON array", path.display()))),
            Err(e) => Err(unavailable(format!("{}: {e}", path.display()))),
        }
    }
}

/// In-memory source serving one prepared history for any user
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    history: RawHistory,
}

impl StaticSource {
    pub fn new(history: RawHistory) -> Self {
        Self { history }
    }
}

impl HistorySource for StaticSource {
    fn fetch(&self, kind: EventKind, user_id: &str) -> Result<Vec<Value>, InsightError> {
        if self.history.failed_sources.contains(&kind) {
            return Err(InsightError::SourceUnavailable {
                collection: kind.collection_key().to_string(),
                user_id: user_id.to_string(),
                reason: "marked as failed".to_string(),
            });
        }
        Ok(self.history.collection(kind).to_vec())
    }
}
