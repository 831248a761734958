//! History validation
//!
//! Reports records the normalizer will have to degrade: entries that are not
//! JSON objects and entries without a usable timestamp. Validation never rejects
//! a document; it only describes it.

use super::RawHistory;
use crate::normalizer::parse_timestamp;
use crate::types::EventKind;
use serde::Serialize;
use serde_json::Value;

/// Validation counts for one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub collection: EventKind,
    pub total_records: usize,
    pub non_object_records: usize,
    pub undated_records: usize,
    /// Indices of degraded records, in input order
    pub degraded_indices: Vec<usize>,
}

/// Validation result for a whole history document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub collections: Vec<CollectionReport>,
    pub failed_sources: Vec<EventKind>,
}

impl ValidationReport {
    /// True when every record is an object with a parsable timestamp
    pub fn is_clean(&self) -> bool {
        self.collections
            .iter()
            .all(|c| c.non_object_records == 0 && c.undated_records == 0)
    }

    pub fn degraded_records(&self) -> usize {
        self.collections
            .iter()
            .map(|c| c.degraded_indices.len())
            .sum()
    }
}

/// Validate every collection of a raw history
pub fn validate_history(history: &RawHistory) -> ValidationReport {
    let collections = EventKind::ALL
        .iter()
        .map(|&kind| validate_collection(history.collection(kind), kind))
        .collect();

    ValidationReport {
        collections,
        failed_sources: history.failed_sources.clone(),
    }
}

fn validate_collection(records: &[Value], kind: EventKind) -> CollectionReport {
    let mut report = CollectionReport {
        collection: kind,
        total_records: records.len(),
        non_object_records: 0,
        undated_records: 0,
        degraded_indices: Vec::new(),
    };

    for (index, record) in records.iter().enumerate() {
        if !record.is_object() {
            report.non_object_records += 1;
            report.degraded_indices.push(index);
            continue;
        }

        let dated = record
            .get(kind.timestamp_field())
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .is_some();
        if !dated {
            report.undated_records += 1;
            report.degraded_indices.push(index);
        }
    }

    report
}
