//! Record normalization
//!
//! This module turns loosely-typed upstream records into validated events.
//! - Missing or non-numeric numeric fields default to 0
//! - Missing text fields default to an empty string
//! - Unparsable timestamps become `None`; the record itself is kept

use crate::schema::RawHistory;
use crate::types::{Event, EventKind, Meal, NormalizedHistory, SleepSession, Workout};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Naive timestamp layouts accepted after RFC 3339 has been tried
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalizer for converting raw records to typed events
pub struct Normalizer;

impl Normalizer {
    /// Normalize every collection of a raw history
    pub fn normalize(raw: &RawHistory) -> NormalizedHistory {
        let mut events = Vec::with_capacity(raw.total_records());
        for kind in EventKind::ALL {
            events.extend(Self::normalize_collection(raw.collection(kind), kind));
        }

        NormalizedHistory {
            events,
            failed_sources: raw.failed_sources.clone(),
        }
    }

    /// Normalize one collection; never fails and never drops records
    pub fn normalize_collection(records: &[Value], kind: EventKind) -> Vec<Event> {
        let events: Vec<Event> = records
            .iter()
            .map(|record| Self::normalize_record(record, kind))
            .collect();

        let undated = events.iter().filter(|e| e.timestamp().is_none()).count();
        if undated > 0 {
            tracing::debug!(
                collection = kind.collection_key(),
                undated,
                total = events.len(),
                "records without a usable timestamp are excluded from day buckets"
            );
        }

        events
    }

    /// Normalize a single record of the given variant
    pub fn normalize_record(record: &Value, kind: EventKind) -> Event {
        match kind {
            EventKind::Workout => Event::Workout(Workout {
                id: id_field(record),
                timestamp: timestamp_field(record, "date"),
                workout_type: text_field(record, "type"),
                duration_minutes: number_field(record, "durationMinutes"),
                calories_burned: number_field(record, "caloriesBurned"),
            }),
            EventKind::Meal => Event::Meal(Meal {
                id: id_field(record),
                timestamp: timestamp_field(record, "date"),
                name: text_field(record, "name"),
                calories: number_field(record, "calories"),
            }),
            EventKind::Sleep => Event::Sleep(SleepSession {
                id: id_field(record),
                start: timestamp_field(record, "sleepStart"),
                end: timestamp_field(record, "sleepEnd"),
                duration_hours: number_field(record, "durationHours"),
            }),
        }
    }
}

/// Parse an upstream timestamp into wall-clock time.
///
/// Offsets are dropped rather than converted, so the calendar date is the one
/// written in the record. Events logged near midnight in another offset than
/// the server's can therefore land on a neighbouring day.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn timestamp_field(record: &Value, key: &str) -> Option<NaiveDateTime> {
    record.get(key).and_then(Value::as_str).and_then(parse_timestamp)
}

/// Numeric field with 0 as the default; numeric strings are accepted
fn number_field(record: &Value, key: &str) -> f64 {
    let value = match record.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn text_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn id_field(record: &Value) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_normalize_complete_workout() {
        let record = json!({
            "id": 4,
            "date": "2024-01-15T07:30:00Z",
            "type": "Running",
            "durationMinutes": 45,
            "caloriesBurned": 410
        });

        let event = Normalizer::normalize_record(&record, EventKind::Workout);
        let Event::Workout(workout) = event else {
            panic!("expected a workout");
        };
        assert_eq!(workout.id, Some(4));
        assert_eq!(workout.timestamp, Some(at(2024, 1, 15, 7, 30)));
        assert_eq!(workout.workout_type, "Running");
        assert_eq!(workout.duration_minutes, 45.0);
        assert_eq!(workout.calories_burned, 410.0);
    }

    #[test]
    fn test_missing_fields_default() {
        let event = Normalizer::normalize_record(&json!({}), EventKind::Meal);
        assert_eq!(event, Event::Meal(Meal::default()));

        let event = Normalizer::normalize_record(&json!("garbage"), EventKind::Sleep);
        assert_eq!(event, Event::Sleep(SleepSession::default()));
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let record = json!({"calories": "lots", "date": "2024-01-15"});
        let Event::Meal(meal) = Normalizer::normalize_record(&record, EventKind::Meal) else {
            panic!("expected a meal");
        };
        assert_eq!(meal.calories, 0.0);

        let record = json!({"calories": " 650 "});
        let Event::Meal(meal) = Normalizer::normalize_record(&record, EventKind::Meal) else {
            panic!("expected a meal");
        };
        assert_eq!(meal.calories, 650.0);
    }

    #[test]
    fn test_sleep_uses_sleep_start() {
        let record = json!({
            "sleepStart": "2024-01-01T23:00:00",
            "sleepEnd": "2024-01-02T07:00:00",
            "durationHours": 8
        });
        let event = Normalizer::normalize_record(&record, EventKind::Sleep);
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_unparsable_date_keeps_record() {
        let records = vec![
            json!({"date": "yesterday", "calories": 300}),
            json!({"date": null, "calories": 200}),
            json!({"date": "2024-01-15", "calories": 100}),
        ];
        let events = Normalizer::normalize_collection(&records, EventKind::Meal);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].timestamp(), None);
        assert_eq!(events[1].timestamp(), None);
        assert!(events[2].timestamp().is_some());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(
            parse_timestamp("2024-01-15T07:30:00.1234567"),
            Some(at(2024, 1, 15, 7, 30) + chrono::Duration::nanoseconds(123_456_700))
        );
        assert_eq!(parse_timestamp("2024-01-15 07:30:00"), Some(at(2024, 1, 15, 7, 30)));
        assert_eq!(parse_timestamp("2024-01-15T07:30"), Some(at(2024, 1, 15, 7, 30)));
        assert_eq!(parse_timestamp("2024-01-15"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(parse_timestamp("15/01/2024"), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn test_offset_is_ignored_for_calendar_date() {
        // 23:30 at +05:00 stays on the 15th even though it is the 15th 18:30 UTC
        let ts = parse_timestamp("2024-01-15T23:30:00+05:00").unwrap();
        assert_eq!(ts, at(2024, 1, 15, 23, 30));

        let ts = parse_timestamp("2024-01-15T23:30:00-08:00").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_normalize_history_keeps_failed_sources() {
        let mut raw = RawHistory::from_json(
            r#"{"workouts": [{"date": "2024-01-15"}], "meals": [{}, {}]}"#,
        )
        .unwrap();
        raw.mark_failed(EventKind::Sleep);

        let history = Normalizer::normalize(&raw);
        assert_eq!(history.workouts().count(), 1);
        assert_eq!(history.meals().count(), 2);
        assert_eq!(history.sleeps().count(), 0);
        assert_eq!(history.failed_sources, vec![EventKind::Sleep]);
    }
}
