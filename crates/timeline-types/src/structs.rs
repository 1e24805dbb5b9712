//! Records held in the state tree that are not backend payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EventType;
use crate::ids::GroupId;

/// The timeline event the user has selected for the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRecord {
    /// Backend primary key.
    pub id: u64,
    /// Event headline.
    pub name: String,
    /// First day of the event, if known.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the event for events spanning a period.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// One-paragraph summary.
    #[serde(default)]
    pub description_short: String,
    /// Classification used by the event-type filter.
    #[serde(default)]
    pub event_type: Option<EventType>,
    /// Groups the event is tagged with.
    #[serde(default)]
    pub groups: Vec<GroupId>,
}

/// Observable outcome of the most recent load of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LoadStatus {
    /// No load issued for the current slug.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last response was committed.
    Ready,
    /// The last request failed; the message says why.
    Failed(String),
}

impl LoadStatus {
    /// Whether a request is still in flight.
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the last load failed.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_record_decodes_with_optional_fields_missing() {
        let json = r#"{"id": 17, "name": "Page Act"}"#;
        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 17);
        assert_eq!(record.start_date, None);
        assert!(record.groups.is_empty());
    }

    #[test]
    fn event_record_decodes_dates() {
        let json = r#"{
            "id": 3,
            "name": "Chinese Exclusion Act",
            "start_date": "1882-05-06",
            "event_type": "legislation",
            "groups": ["chinese"]
        }"#;
        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(1882, 5, 6));
        assert_eq!(record.event_type, Some(EventType::Legislation));
    }

    #[test]
    fn load_status_serializes_tagged() {
        let json = serde_json::to_value(LoadStatus::Failed(String::from("timeout"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "failed", "detail": "timeout"})
        );
        assert!(LoadStatus::Pending.is_pending());
        assert!(!LoadStatus::Ready.is_failed());
    }
}
