use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::repository::Document;

/// A note as stored in the document collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Document fields for a freshly created note. Both timestamps are `now`.
    pub fn new_fields(title: String, detail: String, now: DateTime<Utc>) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title));
        fields.insert("detail".to_string(), Value::String(detail));
        fields.insert("created_at".to_string(), timestamp::to_value(now));
        fields.insert("updated_at".to_string(), timestamp::to_value(now));
        fields
    }
}

impl TryFrom<Document> for Note {
    type Error = serde_json::Error;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let mut data = document.data;
        data.insert("id".to_string(), Value::String(document.id));
        serde_json::from_value(Value::Object(data))
    }
}

/// Fixed-width RFC 3339 timestamps with microsecond precision and a `Z` suffix.
///
/// Every stored timestamp has the same width, so ordering the raw strings
/// orders them chronologically.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use serde_json::Value;

    pub fn format(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn to_value(at: DateTime<Utc>) -> Value {
        Value::String(format(at))
    }

    /// Current time, truncated to the stored precision.
    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    /// The timestamp for a write following one made at `previous`.
    ///
    /// Never returns a value at or before `previous`, even if the clock has
    /// not advanced past the stored precision.
    pub fn after(previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = now();
        if now > previous {
            now
        } else {
            previous + TimeDelta::microseconds(1)
        }
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_fixed_width_with_z_suffix() {
        let whole_second = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(timestamp::format(whole_second), "2026-01-02T03:04:05.000000Z");

        let later = whole_second + chrono::TimeDelta::microseconds(1234);
        assert_eq!(timestamp::format(later), "2026-01-02T03:04:05.001234Z");
        assert!(timestamp::format(whole_second) < timestamp::format(later));
    }

    #[test]
    fn test_after_strictly_increases() {
        let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        let next = timestamp::after(far_future);
        assert!(next > far_future);

        let past = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert!(timestamp::after(past) > past);
    }

    #[test]
    fn test_note_from_document() {
        let now = timestamp::now();
        let document = Document {
            id: "abc".to_string(),
            data: Note::new_fields("Title".to_string(), String::new(), now),
        };

        let note = Note::try_from(document).unwrap();
        assert_eq!(note.id, "abc");
        assert_eq!(note.title, "Title");
        assert_eq!(note.detail, "");
        assert_eq!(note.created_at, now);
        assert_eq!(note.updated_at, now);
    }

    #[test]
    fn test_note_from_document_missing_title() {
        let mut data = Note::new_fields("Title".to_string(), String::new(), timestamp::now());
        data.remove("title");

        let document = Document {
            id: "abc".to_string(),
            data,
        };
        assert!(Note::try_from(document).is_err());
    }
}
