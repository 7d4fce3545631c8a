use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::model::ids::CardId;
use crate::time::{format_date, parse_date};

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// Scheduling state stored for one card.
///
/// Serialized as `{ "dueDate": "YYYY-MM-DD" }`. Extra fields written by other
/// tools are ignored on read, and a `dueDate` that is not a valid date reads
/// as "no due date" rather than failing the whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(
        rename = "dueDate",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_date",
        deserialize_with = "deserialize_lenient_date"
    )]
    pub due_date: Option<NaiveDate>,
}

impl ProgressEntry {
    #[must_use]
    pub fn due_on(date: NaiveDate) -> Self {
        Self {
            due_date: Some(date),
        }
    }
}

#[allow(clippy::ref_option)]
fn serialize_date<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.serialize_str(&format_date(*date)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawDate>::deserialize(deserializer)? {
        Some(RawDate::Text(raw)) => parse_date(&raw).ok(),
        Some(RawDate::Other(_)) | None => None,
    })
}

//
// ─── MAP ───────────────────────────────────────────────────────────────────────
//

/// Mapping from card identifier to its scheduling state.
///
/// Holds at most one entry per id. A missing entry means the card has never
/// been reviewed. An entry that is not an object (`null`, a bare string)
/// reads as an entry with no due date; only a document that is not an object
/// at the top level fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProgressMap {
    entries: BTreeMap<CardId, ProgressEntry>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&ProgressEntry> {
        self.entries.get(id)
    }

    /// The stored due date for `id`, if the card has one.
    #[must_use]
    pub fn due_date(&self, id: &CardId) -> Option<NaiveDate> {
        self.entries.get(id).and_then(|entry| entry.due_date)
    }

    /// Stores `date` as the due date for `id`, creating the entry when missing.
    pub fn set_due_date(&mut self, id: &CardId, date: NaiveDate) {
        self.entries.entry(id.clone()).or_default().due_date = Some(date);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(CardId, ProgressEntry)> for ProgressMap {
    fn from_iter<T: IntoIterator<Item = (CardId, ProgressEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for ProgressMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawEntry {
            Entry(ProgressEntry),
            Other(serde::de::IgnoredAny),
        }

        let raw = BTreeMap::<CardId, RawEntry>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(id, entry)| match entry {
                RawEntry::Entry(entry) => (id, entry),
                RawEntry::Other(_) => (id, ProgressEntry::default()),
            })
            .collect())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn set_due_date_creates_missing_entry() {
        let mut map = ProgressMap::new();
        let id = CardId::from(9);
        assert!(map.get(&id).is_none());

        map.set_due_date(&id, day(2024, 1, 5));
        map.set_due_date(&id, day(2024, 1, 8));

        assert_eq!(map.len(), 1);
        assert_eq!(map.due_date(&id), Some(day(2024, 1, 8)));
    }

    #[test]
    fn serializes_to_due_date_objects() {
        let mut map = ProgressMap::new();
        map.set_due_date(&CardId::from(2), day(2024, 1, 5));

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2":{"dueDate":"2024-01-05"}}"#);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"1":{"dueDate":"2024-02-10","ease":2.5,"seen":true}}"#;
        let map: ProgressMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.due_date(&CardId::from(1)), Some(day(2024, 2, 10)));
    }

    #[test]
    fn invalid_due_date_degrades_to_absent() {
        let json = r#"{"1":{"dueDate":"soon"},"2":{"dueDate":17},"3":{},"4":{"dueDate":null},"5":{"dueDate":"2024-01-01"}}"#;
        let map: ProgressMap = serde_json::from_str(json).unwrap();

        assert_eq!(map.len(), 5);
        for id in 1..=4_u64 {
            assert_eq!(map.due_date(&CardId::from(id)), None);
        }
        assert_eq!(map.due_date(&CardId::from(5)), Some(day(2024, 1, 1)));
    }

    #[test]
    fn non_object_entries_keep_their_neighbours() {
        let json = r#"{"1":null,"2":{"dueDate":"2024-01-01"},"3":"2023-12-20","4":[1]}"#;
        let map: ProgressMap = serde_json::from_str(json).unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(map.due_date(&CardId::from(1)), None);
        assert_eq!(map.due_date(&CardId::from(2)), Some(day(2024, 1, 1)));
        assert_eq!(map.due_date(&CardId::from(3)), None);
        assert_eq!(map.due_date(&CardId::from(4)), None);
    }

    #[test]
    fn non_object_document_is_rejected() {
        for raw in ["null", "[1,2]", "\"2024-01-01\"", "7"] {
            assert!(serde_json::from_str::<ProgressMap>(raw).is_err(), "raw: {raw}");
        }
    }
}
