//! Item-location records: a sequence store with an insertion timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query;
use crate::store::StoreStrategy;

/// Where an item was last put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Item name; required.
    pub name: String,
    /// Where it is; required.
    pub place: String,
    /// Free-form label, may be empty.
    pub tag: String,
    /// When the record was created.
    pub time: DateTime<Utc>,
}

/// Sequence store of item locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemStore;

impl StoreStrategy for ItemStore {
    type Record = ItemRecord;
    type Aggregate = Vec<ItemRecord>;

    fn template(&self) -> Self::Aggregate {
        Vec::new()
    }

    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<ItemRecord> {
        let mut record = ItemRecord {
            name: String::new(),
            place: String::new(),
            tag: String::new(),
            time: Utc::now(),
        };
        for (key, value) in fields {
            match key.as_str() {
                "name" => record.name = value.clone(),
                "place" => record.place = value.clone(),
                "tag" => record.tag = value.clone(),
                _ => {}
            }
        }
        if record.name.is_empty() || record.place.is_empty() {
            return None;
        }
        Some(record)
    }

    fn insert(&self, aggregate: &mut Self::Aggregate, record: ItemRecord) {
        aggregate.push(record);
    }

    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<ItemRecord> {
        aggregate.get(index).cloned()
    }

    fn matches(&self, record: &ItemRecord, key: &str, value: &str) -> bool {
        query::record_conforms(record, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    #[test]
    fn test_new_record_stamps_time() {
        let strategy = ItemStore;
        let before = Utc::now();
        let fields = parse_line("name passport, place 'desk drawer'").unwrap();
        let record = strategy.new_record(&fields).unwrap();
        assert_eq!(record.place, "desk drawer");
        assert!(record.time >= before);
    }

    #[test]
    fn test_new_record_requires_name_and_place() {
        let strategy = ItemStore;
        let fields = parse_line("name passport, tag travel").unwrap();
        assert!(strategy.new_record(&fields).is_none());
    }

    #[test]
    fn test_matcher_uses_shared_field_rules() {
        let strategy = ItemStore;
        let record = ItemRecord {
            name: "passport".into(),
            place: "drawer".into(),
            tag: String::new(),
            time: Utc::now(),
        };
        assert!(strategy.matches(&record, "name", "passport"));
        assert!(!strategy.matches(&record, "owner", "alice"));
    }
}
