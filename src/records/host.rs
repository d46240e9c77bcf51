//! SSH host records: a sequence store with a hand-written matcher.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::StoreStrategy;

/// One SSH target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Free-form label, may be empty.
    pub tag: String,
    /// Host name or address; required.
    pub host: String,
    /// Login user; required.
    pub user: String,
}

/// Sequence store of SSH targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostStore;

impl StoreStrategy for HostStore {
    type Record = HostRecord;
    type Aggregate = Vec<HostRecord>;

    fn template(&self) -> Self::Aggregate {
        Vec::new()
    }

    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<HostRecord> {
        let mut record = HostRecord {
            tag: String::new(),
            host: String::new(),
            user: String::new(),
        };
        for (key, value) in fields {
            match key.as_str() {
                "tag" => record.tag = value.clone(),
                "host" => record.host = value.clone(),
                "user" => record.user = value.clone(),
                _ => {}
            }
        }
        if record.host.is_empty() || record.user.is_empty() {
            return None;
        }
        Some(record)
    }

    fn insert(&self, aggregate: &mut Self::Aggregate, record: HostRecord) {
        aggregate.push(record);
    }

    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<HostRecord> {
        aggregate.get(index).cloned()
    }

    fn matches(&self, record: &HostRecord, key: &str, value: &str) -> bool {
        match key {
            "tag" => record.tag == value,
            "host" => record.host == value,
            "user" => record.user == value,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    #[test]
    fn test_new_record_requires_host_and_user() {
        let strategy = HostStore;

        let fields = parse_line("host example.com, user alice, tag work").unwrap();
        let record = strategy.new_record(&fields).unwrap();
        assert_eq!(record.host, "example.com");
        assert_eq!(record.user, "alice");
        assert_eq!(record.tag, "work");

        let fields = parse_line("host example.com, tag work").unwrap();
        assert!(strategy.new_record(&fields).is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let strategy = HostStore;
        let fields = parse_line("host h, user u, color green").unwrap();
        assert!(strategy.new_record(&fields).is_some());
    }

    #[test]
    fn test_matcher_rejects_unknown_key() {
        let strategy = HostStore;
        let record = HostRecord {
            tag: String::new(),
            host: "h".into(),
            user: "u".into(),
        };
        assert!(strategy.matches(&record, "host", "h"));
        assert!(!strategy.matches(&record, "port", "22"));
    }

    #[test]
    fn test_stepper_ends_past_length() {
        let strategy = HostStore;
        let aggregate = vec![HostRecord {
            tag: String::new(),
            host: "h".into(),
            user: "u".into(),
        }];
        assert!(strategy.record_at(&aggregate, 0).is_some());
        assert!(strategy.record_at(&aggregate, 1).is_none());
    }
}
