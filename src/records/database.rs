//! Database connection records: the keyed-store specialization.
//!
//! The aggregate maps a tag to its connection record. The first writer of a
//! tag wins, both at insert time and during reconciliation; the stepper
//! walks tags in sorted order, folding the tag back into the yielded entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MergeError;
use crate::merge;
use crate::store::StoreStrategy;

/// Connection details for one database, stored under its tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbRecord {
    /// Server dialect, e.g. `postgres`.
    pub dialect: String,
    /// Host name or address; required.
    pub host: String,
    /// Port, kept as entered.
    pub port: String,
    /// Login user; required.
    pub user: String,
    /// Login password, may be empty.
    pub password: String,
    /// Database name.
    pub database: String,
}

/// A tagged record as yielded by queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEntry {
    /// The tag the record is keyed under.
    pub tag: String,
    /// The connection record.
    pub info: DbRecord,
}

/// Keyed store of database connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbStore;

impl StoreStrategy for DbStore {
    type Record = DbEntry;
    type Aggregate = BTreeMap<String, DbRecord>;

    fn template(&self) -> Self::Aggregate {
        BTreeMap::new()
    }

    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<DbEntry> {
        let mut tag = String::new();
        let mut info = DbRecord::default();
        for (key, value) in fields {
            match key.as_str() {
                "tag" => tag = value.clone(),
                "dialect" => info.dialect = value.clone(),
                "host" => info.host = value.clone(),
                "port" => info.port = value.clone(),
                "user" => info.user = value.clone(),
                "password" => info.password = value.clone(),
                "database" => info.database = value.clone(),
                _ => {}
            }
        }
        if tag.is_empty() || info.host.is_empty() || info.user.is_empty() {
            return None;
        }
        Some(DbEntry { tag, info })
    }

    fn insert(&self, aggregate: &mut Self::Aggregate, record: DbEntry) {
        // First writer of a tag wins.
        aggregate.entry(record.tag).or_insert(record.info);
    }

    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<DbEntry> {
        aggregate.iter().nth(index).map(|(tag, info)| DbEntry {
            tag: tag.clone(),
            info: info.clone(),
        })
    }

    fn matches(&self, record: &DbEntry, key: &str, value: &str) -> bool {
        match key {
            "tag" => record.tag == value,
            "host" => record.info.host == value,
            "port" => record.info.port == value,
            _ => false,
        }
    }

    fn merge_aggregates(&self, a: &Value, b: &Value) -> Result<Value, MergeError> {
        merge::merge_first_wins(a, b)
    }
}
