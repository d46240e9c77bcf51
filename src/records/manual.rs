//! Manual-page records: a sequence store on the shared field matcher.
//!
//! The `opts` value is itself list-like: the parser rejoins value words with
//! commas, and this strategy splits them back into the option list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::query;
use crate::store::StoreStrategy;

/// One remembered command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRecord {
    /// Executable name; required.
    pub exec: String,
    /// Options worth remembering; at least one required.
    pub opts: Vec<String>,
}

/// Sequence store of manual entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualStore;

impl StoreStrategy for ManualStore {
    type Record = ManualRecord;
    type Aggregate = Vec<ManualRecord>;

    fn template(&self) -> Self::Aggregate {
        Vec::new()
    }

    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<ManualRecord> {
        let mut record = ManualRecord {
            exec: String::new(),
            opts: Vec::new(),
        };
        for (key, value) in fields {
            match key.as_str() {
                "exec" => record.exec = value.clone(),
                "opts" => record.opts.extend(value.split(',').map(str::to_string)),
                _ => {}
            }
        }
        if record.exec.is_empty() || record.opts.is_empty() {
            return None;
        }
        Some(record)
    }

    fn insert(&self, aggregate: &mut Self::Aggregate, record: ManualRecord) {
        aggregate.push(record);
    }

    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<ManualRecord> {
        aggregate.get(index).cloned()
    }

    fn matches(&self, record: &ManualRecord, key: &str, value: &str) -> bool {
        query::record_conforms(record, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    #[test]
    fn test_multi_word_opts_become_a_list() {
        let strategy = ManualStore;
        let fields = parse_line("exec tar, opts -x -z -f").unwrap();
        let record = strategy.new_record(&fields).unwrap();
        assert_eq!(record.exec, "tar");
        assert_eq!(record.opts, vec!["-x", "-z", "-f"]);
    }

    #[test]
    fn test_new_record_requires_exec_and_opts() {
        let strategy = ManualStore;
        let fields = parse_line("exec tar, comment handy").unwrap();
        assert!(strategy.new_record(&fields).is_none());
    }

    #[test]
    fn test_matcher_tests_opts_membership() {
        let strategy = ManualStore;
        let record = ManualRecord {
            exec: "tar".into(),
            opts: vec!["-x".into(), "-z".into()],
        };
        assert!(strategy.matches(&record, "exec", "tar"));
        assert!(strategy.matches(&record, "opts", "-z"));
        assert!(!strategy.matches(&record, "opts", "-v"));
        assert!(!strategy.matches(&record, "flags", "-z"));
    }
}
