//! Command-sequence records: named lists of shell steps.
//!
//! Like the manual store, the list-like `seq` value arrives comma-rejoined
//! from the parser and is split back into the step list here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::query;
use crate::store::StoreStrategy;

/// A named command sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqRecord {
    /// Name the sequence is recalled by; required.
    pub name: String,
    /// Steps in execution order; at least one required.
    pub seq: Vec<String>,
}

/// Sequence store of command sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeqStore;

impl StoreStrategy for SeqStore {
    type Record = SeqRecord;
    type Aggregate = Vec<SeqRecord>;

    fn template(&self) -> Self::Aggregate {
        Vec::new()
    }

    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<SeqRecord> {
        let mut record = SeqRecord {
            name: String::new(),
            seq: Vec::new(),
        };
        for (key, value) in fields {
            match key.as_str() {
                "name" => record.name = value.clone(),
                "seq" => record.seq.extend(value.split(',').map(str::to_string)),
                _ => {}
            }
        }
        if record.name.is_empty() || record.seq.is_empty() {
            return None;
        }
        Some(record)
    }

    fn insert(&self, aggregate: &mut Self::Aggregate, record: SeqRecord) {
        aggregate.push(record);
    }

    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<SeqRecord> {
        aggregate.get(index).cloned()
    }

    fn matches(&self, record: &SeqRecord, key: &str, value: &str) -> bool {
        query::record_conforms(record, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    #[test]
    fn test_quoted_steps_keep_their_commas_apart() {
        let strategy = SeqStore;
        let fields = parse_line("name deploy, seq 'git pull,make,make install'").unwrap();
        let record = strategy.new_record(&fields).unwrap();
        assert_eq!(record.name, "deploy");
        assert_eq!(record.seq, vec!["git pull", "make", "make install"]);
    }

    #[test]
    fn test_space_separated_steps_rejoin_then_split() {
        let strategy = SeqStore;
        let fields = parse_line("name up, seq build test push").unwrap();
        let record = strategy.new_record(&fields).unwrap();
        assert_eq!(record.seq, vec!["build", "test", "push"]);
    }

    #[test]
    fn test_new_record_requires_name_and_steps() {
        let strategy = SeqStore;
        let fields = parse_line("name deploy").unwrap();
        assert!(parse_line("name").is_err());
        assert!(strategy.new_record(&fields).is_none());
    }

    #[test]
    fn test_matcher_tests_step_membership() {
        let strategy = SeqStore;
        let record = SeqRecord {
            name: "up".into(),
            seq: vec!["build".into(), "push".into()],
        };
        assert!(strategy.matches(&record, "name", "up"));
        assert!(strategy.matches(&record, "seq", "push"));
        assert!(!strategy.matches(&record, "seq", "deploy"));
    }
}
