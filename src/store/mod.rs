//! The staged-write record store.
//!
//! A [`RecordStore`] owns one persisted aggregate's lifecycle: lazy load of
//! the stable file, staged inserts, and periodic reconciliation of staged
//! writes into a pre-stable snapshot. It is lock-free and safe across
//! concurrent process invocations by convention: staged filenames carry a
//! random suffix unique per moment, and reconciliation is additive, so two
//! processes folding the same staged set independently produce equivalent
//! pre-stable content.
//!
//! # On-disk naming
//!
//! | file       | pattern                         |
//! |------------|---------------------------------|
//! | stable     | `<basename>.<suffix>`           |
//! | pre-stable | `<basename>.new.<suffix>`       |
//! | staged     | `<basename>.temp<random>.<suffix>` |
//!
//! The suffix defaults to `json` and is overridden by an extension present
//! in the configured file name. Promotion of the pre-stable file over the
//! stable file is an explicit external operation; the store never performs
//! it.

pub mod codec;
mod traits;

pub use traits::StoreStrategy;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::parse::parse_line;
use crate::query;

const DEFAULT_SUFFIX: &str = "json";
const DEFAULT_MERGE_THRESHOLD: usize = 3;

/// Explicit store configuration, injected at construction.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the stable, pre-stable, and staged files.
    pub dir: PathBuf,
    /// Configured file name; its extension, if any, overrides the suffix.
    pub file_name: String,
    /// Pending staged-file count at which an insert triggers reconciliation.
    pub merge_threshold: usize,
}

impl StoreConfig {
    /// Creates a configuration with the default merge threshold of 3.
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
        }
    }

    /// Overrides the reconciliation threshold.
    #[must_use]
    pub fn with_merge_threshold(mut self, threshold: usize) -> Self {
        self.merge_threshold = threshold;
        self
    }

    fn base_name(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(base, _)| base)
    }

    fn suffix(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(DEFAULT_SUFFIX, |(_, ext)| ext)
    }
}

/// A record store over a strategy-defined aggregate.
pub struct RecordStore<S: StoreStrategy> {
    strategy: S,
    config: StoreConfig,
    cached: Option<S::Aggregate>,
}

impl<S: StoreStrategy> RecordStore<S> {
    /// Creates a store; nothing is read from disk until first use.
    pub fn new(strategy: S, config: StoreConfig) -> Self {
        Self {
            strategy,
            config,
            cached: None,
        }
    }

    /// The strategy supplied at construction.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The configuration supplied at construction.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the authoritative stable file.
    pub fn stable_path(&self) -> PathBuf {
        let name = format!("{}.{}", self.config.base_name(), self.config.suffix());
        self.config.dir.join(name)
    }

    /// Path of the merged-but-unpromoted pre-stable file.
    pub fn pre_stable_path(&self) -> PathBuf {
        let name = format!("{}.new.{}", self.config.base_name(), self.config.suffix());
        self.config.dir.join(name)
    }

    fn staged_prefix(&self) -> String {
        format!("{}.temp", self.config.base_name())
    }

    /// Allocates a fresh staged-file path. The random decimal suffix is
    /// drawn from a v4 UUID so concurrent processes never collide.
    fn staged_path(&self) -> PathBuf {
        let name = format!(
            "{}.temp{}.{}",
            self.config.base_name(),
            Uuid::new_v4().as_u128(),
            self.config.suffix()
        );
        self.config.dir.join(name)
    }

    /// Number of staged files currently pending reconciliation.
    pub fn pending_staged(&self) -> usize {
        codec::count_prefixed(&self.config.dir, &self.staged_prefix())
    }

    fn load_stable(&self) -> S::Aggregate {
        let path = self.stable_path();
        match codec::read_json(&path) {
            Ok(aggregate) => aggregate,
            Err(err) => {
                debug!(path = %path.display(), %err, "stable load failed; using empty template");
                self.strategy.template()
            }
        }
    }

    fn ensure_loaded(&mut self) {
        if self.cached.is_none() {
            let loaded = self.load_stable();
            self.cached = Some(loaded);
        }
    }

    /// Returns the cached materialization, loading the stable file on first
    /// call. A missing or corrupt stable file silently materializes the
    /// strategy's empty template. Never fails.
    ///
    /// Unreconciled staged inserts are not visible here: the cache reads the
    /// stable file only.
    pub fn store(&mut self) -> &S::Aggregate {
        self.ensure_loaded();
        match self.cached {
            Some(ref aggregate) => aggregate,
            None => unreachable!(),
        }
    }

    /// Drops the cached materialization so the next read hits disk again
    /// (needed after an external promotion of the pre-stable file).
    pub fn reload(&mut self) {
        self.cached = None;
    }

    /// Parses `raw`, validates it through the strategy, and durably writes
    /// one staged file.
    ///
    /// Returns `false` without side effects when parsing or validation
    /// fails, or when the staged write itself fails. After a successful
    /// write, reaching the merge threshold triggers reconciliation as a side
    /// effect whose failure does not revert the insert.
    pub fn insert_element(&mut self, raw: &str) -> bool {
        let fields = match parse_line(raw) {
            Ok(fields) => fields,
            Err(err) => {
                debug!(%err, "insert line rejected");
                return false;
            }
        };
        let Some(record) = self.strategy.new_record(&fields) else {
            debug!("insert rejected by store validation");
            return false;
        };
        self.insert_record(record)
    }

    /// Stages an already-constructed record, bypassing the line parser.
    pub fn insert_record(&mut self, record: S::Record) -> bool {
        let mut staged = self.strategy.template();
        self.strategy.insert(&mut staged, record);

        let path = self.staged_path();
        if let Err(err) = codec::write_json(&path, &staged) {
            warn!(path = %path.display(), %err, "staged write failed");
            return false;
        }

        if self.pending_staged() >= self.config.merge_threshold && !self.update_pre_stable() {
            warn!("threshold reconciliation failed; staged files kept for retry");
        }
        true
    }

    /// Parses `query` and returns every record satisfying all of its
    /// predicates. A query that fails to parse and a query that matches
    /// nothing are observably identical empty results.
    pub fn get_elements(&mut self, query: &str) -> Vec<S::Record> {
        let predicates = match parse_line(query) {
            Ok(predicates) => predicates,
            Err(err) => {
                debug!(%err, "query rejected");
                return Vec::new();
            }
        };
        self.ensure_loaded();
        match self.cached {
            Some(ref aggregate) => query::filter(&self.strategy, aggregate, &predicates),
            None => unreachable!(),
        }
    }

    /// Folds all pending staged files into the pre-stable snapshot.
    ///
    /// Staged files are merged pairwise left to right in
    /// filename-lexicographic order, then into any existing pre-stable
    /// (existing first), and the consumed staged files are deleted only
    /// after the pre-stable write succeeds. Zero pending staged files is a
    /// no-op returning `true` with disk state untouched; any failure
    /// returns `false` with all staged files intact.
    pub fn update_pre_stable(&mut self) -> bool {
        match self.reconcile_staged() {
            Ok(consumed) => {
                if consumed > 0 {
                    debug!(consumed, "staged writes folded into pre-stable");
                }
                true
            }
            Err(err) => {
                warn!(%err, "reconciliation failed; staged files left for retry");
                false
            }
        }
    }

    fn reconcile_staged(&self) -> StoreResult<usize> {
        let staged: Vec<(String, Value)> =
            codec::read_json_batch(&self.config.dir, &self.staged_prefix())?;

        let mut staged = staged.into_iter();
        let Some((first, mut merged)) = staged.next() else {
            return Ok(0);
        };
        let mut consumed = vec![first];
        for (name, value) in staged {
            merged = self.strategy.merge_aggregates(&merged, &value)?;
            consumed.push(name);
        }

        let pre_stable = self.pre_stable_path();
        if pre_stable.exists() {
            let existing: Value = codec::read_json(&pre_stable)?;
            merged = self.strategy.merge_aggregates(&existing, &merged)?;
        }

        codec::write_json(&pre_stable, &merged)?;
        codec::remove_files(&self.config.dir, &consumed)?;
        Ok(consumed.len())
    }
}

/// Convenience for tests and operator tooling: promotes a pre-stable file
/// over the stable file by whole-file rename. The engine itself never calls
/// this; promotion timing is an external decision.
///
/// # Errors
///
/// Returns the underlying I/O error when the rename fails.
pub fn promote(pre_stable: &Path, stable: &Path) -> std::io::Result<()> {
    std::fs::rename(pre_stable, stable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::host::{HostRecord, HostStore};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn host_store(dir: &Path) -> RecordStore<HostStore> {
        RecordStore::new(HostStore, StoreConfig::new(dir, "ssh.json"))
    }

    #[test]
    fn test_file_naming_with_explicit_extension() {
        let dir = tempdir().unwrap();
        let store = host_store(dir.path());

        assert_eq!(store.stable_path(), dir.path().join("ssh.json"));
        assert_eq!(store.pre_stable_path(), dir.path().join("ssh.new.json"));
        assert_eq!(store.staged_prefix(), "ssh.temp");

        let staged = store.staged_path();
        let name = staged.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ssh.temp"));
        assert!(name.ends_with(".json"));
        // Random part must be purely numeric.
        let middle = &name["ssh.temp".len()..name.len() - ".json".len()];
        assert!(!middle.is_empty());
        assert!(middle.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_suffix_defaults_to_json() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(HostStore, StoreConfig::new(dir.path(), "hosts"));
        assert_eq!(store.stable_path(), dir.path().join("hosts.json"));
    }

    #[test]
    fn test_dotted_base_name_keeps_all_but_extension() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(HostStore, StoreConfig::new(dir.path(), "a.b.json"));
        assert_eq!(store.stable_path(), dir.path().join("a.b.json"));
        assert_eq!(store.pre_stable_path(), dir.path().join("a.b.new.json"));
        assert_eq!(store.staged_prefix(), "a.b.temp");
    }

    #[test]
    fn test_store_falls_back_to_template() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());
        assert!(store.store().is_empty());
    }

    #[test]
    fn test_store_falls_back_on_corrupt_stable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ssh.json"), "not json{").unwrap();
        let mut store = host_store(dir.path());
        assert!(store.store().is_empty());
    }

    #[test]
    fn test_insert_writes_one_staged_file() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        assert!(store.insert_element("host example.com, user alice"));
        assert_eq!(store.pending_staged(), 1);
        assert!(!store.stable_path().exists());
        assert!(!store.pre_stable_path().exists());
    }

    #[test]
    fn test_insert_parse_failure_has_no_side_effects() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        assert!(!store.insert_element("host h, host h"));
        assert!(!store.insert_element("host"));
        assert_eq!(store.pending_staged(), 0);
    }

    #[test]
    fn test_insert_validation_failure_has_no_side_effects() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        // user is required by the host strategy
        assert!(!store.insert_element("host example.com, tag work"));
        assert_eq!(store.pending_staged(), 0);
    }

    #[test]
    fn test_staged_inserts_invisible_before_promotion() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        assert!(store.insert_element("host example.com, user alice"));
        assert!(store.get_elements("host example.com").is_empty());
        assert!(store.store().is_empty());
    }

    #[test]
    fn test_threshold_triggers_reconciliation() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        assert!(store.insert_element("host a.example, user alice"));
        assert!(store.insert_element("host b.example, user bob"));
        assert_eq!(store.pending_staged(), 2);
        assert!(!store.pre_stable_path().exists());

        // Third insert reaches the default threshold.
        assert!(store.insert_element("host c.example, user carol"));
        assert_eq!(store.pending_staged(), 0);
        assert!(store.pre_stable_path().exists());

        let pre: Vec<HostRecord> = codec::read_json(&store.pre_stable_path()).unwrap();
        assert_eq!(pre.len(), 3);
    }

    #[test]
    fn test_update_pre_stable_no_staged_is_noop() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ssh.json"), "[]").unwrap();
        let before: Vec<(String, Vec<u8>)> = dir_snapshot(dir.path());

        let mut store = host_store(dir.path());
        assert!(store.update_pre_stable());

        assert_eq!(dir_snapshot(dir.path()), before);
    }

    #[test]
    fn test_update_pre_stable_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        let mut store = host_store(&dir.path().join("absent"));

        assert_eq!(store.pending_staged(), 0);
        assert!(store.update_pre_stable());
        assert!(!dir.path().join("absent").exists());
    }

    #[test]
    fn test_update_pre_stable_folds_into_existing() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        assert!(store.insert_element("host a.example, user alice"));
        assert!(store.update_pre_stable());
        assert!(store.insert_element("host b.example, user bob"));
        assert!(store.update_pre_stable());

        let pre: Vec<HostRecord> = codec::read_json(&store.pre_stable_path()).unwrap();
        // Existing pre-stable content comes first.
        assert_eq!(pre[0].host, "a.example");
        assert_eq!(pre[1].host, "b.example");
        assert_eq!(store.pending_staged(), 0);
    }

    #[test]
    fn test_staged_files_kept_when_merge_fails() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        // A staged file whose shape disagrees with a sequence aggregate
        // makes the structural merge violate.
        fs::write(dir.path().join("ssh.temp1.json"), "[]").unwrap();
        fs::write(dir.path().join("ssh.temp2.json"), "{\"k\":1}").unwrap();

        assert!(!store.update_pre_stable());
        assert_eq!(store.pending_staged(), 2);
        assert!(!store.pre_stable_path().exists());
    }

    #[test]
    fn test_promotion_then_reload_makes_records_queryable() {
        let dir = tempdir().unwrap();
        let mut store = host_store(dir.path());

        assert!(store.insert_element("host example.com, user alice"));
        assert!(store.update_pre_stable());
        promote(&store.pre_stable_path(), &store.stable_path()).unwrap();
        store.reload();

        let found = store.get_elements("host example.com");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user, "alice");
    }

    #[test]
    fn test_cached_materialization_survives_disk_changes() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ssh.json"),
            json!([{"tag": "", "host": "h", "user": "u"}]).to_string(),
        )
        .unwrap();

        let mut store = host_store(dir.path());
        assert_eq!(store.store().len(), 1);

        // Disk changes are not observed until an explicit reload.
        fs::write(dir.path().join("ssh.json"), "[]").unwrap();
        assert_eq!(store.store().len(), 1);
        store.reload();
        assert_eq!(store.store().len(), 0);
    }

    fn dir_snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut entries: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (
                    e.file_name().to_string_lossy().into_owned(),
                    fs::read(e.path()).unwrap(),
                )
            })
            .collect();
        entries.sort();
        entries
    }
}
