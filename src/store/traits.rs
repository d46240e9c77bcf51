//! The per-store strategy interface.
//!
//! Everything a store specializes — record construction, element stepping,
//! predicate matching, the aggregate shape itself — is supplied as one value
//! implementing [`StoreStrategy`] at store construction. There is no
//! inheritance and no process-wide defaults.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::MergeError;
use crate::merge::{self, Strictness};

/// Strategy supplied at [`RecordStore`](crate::store::RecordStore)
/// construction.
///
/// The aggregate is the persisted shape (an ordered sequence of records, or
/// a mapping from tag to record); the record is what queries yield. The
/// stepper contract is index-based rather than a native iterator so stores
/// of differing backing shapes share one traversal contract.
pub trait StoreStrategy {
    /// Record yielded by queries and accepted by inserts.
    type Record;

    /// Persisted aggregate shape.
    type Aggregate: Serialize + DeserializeOwned + Clone;

    /// The empty aggregate a store falls back to when no stable file loads.
    fn template(&self) -> Self::Aggregate;

    /// Builds a record from parsed key/value fields, or `None` when a
    /// required field is missing or empty.
    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<Self::Record>;

    /// Inserts a record into an aggregate. Keyed stores refuse to overwrite
    /// an existing tag here (the new record is silently dropped).
    fn insert(&self, aggregate: &mut Self::Aggregate, record: Self::Record);

    /// Returns the record at `index`, or `None` once the aggregate is
    /// exhausted.
    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<Self::Record>;

    /// Tests one predicate against a record. An unrecognized key must
    /// evaluate to `false`.
    fn matches(&self, record: &Self::Record, key: &str, value: &str) -> bool;

    /// Reconciliation-time merge of two encoded aggregates.
    ///
    /// The default is the structural merge at [`Strictness::PairEqual`];
    /// keyed stores override this with a first-writer-wins union.
    ///
    /// # Errors
    ///
    /// Returns a [`MergeError`] on a consistency violation, aborting the
    /// reconciliation that invoked it.
    fn merge_aggregates(&self, a: &Value, b: &Value) -> Result<Value, MergeError> {
        merge::merge(a, b, Strictness::PairEqual)
    }
}
