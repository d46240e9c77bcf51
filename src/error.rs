//! Error types for jsonstash.
//!
//! All errors are strongly typed using thiserror. The store layer converts
//! most of them into boolean outcomes at its public surface; the typed forms
//! exist so internal code can propagate with `?` and so callers that want the
//! detail (tests, diagnostics) can pattern match.

use thiserror::Error;

/// Failures raised while tokenizing a raw `"key value, key value"` line.
///
/// A parse failure always aborts the whole parse; no partial mapping is ever
/// returned.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A quoted span was opened but never closed before end of input.
    #[error("unterminated quoted span (opened with {quote:?})")]
    UnterminatedQuote {
        /// The quote character that was left open.
        quote: char,
    },

    /// The same key appeared twice within one line.
    #[error("duplicate key '{key}' in input")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// A fragment produced fewer than two tokens (no value for its key).
    #[error("no value paired with key, see here -> '{fragment}'")]
    MissingValue {
        /// The offending fragment, as split from the input line.
        fragment: String,
    },
}

/// Consistency violations raised by the structural merge.
///
/// Any violation aborts the entire merge call; callers treat it as
/// "reconciliation failed, nothing consumed, safe to retry later".
#[derive(Debug, Error)]
pub enum MergeError {
    /// Both sides carry the same key with equal shape but differing scalars.
    #[error("conflicting values at '{key}': {left} vs {right}")]
    ValueConflict {
        /// Dotted path of the conflicting key.
        key: String,
        /// Left-hand value.
        left: serde_json::Value,
        /// Right-hand value.
        right: serde_json::Value,
    },

    /// Both sides carry the same key with disagreeing shapes.
    #[error("shape mismatch at '{key}': {left} vs {right}")]
    ShapeConflict {
        /// Dotted path of the conflicting key.
        key: String,
        /// Shape name of the left-hand value.
        left: &'static str,
        /// Shape name of the right-hand value.
        right: &'static str,
    },

    /// A key present on only one side, rejected under `KeyEqual` strictness.
    #[error("key '{key}' is missing from one side under KeyEqual strictness")]
    MissingKey {
        /// Dotted path of the one-sided key.
        key: String,
    },
}

/// Failures in the durable codec and staged-write pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read, write, enumeration, or deletion failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode or decode failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Reconciliation hit a consistency violation.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
