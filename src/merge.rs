//! Structural merge over JSON-shaped aggregates.
//!
//! The merge is additive: sequences concatenate, keyed aggregates union, and
//! the [`Strictness`] level decides how much disagreement is tolerated before
//! the whole call fails with a consistency violation. Reconciliation uses the
//! default [`Strictness::PairEqual`], which unions data aggressively while
//! still catching genuinely conflicting edits.

use serde_json::Value;

use crate::error::MergeError;

/// Merge policy controlling tolerance for missing keys and conflicting
/// scalars. Levels are ordered: `Dumb < PairEqual < KeyEqual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Strictness {
    /// Tolerate everything; on any disagreement the left side wins.
    Dumb,
    /// Tolerate missing keys, reject contradictory scalars and shapes.
    #[default]
    PairEqual,
    /// Additionally reject keys present on only one side.
    KeyEqual,
}

/// Returns a human-readable shape name for a JSON value.
pub const fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "record",
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn conflict_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

/// Deep-merges two same-shaped aggregate values under `strictness`.
///
/// - sequence x sequence concatenates, left order then right order;
/// - record x record unions keys: sequence-valued fields concatenate, nested
///   records recurse (strictness propagates), scalars must be equal at
///   `>= PairEqual`, and one-sided keys are copied through below `KeyEqual`;
/// - anything else (scalar pairs, disagreeing shapes) passes only when equal,
///   otherwise it violates at `>= PairEqual` and keeps the left side at
///   `Dumb`.
///
/// # Errors
///
/// Returns a [`MergeError`] naming the dotted path of the first violation.
pub fn merge(a: &Value, b: &Value, strictness: Strictness) -> Result<Value, MergeError> {
    merge_at("", a, b, strictness)
}

fn merge_at(path: &str, a: &Value, b: &Value, strictness: Strictness) -> Result<Value, MergeError> {
    match (a, b) {
        (Value::Array(left), Value::Array(right)) => {
            let mut out = left.clone();
            out.extend(right.iter().cloned());
            Ok(Value::Array(out))
        }
        (Value::Object(left), Value::Object(right)) => {
            let mut keys: Vec<&String> = left.keys().collect();
            keys.extend(right.keys().filter(|k| !left.contains_key(*k)));

            let mut out = serde_json::Map::with_capacity(keys.len());
            for key in keys {
                let child = join_path(path, key);
                match (left.get(key), right.get(key)) {
                    (Some(l), Some(r)) => {
                        out.insert(key.clone(), merge_at(&child, l, r, strictness)?);
                    }
                    (Some(one), None) | (None, Some(one)) => {
                        if strictness >= Strictness::KeyEqual {
                            return Err(MergeError::MissingKey { key: child });
                        }
                        out.insert(key.clone(), one.clone());
                    }
                    (None, None) => unreachable!(),
                }
            }
            Ok(Value::Object(out))
        }
        _ => {
            if a == b {
                return Ok(a.clone());
            }
            if strictness >= Strictness::PairEqual {
                let key = conflict_path(path);
                if shape_name(a) == shape_name(b) {
                    return Err(MergeError::ValueConflict {
                        key,
                        left: a.clone(),
                        right: b.clone(),
                    });
                }
                return Err(MergeError::ShapeConflict {
                    key,
                    left: shape_name(a),
                    right: shape_name(b),
                });
            }
            Ok(a.clone())
        }
    }
}

/// Tag-level union where a colliding tag keeps the left entry wholesale.
///
/// This is the keyed-store reconciliation merge: the first writer of a tag
/// wins and a later write of the same tag is silently dropped, never a
/// consistency violation.
///
/// # Errors
///
/// Returns [`MergeError::ShapeConflict`] when either side is not a record.
pub fn merge_first_wins(a: &Value, b: &Value) -> Result<Value, MergeError> {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            let mut out = left.clone();
            for (key, value) in right {
                out.entry(key.clone()).or_insert_with(|| value.clone());
            }
            Ok(Value::Object(out))
        }
        _ => Err(MergeError::ShapeConflict {
            key: "<root>".to_string(),
            left: shape_name(a),
            right: shape_name(b),
        }),
    }
}
