//! Predicate filtering over materialized stores.
//!
//! Records are enumerated through the strategy's index-based stepper and
//! kept only when every predicate passes (logical AND). Predicate evaluation
//! never partially matches: one unrecognized key fails the record outright.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::store::StoreStrategy;

/// Keeps every record of `aggregate` satisfying all `predicates` under the
/// strategy's matcher.
pub fn filter<S: StoreStrategy>(
    strategy: &S,
    aggregate: &S::Aggregate,
    predicates: &BTreeMap<String, String>,
) -> Vec<S::Record> {
    let mut kept = Vec::new();
    let mut index = 0;
    while let Some(record) = strategy.record_at(aggregate, index) {
        if predicates
            .iter()
            .all(|(key, value)| strategy.matches(&record, key, value))
        {
            kept.push(record);
        }
        index += 1;
    }
    kept
}

/// The shared field matcher: resolves one predicate against a record's
/// encoded fields by declared field name and type.
///
/// - string fields compare for equality;
/// - number fields compare after string-to-number coercion of the query
///   value;
/// - sequence fields test membership of the query value;
/// - bool fields accept case-insensitive `true`/`t` and `false`/`f`;
/// - an unknown field name, an unparseable literal, or any other field
///   shape evaluates to `false`.
pub fn field_conforms(fields: &Value, key: &str, value: &str) -> bool {
    let Some(field) = fields.get(key) else {
        return false;
    };
    match field {
        Value::String(s) => s == value,
        Value::Number(n) => value
            .parse::<f64>()
            .is_ok_and(|parsed| n.as_f64() == Some(parsed)),
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(value)),
        Value::Bool(b) => match value.to_ascii_lowercase().as_str() {
            "true" | "t" => *b,
            "false" | "f" => !*b,
            _ => false,
        },
        _ => false,
    }
}

/// [`field_conforms`] over any serializable record.
pub fn record_conforms<R: Serialize>(record: &R, key: &str, value: &str) -> bool {
    serde_json::to_value(record).is_ok_and(|fields| field_conforms(&fields, key, value))
}
