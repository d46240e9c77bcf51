//! Credential records: the record-shaped aggregate.
//!
//! Unlike the sequence stores, the aggregate here is a record holding two
//! sequences, so reconciliation unions the surrounding record and
//! concatenates `sites` and `accounts` field by field. The account shape is
//! open-ended: keys without a named slot spill into `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::StoreStrategy;

/// A key/value pair the account shape has no named slot for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    /// Field label as entered.
    pub label: String,
    /// Field value as entered.
    pub value: String,
}

/// A site known to the credential book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// URLs the site answers on.
    pub urls: Vec<String>,
    /// Organization behind the site.
    pub org: String,
}

/// One stored account; only `username` is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    /// Login name; required.
    pub username: String,
    /// Organization the account belongs to.
    pub org: Option<String>,
    /// Free-form grouping tag.
    pub tag: Option<String>,
    /// Password, kept as entered.
    pub password: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Spillover for unrecognized keys.
    pub extra: Vec<ExtraField>,
}

/// The credential aggregate: two sequences inside one record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialBook {
    /// Known sites.
    pub sites: Vec<Site>,
    /// Stored accounts.
    pub accounts: Vec<Account>,
}

/// Credential store; inserts append to the book's `accounts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStore;

impl StoreStrategy for CredentialStore {
    type Record = Account;
    type Aggregate = CredentialBook;

    fn template(&self) -> Self::Aggregate {
        CredentialBook::default()
    }

    fn new_record(&self, fields: &BTreeMap<String, String>) -> Option<Account> {
        let mut record = Account::default();
        for (key, value) in fields {
            match key.as_str() {
                "username" => record.username = value.clone(),
                "org" => record.org = Some(value.clone()),
                "tag" => record.tag = Some(value.clone()),
                "password" => record.password = Some(value.clone()),
                "email" => record.email = Some(value.clone()),
                _ => record.extra.push(ExtraField {
                    label: key.clone(),
                    value: value.clone(),
                }),
            }
        }
        if record.username.is_empty() {
            return None;
        }
        Some(record)
    }

    fn insert(&self, aggregate: &mut Self::Aggregate, record: Account) {
        aggregate.accounts.push(record);
    }

    fn record_at(&self, aggregate: &Self::Aggregate, index: usize) -> Option<Account> {
        aggregate.accounts.get(index).cloned()
    }

    fn matches(&self, record: &Account, key: &str, value: &str) -> bool {
        match key {
            "org" => record.org.as_deref() == Some(value),
            "email" => record.email.as_deref() == Some(value),
            _ => false,
        }
    }
}
