//! # jsonstash — staged-write JSON record stores
//!
//! jsonstash persists small record collections as JSON on disk through a
//! lock-free, multi-process-safe-by-convention staged-write protocol. Every
//! insert lands in its own ephemeral staged file; reconciliation folds
//! staged files into a pre-stable snapshot with an additive structural
//! merge; promoting the pre-stable file over the stable one is an explicit
//! external operation.
//!
//! ## Core pieces
//!
//! - **Input parser**: tokenizes `"key value, key value"` lines into a
//!   predicate/field mapping, quote-aware
//! - **Structural merge**: deep-merges same-shaped aggregates under a
//!   tunable [`Strictness`] policy
//! - **Query engine**: linear-scan filtering through a store-supplied
//!   matcher and stepper
//! - **Record store**: the staged-write lifecycle, parameterized by a
//!   [`StoreStrategy`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jsonstash::records::HostStore;
//! use jsonstash::{RecordStore, StoreConfig};
//!
//! let mut store = RecordStore::new(HostStore, StoreConfig::new("/tmp/stash", "ssh.json"));
//! store.insert_element("host example.com, user alice");
//! let found = store.get_elements("host example.com");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod merge;
pub mod parse;
pub mod query;
pub mod records;
pub mod store;

// Re-export primary types at crate root for convenience
pub use error::{MergeError, ParseError, StoreError, StoreResult};
pub use merge::{merge, Strictness};
pub use parse::parse_line;
pub use store::{RecordStore, StoreConfig, StoreStrategy};
