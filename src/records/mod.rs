//! Concrete record strategies.
//!
//! Each submodule is one plugin's persistence strategy: the record shape,
//! the aggregate shape, and the strategy implementation the store engine is
//! parameterized with. Hosts, manual pages, command sequences, and item
//! locations are sequence stores; database connections are a keyed store;
//! credentials aggregate into a record of sequences.

pub mod credential;
pub mod database;
pub mod host;
pub mod manual;
pub mod sequence;
pub mod whereis;

pub use credential::{Account, CredentialBook, CredentialStore};
pub use database::{DbEntry, DbRecord, DbStore};
pub use host::{HostRecord, HostStore};
pub use manual::{ManualRecord, ManualStore};
pub use sequence::{SeqRecord, SeqStore};
pub use whereis::{ItemRecord, ItemStore};
