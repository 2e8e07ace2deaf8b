//! Store backend
//!
//! Wraps an embedded transactional key-value engine behind the store-key
//! scheme of §4.B and the transaction envelope of §4.G. Everything above
//! this crate (indexing, the write path) talks to entries purely in terms
//! of [`Dn`](dirdb_core::Dn)-derived keys and opaque byte records; it never
//! touches the underlying engine directly.

pub mod backend;
pub mod config;
pub mod key;
pub mod txn;

pub use backend::{PutMode, Store};
pub use config::DatabaseConfig;
pub use key::store_key;
pub use txn::{ReadSnapshot, Transaction};
