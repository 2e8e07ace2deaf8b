//! # dirdb
//!
//! An embedded, single-process directory database backend: LDAP-style
//! entries (a distinguished name plus multi-valued attributes), a small
//! attribute schema, equality and one-level indexes, and a write path with
//! transactional atomicity.
//!
//! # Quick Start
//!
//! ```no_run
//! use dirdb::Dirdb;
//! use dirdb_core::{Dn, Element, Entry, Value};
//!
//! fn main() -> dirdb_core::Result<()> {
//!     let mut db = Dirdb::open("./my-data.db")?;
//!
//!     let mut entry = Entry::new(Dn::new("cn=alice,dc=example,dc=com"));
//!     entry.push_element(Element::new("cn", vec![Value::from("alice")]));
//!     db.add(entry)?;
//!
//!     assert_eq!(db.sequence_number()?, 1);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The [`Dirdb`] struct is the main entry point; every operation goes
//! through it. Internal crates (`dirdb-core`, `dirdb-schema`, `dirdb-codec`,
//! `dirdb-store`, `dirdb-index`, `dirdb-engine`) are not re-exported in
//! full — only the types needed to build entries and inspect results are.

use std::path::Path;
use std::sync::Arc;

use dirdb_core::{Dn, Element, Entry, Result};
use dirdb_engine::{Adapter, Engine, Request};
use dirdb_store::{DatabaseConfig, Store};

pub use dirdb_core::{Error, ModFlag, Value};
pub use dirdb_core::types::OperationCode;
pub use dirdb_engine::{HandleState, Response, ResponseValue};

/// High-level, typed wrapper over the request adapter.
///
/// `Dirdb` owns the open store and a persistent [`Adapter`], so explicit
/// `start_transaction`/`end_transaction`/`cancel_transaction` calls span
/// several method calls on the same handle.
pub struct Dirdb {
    adapter: Adapter,
}

impl Dirdb {
    /// Open (creating if absent) the database file at `path` with default
    /// configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, DatabaseConfig::default())
    }

    /// Open the database file at `path` with an explicit [`DatabaseConfig`]
    /// (e.g. read-only access).
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: DatabaseConfig) -> Result<Self> {
        let store = Arc::new(Store::open(path.as_ref(), config)?);
        let engine = Engine::new(store);
        Ok(Dirdb {
            adapter: Adapter::new(engine),
        })
    }

    /// Borrow the underlying adapter, for callers that want to build and
    /// dispatch a [`Request`] directly (e.g. to attach controls).
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    fn dispatch(&mut self, request: Request) -> Result<ResponseValue> {
        self.adapter.dispatch(request, None).result
    }

    /// Add a new entry.
    pub fn add(&mut self, entry: Entry) -> Result<()> {
        self.dispatch(Request::new(OperationCode::Add).with_entry(entry))
            .map(|_| ())
    }

    /// Apply a list of modifications to the entry named by `dn`.
    pub fn modify(&mut self, dn: &Dn, mods: Vec<Element>) -> Result<()> {
        self.dispatch(
            Request::new(OperationCode::Modify)
                .with_dn(dn.clone())
                .with_mods(mods),
        )
        .map(|_| ())
    }

    /// Delete the entry named by `dn`.
    pub fn delete(&mut self, dn: &Dn) -> Result<()> {
        self.dispatch(Request::new(OperationCode::Delete).with_dn(dn.clone()))
            .map(|_| ())
    }

    /// Rename the entry at `old` to `new`.
    pub fn rename(&mut self, old: &Dn, new: &Dn) -> Result<()> {
        self.dispatch(
            Request::new(OperationCode::Rename)
                .with_dn(old.clone())
                .with_new_dn(new.clone()),
        )
        .map(|_| ())
    }

    /// Current database sequence number.
    pub fn sequence_number(&mut self) -> Result<u64> {
        match self.dispatch(Request::new(OperationCode::SequenceNumber))? {
            ResponseValue::SequenceNumber(n) => Ok(n),
            ResponseValue::Unit => Err(Error::Operations(
                "sequence number request returned no number".to_string(),
            )),
        }
    }

    /// Open an explicit transaction spanning subsequent calls on this
    /// handle, until a matching `end_transaction` or `cancel_transaction`.
    pub fn start_transaction(&mut self) -> Result<()> {
        self.dispatch(Request::new(OperationCode::StartTransaction))
            .map(|_| ())
    }

    /// Commit the currently open explicit transaction.
    pub fn end_transaction(&mut self) -> Result<()> {
        self.dispatch(Request::new(OperationCode::EndTransaction))
            .map(|_| ())
    }

    /// Discard the currently open explicit transaction.
    pub fn cancel_transaction(&mut self) -> Result<()> {
        self.dispatch(Request::new(OperationCode::CancelTransaction))
            .map(|_| ())
    }
}

/// Controls and the critical-control rejection path, for callers that
/// build a [`Request`] through [`Dirdb::adapter`] rather than the typed
/// methods above.
pub use dirdb_engine::Control as RequestControl;
