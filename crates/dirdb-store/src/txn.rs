//! Transaction envelope (§4.G): a thin pass-through to the underlying
//! engine's begin/commit/cancel, plus a non-negative nesting depth.
//!
//! Only the outermost `begin` actually opens an engine transaction;
//! nested `begin`s just bump the depth. `commit`/`cancel` at depth 1
//! finalise the underlying transaction — committing persists every write
//! made since the outermost `begin`, cancelling drops them all, since an
//! uncommitted `redb` write transaction is invisible to any reader.
//!
//! `Transaction` holds an `Arc<Store>` rather than borrowing it, so a
//! handle that needs to keep a transaction open across several calls (the
//! Request Adapter's explicit `start/end/cancel transaction`, §4.I) can do
//! so without becoming a self-referential struct.

use crate::backend::{self, PutMode, Store};
use dirdb_core::{Error, Result};
use std::sync::Arc;

/// A (possibly nested) write transaction against a [`Store`].
pub struct Transaction {
    store: Arc<Store>,
    inner: Option<redb::WriteTransaction>,
    depth: u32,
}

impl Transaction {
    pub fn new(store: Arc<Store>) -> Self {
        Transaction {
            store,
            inner: None,
            depth: 0,
        }
    }

    /// Begin, or re-enter, this transaction.
    pub fn begin(&mut self) -> Result<()> {
        if self.store.config().read_only {
            return Err(Error::InsufficientAccess(
                "database opened read-only".to_string(),
            ));
        }
        if self.depth == 0 {
            let txn = self
                .store
                .db()
                .begin_write()
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            self.inner = Some(txn);
        }
        self.depth += 1;
        Ok(())
    }

    /// Depth of nested `begin` calls still outstanding.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn active(&self) -> Result<&redb::WriteTransaction> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::Operations("no active transaction".to_string()))
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        backend::get(self.active()?, key)
    }

    pub fn put(&self, key: &[u8], value: &[u8], mode: PutMode) -> Result<()> {
        backend::put(self.active()?, key, value, mode)
    }

    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        backend::delete(self.active()?, key)
    }

    pub fn scan_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        backend::scan_all(self.active()?)
    }

    /// Commit one level of nesting; at depth 1 this persists every write
    /// made since the outermost `begin`.
    pub fn commit(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::Operations(
                "commit called without a matching begin".to_string(),
            ));
        }
        self.depth -= 1;
        if self.depth == 0 {
            if let Some(txn) = self.inner.take() {
                txn.commit().map_err(|e| Error::Io(std::io::Error::other(e)))?;
            }
        }
        Ok(())
    }

    /// Cancel one level of nesting; at depth 1 this discards every write
    /// made since the outermost `begin`, undoing entry and index edits as
    /// one unit.
    pub fn cancel(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::Operations(
                "cancel called without a matching begin".to_string(),
            ));
        }
        self.depth -= 1;
        if self.depth == 0 {
            // Dropping an uncommitted redb::WriteTransaction aborts it.
            self.inner.take();
        }
        Ok(())
    }
}

/// A read-only snapshot, for lookups that don't need to participate in a
/// write transaction (e.g. answering a read while no write is in flight).
pub struct ReadSnapshot {
    inner: redb::ReadTransaction,
}

impl ReadSnapshot {
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        backend::get_read(&self.inner, key)
    }
}

impl Store {
    pub fn read(&self) -> Result<ReadSnapshot> {
        let inner = self
            .db()
            .begin_read()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        Ok(ReadSnapshot { inner })
    }
}
