//! Store backend: a thin adapter over an embedded, transactional
//! key-value engine (`redb`), keyed by the store keys built in
//! [`crate::key`] and storing the opaque byte records produced by
//! `dirdb-codec`.
//!
//! The engine itself — its page format, hashing, locking — is out of
//! scope here; this module only needs a real crate that gives us ACID
//! single-writer/multi-reader transactions over a byte-keyed table.

use crate::config::DatabaseConfig;
use dirdb_core::{Error, Result};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

pub(crate) const ENTRIES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entries");

/// How a write should behave if the key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutMode {
    /// Fail if the key is already present.
    Insert,
    /// Overwrite unconditionally.
    Replace,
}

/// An open database file.
pub struct Store {
    db: Database,
    config: DatabaseConfig,
}

impl Store {
    /// Open (creating if absent, unless `config.read_only`) the database
    /// file at `path`.
    pub fn open(path: &Path, config: DatabaseConfig) -> Result<Self> {
        let db = if config.read_only {
            Database::open(path).map_err(|e| Error::Io(std::io::Error::other(e)))?
        } else {
            Database::create(path).map_err(|e| Error::Io(std::io::Error::other(e)))?
        };
        // Ensure the table exists so later read-only opens never hit a
        // "no such table" error on an otherwise-empty database.
        if !config.read_only {
            let txn = db
                .begin_write()
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            {
                txn.open_table(ENTRIES_TABLE)
                    .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            }
            txn.commit()
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        }
        Ok(Store { db, config })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }
}

/// Fetch a record by store key from an open write transaction (writers may
/// always read their own in-flight snapshot).
pub(crate) fn get(txn: &redb::WriteTransaction, key: &[u8]) -> Result<Option<Vec<u8>>> {
    let table = txn
        .open_table(ENTRIES_TABLE)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(table
        .get(key)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
        .map(|v| v.value().to_vec()))
}

/// Fetch a record by store key from a pure read transaction.
pub(crate) fn get_read(txn: &redb::ReadTransaction, key: &[u8]) -> Result<Option<Vec<u8>>> {
    let table = txn
        .open_table(ENTRIES_TABLE)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(table
        .get(key)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
        .map(|v| v.value().to_vec()))
}

pub(crate) fn put(
    txn: &redb::WriteTransaction,
    key: &[u8],
    value: &[u8],
    mode: PutMode,
) -> Result<()> {
    let mut table = txn
        .open_table(ENTRIES_TABLE)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    if mode == PutMode::Insert
        && table
            .get(key)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .is_some()
    {
        return Err(Error::EntryAlreadyExists(crate::key::describe_key(key)));
    }
    table
        .insert(key, value)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(())
}

pub(crate) fn delete(txn: &redb::WriteTransaction, key: &[u8]) -> Result<bool> {
    let mut table = txn
        .open_table(ENTRIES_TABLE)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    let existed = table
        .remove(key)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
        .is_some();
    Ok(existed)
}

/// Every `(key, value)` pair currently stored, in key order. Used by
/// reindexing, which must visit every regular entry.
pub(crate) fn scan_all(txn: &redb::WriteTransaction) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let table = txn
        .open_table(ENTRIES_TABLE)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    let mut out = Vec::new();
    for item in table
        .iter()
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
    {
        let (k, v) = item.map_err(|e| Error::Io(std::io::Error::other(e)))?;
        out.push((k.value().to_vec(), v.value().to_vec()));
    }
    Ok(out)
}
