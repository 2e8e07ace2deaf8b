//! Write Path (§4.F): Add / Modify / Delete / Rename, each carried out
//! inside a transaction, with index upkeep and the sequence-bump /
//! reindex post-modify hook.

use crate::cache::Metadata;
use crate::sequence;
use dirdb_core::{Dn, Element, Entry, Error, ModFlag, Result, Value};
use dirdb_store::{PutMode, Store, Transaction};
use std::sync::Arc;
use tracing::{info, warn};

/// Bundles the store, the index engine's view of metadata, and the
/// schema/index caches a write needs.
///
/// `active` holds the transaction opened by an explicit
/// `start_transaction` (§4.I); when present, every write-path call
/// participates in it instead of opening (and committing/cancelling) its
/// own, so a caller-driven `start/end/cancel transaction` sequence spans
/// several add/modify/delete/rename calls atomically.
pub struct Engine {
    store: Arc<Store>,
    pub metadata: Metadata,
    active: Option<Transaction>,
}

impl Engine {
    pub fn new(store: Arc<Store>) -> Self {
        Engine {
            store,
            metadata: Metadata::new(),
            active: None,
        }
    }

    /// Begin an explicit, caller-managed transaction (§4.I `start
    /// transaction`). Nested calls increment the envelope's depth rather
    /// than opening a second underlying transaction.
    pub fn start_transaction(&mut self) -> Result<()> {
        if let Some(txn) = self.active.as_mut() {
            return txn.begin();
        }
        let mut txn = Transaction::new(Arc::clone(&self.store));
        txn.begin()?;
        self.metadata.refresh(&txn)?;
        self.active = Some(txn);
        Ok(())
    }

    /// Commit one level of the explicit transaction (§4.I `end
    /// transaction`).
    pub fn end_transaction(&mut self) -> Result<()> {
        let txn = self
            .active
            .as_mut()
            .ok_or_else(|| Error::Operations("no active transaction".to_string()))?;
        txn.commit()?;
        if txn.depth() == 0 {
            self.active = None;
        }
        Ok(())
    }

    /// Cancel one level of the explicit transaction (§4.I `cancel
    /// transaction`).
    pub fn cancel_transaction(&mut self) -> Result<()> {
        let txn = self
            .active
            .as_mut()
            .ok_or_else(|| Error::Operations("no active transaction".to_string()))?;
        txn.cancel()?;
        if txn.depth() == 0 {
            self.active = None;
        }
        Ok(())
    }

    /// Run `f` against either the caller's explicit transaction (left
    /// open for the caller to commit/cancel) or a fresh one scoped to
    /// this single call (committed on success, cancelled on failure).
    fn with_txn<T>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut Transaction) -> Result<T>,
    ) -> Result<T> {
        if let Some(mut txn) = self.active.take() {
            let result = f(self, &mut txn);
            self.active = Some(txn);
            result
        } else {
            let mut txn = Transaction::new(Arc::clone(&self.store));
            txn.begin()?;
            self.metadata.refresh(&txn)?;
            let result = f(self, &mut txn);
            match &result {
                Ok(_) => txn.commit()?,
                Err(_) => txn.cancel()?,
            }
            result
        }
    }

    /// §4.H `sequence_number` request: the current (highest) sequence
    /// number, without bumping it. A pure read, taken from a
    /// [`dirdb_store::ReadSnapshot`] so it works against a database opened
    /// read-only, where a write transaction is rejected outright.
    pub fn sequence_number(&self) -> Result<u64> {
        let snapshot = self.store.read()?;
        sequence::highest_readonly(&snapshot)
    }

    /// §4.F Add.
    pub fn add(&mut self, entry: Entry) -> Result<()> {
        self.with_txn(|engine, txn| {
            engine.add_internal(txn, &entry)?;
            engine.post_modify(txn, &entry.dn)
        })
    }

    fn add_internal(&mut self, txn: &mut Transaction, entry: &Entry) -> Result<()> {
        validate_special_dn(entry)?;

        let key = dirdb_store::store_key(&entry.dn);
        txn.put(&key, &dirdb_codec::pack(entry), PutMode::Insert)?;

        if !entry.dn.is_special() {
            if let Some(parent) = entry.dn.parent() {
                dirdb_index::index_one_add(txn, &parent, &entry.dn)?;
            }
        }
        for attr in &self.metadata.indexed_attributes {
            if let Some(element) = entry.element(attr) {
                let syntax = self.metadata.registry.syntax_for(attr);
                for value in &element.values {
                    let canonical = (syntax.canonicalize)(value);
                    let canonical_text = String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                    dirdb_index::index_add(txn, attr, &canonical_text, &entry.dn)?;
                }
            }
        }

        Ok(())
    }

    /// §4.F Delete.
    pub fn delete(&mut self, dn: &Dn) -> Result<()> {
        self.with_txn(|engine, txn| {
            engine.delete_internal(txn, dn)?;
            engine.post_modify(txn, dn)
        })
    }

    fn delete_internal(&mut self, txn: &mut Transaction, dn: &Dn) -> Result<()> {
        let key = dirdb_store::store_key(dn);
        let record = txn
            .get(&key)?
            .ok_or_else(|| Error::NoSuchObject(dn.as_str().to_string()))?;
        let old = dirdb_codec::unpack(&record)?;

        txn.delete(&key)?;

        if !dn.is_special() {
            if let Some(parent) = dn.parent() {
                dirdb_index::index_one_del(txn, &parent, dn)?;
            }
        }
        for attr in &self.metadata.indexed_attributes {
            if let Some(element) = old.element(attr) {
                let syntax = self.metadata.registry.syntax_for(attr);
                for value in &element.values {
                    let canonical = (syntax.canonicalize)(value);
                    let canonical_text = String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                    dirdb_index::index_del(txn, attr, &canonical_text, dn)?;
                }
            }
        }

        Ok(())
    }

    /// §4.F Modify.
    pub fn modify(&mut self, dn: &Dn, mods: Vec<Element>) -> Result<()> {
        self.with_txn(|engine, txn| {
            engine.modify_internal(txn, dn, mods)?;
            engine.post_modify(txn, dn)
        })
    }

    fn modify_internal(
        &mut self,
        txn: &mut Transaction,
        dn: &Dn,
        mods: Vec<Element>,
    ) -> Result<()> {
        let key = dirdb_store::store_key(dn);
        let record = txn
            .get(&key)?
            .ok_or_else(|| Error::NoSuchObject(dn.as_str().to_string()))?;
        let mut cur = dirdb_codec::unpack(&record)?;

        for modification in mods {
            let flag = ModFlag::from_code(modification.flags as u8)
                .ok_or_else(|| Error::Protocol(format!("unknown modify flag {}", modification.flags)))?;
            let attr = modification.name.clone();
            let syntax = self.metadata.registry.syntax_for(&attr);

            match flag {
                ModFlag::Add => {
                    reject_internal_duplicates(&modification.values, syntax)?;
                    match cur.element_mut(&attr) {
                        None => {
                            let mut new_element = modification.clone();
                            new_element.flags = 0;
                            cur.push_element(new_element);
                        }
                        Some(existing) => {
                            for value in &modification.values {
                                if existing
                                    .values
                                    .iter()
                                    .any(|v| syntax.values_equal(v, value))
                                {
                                    return Err(Error::AttributeOrValueExists(attr.clone()));
                                }
                            }
                            existing.values.extend(modification.values.iter().cloned());
                        }
                    }
                    if self.metadata.indexed_attributes.iter().any(|a| a.eq_ignore_ascii_case(&attr)) {
                        for value in &modification.values {
                            let canonical = (syntax.canonicalize)(value);
                            let canonical_text =
                                String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                            dirdb_index::index_add(txn, &attr, &canonical_text, dn)?;
                        }
                    }
                }
                ModFlag::Replace => {
                    reject_internal_duplicates(&modification.values, syntax)?;
                    let indexed = self
                        .metadata
                        .indexed_attributes
                        .iter()
                        .any(|a| a.eq_ignore_ascii_case(&attr));
                    if let Some(old) = cur.remove_element(&attr) {
                        if indexed {
                            for value in &old.values {
                                let canonical = (syntax.canonicalize)(value);
                                let canonical_text =
                                    String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                                dirdb_index::index_del(txn, &attr, &canonical_text, dn)?;
                            }
                        }
                    }
                    if !modification.values.is_empty() {
                        let mut new_element = modification.clone();
                        new_element.flags = 0;
                        cur.push_element(new_element);
                        if indexed {
                            for value in &modification.values {
                                let canonical = (syntax.canonicalize)(value);
                                let canonical_text =
                                    String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                                dirdb_index::index_add(txn, &attr, &canonical_text, dn)?;
                            }
                        }
                    }
                }
                ModFlag::Delete => {
                    let indexed = self
                        .metadata
                        .indexed_attributes
                        .iter()
                        .any(|a| a.eq_ignore_ascii_case(&attr));
                    if modification.values.is_empty() {
                        let old = cur
                            .remove_element(&attr)
                            .ok_or_else(|| Error::NoSuchAttribute(attr.clone()))?;
                        if indexed {
                            for value in &old.values {
                                let canonical = (syntax.canonicalize)(value);
                                let canonical_text =
                                    String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                                dirdb_index::index_del_value(txn, &attr, &canonical_text, dn)?;
                            }
                        }
                    } else {
                        for value in &modification.values {
                            let element = cur
                                .element_mut(&attr)
                                .ok_or_else(|| Error::NoSuchAttribute(attr.clone()))?;
                            let pos = element
                                .values
                                .iter()
                                .position(|v| syntax.values_equal(v, value))
                                .ok_or_else(|| Error::NoSuchAttribute(attr.clone()))?;
                            element.values.remove(pos);
                            if indexed {
                                let canonical = (syntax.canonicalize)(value);
                                let canonical_text =
                                    String::from_utf8_lossy(canonical.as_bytes()).into_owned();
                                dirdb_index::index_del_value(txn, &attr, &canonical_text, dn)?;
                            }
                            if cur.element(&attr).map(|e| e.values.is_empty()) == Some(true) {
                                cur.remove_element(&attr);
                            }
                        }
                    }
                }
            }
        }

        let key = dirdb_store::store_key(dn);
        txn.put(&key, &dirdb_codec::pack(&cur), PutMode::Replace)?;
        Ok(())
    }

    /// §4.F Rename. A single transaction encloses both the add of the new
    /// DN and the delete of the old one, so cancel/commit alone decides
    /// the outcome — no best-effort cleanup outside it (§9).
    pub fn rename(&mut self, old: &Dn, new: &Dn) -> Result<()> {
        self.with_txn(|engine, txn| {
            let result = engine.rename_internal(txn, old, new).and_then(|_| {
                engine.bump_sequence(txn)?;
                engine.reindex_if_schema_affecting(txn, old)?;
                engine.reindex_if_schema_affecting(txn, new)
            });
            if result.is_err() {
                warn!(old = old.as_str(), new = new.as_str(), "rename failed; cancelling");
            }
            result
        })
    }

    /// Adds the renamed record and removes the old one, without touching
    /// the sequence number — a rename is one logical write and bumps the
    /// sequence exactly once, not once per internal add/delete.
    fn rename_internal(&mut self, txn: &mut Transaction, old: &Dn, new: &Dn) -> Result<()> {
        let key = dirdb_store::store_key(old);
        let record = txn
            .get(&key)?
            .ok_or_else(|| Error::NoSuchObject(old.as_str().to_string()))?;
        let mut renamed = dirdb_codec::unpack(&record)?;
        renamed.dn = new.clone();

        if old == new {
            // Case-only change: the store key is identical, so the old
            // record must be deleted before the renamed one is re-added.
            self.delete_internal(txn, old)?;
            self.add_internal(txn, &renamed)?;
        } else {
            self.add_internal(txn, &renamed)?;
            self.delete_internal(txn, old)?;
        }
        Ok(())
    }

    /// Bump the sequence number (unless the DN is `@BASEINFO`) and trigger
    /// a full reindex if the DN is schema-affecting.
    fn post_modify(&mut self, txn: &mut Transaction, dn: &Dn) -> Result<()> {
        if dn.canonical() != dirdb_core::dn::BASEINFO {
            self.bump_sequence(txn)?;
        }
        self.reindex_if_schema_affecting(txn, dn)
    }

    fn bump_sequence(&mut self, txn: &mut Transaction) -> Result<()> {
        sequence::bump(txn)?;
        Ok(())
    }

    fn reindex_if_schema_affecting(&mut self, txn: &mut Transaction, dn: &Dn) -> Result<()> {
        if dn.canonical() == dirdb_core::dn::ATTRIBUTES || dn.canonical() == dirdb_core::dn::INDEXLIST {
            self.metadata.refresh(txn)?;
            let registry = &self.metadata.registry;
            let indexed = self.metadata.indexed_attributes.clone();
            dirdb_index::reindex(txn, &indexed, |attr, value| {
                let syntax = registry.syntax_for(attr);
                let canonical = (syntax.canonicalize)(value);
                String::from_utf8_lossy(canonical.as_bytes()).into_owned()
            })?;
            info!(dn = dn.as_str(), "schema-affecting write triggered reindex");
        }
        Ok(())
    }
}

fn validate_special_dn(entry: &Entry) -> Result<()> {
    if entry.dn.canonical() == dirdb_core::dn::ATTRIBUTES {
        if let Some(element) = entry.element("attributeTypes") {
            for value in &element.values {
                let text = String::from_utf8_lossy(value.as_bytes());
                dirdb_schema::attr_value::parse_attribute_tuple(&text)?;
            }
        }
    }
    Ok(())
}

fn reject_internal_duplicates(values: &[Value], syntax: dirdb_schema::Syntax) -> Result<()> {
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if syntax.values_equal(&values[i], &values[j]) {
                return Err(Error::AttributeOrValueExists(
                    "duplicate value in supplied batch".to_string(),
                ));
            }
        }
    }
    Ok(())
}
