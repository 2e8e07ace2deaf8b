//! One-level (parent → immediate children) index (§4.E):
//! `@IDXONE:<parent-dn>` holds the set of immediate child DNs, used to
//! answer one-level searches without scanning every entry.

use crate::set::{decode, encode};
use dirdb_core::{Dn, Result};
use dirdb_store::{PutMode, Transaction};

/// Record `child` as an immediate child of `parent`.
pub fn index_one_add(txn: &Transaction, parent: &Dn, child: &Dn) -> Result<()> {
    let slot = Dn::idxone(parent);
    let key = dirdb_store::store_key(&slot);
    let mut members = decode(&txn.get(&key)?.unwrap_or_default())?;
    let child_text = child.canonical().to_string();
    if !members.contains(&child_text) {
        members.push(child_text);
        txn.put(&key, &encode(&members), PutMode::Replace)?;
    }
    Ok(())
}

/// Remove `child` from `parent`'s slot, deleting the slot if it becomes
/// empty.
pub fn index_one_del(txn: &Transaction, parent: &Dn, child: &Dn) -> Result<()> {
    let slot = Dn::idxone(parent);
    let key = dirdb_store::store_key(&slot);
    let Some(existing) = txn.get(&key)? else {
        return Ok(());
    };
    let mut members = decode(&existing)?;
    let child_text = child.canonical().to_string();
    members.retain(|m| m != &child_text);
    if members.is_empty() {
        txn.delete(&key)?;
    } else {
        txn.put(&key, &encode(&members), PutMode::Replace)?;
    }
    Ok(())
}

/// List the immediate children currently recorded for `parent`.
pub fn children_of(txn: &Transaction, parent: &Dn) -> Result<Vec<String>> {
    let slot = Dn::idxone(parent);
    let key = dirdb_store::store_key(&slot);
    decode(&txn.get(&key)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use dirdb_store::{DatabaseConfig, Store};

    fn open_txn(store: &Arc<Store>) -> Transaction {
        let mut txn = Transaction::new(Arc::clone(store));
        txn.begin().unwrap();
        txn
    }

    #[test]
    fn add_then_children_of_finds_child() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let txn = open_txn(&store);
        let parent = Dn::new("dc=x");
        let child = Dn::new("cn=ann,dc=x");
        index_one_add(&txn, &parent, &child).unwrap();
        assert_eq!(children_of(&txn, &parent).unwrap(), vec!["cn=ann,dc=x".to_string()]);
    }

    #[test]
    fn del_removes_child_and_empty_slot_disappears() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let txn = open_txn(&store);
        let parent = Dn::new("dc=x");
        let child = Dn::new("cn=ann,dc=x");
        index_one_add(&txn, &parent, &child).unwrap();
        index_one_del(&txn, &parent, &child).unwrap();
        assert!(children_of(&txn, &parent).unwrap().is_empty());
        let key = dirdb_store::store_key(&Dn::idxone(&parent));
        assert!(txn.get(&key).unwrap().is_none());
    }
}
