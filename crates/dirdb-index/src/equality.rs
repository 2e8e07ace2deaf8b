//! Per-attribute equality indexes (§4.E): `@INDEX:<attr>:<canonical-value>`
//! buckets, each holding the set of DNs of entries carrying that value.

use crate::set::{decode, encode};
use dirdb_core::{Dn, Result};
use dirdb_store::{PutMode, Transaction};

/// Record that `dn` carries `value` for the indexed attribute `attr`.
/// Idempotent: adding the same membership twice is a no-op.
pub fn index_add(txn: &Transaction, attr: &str, canonical_value: &str, dn: &Dn) -> Result<()> {
    let bucket = Dn::index_bucket(attr, canonical_value);
    let key = dirdb_store::store_key(&bucket);
    let mut members = decode(&txn.get(&key)?.unwrap_or_default())?;
    let dn_text = dn.canonical().to_string();
    if !members.contains(&dn_text) {
        members.push(dn_text);
        txn.put(&key, &encode(&members), PutMode::Replace)?;
    }
    Ok(())
}

/// Remove `dn` from the `attr`/`value` bucket, deleting the bucket key
/// entirely if it becomes empty.
pub fn index_del(txn: &Transaction, attr: &str, canonical_value: &str, dn: &Dn) -> Result<()> {
    let bucket = Dn::index_bucket(attr, canonical_value);
    let key = dirdb_store::store_key(&bucket);
    let Some(existing) = txn.get(&key)? else {
        return Ok(());
    };
    let mut members = decode(&existing)?;
    let dn_text = dn.canonical().to_string();
    members.retain(|m| m != &dn_text);
    if members.is_empty() {
        txn.delete(&key)?;
    } else {
        txn.put(&key, &encode(&members), PutMode::Replace)?;
    }
    Ok(())
}

/// Remove a single value's membership without disturbing other values of
/// the same attribute on the same entry — the operation a `Modify` delete
/// of one value performs, as distinct from deleting the whole entry.
pub fn index_del_value(
    txn: &Transaction,
    attr: &str,
    canonical_value: &str,
    dn: &Dn,
) -> Result<()> {
    index_del(txn, attr, canonical_value, dn)
}

/// List the DNs currently in the `attr`/`value` bucket.
pub fn lookup(txn: &Transaction, attr: &str, canonical_value: &str) -> Result<Vec<String>> {
    let bucket = Dn::index_bucket(attr, canonical_value);
    let key = dirdb_store::store_key(&bucket);
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
    fn add_then_lookup_finds_member() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let txn = open_txn(&store);
        let dn = Dn::new("cn=ann,dc=x");
        index_add(&txn, "cn", "ann", &dn).unwrap();
        assert_eq!(lookup(&txn, "cn", "ann").unwrap(), vec!["cn=ann,dc=x".to_string()]);
    }

    #[test]
    fn add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let txn = open_txn(&store);
        let dn = Dn::new("cn=ann,dc=x");
        index_add(&txn, "cn", "ann", &dn).unwrap();
        index_add(&txn, "cn", "ann", &dn).unwrap();
        assert_eq!(lookup(&txn, "cn", "ann").unwrap().len(), 1);
    }

    #[test]
    fn del_removes_member_and_empty_bucket_disappears() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let txn = open_txn(&store);
        let dn = Dn::new("cn=ann,dc=x");
        index_add(&txn, "cn", "ann", &dn).unwrap();
        index_del(&txn, "cn", "ann", &dn).unwrap();
        assert!(lookup(&txn, "cn", "ann").unwrap().is_empty());
        let key = dirdb_store::store_key(&Dn::index_bucket("cn", "ann"));
        assert!(txn.get(&key).unwrap().is_none());
    }

    #[test]
    fn del_of_absent_member_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let txn = open_txn(&store);
        let dn = Dn::new("cn=ann,dc=x");
        index_del(&txn, "cn", "ann", &dn).unwrap();
        assert!(lookup(&txn, "cn", "ann").unwrap().is_empty());
    }
}
