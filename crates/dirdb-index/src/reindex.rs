//! Full reindex: drop every existing `@INDEX:*` / `@IDXONE:*` bucket and
//! rebuild them from a scan of every regular entry. Used when the set of
//! indexed attributes changes, or to repair a database after an
//! interrupted run.

use crate::equality::index_add;
use crate::onelevel::index_one_add;
use dirdb_core::{Dn, Result, Value};
use dirdb_store::Transaction;
use tracing::info;

/// Rebuild every index bucket.
///
/// `indexed_attrs` names the attributes to build equality buckets for
/// (the current contents of `@INDEXLIST`). `canonicalize` maps an
/// attribute name and a raw stored value to the canonical text used as the
/// bucket key, mirroring each attribute's declared syntax.
pub fn reindex(
    txn: &Transaction,
    indexed_attrs: &[String],
    canonicalize: impl Fn(&str, &Value) -> String,
) -> Result<()> {
    let all = txn.scan_all()?;

    for (key, _value) in &all {
        if key.starts_with(b"DN=@INDEX:") || key.starts_with(b"DN=@IDXONE:") {
            txn.delete(key)?;
        }
    }

    let mut rebuilt_entries = 0u64;
    for (key, record) in &all {
        if key.starts_with(b"DN=@") {
            continue; // special pseudo-entries are never indexed
        }
        let entry = dirdb_codec::unpack(record)?;
        if let Some(parent) = entry.dn.parent() {
            index_one_add(txn, &parent, &entry.dn)?;
        }
        for attr in indexed_attrs {
            if let Some(element) = entry.element(attr) {
                for value in &element.values {
                    let canonical = canonicalize(attr, value);
                    index_add(txn, attr, &canonical, &entry.dn)?;
                }
            }
        }
        rebuilt_entries += 1;
    }

    info!(entries = rebuilt_entries, indexes = indexed_attrs.len(), "reindex complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::equality::lookup;
    use crate::onelevel::children_of;
    use dirdb_core::{Element, Entry};
    use dirdb_store::{DatabaseConfig, PutMode, Store};

    fn put_entry(txn: &Transaction, entry: &Entry) {
        let key = dirdb_store::store_key(&entry.dn);
        txn.put(&key, &dirdb_codec::pack(entry), PutMode::Insert)
            .unwrap();
    }

    #[test]
    fn reindex_rebuilds_equality_and_one_level_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let mut txn = Transaction::new(Arc::clone(&store));
        txn.begin().unwrap();

        let mut entry = Entry::new(Dn::new("cn=ann,dc=x"));
        entry.push_element(Element::new("cn", vec![Value::from("ann")]));
        put_entry(&txn, &entry);

        reindex(&txn, &["cn".to_string()], |_attr, v| {
            String::from_utf8_lossy(v.as_bytes()).to_ascii_lowercase()
        })
        .unwrap();

        assert_eq!(lookup(&txn, "cn", "ann").unwrap(), vec!["cn=ann,dc=x".to_string()]);
        assert_eq!(
            children_of(&txn, &Dn::new("dc=x")).unwrap(),
            vec!["cn=ann,dc=x".to_string()]
        );
    }

    #[test]
    fn reindex_skips_special_pseudo_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(&dir.path().join("t.db"), DatabaseConfig::default()).unwrap());
        let mut txn = Transaction::new(Arc::clone(&store));
        txn.begin().unwrap();

        let baseinfo = Entry::new(Dn::new("@BASEINFO"));
        put_entry(&txn, &baseinfo);

        reindex(&txn, &[], |_a, _v| String::new()).unwrap();
        // No panic, no bogus index entries for the pseudo-entry itself.
        assert!(children_of(&txn, &Dn::new("dc=x")).unwrap().is_empty());
    }
}
