//! Scenarios S1-S6 driven entirely through the public [`Dirdb`] facade.

use dirdb::{Dirdb, Error, ModFlag};
use dirdb_core::{Dn, Element, Entry, Value};

fn mod_element(flag: ModFlag, name: &str, values: &[&str]) -> Element {
    let code = match flag {
        ModFlag::Add => 0,
        ModFlag::Delete => 1,
        ModFlag::Replace => 2,
    };
    let mut el = Element::new(name, values.iter().map(|v| Value::from(*v)).collect());
    el.flags = code;
    el
}

fn entry_with_cn(dn: &str, cn: &[&str]) -> Entry {
    let mut e = Entry::new(Dn::new(dn));
    e.push_element(Element::new(
        "cn",
        cn.iter().map(|v| Value::from(*v)).collect(),
    ));
    e
}

fn open_db() -> (tempfile::TempDir, Dirdb) {
    let dir = tempfile::tempdir().unwrap();
    let db = Dirdb::open(dir.path().join("t.db")).unwrap();
    (dir, db)
}

#[test]
fn s1_through_s4_track_sequence_across_the_write_path() {
    let (_dir, mut db) = open_db();

    // S1
    db.add(entry_with_cn("cn=a,dc=x", &["a"])).unwrap();
    assert_eq!(db.sequence_number().unwrap(), 1);

    // S2
    db.modify(
        &Dn::new("cn=a,dc=x"),
        vec![mod_element(ModFlag::Add, "cn", &["b"])],
    )
    .unwrap();
    assert_eq!(db.sequence_number().unwrap(), 2);

    // S3
    db.modify(
        &Dn::new("cn=a,dc=x"),
        vec![mod_element(ModFlag::Delete, "cn", &["a"])],
    )
    .unwrap();
    assert_eq!(db.sequence_number().unwrap(), 3);

    // S4
    db.rename(&Dn::new("cn=a,dc=x"), &Dn::new("cn=c,dc=x"))
        .unwrap();
    assert_eq!(db.sequence_number().unwrap(), 4);

    // Only the new DN exists.
    assert!(matches!(
        db.delete(&Dn::new("cn=a,dc=x")),
        Err(Error::NoSuchObject(_))
    ));
    db.delete(&Dn::new("cn=c,dc=x")).unwrap();
}

#[test]
fn s5_duplicate_add_is_rejected_and_sequence_is_unchanged() {
    let (_dir, mut db) = open_db();
    db.add(entry_with_cn("cn=a,dc=x", &["a"])).unwrap();
    assert_eq!(db.sequence_number().unwrap(), 1);

    let err = db.add(entry_with_cn("cn=a,dc=x", &["a"])).unwrap_err();
    assert!(matches!(err, Error::EntryAlreadyExists(_)));
    assert_eq!(db.sequence_number().unwrap(), 1);
}

#[test]
fn s6_modify_replace_with_duplicate_values_is_rejected() {
    let (_dir, mut db) = open_db();
    db.add(entry_with_cn("cn=a,dc=x", &["a"])).unwrap();

    let err = db
        .modify(
            &Dn::new("cn=a,dc=x"),
            vec![mod_element(ModFlag::Replace, "cn", &["q", "q"])],
        )
        .unwrap_err();
    assert!(matches!(err, Error::AttributeOrValueExists(_)));
    // Entry is unchanged: a later add of "q" against the same attribute
    // still succeeds, which would fail with AttributeOrValueExists if the
    // rejected replace had partially landed.
    db.modify(
        &Dn::new("cn=a,dc=x"),
        vec![mod_element(ModFlag::Add, "cn", &["q"])],
    )
    .unwrap();
}

#[test]
fn explicit_transaction_cancel_discards_every_write_inside_it() {
    let (_dir, mut db) = open_db();
    db.add(entry_with_cn("cn=a,dc=x", &["a"])).unwrap();
    assert_eq!(db.sequence_number().unwrap(), 1);

    db.start_transaction().unwrap();
    db.add(entry_with_cn("cn=b,dc=x", &["b"])).unwrap();
    db.cancel_transaction().unwrap();

    assert_eq!(db.sequence_number().unwrap(), 1);
    assert!(matches!(
        db.delete(&Dn::new("cn=b,dc=x")),
        Err(Error::NoSuchObject(_))
    ));
}

#[test]
fn explicit_transaction_end_commits_every_write_inside_it() {
    let (_dir, mut db) = open_db();

    db.start_transaction().unwrap();
    db.add(entry_with_cn("cn=a,dc=x", &["a"])).unwrap();
    db.add(entry_with_cn("cn=b,dc=x", &["b"])).unwrap();
    db.end_transaction().unwrap();

    assert_eq!(db.sequence_number().unwrap(), 2);
    db.delete(&Dn::new("cn=a,dc=x")).unwrap();
    db.delete(&Dn::new("cn=b,dc=x")).unwrap();
}
