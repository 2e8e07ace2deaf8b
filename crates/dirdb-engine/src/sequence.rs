//! Sequence & Timestamp (§4.H)
//!
//! `@BASEINFO.sequenceNumber` is read, incremented by one, and written
//! back inside the same transaction as the triggering operation.
//! `whenChanged` is stamped with the current UTC time in the fixed
//! `YYYYmmddHHMMSS.0Z` form.

use chrono::Utc;
use dirdb_core::{Dn, Element, Entry, Result, Value};
use dirdb_store::{PutMode, ReadSnapshot, Transaction};

const SEQUENCE_NUMBER_ELEMENT: &str = "sequenceNumber";
const WHEN_CHANGED_ELEMENT: &str = "whenChanged";

/// The current sequence number (0 if `@BASEINFO` hasn't been written yet).
pub fn highest(txn: &Transaction) -> Result<u64> {
    load(txn).map(|(seq, _)| seq)
}

/// The current sequence number, read from a [`ReadSnapshot`] rather than a
/// write transaction — usable against a read-only database, where opening
/// a write transaction is rejected outright (§4.G).
pub fn highest_readonly(snapshot: &ReadSnapshot) -> Result<u64> {
    let dn = Dn::new(dirdb_core::dn::BASEINFO);
    let key = dirdb_store::store_key(&dn);
    let Some(record) = snapshot.get(&key)? else {
        return Ok(0);
    };
    let entry = dirdb_codec::unpack(&record)?;
    Ok(parse_base_info(&entry).0)
}

/// `highest() + 1`, without mutating anything.
pub fn next(txn: &Transaction) -> Result<u64> {
    Ok(highest(txn)? + 1)
}

/// The `whenChanged` timestamp of the last bump, if any.
pub fn highest_timestamp(txn: &Transaction) -> Result<Option<String>> {
    load(txn).map(|(_, when)| when)
}

/// Bump the sequence number by one and stamp `whenChanged` with the
/// current UTC time, writing `@BASEINFO` back inside the caller's
/// transaction. Returns the new sequence number.
pub fn bump(txn: &Transaction) -> Result<u64> {
    let (current, _) = load(txn)?;
    let new_seq = current + 1;
    let when_changed = format!("{}.0Z", Utc::now().format("%Y%m%d%H%M%S"));

    let mut entry = Entry::new(Dn::new(dirdb_core::dn::BASEINFO));
    entry.push_element(Element::new(
        SEQUENCE_NUMBER_ELEMENT,
        vec![Value::from(new_seq.to_string())],
    ));
    entry.push_element(Element::new(
        WHEN_CHANGED_ELEMENT,
        vec![Value::from(when_changed)],
    ));

    let key = dirdb_store::store_key(&entry.dn);
    txn.put(&key, &dirdb_codec::pack(&entry), PutMode::Replace)?;
    Ok(new_seq)
}

fn load(txn: &Transaction) -> Result<(u64, Option<String>)> {
    let dn = Dn::new(dirdb_core::dn::BASEINFO);
    let key = dirdb_store::store_key(&dn);
    let Some(record) = txn.get(&key)? else {
        return Ok((0, None));
    };
    let entry = dirdb_codec::unpack(&record)?;
    Ok(parse_base_info(&entry))
}

fn parse_base_info(entry: &Entry) -> (u64, Option<String>) {
    let seq = entry
        .element(SEQUENCE_NUMBER_ELEMENT)
        .and_then(|e| e.values.first())
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_else(|| "0".to_string())
        .parse()
        .unwrap_or(0);
    let when = entry
        .element(WHEN_CHANGED_ELEMENT)
        .and_then(|e| e.values.first())
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    (seq, when)
}
