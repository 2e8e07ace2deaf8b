//! Cache / Metadata Loader (§4.D)
//!
//! Reads and materialises `@ATTRIBUTES`, `@INDEXLIST`, and `@BASEINFO`
//! before every write and before sensitive reads. The loader stamps the
//! last-seen sequence number; if the on-disk value hasn't moved since the
//! last load, the cached view is reused rather than re-parsed.

use dirdb_core::{Dn, Error, Result};
use dirdb_schema::SchemaRegistry;
use dirdb_store::Transaction;
use tracing::debug;

const ATTRIBUTE_TYPES_ELEMENT: &str = "attributeTypes";
const INDEXED_ATTRIBUTE_ELEMENT: &str = "indexedAttribute";
const SEQUENCE_NUMBER_ELEMENT: &str = "sequenceNumber";
const WHEN_CHANGED_ELEMENT: &str = "whenChanged";

/// The backend's in-memory view of the three metadata entries.
pub struct Metadata {
    pub registry: SchemaRegistry,
    pub indexed_attributes: Vec<String>,
    pub sequence_number: u64,
    pub when_changed: Option<String>,
    loaded: bool,
}

impl Metadata {
    pub fn new() -> Self {
        Metadata {
            registry: SchemaRegistry::with_well_known(),
            indexed_attributes: Vec::new(),
            sequence_number: 0,
            when_changed: None,
            loaded: false,
        }
    }

    /// Refresh the cached view from the store if the on-disk sequence
    /// number has moved since the last load (or this is the first load).
    /// Failure to load is fatal to the current operation.
    pub fn refresh(&mut self, txn: &Transaction) -> Result<()> {
        let on_disk_seq = read_sequence_number(txn)?;
        if self.loaded && on_disk_seq == self.sequence_number {
            return Ok(());
        }

        let mut registry = SchemaRegistry::with_well_known();
        for tuple in read_values(txn, dirdb_core::dn::ATTRIBUTES, ATTRIBUTE_TYPES_ELEMENT)? {
            let desc = dirdb_schema::attr_value::parse_attribute_tuple(&tuple)?;
            registry.register(desc);
        }
        let indexed_attributes =
            read_values(txn, dirdb_core::dn::INDEXLIST, INDEXED_ATTRIBUTE_ELEMENT)?;

        let (sequence_number, when_changed) = read_base_info(txn)?;

        debug!(
            sequence_number,
            indexed = indexed_attributes.len(),
            "metadata cache refreshed"
        );

        self.registry = registry;
        self.indexed_attributes = indexed_attributes;
        self.sequence_number = sequence_number;
        self.when_changed = when_changed;
        self.loaded = true;
        Ok(())
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

fn read_values(txn: &Transaction, dn_text: &str, element_name: &str) -> Result<Vec<String>> {
    let dn = Dn::new(dn_text);
    let key = dirdb_store::store_key(&dn);
    let Some(record) = txn.get(&key)? else {
        return Ok(Vec::new());
    };
    let entry = dirdb_codec::unpack(&record)?;
    let Some(element) = entry.element(element_name) else {
        return Ok(Vec::new());
    };
    Ok(element
        .values
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect())
}

fn read_sequence_number(txn: &Transaction) -> Result<u64> {
    let dn = Dn::new(dirdb_core::dn::BASEINFO);
    let key = dirdb_store::store_key(&dn);
    let Some(record) = txn.get(&key)? else {
        return Ok(0);
    };
    let entry = dirdb_codec::unpack(&record)?;
    let Some(element) = entry.element(SEQUENCE_NUMBER_ELEMENT) else {
        return Ok(0);
    };
    let Some(value) = element.values.first() else {
        return Ok(0);
    };
    String::from_utf8_lossy(value.as_bytes())
        .parse()
        .map_err(|_| Error::Operations("corrupt sequenceNumber in @BASEINFO".to_string()))
}

fn read_base_info(txn: &Transaction) -> Result<(u64, Option<String>)> {
    let dn = Dn::new(dirdb_core::dn::BASEINFO);
    let key = dirdb_store::store_key(&dn);
    let Some(record) = txn.get(&key)? else {
        return Ok((0, None));
    };
    let entry = dirdb_codec::unpack(&record)?;
    let seq = entry
        .element(SEQUENCE_NUMBER_ELEMENT)
        .and_then(|e| e.values.first())
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_else(|| "0".to_string())
        .parse()
        .map_err(|_| Error::Operations("corrupt sequenceNumber in @BASEINFO".to_string()))?;
    let when_changed = entry
        .element(WHEN_CHANGED_ELEMENT)
        .and_then(|e| e.values.first())
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    Ok((seq, when_changed))
}
