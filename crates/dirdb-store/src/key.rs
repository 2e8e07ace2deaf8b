//! Store-key derivation (§4.B).
//!
//! Every entry, and every special bookkeeping pseudo-entry, is addressed
//! under the underlying key-value engine by a single byte string:
//! `"DN=" || casefold(dn) || '\0'`. Special DNs (`@BASEINFO`, `@ATTRIBUTES`,
//! ...) are not casefolded — [`Dn::canonical`] already returns the raw form
//! for those, so this module never has to special-case them itself.

use dirdb_core::Dn;

/// Build the store key for `dn`.
pub fn store_key(dn: &Dn) -> Vec<u8> {
    let mut key = Vec::with_capacity(dn.canonical().len() + 4);
    key.extend_from_slice(b"DN=");
    key.extend_from_slice(dn.canonical().as_bytes());
    key.push(0);
    key
}

/// Render a store key back to a human-readable string for error messages.
/// Lossy and best-effort — never used on the read/write hot path.
pub fn describe_key(key: &[u8]) -> String {
    let trimmed = key.strip_prefix(b"DN=").unwrap_or(key);
    let trimmed = trimmed.strip_suffix(&[0u8]).unwrap_or(trimmed);
    String::from_utf8_lossy(trimmed).into_owned()
}
