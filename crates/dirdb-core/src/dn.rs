//! Distinguished names
//!
//! A [`Dn`] is either a *normal* DN — identifying a user entry, folded to a
//! canonical case by the DN syntax — or a *special* DN beginning with `@`,
//! reserved for metadata and index entries (`@BASEINFO`, `@ATTRIBUTES`,
//! `@INDEXLIST`, `@INDEX:<attr>:<value>`, `@IDXONE:<parent-dn>`). Special
//! DNs are never casefolded; they are carried and compared verbatim.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// `@BASEINFO` — sequence number and last-change timestamp.
pub const BASEINFO: &str = "@BASEINFO";
/// `@ATTRIBUTES` — schema attribute declarations.
pub const ATTRIBUTES: &str = "@ATTRIBUTES";
/// `@INDEXLIST` — the set of equality-indexed attributes.
pub const INDEXLIST: &str = "@INDEXLIST";

/// A distinguished name.
///
/// Equality, hashing, and ordering are all defined over [`Dn::canonical`],
/// so two `Dn`s that differ only in the case of a normal DN compare equal —
/// this is what the Key Builder (§4.B) relies on for store-key determinism.
#[derive(Debug, Clone)]
pub struct Dn {
    raw: String,
    canonical: String,
}

impl Dn {
    /// Build a `Dn` from its textual form, case-folding it if it is a
    /// normal DN. Special DNs (leading `@`) are left verbatim.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let canonical = if is_special_text(&raw) {
            raw.clone()
        } else {
            casefold(&raw)
        };
        Dn { raw, canonical }
    }

    /// The DN exactly as given to [`Dn::new`].
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The case-folded form used for comparison and key derivation.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Special DNs begin with `@` (`@BASEINFO`, `@ATTRIBUTES`, `@INDEXLIST`,
    /// `@INDEX:...`, `@IDXONE:...`).
    pub fn is_special(&self) -> bool {
        is_special_text(&self.raw)
    }

    /// Parent DN: the text after the first unescaped `,` separating the
    /// leading RDN from the rest. Returns `None` for a single-RDN DN or for
    /// special DNs (the one-level index does not apply to them).
    pub fn parent(&self) -> Option<Dn> {
        if self.is_special() {
            return None;
        }
        first_unescaped_comma(&self.raw).map(|idx| Dn::new(self.raw[idx + 1..].trim()))
    }

    /// Build the `@INDEX:<attr>:<canonical-value>` special DN for an
    /// equality index bucket.
    pub fn index_bucket(attr: &str, canonical_value: &str) -> Dn {
        Dn::new(format!("@INDEX:{}:{}", attr.to_ascii_lowercase(), canonical_value))
    }

    /// Build the `@IDXONE:<parent-dn>` special DN for a one-level index
    /// slot.
    pub fn idxone(parent: &Dn) -> Dn {
        Dn::new(format!("@IDXONE:{}", parent.canonical()))
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Dn {}

impl Hash for Dn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

fn is_special_text(raw: &str) -> bool {
    raw.starts_with('@')
}

/// Case-fold a normal DN: split on unescaped commas, trim whitespace
/// around each RDN and around the `attr=value` separator within it,
/// lowercase ASCII, rejoin with `,`. This is the DN syntax's
/// canonicalisation, used both for Dn equality and for Key Builder output.
pub fn casefold(raw: &str) -> String {
    split_rdns(raw)
        .into_iter()
        .map(|rdn| {
            let rdn = rdn.trim();
            match rdn.find('=') {
                Some(eq) => {
                    let (attr, value) = rdn.split_at(eq);
                    let value = &value[1..];
                    format!(
                        "{}={}",
                        attr.trim().to_ascii_lowercase(),
                        value.trim().to_ascii_lowercase()
                    )
                }
                None => rdn.to_ascii_lowercase(),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn split_rdns(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    loop {
        match first_unescaped_comma(&raw[start..]) {
            Some(idx) => {
                parts.push(raw[start..start + idx].to_string());
                start += idx + 1;
            }
            None => {
                parts.push(raw[start..].to_string());
                break;
            }
        }
    }
    parts
}

fn first_unescaped_comma(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b',' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_dn_is_casefolded() {
        let dn = Dn::new("CN=Alice,DC=Example,DC=Com");
        assert_eq!(dn.canonical(), "cn=alice,dc=example,dc=com");
        assert_eq!(dn.as_str(), "CN=Alice,DC=Example,DC=Com");
    }

    #[test]
    fn special_dn_is_verbatim() {
        let dn = Dn::new("@ATTRIBUTES");
        assert!(dn.is_special());
        assert_eq!(dn.canonical(), "@ATTRIBUTES");
    }

    #[test]
    fn equality_is_case_insensitive_for_normal_dns() {
        assert_eq!(Dn::new("cn=a,dc=x"), Dn::new("CN=A,DC=X"));
        assert_ne!(Dn::new("cn=a,dc=x"), Dn::new("cn=b,dc=x"));
    }

    #[test]
    fn special_dns_are_never_case_folded() {
        // Case differences on a special DN are NOT collapsed: they are
        // verbatim, distinct index entries rely on exact text.
        assert_ne!(Dn::new("@INDEX:cn:A"), Dn::new("@INDEX:cn:a"));
    }

    #[test]
    fn parent_splits_on_first_unescaped_comma() {
        let dn = Dn::new("cn=a,dc=x,dc=com");
        let parent = dn.parent().unwrap();
        assert_eq!(parent.canonical(), "dc=x,dc=com");
    }

    #[test]
    fn parent_respects_escaped_commas() {
        let dn = Dn::new(r"cn=Smith\, John,dc=x");
        let parent = dn.parent().unwrap();
        assert_eq!(parent.canonical(), "dc=x");
    }

    #[test]
    fn single_rdn_has_no_parent() {
        let dn = Dn::new("dc=x");
        assert!(dn.parent().is_none());
    }

    #[test]
    fn special_dn_has_no_parent() {
        assert!(Dn::new("@BASEINFO").parent().is_none());
    }

    #[test]
    fn index_bucket_and_idxone_helpers() {
        let bucket = Dn::index_bucket("CN", "alice");
        assert_eq!(bucket.canonical(), "@INDEX:cn:alice");

        let parent = Dn::new("dc=x");
        let slot = Dn::idxone(&parent);
        assert_eq!(slot.canonical(), "@IDXONE:dc=x");
    }

    #[test]
    fn casefold_trims_whitespace_around_components() {
        assert_eq!(casefold(" CN = A , DC = X "), "cn=a,dc=x");
    }
}
