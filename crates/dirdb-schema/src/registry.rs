//! Schema attribute registry
//!
//! A sorted table of attribute descriptors, looked up by case-insensitive
//! name via binary search. A leading wildcard entry (name `*`), if present,
//! is reserved as a default and excluded from the binary-search range
//! (§4.C).

use crate::syntax::{Syntax, DIRECTORY_STRING, DN, OBJECT_CLASS, OCTET_STRING};

/// Attribute descriptor flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrFlags(u32);

impl AttrFlags {
    /// May not be overwritten or removed.
    pub const FIXED: AttrFlags = AttrFlags(1 << 0);
    /// The registry owns the name's storage (vestigial in Rust, where
    /// every descriptor owns its `String`; kept for fidelity with the
    /// source model's allocator bookkeeping).
    pub const ALLOCATED: AttrFlags = AttrFlags(1 << 1);
    /// No flags set.
    pub const NONE: AttrFlags = AttrFlags(0);

    /// Build a flag set from its raw decimal bitmask (as stored in
    /// `@ATTRIBUTES` tuples).
    pub fn from_bits(bits: u32) -> Self {
        AttrFlags(bits)
    }

    /// Combine two flag sets.
    pub fn union(self, other: AttrFlags) -> AttrFlags {
        AttrFlags(self.0 | other.0)
    }

    /// Whether `flag` is set.
    pub fn contains(self, flag: AttrFlags) -> bool {
        self.0 & flag.0 == flag.0
    }
}

/// `{ name, flags, syntax }` — one registered attribute.
#[derive(Clone)]
pub struct AttributeDescriptor {
    /// Attribute name as registered (display case preserved).
    pub name: String,
    /// FIXED / ALLOCATED flags.
    pub flags: AttrFlags,
    /// The syntax governing this attribute's values.
    pub syntax: Syntax,
}

impl AttributeDescriptor {
    fn lower(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Sorted, case-insensitive attribute descriptor table.
pub struct SchemaRegistry {
    /// Sorted by case-insensitive name; the wildcard `*` entry, if
    /// present, is always stored separately in `wildcard`.
    entries: Vec<AttributeDescriptor>,
    wildcard: Option<AttributeDescriptor>,
}

impl SchemaRegistry {
    /// An empty registry with no descriptors registered.
    pub fn empty() -> Self {
        SchemaRegistry {
            entries: Vec::new(),
            wildcard: None,
        }
    }

    /// A registry pre-populated with the well-known attribute set
    /// registered at open time (§3 Lifecycle): `dn`, `distinguishedName`,
    /// `cn`, `dc`, `ou`, `objectClass`, all FIXED.
    pub fn with_well_known() -> Self {
        let mut reg = Self::empty();
        let fixed = |name: &str, syntax: Syntax| AttributeDescriptor {
            name: name.to_string(),
            flags: AttrFlags::FIXED,
            syntax,
        };
        for desc in [
            fixed("dn", DN),
            fixed("distinguishedName", DN),
            fixed("cn", DIRECTORY_STRING),
            fixed("dc", DIRECTORY_STRING),
            fixed("ou", DIRECTORY_STRING),
            fixed("objectClass", OBJECT_CLASS),
        ] {
            reg.register(desc);
        }
        reg
    }

    fn search(&self, name: &str) -> Result<usize, usize> {
        let lower = name.to_ascii_lowercase();
        self.entries.binary_search_by(|e| e.lower().cmp(&lower))
    }

    /// Register (insert or update) an attribute descriptor.
    ///
    /// - Name absent: insert in sort position.
    /// - Name present and existing is FIXED: silently succeed, ignoring
    ///   the new descriptor.
    /// - Name present otherwise: replace flags + syntax in place.
    /// - Name `*`: stored as the wildcard default, not part of the sorted
    ///   binary-search range.
    pub fn register(&mut self, desc: AttributeDescriptor) {
        if desc.name == "*" {
            self.wildcard = Some(desc);
            return;
        }
        match self.search(&desc.name) {
            Ok(idx) => {
                if self.entries[idx].flags.contains(AttrFlags::FIXED) {
                    return;
                }
                self.entries[idx] = desc;
            }
            Err(idx) => self.entries.insert(idx, desc),
        }
    }

    /// Look up a descriptor by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<&AttributeDescriptor> {
        if name == "*" {
            return self.wildcard.as_ref();
        }
        self.search(name).ok().map(|idx| &self.entries[idx])
    }

    /// Resolve the syntax to use for `name`: the registered descriptor's
    /// syntax, the wildcard default's syntax, or [`OCTET_STRING`] if
    /// neither matches (§4.C).
    pub fn syntax_for(&self, name: &str) -> Syntax {
        if let Some(desc) = self.search(name).ok().map(|idx| &self.entries[idx]) {
            return desc.syntax;
        }
        if let Some(wildcard) = &self.wildcard {
            return wildcard.syntax;
        }
        OCTET_STRING
    }

    /// Remove a descriptor. Refuses (returns `false`) if it is FIXED or
    /// absent.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.search(name) {
            Ok(idx) => {
                if self.entries[idx].flags.contains(AttrFlags::FIXED) {
                    false
                } else {
                    self.entries.remove(idx);
                    true
                }
            }
            Err(_) => false,
        }
    }

    /// Whether `name` is a currently-registered attribute.
    pub fn contains(&self, name: &str) -> bool {
        self.search(name).is_ok()
    }

    /// Iterate descriptors in sorted order (wildcard excluded).
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::OCTET_STRING;

    fn desc(name: &str) -> AttributeDescriptor {
        AttributeDescriptor {
            name: name.to_string(),
            flags: AttrFlags::NONE,
            syntax: OCTET_STRING,
        }
    }

    #[test]
    fn well_known_attributes_are_fixed() {
        let reg = SchemaRegistry::with_well_known();
        assert!(reg.find("cn").unwrap().flags.contains(AttrFlags::FIXED));
        assert!(!reg.remove("cn"));
        assert!(reg.contains("CN")); // case-insensitive
    }

    #[test]
    fn register_ignores_order_of_insertion() {
        let mut a = SchemaRegistry::empty();
        for n in ["zebra", "apple", "mango"] {
            a.register(desc(n));
        }
        let mut b = SchemaRegistry::empty();
        for n in ["mango", "zebra", "apple"] {
            b.register(desc(n));
        }
        let names_a: Vec<_> = a.iter().map(|d| d.name.clone()).collect();
        let names_b: Vec<_> = b.iter().map(|d| d.name.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(names_a, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn fixed_entries_cannot_be_overwritten() {
        let mut reg = SchemaRegistry::with_well_known();
        reg.register(AttributeDescriptor {
            name: "cn".to_string(),
            flags: AttrFlags::NONE,
            syntax: OCTET_STRING,
        });
        // still directoryString, not octetString
        assert_eq!(reg.find("cn").unwrap().syntax.name, "directoryString");
    }

    #[test]
    fn non_fixed_entries_are_replaced_in_place() {
        let mut reg = SchemaRegistry::empty();
        reg.register(desc("mail"));
        assert_eq!(reg.find("mail").unwrap().syntax.name, "octetString");
        reg.register(AttributeDescriptor {
            name: "mail".to_string(),
            flags: AttrFlags::NONE,
            syntax: crate::syntax::DIRECTORY_STRING,
        });
        assert_eq!(reg.find("mail").unwrap().syntax.name, "directoryString");
    }

    #[test]
    fn remove_refuses_missing_and_fixed() {
        let mut reg = SchemaRegistry::with_well_known();
        assert!(!reg.remove("cn"));
        assert!(!reg.remove("does-not-exist"));
        reg.register(desc("custom"));
        assert!(reg.remove("custom"));
        assert!(!reg.contains("custom"));
    }

    #[test]
    fn wildcard_default_excluded_from_binary_search() {
        let mut reg = SchemaRegistry::empty();
        reg.register(AttributeDescriptor {
            name: "*".to_string(),
            flags: AttrFlags::NONE,
            syntax: crate::syntax::DIRECTORY_STRING,
        });
        assert!(reg.find("*").is_some());
        assert_eq!(reg.iter().count(), 0);
        // unregistered names fall back to the wildcard's syntax
        assert_eq!(reg.syntax_for("unregistered").name, "directoryString");
    }

    #[test]
    fn default_syntax_is_octet_string_when_nothing_matches() {
        let reg = SchemaRegistry::empty();
        assert_eq!(reg.syntax_for("whatever").name, "octetString");
    }
}
