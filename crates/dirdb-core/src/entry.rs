//! Entries and elements
//!
//! An [`Entry`] is a DN plus an ordered sequence of [`Element`]s. Within one
//! entry, attribute names are unique (case-insensitively); value order
//! inside an element is preserved but carries no semantic rank (§3).

use crate::dn::Dn;
use crate::value::Value;
use std::collections::HashSet;

/// One attribute within an entry: name, flags, and its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Attribute name, compared case-insensitively.
    pub name: String,
    /// Reserved flags field, carried opaquely by the write path.
    pub flags: u32,
    /// Values in the order they were supplied.
    pub values: Vec<Value>,
}

impl Element {
    /// Build a new element with no flags set.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Element {
            name: name.into(),
            flags: 0,
            values,
        }
    }

    /// Case-insensitive name match.
    pub fn name_eq(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

/// A directory entry: a DN plus its attribute elements.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The entry's distinguished name.
    pub dn: Dn,
    /// Attribute elements, unique by case-insensitive name.
    pub elements: Vec<Element>,
}

impl Entry {
    /// Build a new, empty entry for the given DN.
    pub fn new(dn: Dn) -> Self {
        Entry {
            dn,
            elements: Vec::new(),
        }
    }

    /// Find an element by case-insensitive attribute name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name_eq(name))
    }

    /// Find a mutable element by case-insensitive attribute name.
    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.name_eq(name))
    }

    /// Append a new element. Caller is responsible for ensuring the name
    /// isn't already present (invariant 5); this is enforced by the write
    /// path, not by `Entry` itself, so that the codec can round-trip any
    /// well-formed record without re-validating it.
    pub fn push_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Remove the whole attribute. Returns the removed element, if any.
    pub fn remove_element(&mut self, name: &str) -> Option<Element> {
        let idx = self.elements.iter().position(|e| e.name_eq(name))?;
        Some(self.elements.remove(idx))
    }

    /// Compare two entries as multisets of `(name, [values])`, ignoring
    /// element order and value order within an element — the equivalence
    /// the Record Codec's round-trip property is stated over (§4.A, §8.1).
    pub fn semantically_equal(&self, other: &Entry) -> bool {
        if self.dn != other.dn || self.elements.len() != other.elements.len() {
            return false;
        }
        for el in &self.elements {
            match other.element(&el.name) {
                Some(other_el) => {
                    let a: HashSet<&Value> = el.values.iter().collect();
                    let b: HashSet<&Value> = other_el.values.iter().collect();
                    if a != b || el.values.len() != other_el.values.len() {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dn: &str, attrs: &[(&str, &[&str])]) -> Entry {
        let mut e = Entry::new(Dn::new(dn));
        for (name, values) in attrs {
            e.push_element(Element::new(
                *name,
                values.iter().map(|v| Value::from(*v)).collect(),
            ));
        }
        e
    }

    #[test]
    fn element_lookup_is_case_insensitive() {
        let e = entry("cn=a,dc=x", &[("cn", &["a"])]);
        assert!(e.element("CN").is_some());
        assert!(e.element("sn").is_none());
    }

    #[test]
    fn remove_element_drops_it() {
        let mut e = entry("cn=a,dc=x", &[("cn", &["a"]), ("sn", &["b"])]);
        let removed = e.remove_element("CN").unwrap();
        assert_eq!(removed.name, "cn");
        assert!(e.element("cn").is_none());
        assert!(e.element("sn").is_some());
    }

    #[test]
    fn semantically_equal_ignores_element_and_value_order() {
        let a = entry("cn=a,dc=x", &[("cn", &["a", "b"]), ("sn", &["x"])]);
        let b = entry("cn=a,dc=x", &[("sn", &["x"]), ("cn", &["b", "a"])]);
        assert!(a.semantically_equal(&b));
    }

    #[test]
    fn semantically_equal_detects_value_differences() {
        let a = entry("cn=a,dc=x", &[("cn", &["a"])]);
        let b = entry("cn=a,dc=x", &[("cn", &["b"])]);
        assert!(!a.semantically_equal(&b));
    }

    #[test]
    fn semantically_equal_requires_same_dn() {
        let a = entry("cn=a,dc=x", &[("cn", &["a"])]);
        let b = entry("cn=b,dc=x", &[("cn", &["a"])]);
        assert!(!a.semantically_equal(&b));
    }
}
