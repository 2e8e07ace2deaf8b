//! Value syntaxes
//!
//! A [`Syntax`] bundles the four operations a schema attribute needs: read
//! a textual form, write a textual form, canonicalise a value, and compare
//! two values with a total order (ties fall back to byte equality). Built-in
//! syntaxes are `const` values; nothing here prevents a caller from handing
//! the registry its own `Syntax` for a user-registered attribute.

use dirdb_core::dn::casefold as dn_casefold;
use dirdb_core::Value;
use std::cmp::Ordering;

/// A value syntax: textual I/O, canonicalisation, and comparison for one
/// attribute syntax.
#[derive(Clone, Copy)]
pub struct Syntax {
    /// The syntax's registered name (e.g. `"octetString"`, `"dn"`).
    pub name: &'static str,
    /// Parse a textual value into its internal [`Value`] form.
    pub write: fn(&str) -> Value,
    /// Render a value back to its textual form.
    pub read: fn(&Value) -> String,
    /// Canonicalise a value (e.g. case-fold a directory string) so that
    /// syntactically-equivalent values map to the same index bucket.
    pub canonicalize: fn(&Value) -> Value,
    /// Compare two values under this syntax's total order.
    pub compare: fn(&Value, &Value) -> Ordering,
}

impl Syntax {
    /// Two values are equal under this syntax if their canonical forms are
    /// byte-equal — the comparison's tie-break fallback (§3).
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        (self.compare)(a, b) == Ordering::Equal
    }
}

fn octet_write(s: &str) -> Value {
    Value::from(s)
}

fn octet_read(v: &Value) -> String {
    v.as_str().map(|s| s.to_string()).unwrap_or_default()
}

fn octet_canon(v: &Value) -> Value {
    v.clone()
}

fn octet_compare(a: &Value, b: &Value) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Default syntax: binary compare, identity canonicalisation. Returned
/// when no schema descriptor matches an attribute (§4.C).
pub const OCTET_STRING: Syntax = Syntax {
    name: "octetString",
    write: octet_write,
    read: octet_read,
    canonicalize: octet_canon,
    compare: octet_compare,
};

fn dir_string_canon(v: &Value) -> Value {
    match v.as_str() {
        Some(s) => Value::from(fold_directory_string(s)),
        None => v.clone(),
    }
}

fn fold_directory_string(s: &str) -> String {
    // Case-fold and collapse runs of internal whitespace, mirroring the DN
    // syntax's RDN canonicalisation.
    s.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn dir_string_compare(a: &Value, b: &Value) -> Ordering {
    dir_string_canon(a).as_bytes().cmp(dir_string_canon(b).as_bytes())
}

/// Directory string: case-insensitive, whitespace-collapsed comparison
/// (used by attributes like `cn`, `ou`).
pub const DIRECTORY_STRING: Syntax = Syntax {
    name: "directoryString",
    write: octet_write,
    read: octet_read,
    canonicalize: dir_string_canon,
    compare: dir_string_compare,
};

fn dn_write(s: &str) -> Value {
    Value::from(dn_casefold(s))
}

fn dn_canon(v: &Value) -> Value {
    match v.as_str() {
        Some(s) => Value::from(dn_casefold(s)),
        None => v.clone(),
    }
}

fn dn_compare(a: &Value, b: &Value) -> Ordering {
    dn_canon(a).as_bytes().cmp(dn_canon(b).as_bytes())
}

/// DN syntax: case-folds the way [`Dn`](dirdb_core::Dn) does, used by `dn`
/// and `distinguishedName`.
pub const DN: Syntax = Syntax {
    name: "dn",
    write: dn_write,
    read: octet_read,
    canonicalize: dn_canon,
    compare: dn_compare,
};

/// Object class syntax: case-insensitive like directory string, a distinct
/// name so `@ATTRIBUTES` can name it explicitly.
pub const OBJECT_CLASS: Syntax = Syntax {
    name: "objectClass",
    write: octet_write,
    read: octet_read,
    canonicalize: dir_string_canon,
    compare: dir_string_compare,
};

fn integer_canon(v: &Value) -> Value {
    match v.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) => Value::from(n.to_string()),
        None => v.clone(),
    }
}

fn integer_compare(a: &Value, b: &Value) -> Ordering {
    let pa = a.as_str().and_then(|s| s.trim().parse::<i64>().ok());
    let pb = b.as_str().and_then(|s| s.trim().parse::<i64>().ok());
    match (pa, pb) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => octet_compare(a, b),
    }
}

/// Integer syntax: numeric comparison when both values parse as `i64`,
/// falling back to byte comparison otherwise.
pub const INTEGER: Syntax = Syntax {
    name: "integer",
    write: octet_write,
    read: octet_read,
    canonicalize: integer_canon,
    compare: integer_compare,
};

fn boolean_canon(v: &Value) -> Value {
    match v.as_str() {
        Some(s) if s.eq_ignore_ascii_case("true") => Value::from("TRUE"),
        Some(s) if s.eq_ignore_ascii_case("false") => Value::from("FALSE"),
        _ => v.clone(),
    }
}

fn boolean_compare(a: &Value, b: &Value) -> Ordering {
    boolean_canon(a).as_bytes().cmp(boolean_canon(b).as_bytes())
}

/// Boolean syntax: `TRUE`/`FALSE`, case-insensitive on input.
pub const BOOLEAN: Syntax = Syntax {
    name: "boolean",
    write: octet_write,
    read: octet_read,
    canonicalize: boolean_canon,
    compare: boolean_compare,
};

/// Look up a built-in syntax by registered name. Returns `None` for
/// unrecognised names (callers typically fall back to
/// [`OCTET_STRING`]).
pub fn lookup_builtin(name: &str) -> Option<Syntax> {
    match name {
        "octetString" => Some(OCTET_STRING),
        "directoryString" => Some(DIRECTORY_STRING),
        "dn" => Some(DN),
        "objectClass" => Some(OBJECT_CLASS),
        "integer" => Some(INTEGER),
        "boolean" => Some(BOOLEAN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_string_folds_case_and_whitespace() {
        let a = Value::from("Alice   Smith");
        let b = Value::from("alice smith");
        assert!(DIRECTORY_STRING.values_equal(&a, &b));
    }

    #[test]
    fn octet_string_is_byte_exact() {
        let a = Value::from("Alice");
        let b = Value::from("alice");
        assert!(!OCTET_STRING.values_equal(&a, &b));
    }

    #[test]
    fn dn_syntax_matches_dn_casefold() {
        let a = Value::from("CN=Alice,DC=X");
        let b = Value::from("cn=alice,dc=x");
        assert!(DN.values_equal(&a, &b));
    }

    #[test]
    fn integer_compares_numerically_not_lexically() {
        let a = Value::from("9");
        let b = Value::from("10");
        assert_eq!((INTEGER.compare)(&a, &b), Ordering::Less);
        // Lexical (octet) comparison would say the opposite.
        assert_eq!((OCTET_STRING.compare)(&a, &b), Ordering::Greater);
    }

    #[test]
    fn boolean_case_insensitive() {
        let a = Value::from("true");
        let b = Value::from("TRUE");
        assert!(BOOLEAN.values_equal(&a, &b));
    }

    #[test]
    fn lookup_builtin_unknown_returns_none() {
        assert!(lookup_builtin("nonsense").is_none());
    }
}
