//! `@ATTRIBUTES` value tuple parsing
//!
//! Each value stored under the `@ATTRIBUTES` entry is a `:`-separated
//! tuple `<attr>:<flag-mask>[:<syntax-name>]`, where `flag-mask` is a
//! decimal bitfield and `syntax-name` is one of the registered syntaxes;
//! absence of `syntax-name` implies the octet-string default (§6).

use crate::registry::{AttrFlags, AttributeDescriptor};
use crate::syntax::{lookup_builtin, OCTET_STRING};
use dirdb_core::{Error, Result};

/// Parse one `@ATTRIBUTES` value into an [`AttributeDescriptor`].
///
/// Returns [`Error::InvalidAttributeSyntax`] if the tuple doesn't parse:
/// missing attribute name, non-decimal flag mask, or an unrecognised
/// syntax name.
pub fn parse_attribute_tuple(raw: &str) -> Result<AttributeDescriptor> {
    let mut parts = raw.splitn(3, ':');
    let name = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidAttributeSyntax(raw.to_string()))?;
    let flags_str = parts
        .next()
        .ok_or_else(|| Error::InvalidAttributeSyntax(raw.to_string()))?;
    let flags_bits: u32 = flags_str
        .parse()
        .map_err(|_| Error::InvalidAttributeSyntax(raw.to_string()))?;
    let flags = AttrFlags::from_bits(flags_bits);

    let syntax = match parts.next() {
        Some(syntax_name) if !syntax_name.is_empty() => lookup_builtin(syntax_name)
            .ok_or_else(|| Error::InvalidAttributeSyntax(raw.to_string()))?,
        _ => OCTET_STRING,
    };

    Ok(AttributeDescriptor {
        name: name.to_string(),
        flags,
        syntax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_tuple() {
        let desc = parse_attribute_tuple("cn:0:directoryString").unwrap();
        assert_eq!(desc.name, "cn");
        assert_eq!(desc.syntax.name, "directoryString");
    }

    #[test]
    fn defaults_to_octet_string_without_syntax_name() {
        let desc = parse_attribute_tuple("mail:0").unwrap();
        assert_eq!(desc.syntax.name, "octetString");
    }

    #[test]
    fn rejects_missing_flag_mask() {
        assert!(parse_attribute_tuple("cn").is_err());
    }

    #[test]
    fn rejects_non_decimal_flag_mask() {
        assert!(parse_attribute_tuple("cn:abc").is_err());
    }

    #[test]
    fn rejects_unknown_syntax_name() {
        assert!(parse_attribute_tuple("cn:0:bogusSyntax").is_err());
    }

    #[test]
    fn rejects_empty_attribute_name() {
        assert!(parse_attribute_tuple(":0:directoryString").is_err());
    }
}
