//! Schema attribute registry and value syntaxes
//!
//! This crate owns the sorted table of attribute descriptors used by every
//! comparison in the write path (§4.C), and the built-in value syntaxes
//! (§9 design notes: "a record of four function values").

pub mod attr_value;
pub mod registry;
pub mod syntax;

pub use registry::{AttrFlags, AttributeDescriptor, SchemaRegistry};
pub use syntax::Syntax;
