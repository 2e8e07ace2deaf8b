//! Core types for the directory database backend
//!
//! This crate defines the foundational types shared by every other crate in
//! the workspace:
//! - [`Dn`]: a case-folded, linearised distinguished name
//! - [`Value`]: an opaque attribute value with explicit length
//! - [`Element`] / [`Entry`]: an attribute and the DN + attribute set it belongs to
//! - [`ModFlag`]: the modify-operation kind carried by a modify element
//! - [`Error`] / [`Result`]: the unified error type for the whole backend

pub mod dn;
pub mod entry;
pub mod error;
pub mod types;
pub mod value;

pub use dn::Dn;
pub use entry::{Element, Entry};
pub use error::{Error, Result};
pub use types::ModFlag;
pub use value::Value;
