//! Index engine
//!
//! Maintains the two index families of §4.E on top of the store backend:
//! per-attribute equality buckets (`@INDEX:<attr>:<value>`) and the
//! one-level parent→children index (`@IDXONE:<parent-dn>`). All of it is
//! ordinary data in the same store, addressed through the same key
//! scheme — there is no separate index file.

pub mod equality;
pub mod onelevel;
pub mod reindex;
pub mod set;

pub use equality::{index_add, index_del, index_del_value, lookup};
pub use onelevel::{children_of, index_one_add, index_one_del};
pub use reindex::reindex;
