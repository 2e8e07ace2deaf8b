//! Record codec
//!
//! Packs an [`Entry`] to an opaque, length-prefixed byte form and back.
//! Pack is total over any well-formed entry; unpack fails with a protocol
//! error on short input, bad counts, or length arithmetic that would run
//! past the buffer (§4.A).

pub mod record;

pub use record::{pack, unpack};
