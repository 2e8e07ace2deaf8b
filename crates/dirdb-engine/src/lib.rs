//! Backend engine
//!
//! Binds the schema/index/store layers into the write path (§4.F), the
//! metadata cache (§4.D), sequence/timestamp bookkeeping (§4.H), and the
//! request adapter (§4.I) that fronts them all.

pub mod cache;
pub mod request;
pub mod sequence;
pub mod write_path;

pub use cache::Metadata;
pub use request::{Adapter, Control, HandleState, Request, Response, ResponseValue};
pub use write_path::Engine;
