//! tabsync Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the differ and the runtime:
//! - Identifiers (ItemId, GroupId, WindowId)
//! - Capture timestamps
//! - The snapshot model (items, groups, bookmark tree)
//! - Change fingerprints and snapshot summaries
//! - The error taxonomy

pub mod id;
pub mod time;
pub mod model;
pub mod fingerprint;
pub mod summary;
pub mod error;

pub use id::*;
pub use time::*;
pub use model::*;
pub use fingerprint::*;
pub use summary::*;
pub use error::*;
