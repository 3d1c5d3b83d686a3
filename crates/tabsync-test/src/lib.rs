//! tabsync Test Harness - simulation and end-to-end validation
//!
//! This crate provides:
//! - A simulated browser implementing the live system and local capture
//! - An in-memory remote store shared between simulated clients
//! - A seeded random snapshot generator
//! - Diff benchmarks and the `tabsync-sim` demo binary

pub mod browser;
pub mod remote;
pub mod generator;

pub use browser::*;
pub use remote::*;
pub use generator::*;
