//! tabsync Diff Engine - three-way diff of workspace snapshots
//!
//! This crate implements the pure, synchronous half of reconciliation:
//! - Item diff (identity-based additions and removals)
//! - Group diff (additions, modifications and removals by content)
//! - Snapshot diff (loose items and groups composed into one diff)
//!
//! Inputs are never mutated. Malformed inputs fail fast with
//! `SyncError::InvalidArgument`.

pub mod items;
pub mod groups;
pub mod snapshot;

pub use items::*;
pub use groups::*;
pub use snapshot::*;
