//! tabsync Runtime - applying diffs to a live workspace
//!
//! This crate drives one reconciliation cycle:
//! 1. Capture the local replica and fetch the remote one
//! 2. Decide between pushing local state and pulling remote state
//! 3. Apply the snapshot diff to the live system, create-before-destroy
//! 4. Wait for asynchronous loading to settle, or for a user override
//! 5. Re-capture, push the regenerated identifiers, update the ledger

pub mod live;
pub mod config;
pub mod executor;
pub mod convergence;
pub mod source;
pub mod ledger;
pub mod cycle;
pub mod logging;

pub use live::*;
pub use config::*;
pub use executor::*;
pub use convergence::*;
pub use source::*;
pub use ledger::*;
pub use cycle::*;
pub use logging::*;

#[cfg(test)]
mod mock;
