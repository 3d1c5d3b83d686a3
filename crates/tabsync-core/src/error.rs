//! Error types for tabsync

use std::fmt;

use thiserror::Error;

/// Live system operation, named in errors raised while reconciling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiveOp {
    CreateItem,
    RemoveItem,
    GroupItems,
    SetGroupLabel,
    QueryItemsByGroup,
    QueryLoadingItems,
    CurrentActiveItem,
    CurrentWindow,
}

impl LiveOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LiveOp::CreateItem => "create_item",
            LiveOp::RemoveItem => "remove_item",
            LiveOp::GroupItems => "group_items",
            LiveOp::SetGroupLabel => "set_group_label",
            LiveOp::QueryItemsByGroup => "query_items_by_group",
            LiveOp::QueryLoadingItems => "query_loading_items",
            LiveOp::CurrentActiveItem => "current_active_item",
            LiveOp::CurrentWindow => "current_window",
        }
    }
}

impl fmt::Display for LiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a live system call, before it is attributed to an
/// operation and subject
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LiveFault(pub String);

impl LiveFault {
    pub fn new(reason: impl Into<String>) -> Self {
        LiveFault(reason.into())
    }
}

/// Result type for live system calls
pub type LiveResult<T> = Result<T, LiveFault>;

/// Core tabsync errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// Malformed snapshot or collection handed to a differ or executor
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A live system call failed; the partially applied state is kept
    #[error("Live system call {op} failed for {subject}: {reason}")]
    LiveSystem {
        op: LiveOp,
        subject: String,
        reason: String,
    },

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Local capture failed: {0}")]
    Capture(String),
}

impl SyncError {
    /// Attribute a live fault to the operation and subject that raised it
    pub fn live(op: LiveOp, subject: impl fmt::Display, fault: LiveFault) -> Self {
        SyncError::LiveSystem {
            op,
            subject: subject.to_string(),
            reason: fault.0,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        SyncError::InvalidArgument(msg.into())
    }
}

/// Result type for tabsync operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_error_names_operation_and_subject() {
        let err = SyncError::live(LiveOp::RemoveItem, "item 42", LiveFault::new("no tab with id"));
        assert_eq!(
            err.to_string(),
            "Live system call remove_item failed for item 42: no tab with id"
        );
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = SyncError::invalid("duplicate item id 3");
        assert_eq!(err.to_string(), "Invalid argument: duplicate item id 3");
    }
}
