//! Snapshot summary counts

use std::fmt;

use crate::Snapshot;

/// Headline counts for a capture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SnapshotSummary {
    /// Loose and grouped items together
    pub item_count: usize,
    pub group_count: usize,
    pub bookmark_count: usize,
}

impl SnapshotSummary {
    pub fn of(snapshot: &Snapshot) -> Self {
        SnapshotSummary {
            item_count: snapshot.all_items().count(),
            group_count: snapshot.groups.len(),
            bookmark_count: snapshot.bookmarks.iter().map(|n| n.bookmark_count()).sum(),
        }
    }
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items, {} groups, {} bookmarks",
            self.item_count, self.group_count, self.bookmark_count
        )
    }
}

impl Snapshot {
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary::of(self)
    }
}
