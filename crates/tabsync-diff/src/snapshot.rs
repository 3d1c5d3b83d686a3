//! Snapshot diff - loose item and group diffs composed into one structure

use std::collections::BTreeMap;
use std::fmt;

use tabsync_core::{Group, GroupId, Item, ItemId, Snapshot, SyncResult};
use tracing::debug;

use crate::{diff_groups, diff_items};

/// One diff bucket, shaped like a snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffBucket {
    /// Loose items
    pub items: BTreeMap<ItemId, Item>,
    pub groups: BTreeMap<GroupId, Group>,
}

impl DiffBucket {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.groups.is_empty()
    }

    /// Number of loose items plus groups
    pub fn len(&self) -> usize {
        self.items.len() + self.groups.len()
    }
}

/// Changes that bring the local replica to the remote's shape
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub additions: DiffBucket,
    /// Modified groups, in their target state. Loose items are diffed by
    /// identity only, so `modifications.items` stays empty.
    pub modifications: DiffBucket,
    pub deletions: DiffBucket,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.modifications.is_empty() && self.deletions.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.additions.len() + self.modifications.len() + self.deletions.len()
    }
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} ~{} -{}",
            self.additions.len(),
            self.modifications.len(),
            self.deletions.len()
        )
    }
}

/// Diff `local` (old) against `remote` (latest).
///
/// The result is framed from the local side: what has to change locally to
/// match the remote. Both snapshots are validated first. The bookmark tree
/// and capture time are never compared.
pub fn diff_snapshots(local: &Snapshot, remote: &Snapshot) -> SyncResult<SnapshotDiff> {
    local.validate()?;
    remote.validate()?;

    let items = diff_items(&local.items, &remote.items)?;
    let groups = diff_groups(&local.groups, &remote.groups)?;

    let diff = SnapshotDiff {
        additions: DiffBucket {
            items: items.to_add.into_iter().map(|i| (i.id, i)).collect(),
            groups: groups.to_add,
        },
        modifications: DiffBucket {
            items: BTreeMap::new(),
            groups: groups.to_modify,
        },
        deletions: DiffBucket {
            items: items.to_remove.into_iter().map(|i| (i.id, i)).collect(),
            groups: groups.to_remove,
        },
    };

    debug!(%diff, "snapshots diffed");
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsync_core::{BookmarkNode, GroupColor, SyncError, Timestamp, WindowId};

    fn local() -> Snapshot {
        Snapshot::new(Timestamp::from_millis(100))
            .with_item(ItemId::new(1), "https://google.com")
            .with_item(ItemId::new(2), "https://yahoo.com")
            .with_group(
                Group::new(GroupId::new(10), "work", GroupColor::Blue, WindowId::new(1))
                    .with_item(ItemId::new(11), "https://docs.rs")
                    .with_item(ItemId::new(12), "https://crates.io"),
            )
            .with_group(
                Group::new(GroupId::new(20), "news", GroupColor::Red, WindowId::new(1))
                    .with_item(ItemId::new(21), "https://lwn.net"),
            )
    }

    #[test]
    fn test_same_snapshot_empty_diff() {
        let diff = diff_snapshots(&local(), &local()).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.to_string(), "+0 ~0 -0");
    }

    #[test]
    fn test_timestamp_and_bookmarks_not_compared() {
        let remote = Snapshot {
            captured_at: Timestamp::from_millis(999),
            bookmarks: vec![BookmarkNode::bookmark("1", "rust", "https://rust-lang.org")],
            ..local()
        };
        assert!(diff_snapshots(&local(), &remote).unwrap().is_empty());
    }

    #[test]
    fn test_buckets_framed_from_local() {
        let mut remote = local()
            .with_item(ItemId::new(3), "https://apple.com")
            .with_group(
                Group::new(GroupId::new(30), "fresh", GroupColor::Green, WindowId::new(1))
                    .with_item(ItemId::new(31), "https://tokio.rs"),
            );
        remote.items.retain(|i| i.id != ItemId::new(1));
        remote.groups.retain(|g| g.id != GroupId::new(20));
        remote.groups[0].title = "work!".into();

        let diff = diff_snapshots(&local(), &remote).unwrap();

        assert_eq!(diff.additions.items.keys().copied().collect::<Vec<_>>(), vec![ItemId::new(3)]);
        assert_eq!(diff.additions.groups.keys().copied().collect::<Vec<_>>(), vec![GroupId::new(30)]);
        assert_eq!(diff.modifications.groups[&GroupId::new(10)].title, "work!");
        assert!(diff.modifications.items.is_empty());
        assert_eq!(diff.deletions.items.keys().copied().collect::<Vec<_>>(), vec![ItemId::new(1)]);
        assert_eq!(diff.deletions.groups.keys().copied().collect::<Vec<_>>(), vec![GroupId::new(20)]);
        assert_eq!(diff.change_count(), 5);
        assert_eq!(diff.to_string(), "+2 ~1 -2");
    }

    #[test]
    fn test_removed_group_members_not_loose_deletions() {
        let mut remote = local();
        remote.groups.retain(|g| g.id != GroupId::new(10));

        let diff = diff_snapshots(&local(), &remote).unwrap();
        assert_eq!(diff.deletions.groups[&GroupId::new(10)].items.len(), 2);
        assert!(diff.deletions.items.is_empty());
        assert!(diff.additions.is_empty());
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let mut broken = local();
        broken.items[0].group = Some(GroupId::new(10));
        assert!(matches!(
            diff_snapshots(&broken, &local()),
            Err(SyncError::InvalidArgument(_))
        ));
        assert!(diff_snapshots(&local(), &broken).is_err());
    }

    #[test]
    fn test_inputs_untouched() {
        let a = local();
        let b = Snapshot::default();
        let _ = diff_snapshots(&a, &b).unwrap();
        assert_eq!(a, local());
    }
}
