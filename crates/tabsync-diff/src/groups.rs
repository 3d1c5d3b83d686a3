//! Group diff - additions, modifications and removals between group collections

use std::collections::{BTreeMap, HashMap, HashSet};

use tabsync_core::{Group, GroupId, SyncError, SyncResult};
use tracing::debug;

use crate::diff_items;

/// Diff of two group collections, keyed by group ID
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupDiff {
    /// Groups only in `latest`
    pub to_add: BTreeMap<GroupId, Group>,
    /// Groups on both sides whose title, color or membership changed.
    /// Always holds the `latest` version.
    pub to_modify: BTreeMap<GroupId, Group>,
    /// Groups only in `old`, with their old membership
    pub to_remove: BTreeMap<GroupId, Group>,
}

impl GroupDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_modify.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff two group collections.
///
/// Groups are matched by ID. A matched group is modified when its title or
/// color differs, or when the item diff of its members is non-empty (member
/// order is ignored). Unchanged groups appear in no bucket.
pub fn diff_groups(old: &[Group], latest: &[Group]) -> SyncResult<GroupDiff> {
    let mut remaining: HashMap<GroupId, &Group> = HashMap::with_capacity(old.len());
    for group in old {
        if remaining.insert(group.id, group).is_some() {
            return Err(SyncError::invalid(format!(
                "duplicate group id {} in old collection",
                group.id
            )));
        }
    }

    let mut seen: HashSet<GroupId> = HashSet::with_capacity(latest.len());
    let mut diff = GroupDiff::default();

    for group in latest {
        if !seen.insert(group.id) {
            return Err(SyncError::invalid(format!(
                "duplicate group id {} in latest collection",
                group.id
            )));
        }

        let Some(prev) = remaining.remove(&group.id) else {
            diff.to_add.insert(group.id, group.clone());
            continue;
        };

        let members = diff_items(&prev.items, &group.items)?;
        if !members.is_empty() || !prev.same_label(group) {
            debug!(
                group = %group.id,
                title_changed = prev.title != group.title,
                color_changed = prev.color != group.color,
                added = members.to_add.len(),
                removed = members.to_remove.len(),
                "group modified"
            );
            diff.to_modify.insert(group.id, group.clone());
        }
    }

    diff.to_remove = remaining
        .into_iter()
        .map(|(id, group)| (id, group.clone()))
        .collect();

    Ok(diff)
}
