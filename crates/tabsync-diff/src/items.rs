//! Item diff - additions and removals between two item collections

use std::collections::{HashMap, HashSet};

use tabsync_core::{Item, ItemId, SyncError, SyncResult};

/// Identity diff of two item collections
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemDiff {
    /// Items in `latest` with no counterpart in `old`, in `latest` order
    pub to_add: Vec<Item>,
    /// Items in `old` with no counterpart in `latest`, in `old` order
    pub to_remove: Vec<Item>,
    /// Items present on both sides
    pub unchanged: usize,
}

impl ItemDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff two item collections by identifier.
///
/// Matching is by ID only: an item whose location changed under the same ID
/// counts as unchanged. A collection that repeats an ID is malformed.
pub fn diff_items(old: &[Item], latest: &[Item]) -> SyncResult<ItemDiff> {
    let mut remaining: HashMap<ItemId, &Item> = HashMap::with_capacity(old.len());
    for item in old {
        if remaining.insert(item.id, item).is_some() {
            return Err(SyncError::invalid(format!(
                "duplicate item id {} in old collection",
                item.id
            )));
        }
    }

    let mut seen: HashSet<ItemId> = HashSet::with_capacity(latest.len());
    let mut diff = ItemDiff::default();

    for item in latest {
        if !seen.insert(item.id) {
            return Err(SyncError::invalid(format!(
                "duplicate item id {} in latest collection",
                item.id
            )));
        }
        if remaining.remove(&item.id).is_some() {
            diff.unchanged += 1;
        } else {
            diff.to_add.push(item.clone());
        }
    }

    diff.to_remove = old
        .iter()
        .filter(|item| remaining.contains_key(&item.id))
        .cloned()
        .collect();

    Ok(diff)
}
