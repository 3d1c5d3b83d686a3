//! Live system capability set
//!
//! The executor mutates the live workspace only through this trait. Calls are
//! issued one at a time and the executor assumes exclusive access for the
//! duration of one `apply`.

use tabsync_core::{GroupColor, GroupId, Item, ItemId, LiveResult, WindowId};

/// Label applied to a freshly formed group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupLabel {
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
}

/// Mutable, externally observable workspace
#[allow(async_fn_in_trait)]
pub trait LiveSystem {
    /// Open a new, inactive item at `location` in `window`
    async fn create_item(&self, location: &str, window: WindowId) -> LiveResult<ItemId>;

    /// Close an item. Fails for unknown IDs.
    async fn remove_item(&self, id: ItemId) -> LiveResult<()>;

    /// Form a new group from existing items
    async fn group_items(&self, ids: &[ItemId]) -> LiveResult<GroupId>;

    async fn set_group_label(&self, group: GroupId, label: &GroupLabel) -> LiveResult<()>;

    async fn query_items_by_group(&self, group: GroupId) -> LiveResult<Vec<Item>>;

    /// Items whose content is still loading
    async fn query_loading_items(&self) -> LiveResult<Vec<Item>>;

    /// Currently focused item, if any
    async fn current_active_item(&self) -> LiveResult<Option<ItemId>>;

    /// Window new items are created in
    async fn current_window(&self) -> LiveResult<WindowId>;
}
