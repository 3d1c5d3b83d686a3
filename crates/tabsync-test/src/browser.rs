//! Simulated browser for end-to-end sync testing
//!
//! Models the parts of a browser the executor relies on:
//! - Fresh identifiers for every created item and formed group
//! - Items that keep loading for a configurable number of loading queries
//! - Groups that disappear with their last member
//! - An active item and a call log
//! - Injected failures on the n-th call of a chosen operation

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use tabsync_core::{
    BookmarkNode, Group, GroupColor, GroupId, Item, ItemId, LiveFault, LiveOp, LiveResult,
    Snapshot, SyncError, SyncResult, Timestamp, WindowId,
};
use tabsync_runtime::{GroupLabel, LiveSystem, SnapshotSource};

/// Monotonic capture clock shared by every simulated client
#[derive(Clone, Debug)]
pub struct SimClock {
    now: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new(start: Timestamp) -> Self {
        SimClock {
            now: Arc::new(AtomicU64::new(start.as_millis())),
        }
    }

    /// Advance by one millisecond and return the new time
    pub fn tick(&self) -> Timestamp {
        Timestamp::from_millis(self.now.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Timestamp::from_millis(1_000))
    }
}

/// Simulated browser configuration
#[derive(Clone, Debug)]
pub struct BrowserConfig {
    /// Window items are created in
    pub window: WindowId,
    /// First identifier handed out for created items and groups
    pub id_base: u64,
    /// Loading queries a created item stays loading for
    pub load_polls: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            window: WindowId::new(1),
            id_base: 10_000,
            load_polls: 3,
        }
    }
}

impl BrowserConfig {
    /// Pages load instantly
    pub fn instant() -> Self {
        BrowserConfig {
            load_polls: 0,
            ..Self::default()
        }
    }

    /// Pages never finish loading
    pub fn stalled() -> Self {
        BrowserConfig {
            load_polls: u32::MAX,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
struct LiveItem {
    item: Item,
    polls_left: u32,
}

#[derive(Default)]
struct BrowserState {
    next_id: u64,
    items: BTreeMap<ItemId, LiveItem>,
    labels: HashMap<GroupId, GroupLabel>,
    bookmarks: Vec<BookmarkNode>,
    active: Option<ItemId>,
    calls: Vec<LiveOp>,
    counts: HashMap<LiveOp, usize>,
    fail_on: Option<(LiveOp, usize)>,
    fail_capture: bool,
}

impl BrowserState {
    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Drop labels of groups left without members
    fn prune_groups(&mut self) {
        let items = &self.items;
        self.labels
            .retain(|gid, _| items.values().any(|l| l.item.group == Some(*gid)));
    }
}

/// Simulated browser. Clones share the same state.
#[derive(Clone)]
pub struct SimulatedBrowser {
    config: BrowserConfig,
    clock: SimClock,
    state: Arc<Mutex<BrowserState>>,
}

impl SimulatedBrowser {
    pub fn new(config: BrowserConfig, clock: SimClock) -> Self {
        let state = BrowserState {
            next_id: config.id_base,
            ..BrowserState::default()
        };
        SimulatedBrowser {
            config,
            clock,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Replace the open workspace with `snapshot`, keeping its identifiers.
    /// Loaded items are not loading.
    pub fn load(&self, snapshot: &Snapshot) {
        let mut state = self.state.lock();
        state.items.clear();
        state.labels.clear();
        for item in snapshot.all_items() {
            state.next_id = state.next_id.max(item.id.0);
            state.items.insert(
                item.id,
                LiveItem {
                    item: item.clone(),
                    polls_left: 0,
                },
            );
        }
        for group in &snapshot.groups {
            state.next_id = state.next_id.max(group.id.0);
            state.labels.insert(
                group.id,
                GroupLabel {
                    title: group.title.clone(),
                    color: group.color,
                    collapsed: false,
                },
            );
        }
        state.bookmarks = snapshot.bookmarks.clone();
        state.prune_groups();
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn set_active(&self, id: Option<ItemId>) {
        self.state.lock().active = id;
    }

    /// Fail the `nth` (1-based) call of `op` from now on
    pub fn fail_on(&self, op: LiveOp, nth: usize) {
        let mut state = self.state.lock();
        let done = state.counts.get(&op).copied().unwrap_or(0);
        state.fail_on = Some((op, done + nth));
    }

    pub fn clear_failure(&self) {
        self.state.lock().fail_on = None;
    }

    /// Make the next local capture fail
    pub fn fail_next_capture(&self) {
        self.state.lock().fail_capture = true;
    }

    /// Open a new item directly, as a user would
    pub fn open(&self, location: &str) -> ItemId {
        let mut state = self.state.lock();
        let id = ItemId::new(state.fresh_id());
        state.items.insert(
            id,
            LiveItem {
                item: Item::loose(id, location),
                polls_left: 0,
            },
        );
        id
    }

    /// Live operations issued so far, failed ones included
    pub fn calls(&self) -> Vec<LiveOp> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, op: LiveOp) -> usize {
        self.state.lock().counts.get(&op).copied().unwrap_or(0)
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn loading_count(&self) -> usize {
        self.state
            .lock()
            .items
            .values()
            .filter(|l| l.polls_left > 0)
            .count()
    }

    pub fn label(&self, group: GroupId) -> Option<GroupLabel> {
        self.state.lock().labels.get(&group).cloned()
    }

    fn enter(&self, op: LiveOp) -> LiveResult<()> {
        let mut state = self.state.lock();
        let count = {
            let count = state.counts.entry(op).or_insert(0);
            *count += 1;
            *count
        };
        state.calls.push(op);
        if state.fail_on == Some((op, count)) {
            trace!(%op, count, "injected failure");
            return Err(LiveFault::new(format!("simulated {} failure", op)));
        }
        Ok(())
    }
}

impl LiveSystem for SimulatedBrowser {
    async fn create_item(&self, location: &str, window: WindowId) -> LiveResult<ItemId> {
        self.enter(LiveOp::CreateItem)?;
        if window != self.config.window {
            return Err(LiveFault::new(format!("no window {}", window)));
        }
        let mut state = self.state.lock();
        let id = ItemId::new(state.fresh_id());
        state.items.insert(
            id,
            LiveItem {
                item: Item::loose(id, location),
                polls_left: self.config.load_polls,
            },
        );
        Ok(id)
    }

    async fn remove_item(&self, id: ItemId) -> LiveResult<()> {
        self.enter(LiveOp::RemoveItem)?;
        let mut state = self.state.lock();
        if state.items.remove(&id).is_none() {
            return Err(LiveFault::new(format!("no item {}", id)));
        }
        if state.active == Some(id) {
            state.active = None;
        }
        state.prune_groups();
        Ok(())
    }

    async fn group_items(&self, ids: &[ItemId]) -> LiveResult<GroupId> {
        self.enter(LiveOp::GroupItems)?;
        let mut state = self.state.lock();
        if ids.is_empty() {
            return Err(LiveFault::new("cannot group zero items"));
        }
        if let Some(missing) = ids.iter().find(|id| !state.items.contains_key(*id)) {
            return Err(LiveFault::new(format!("no item {}", missing)));
        }

        let group = GroupId::new(state.fresh_id());
        for id in ids {
            if let Some(live) = state.items.get_mut(id) {
                live.item.group = Some(group);
            }
        }
        state.labels.insert(
            group,
            GroupLabel {
                title: String::new(),
                color: GroupColor::default(),
                collapsed: false,
            },
        );
        state.prune_groups();
        Ok(group)
    }

    async fn set_group_label(&self, group: GroupId, label: &GroupLabel) -> LiveResult<()> {
        self.enter(LiveOp::SetGroupLabel)?;
        let mut state = self.state.lock();
        match state.labels.get_mut(&group) {
            Some(current) => {
                *current = label.clone();
                Ok(())
            }
            None => Err(LiveFault::new(format!("no group {}", group))),
        }
    }

    async fn query_items_by_group(&self, group: GroupId) -> LiveResult<Vec<Item>> {
        self.enter(LiveOp::QueryItemsByGroup)?;
        Ok(self
            .state
            .lock()
            .items
            .values()
            .filter(|l| l.item.group == Some(group))
            .map(|l| l.item.clone())
            .collect())
    }

    /// Each query advances every loading item by one step
    async fn query_loading_items(&self) -> LiveResult<Vec<Item>> {
        self.enter(LiveOp::QueryLoadingItems)?;
        let mut state = self.state.lock();
        let mut loading = Vec::new();
        for live in state.items.values_mut() {
            if live.polls_left > 0 {
                loading.push(live.item.clone());
                if live.polls_left != u32::MAX {
                    live.polls_left -= 1;
                }
            }
        }
        Ok(loading)
    }

    async fn current_active_item(&self) -> LiveResult<Option<ItemId>> {
        self.enter(LiveOp::CurrentActiveItem)?;
        Ok(self.state.lock().active)
    }

    async fn current_window(&self) -> LiveResult<WindowId> {
        self.enter(LiveOp::CurrentWindow)?;
        Ok(self.config.window)
    }
}

impl SnapshotSource for SimulatedBrowser {
    async fn capture_local(&self) -> SyncResult<Snapshot> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_capture) {
            return Err(SyncError::Capture("simulated capture failure".into()));
        }

        let mut snapshot = Snapshot::new(self.clock.tick()).with_bookmarks(state.bookmarks.clone());
        let mut groups: BTreeMap<GroupId, Group> = BTreeMap::new();
        for live in state.items.values() {
            let item = &live.item;
            let Some(gid) = item.group else {
                snapshot.items.push(item.clone());
                continue;
            };
            let group = groups.entry(gid).or_insert_with(|| match state.labels.get(&gid) {
                Some(label) => Group::new(gid, label.title.clone(), label.color, self.config.window),
                None => Group::new(gid, "", GroupColor::default(), self.config.window),
            });
            group.items.push(item.clone());
        }
        snapshot.groups = groups.into_values().collect();
        Ok(snapshot)
    }
}
