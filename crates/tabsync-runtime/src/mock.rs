//! Scripted in-memory live system and remote store for unit tests

use std::collections::{BTreeMap, HashMap, VecDeque};

use parking_lot::Mutex;

use tabsync_core::{
    Group, GroupColor, GroupId, Item, ItemId, LiveFault, LiveOp, LiveResult, Snapshot, SyncError,
    SyncResult, Timestamp, WindowId,
};

use crate::{GroupLabel, LiveSystem, RemoteStore, SnapshotSource};

#[derive(Default)]
struct MockState {
    next_id: u64,
    items: BTreeMap<ItemId, Item>,
    labels: HashMap<GroupId, GroupLabel>,
    active: Option<ItemId>,
    calls: Vec<String>,
    counts: HashMap<LiveOp, usize>,
    fail_on: Option<(LiveOp, usize)>,
    loading: VecDeque<usize>,
    captures: u64,
}

pub struct MockLive {
    state: Mutex<MockState>,
}

impl MockLive {
    pub fn new() -> Self {
        MockLive {
            state: Mutex::new(MockState {
                next_id: 1000,
                ..MockState::default()
            }),
        }
    }

    pub fn seed(&self, item: Item) {
        self.state.lock().items.insert(item.id, item);
    }

    pub fn set_active(&self, id: ItemId) {
        self.state.lock().active = Some(id);
    }

    /// Fail the `nth` (1-based) call of `op`
    pub fn fail_on(&self, op: LiveOp, nth: usize) {
        self.state.lock().fail_on = Some((op, nth));
    }

    /// Loading counts returned by successive polls; the last one repeats
    pub fn script_loading(&self, counts: &[usize]) {
        self.state.lock().loading = counts.iter().copied().collect();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn items(&self) -> Vec<Item> {
        self.state.lock().items.values().cloned().collect()
    }

    pub fn label(&self, group: GroupId) -> Option<GroupLabel> {
        self.state.lock().labels.get(&group).cloned()
    }

    fn enter(&self, op: LiveOp, call: String) -> LiveResult<()> {
        let mut state = self.state.lock();
        let count = {
            let count = state.counts.entry(op).or_insert(0);
            *count += 1;
            *count
        };
        if state.fail_on == Some((op, count)) {
            return Err(LiveFault::new(format!("scripted failure of {}", op)));
        }
        state.calls.push(call);
        Ok(())
    }
}

impl LiveSystem for MockLive {
    async fn create_item(&self, location: &str, _window: WindowId) -> LiveResult<ItemId> {
        self.enter(LiveOp::CreateItem, format!("create {}", location))?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = ItemId::new(state.next_id);
        state.items.insert(id, Item::loose(id, location));
        Ok(id)
    }

    async fn remove_item(&self, id: ItemId) -> LiveResult<()> {
        self.enter(LiveOp::RemoveItem, format!("remove {}", id))?;
        self.state
            .lock()
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LiveFault::new(format!("no item with id {}", id)))
    }

    async fn group_items(&self, ids: &[ItemId]) -> LiveResult<GroupId> {
        let list: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
        self.enter(LiveOp::GroupItems, format!("group [{}]", list.join(",")))?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let group = GroupId::new(state.next_id);
        for id in ids {
            let item = state
                .items
                .get_mut(id)
                .ok_or_else(|| LiveFault::new(format!("no item with id {}", id)))?;
            item.group = Some(group);
        }
        Ok(group)
    }

    async fn set_group_label(&self, group: GroupId, label: &GroupLabel) -> LiveResult<()> {
        self.enter(
            LiveOp::SetGroupLabel,
            format!("label {} {} {}", group, label.title, label.color),
        )?;
        self.state.lock().labels.insert(group, label.clone());
        Ok(())
    }

    async fn query_items_by_group(&self, group: GroupId) -> LiveResult<Vec<Item>> {
        self.enter(LiveOp::QueryItemsByGroup, format!("query {}", group))?;
        Ok(self
            .state
            .lock()
            .items
            .values()
            .filter(|i| i.group == Some(group))
            .cloned()
            .collect())
    }

    async fn query_loading_items(&self) -> LiveResult<Vec<Item>> {
        self.enter(LiveOp::QueryLoadingItems, "loading".into())?;
        let mut state = self.state.lock();
        let count = if state.loading.len() > 1 {
            state.loading.pop_front().unwrap_or(0)
        } else {
            state.loading.front().copied().unwrap_or(0)
        };
        Ok((0..count)
            .map(|i| Item::loose(ItemId::new(i as u64), "about:blank"))
            .collect())
    }

    async fn current_active_item(&self) -> LiveResult<Option<ItemId>> {
        self.enter(LiveOp::CurrentActiveItem, "active".into())?;
        Ok(self.state.lock().active)
    }

    async fn current_window(&self) -> LiveResult<WindowId> {
        self.enter(LiveOp::CurrentWindow, "window".into())?;
        Ok(WindowId::new(1))
    }
}

impl SnapshotSource for MockLive {
    async fn capture_local(&self) -> SyncResult<Snapshot> {
        let mut state = self.state.lock();
        state.captures += 1;
        let mut snapshot = Snapshot::new(Timestamp::from_millis(state.captures));

        let mut groups: BTreeMap<GroupId, Group> = BTreeMap::new();
        for item in state.items.values() {
            let Some(gid) = item.group else {
                snapshot.items.push(item.clone());
                continue;
            };
            let group = groups.entry(gid).or_insert_with(|| {
                let (title, color) = state
                    .labels
                    .get(&gid)
                    .map(|l| (l.title.clone(), l.color))
                    .unwrap_or_else(|| (String::new(), GroupColor::default()));
                Group::new(gid, title, color, WindowId::new(1))
            });
            group.items.push(item.clone());
        }
        snapshot.groups = groups.into_values().collect();
        Ok(snapshot)
    }
}

#[derive(Default)]
struct RemoteState {
    latest: Option<Snapshot>,
    pushes: usize,
    fail_next: bool,
}

#[derive(Default)]
pub struct MockRemote {
    state: Mutex<RemoteState>,
}

impl MockRemote {
    /// Replace the stored snapshot without counting a push
    pub fn store(&self, snapshot: Snapshot) {
        self.state.lock().latest = Some(snapshot);
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.state.lock().latest.clone()
    }

    pub fn pushes(&self) -> usize {
        self.state.lock().pushes
    }

    pub fn fail_next_push(&self) {
        self.state.lock().fail_next = true;
    }
}

impl RemoteStore for MockRemote {
    async fn fetch(&self) -> SyncResult<Option<Snapshot>> {
        Ok(self.latest())
    }

    async fn push(&self, snapshot: &Snapshot) -> SyncResult<()> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next) {
            return Err(SyncError::Remote("scripted push failure".into()));
        }
        state.pushes += 1;
        state.latest = Some(snapshot.clone());
        Ok(())
    }
}
