//! Reconciliation executor - applies a snapshot diff to the live system
//!
//! Steps run in a fixed order, creations before destructions:
//! 1. Create loose item additions
//! 2. Materialize added groups
//! 3. Rebuild modified groups (tear down old membership, materialize new)
//! 4. Remove loose item deletions
//! 5. Tear down deleted groups
//!
//! The active item is never removed. The first failing live call aborts the
//! remaining steps; whatever was applied stays applied.

use tabsync_core::{Group, GroupId, ItemId, LiveOp, SyncError, SyncResult, WindowId};
use tabsync_diff::SnapshotDiff;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::convergence::{wait_for_convergence, OverrideSignal, WaitOutcome, WaitProgress};
use crate::{ExecutorConfig, GroupLabel, LiveSystem};

/// Counters for one `apply`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub items_created: usize,
    pub groups_materialized: usize,
    pub items_removed: usize,
    /// Times the active item was kept instead of removed
    pub active_protected: usize,
    /// Groups with no members, which cannot exist on the live system
    pub groups_skipped: usize,
}

/// Applies diffs against one live system
pub struct Reconciler<'a, L: LiveSystem> {
    live: &'a L,
    config: ExecutorConfig,
}

/// Per-apply facts read once from the live system
struct ApplyContext {
    window: WindowId,
    active: Option<ItemId>,
}

impl<'a, L: LiveSystem> Reconciler<'a, L> {
    pub fn new(live: &'a L, config: ExecutorConfig) -> Self {
        Reconciler { live, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Apply `diff` to the live system
    pub async fn apply(&self, diff: SnapshotDiff) -> SyncResult<ApplyReport> {
        preflight(&diff)?;
        info!(%diff, "applying diff");

        let window = self
            .live
            .current_window()
            .await
            .map_err(|f| SyncError::live(LiveOp::CurrentWindow, "current window", f))?;
        let active = self
            .live
            .current_active_item()
            .await
            .map_err(|f| SyncError::live(LiveOp::CurrentActiveItem, "active item", f))?;
        let ctx = ApplyContext { window, active };
        let mut report = ApplyReport::default();

        for item in diff.additions.items.values() {
            self.create_item(&item.location, &ctx).await?;
            report.items_created += 1;
        }

        for group in diff.additions.groups.values() {
            self.materialize(group, &ctx, &mut report).await?;
        }

        for group in diff.modifications.groups.values() {
            self.teardown(group.id, &ctx, &mut report).await?;
            self.materialize(group, &ctx, &mut report).await?;
        }

        for item in diff.deletions.items.values() {
            self.protect_or_remove(item.id, None, &ctx, &mut report).await?;
        }

        for group in diff.deletions.groups.values() {
            self.teardown(group.id, &ctx, &mut report).await?;
        }

        info!(?report, "diff applied");
        Ok(report)
    }

    /// Wait for loading started by `apply` to settle
    pub async fn wait_for_convergence(
        &self,
        signal: OverrideSignal,
        progress: Option<&watch::Sender<WaitProgress>>,
    ) -> SyncResult<WaitOutcome> {
        wait_for_convergence(self.live, &self.config.convergence, signal, progress).await
    }

    async fn create_item(&self, location: &str, ctx: &ApplyContext) -> SyncResult<ItemId> {
        let id = self
            .live
            .create_item(location, ctx.window)
            .await
            .map_err(|f| SyncError::live(LiveOp::CreateItem, location, f))?;
        debug!(item = %id, location, "item created");
        Ok(id)
    }

    /// Create the members, group them, then label the new group
    async fn materialize(
        &self,
        group: &Group,
        ctx: &ApplyContext,
        report: &mut ApplyReport,
    ) -> SyncResult<Option<GroupId>> {
        if group.items.is_empty() {
            warn!(group = %group.id, title = %group.title, "skipping group without items");
            report.groups_skipped += 1;
            return Ok(None);
        }

        let mut ids = Vec::with_capacity(group.items.len());
        for item in &group.items {
            ids.push(self.create_item(&item.location, ctx).await?);
            report.items_created += 1;
        }

        let formed = self
            .live
            .group_items(&ids)
            .await
            .map_err(|f| SyncError::live(LiveOp::GroupItems, format!("group {}", group.id), f))?;

        let label = GroupLabel {
            title: group.title.clone(),
            color: group.color,
            collapsed: self.config.collapse_groups,
        };
        self.live
            .set_group_label(formed, &label)
            .await
            .map_err(|f| SyncError::live(LiveOp::SetGroupLabel, format!("group {}", formed), f))?;

        debug!(from = %group.id, to = %formed, members = ids.len(), "group materialized");
        report.groups_materialized += 1;
        Ok(Some(formed))
    }

    /// Remove every live member of `group`
    async fn teardown(
        &self,
        group: GroupId,
        ctx: &ApplyContext,
        report: &mut ApplyReport,
    ) -> SyncResult<()> {
        let members = self
            .live
            .query_items_by_group(group)
            .await
            .map_err(|f| SyncError::live(LiveOp::QueryItemsByGroup, format!("group {}", group), f))?;

        debug!(group = %group, members = members.len(), "tearing down group");
        for item in members {
            self.protect_or_remove(item.id, Some(group), ctx, report).await?;
        }
        Ok(())
    }

    /// Remove `id` unless it is the active item. An active group member is
    /// re-attached to a group of its own instead.
    async fn protect_or_remove(
        &self,
        id: ItemId,
        owner: Option<GroupId>,
        ctx: &ApplyContext,
        report: &mut ApplyReport,
    ) -> SyncResult<()> {
        if ctx.active == Some(id) {
            report.active_protected += 1;
            if let Some(group) = owner {
                self.live.group_items(&[id]).await.map_err(|f| {
                    SyncError::live(LiveOp::GroupItems, format!("active item {}", id), f)
                })?;
                info!(item = %id, group = %group, "active item kept, regrouped");
            } else {
                info!(item = %id, "active item kept");
            }
            return Ok(());
        }

        self.live
            .remove_item(id)
            .await
            .map_err(|f| SyncError::live(LiveOp::RemoveItem, format!("item {}", id), f))?;
        report.items_removed += 1;
        Ok(())
    }
}

/// Reject diffs that would fail halfway through for a caller bug
fn preflight(diff: &SnapshotDiff) -> SyncResult<()> {
    let created = diff
        .additions
        .items
        .values()
        .chain(diff.additions.groups.values().flat_map(|g| g.items.iter()))
        .chain(diff.modifications.groups.values().flat_map(|g| g.items.iter()));

    for item in created {
        if item.location.trim().is_empty() {
            return Err(SyncError::invalid(format!("item {} has no location", item.id)));
        }
    }
    Ok(())
}
