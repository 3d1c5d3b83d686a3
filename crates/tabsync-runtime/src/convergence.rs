//! Convergence wait - polling the live system until loading settles
//!
//! Items created by the executor keep loading after `create_item` returns.
//! The wait polls the loading count at a fixed interval and publishes
//! progress. It is unbounded, but once the grace period has elapsed an
//! override signal ends it immediately. Overriding abandons the wait; it does
//! not roll anything back.

use std::time::Duration;

use tabsync_core::{LiveOp, SyncError, SyncResult};
use tokio::sync::{oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::{ConvergenceConfig, LiveSystem};

/// Convergence wait state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WaitState {
    /// No poll yet
    #[default]
    Idle,
    /// Items still loading
    Waiting { loading: usize },
    /// Abandoned by override with items still loading
    Overridden { remaining: usize },
    /// Nothing left loading
    Done,
}

/// Progress snapshot published after every poll
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WaitProgress {
    /// Loading count at the first poll
    pub initial_loading: usize,
    pub loading: usize,
    pub elapsed: Duration,
    pub can_override: bool,
}

impl WaitProgress {
    pub fn done_count(&self) -> usize {
        self.initial_loading.saturating_sub(self.loading)
    }

    pub fn percent(&self) -> f64 {
        if self.initial_loading == 0 {
            return 100.0;
        }
        self.done_count() as f64 / self.initial_loading as f64 * 100.0
    }
}

/// How a wait ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Settled,
    Overridden { remaining: usize },
}

/// Convergence wait state machine, driven by poll results and override
/// requests
#[derive(Debug)]
pub struct ConvergenceWait {
    state: WaitState,
    initial_loading: usize,
    elapsed: Duration,
    grace: Duration,
}

impl ConvergenceWait {
    pub fn new(grace: Duration) -> Self {
        ConvergenceWait {
            state: WaitState::Idle,
            initial_loading: 0,
            elapsed: Duration::ZERO,
            grace,
        }
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, WaitState::Done | WaitState::Overridden { .. })
    }

    /// Feed one poll result. Terminal states ignore further polls.
    pub fn observe(&mut self, loading: usize, elapsed: Duration) -> WaitState {
        match self.state {
            WaitState::Idle => self.initial_loading = loading,
            WaitState::Waiting { .. } => {}
            WaitState::Overridden { .. } | WaitState::Done => return self.state,
        }

        self.elapsed = elapsed;
        self.state = if loading == 0 {
            WaitState::Done
        } else {
            WaitState::Waiting { loading }
        };
        self.state
    }

    /// Overrides are honored only while waiting and past the grace period
    pub fn can_override(&self) -> bool {
        matches!(self.state, WaitState::Waiting { .. }) && self.elapsed >= self.grace
    }

    pub fn request_override(&mut self) -> bool {
        let WaitState::Waiting { loading } = self.state else {
            return false;
        };
        if !self.can_override() {
            return false;
        }
        self.state = WaitState::Overridden { remaining: loading };
        true
    }

    pub fn progress(&self) -> WaitProgress {
        let loading = match self.state {
            WaitState::Idle | WaitState::Done => 0,
            WaitState::Waiting { loading } => loading,
            WaitState::Overridden { remaining } => remaining,
        };
        WaitProgress {
            initial_loading: self.initial_loading,
            loading,
            elapsed: self.elapsed,
            can_override: self.can_override(),
        }
    }
}

/// Sending half of the override signal
#[derive(Debug)]
pub struct OverrideHandle(oneshot::Sender<()>);

impl OverrideHandle {
    /// Ask the wait to stop. Returns false if the wait is already gone.
    pub fn trigger(self) -> bool {
        self.0.send(()).is_ok()
    }
}

/// Receiving half of the override signal. A signal sent before the grace
/// period stays latched until the wait can honor it.
#[derive(Debug)]
pub struct OverrideSignal(Option<oneshot::Receiver<()>>);

impl OverrideSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        OverrideSignal(None)
    }

    fn is_live(&self) -> bool {
        self.0.is_some()
    }

    /// Resolves true when triggered, false when the handle was dropped
    async fn fired(&mut self) -> bool {
        match self.0.as_mut() {
            Some(rx) => rx.await.is_ok(),
            None => std::future::pending().await,
        }
    }
}

pub fn override_channel() -> (OverrideHandle, OverrideSignal) {
    let (tx, rx) = oneshot::channel();
    (OverrideHandle(tx), OverrideSignal(Some(rx)))
}

/// Poll `live` until nothing is loading or an honored override arrives
pub async fn wait_for_convergence<L: LiveSystem>(
    live: &L,
    config: &ConvergenceConfig,
    mut signal: OverrideSignal,
    progress: Option<&watch::Sender<WaitProgress>>,
) -> SyncResult<WaitOutcome> {
    config.validate()?;

    let started = Instant::now();
    let mut wait = ConvergenceWait::new(config.grace_period);
    let mut ticker = time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let armed = wait.can_override() && signal.is_live();

        tokio::select! {
            _ = ticker.tick() => {
                let loading = live
                    .query_loading_items()
                    .await
                    .map_err(|f| SyncError::live(LiveOp::QueryLoadingItems, "loading items", f))?
                    .len();
                let state = wait.observe(loading, started.elapsed());
                publish(progress, &wait);

                if state == WaitState::Done {
                    info!(elapsed = ?started.elapsed(), "live system settled");
                    return Ok(WaitOutcome::Settled);
                }
                debug!(loading, "still loading");
            }
            fired = signal.fired(), if armed => {
                if !fired {
                    // Handle dropped without triggering
                    signal = OverrideSignal::never();
                    continue;
                }
                if wait.request_override() {
                    publish(progress, &wait);
                    let remaining = wait.progress().loading;
                    info!(remaining, "convergence wait overridden");
                    return Ok(WaitOutcome::Overridden { remaining });
                }
            }
        }
    }
}

fn publish(progress: Option<&watch::Sender<WaitProgress>>, wait: &ConvergenceWait) {
    if let Some(tx) = progress {
        // No receivers left is fine
        let _ = tx.send(wait.progress());
    }
}
