//! tabsync-sim - two simulated browsers syncing through one remote
//!
//! Usage: tabsync-sim [SEED] [ROUNDS]

use tokio::sync::watch;
use tracing::{error, info};

use tabsync_core::SyncResult;
use tabsync_runtime::{
    init_logging, ConvergenceConfig, ExecutorConfig, LogConfig, OverrideSignal, SnapshotSource,
    SyncClient, SyncDecision, WaitProgress,
};
use tabsync_test::{
    BrowserConfig, GeneratorConfig, MemoryRemote, SimClock, SimulatedBrowser, SnapshotGenerator,
};

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let rounds = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    if let Err(e) = init_logging(&LogConfig::default()) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    if let Err(e) = run(seed, rounds).await {
        error!(error = %e, "simulation failed");
        std::process::exit(1);
    }
}

async fn run(seed: u64, rounds: usize) -> SyncResult<()> {
    let clock = SimClock::default();
    let remote = MemoryRemote::new();
    let mut gen = SnapshotGenerator::new(GeneratorConfig::default().with_seed(seed));
    let config = ExecutorConfig {
        convergence: ConvergenceConfig::eager(),
        ..ExecutorConfig::default()
    };

    let laptop = SimulatedBrowser::new(BrowserConfig::default(), clock.clone());
    laptop.load(&gen.generate(clock.tick()));
    let desktop = SimulatedBrowser::new(
        BrowserConfig {
            id_base: 50_000,
            ..BrowserConfig::default()
        },
        clock.clone(),
    );

    let mut clients = [
        ("laptop", SyncClient::new(laptop, remote.clone(), config.clone())),
        ("desktop", SyncClient::new(desktop, remote.clone(), config)),
    ];

    for round in 0..rounds {
        for (name, client) in clients.iter_mut() {
            let status = client.status().await?;
            info!(round, client = *name, summary = %status.summary, dirty = status.dirty, "status");

            match client.synchronize().await? {
                SyncDecision::Pushed(summary) => {
                    info!(round, client = *name, %summary, "pushed");
                }
                SyncDecision::PullRequired(diff) => {
                    let (tx, mut rx) = watch::channel(WaitProgress::default());
                    let watcher = tokio::spawn(async move {
                        while rx.changed().await.is_ok() {
                            let p = *rx.borrow();
                            info!(loading = p.loading, percent = p.percent(), "waiting");
                        }
                    });
                    let report = client.pull(diff, OverrideSignal::never(), Some(&tx)).await?;
                    drop(tx);
                    let _ = watcher.await;
                    info!(
                        round,
                        client = *name,
                        summary = %report.summary,
                        apply = ?report.apply,
                        "pulled"
                    );
                }
            }
        }

        // Someone keeps browsing on the laptop between rounds
        let (_, laptop) = &clients[0];
        let current = laptop.live().capture_local().await?;
        laptop.live().load(&gen.mutate(&current, clock.tick()));
    }

    let remote_summary = remote.latest().map(|s| s.summary());
    info!(?remote_summary, pushes = remote.push_count(), "simulation finished");
    Ok(())
}
