//! Optional background sweep: periodically lazily-expires and evicts
//! terminal tickets. Spawned with an explicit shutdown channel so it never
//! keeps the process alive on its own — the caller owns the `JoinHandle`
//! and decides whether to detach or await it, matching the established
//! spawn-and-return-a-handle style for long-running streams.

use crate::store::ApprovalStore;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Default sweep interval.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to a running background sweep. Dropping this without calling
/// [`Self::shutdown`] leaves the sweep running; call `shutdown` to stop it
/// and await `join` to observe completion.
pub struct SweepHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl SweepHandle {
    /// Signal the sweep loop to stop after its current iteration.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Await the sweep task's completion. Call [`Self::shutdown`] first, or
    /// this will not resolve until the loop is otherwise cancelled.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Spawn the background sweep loop against `store`, running every
/// `interval`.
pub fn spawn(store: ApprovalStore, interval: Duration) -> SweepHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.sweep_once();
                    if removed > 0 {
                        tracing::debug!(removed, "approval sweep evicted terminal tickets");
                    }
                }
                _ = &mut shutdown_rx => {
                    break;
                }
            }
        }
    });
    SweepHandle { shutdown_tx: Some(shutdown_tx), join }
}
