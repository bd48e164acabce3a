//! Discovery scheduler — periodic background discovery with cooperative
//! cancellation.
//!
//! A single tokio task: sweep the backend, merge every hit into the
//! registry, sleep, repeat. One iteration's failure is logged and retried
//! at the next interval; consecutive failures stretch the sleep with a
//! bounded exponential backoff, and a success snaps it back to the plain
//! interval. The shutdown signal is only observed at the sleep boundary,
//! so an in-flight scan always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ports::{DeviceBackend, DeviceStore};
use crate::registry::DeviceRegistry;

/// Consecutive failures cap the backoff at `interval * 2^3`.
const MAX_BACKOFF_EXP: u32 = 3;

/// Handle to the background discovery loop.
pub struct DiscoveryScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl DiscoveryScheduler {
    /// Spawn the discovery loop. The first sweep starts immediately.
    pub fn start<S, B>(
        registry: Arc<DeviceRegistry<S>>,
        backend: Arc<B>,
        interval: Duration,
    ) -> Self
    where
        S: DeviceStore + 'static,
        B: DeviceBackend + 'static,
    {
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run(registry, backend, interval, rx));
        tracing::info!(interval_secs = interval.as_secs(), "discovery scheduler started");
        Self { shutdown, handle }
    }

    /// Request cooperative shutdown and wait for the loop to finish.
    ///
    /// An in-flight sweep completes first; the loop exits at its next
    /// sleep boundary.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.handle.await {
            tracing::warn!(%err, "discovery task ended abnormally");
        }
        tracing::info!("discovery scheduler stopped");
    }
}

async fn run<S, B>(
    registry: Arc<DeviceRegistry<S>>,
    backend: Arc<B>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: DeviceStore,
    B: DeviceBackend,
{
    let mut consecutive_failures: u32 = 0;

    loop {
        match backend.discover().await {
            Ok(found) => {
                consecutive_failures = 0;
                let count = found.len();
                for device in found {
                    if let Err(err) = registry.merge_discovered(device).await {
                        tracing::warn!(%err, "failed to merge discovered device");
                    }
                }
                tracing::debug!(count, "discovery sweep complete");
            }
            Err(err) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                tracing::warn!(
                    %err,
                    failures = consecutive_failures,
                    "discovery sweep failed, retrying next interval"
                );
            }
        }

        let delay = interval * 2_u32.pow(consecutive_failures.min(MAX_BACKOFF_EXP));
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
