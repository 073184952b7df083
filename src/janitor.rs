//! Background janitor that sweeps expired registry entries and their
//! on-disk artifacts.

use crate::config::JanitorConfig;
use crate::registry::DownloadRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Spawn the janitor background task.
///
/// Runs [`DownloadRegistry::sweep_expired`] on a fixed period until the
/// cancellation token fires. The first sweep runs immediately on spawn,
/// which is harmless against an empty registry and lets tests observe a
/// sweep without waiting a full interval.
pub fn spawn_janitor(
    registry: Arc<DownloadRegistry>,
    config: JanitorConfig,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let max_age = config.max_age();
        let mut interval = tokio::time::interval(config.sweep_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let swept = registry.sweep_expired(chrono::Utc::now(), max_age);
                    if !swept.is_empty() {
                        tracing::info!(
                            count = swept.len(),
                            remaining = registry.len(),
                            "Janitor swept expired downloads"
                        );
                    }
                }
                _ = cancel_token.cancelled() => {
                    tracing::debug!("Janitor stopping");
                    break;
                }
            }
        }
    })
}
