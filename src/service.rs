//! Service orchestration: owns the registry, the extractor handle, and the
//! janitor lifecycle.

use crate::config::Config;
use crate::error::Result;
use crate::extractor::{AudioExtractor, YtDlpExtractor};
use crate::janitor::spawn_janitor;
use crate::registry::DownloadRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main service instance (cloneable - all fields are shared handles).
///
/// Construction injects every collaborator explicitly: the registry is
/// created here and handed to both the API router and the janitor, rather
/// than living in ambient module state.
#[derive(Clone)]
pub struct AudioDownloader {
    /// Configuration (shared across tasks)
    pub(crate) config: Arc<Config>,
    /// Token-indexed registry of pending downloads
    pub(crate) registry: Arc<DownloadRegistry>,
    /// Extraction collaborator (trait object for pluggable implementations)
    pub(crate) extractor: Arc<dyn AudioExtractor>,
    /// Cancellation root for background tasks
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for AudioDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDownloader")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl AudioDownloader {
    /// Create a service backed by the yt-dlp extractor.
    ///
    /// Validates the configuration, ensures the artifact directory exists,
    /// and discovers the extraction binary.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.temp_dir)?;

        let extractor = YtDlpExtractor::new(config.extractor.clone(), config.proxy.clone())?;
        Ok(Self::with_extractor(config, Arc::new(extractor)))
    }

    /// Create a service with an explicit extractor implementation.
    ///
    /// This is the seam tests use to substitute a scripted collaborator.
    pub fn with_extractor(config: Config, extractor: Arc<dyn AudioExtractor>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(DownloadRegistry::new()),
            extractor,
            cancel_token: CancellationToken::new(),
        }
    }

    /// The download registry.
    pub fn registry(&self) -> &Arc<DownloadRegistry> {
        &self.registry
    }

    /// The extraction collaborator.
    pub fn extractor(&self) -> &Arc<dyn AudioExtractor> {
        &self.extractor
    }

    /// The service configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Start the janitor background task.
    ///
    /// The task sweeps the registry on the configured period and stops when
    /// [`shutdown`](Self::shutdown) is called.
    pub fn start_janitor(&self) -> tokio::task::JoinHandle<()> {
        tracing::info!(
            interval_secs = self.config.janitor.sweep_interval_secs,
            max_age_secs = self.config.janitor.max_age_secs,
            "Janitor background task started"
        );
        spawn_janitor(
            Arc::clone(&self.registry),
            self.config.janitor.clone(),
            self.cancel_token.child_token(),
        )
    }

    /// Spawn the API server as a background task.
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = Arc::new(self.clone());
        tokio::spawn(async move { crate::api::start_api_server(downloader).await })
    }

    /// Gracefully shut down the service.
    ///
    /// Stops the janitor and removes any tracked artifacts still on disk.
    /// The registry itself needs no persistence step - it is process-lifetime
    /// by design.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.cancel_token.cancel();

        let swept = self
            .registry
            .sweep_expired(chrono::Utc::now(), std::time::Duration::ZERO);
        if !swept.is_empty() {
            tracing::info!(count = swept.len(), "Removed tracked downloads at shutdown");
        }

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
