//! Application state for the API server

use crate::Config;
use crate::service::AudioDownloader;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the service instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The main AudioDownloader instance
    pub downloader: Arc<AudioDownloader>,

    /// Configuration (read access for handlers)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<AudioDownloader>, config: Arc<Config>) -> Self {
        Self { downloader, config }
    }
}
