//! # audio-dl
//!
//! Backend library for an audio extraction and streaming API.
//!
//! The hard part, extracting the best audio stream from a media URL, is
//! delegated to an external tool (yt-dlp) routed through a configured
//! outbound proxy. This crate contributes the coordination layer around it:
//! request routing, a token-indexed registry of pending downloads, a
//! periodic temp-file janitor, and streamed delivery that removes the
//! artifact once the response body finishes.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Explicit ownership** - The registry and the extractor handle are
//!   constructor-injected, never ambient module state
//! - **Transient by design** - Nothing survives a restart; the registry is
//!   in-memory and every artifact is deleted after one delivery
//!
//! ## Quick Start
//!
//! ```no_run
//! use audio_dl::{AudioDownloader, Config, run_with_shutdown};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Arc::new(AudioDownloader::new(Config::from_env())?);
//!
//!     let _janitor = downloader.start_janitor();
//!     let _api = downloader.spawn_api_server();
//!
//!     // Run until SIGTERM/SIGINT, then shut down gracefully
//!     run_with_shutdown(downloader).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Extraction collaborator seam and yt-dlp implementation
pub mod extractor;
/// Background temp-file janitor
pub mod janitor;
/// In-memory download registry
pub mod registry;
/// Service orchestration
pub mod service;
/// Streamed delivery with cleanup-on-drop
pub mod stream;
/// Core types: tokens, records, media metadata
pub mod types;

// Re-export commonly used types
pub use config::{Config, ExtractorConfig, JanitorConfig, ProxyConfig, ServerConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use extractor::{AudioExtractor, YtDlpExtractor};
pub use registry::DownloadRegistry;
pub use service::AudioDownloader;
pub use types::{DownloadRecord, DownloadToken, MediaInfo, RecordStatus};

use std::sync::Arc;

/// Helper function to run the service with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's
/// [`shutdown`](AudioDownloader::shutdown) method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to `ctrl_c` if
///   signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(downloader: Arc<AudioDownloader>) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        _ => {
            tracing::warn!("Could not register unix signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
