//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`media`] - Metadata lookup, download preparation, streamed delivery
//! - [`history`] - Download history placeholder
//! - [`system`] - Service index, connectivity probe, OpenAPI spec

use serde::{Deserialize, Serialize};

mod history;
mod media;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use history::*;
pub use media::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /api/info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InfoRequest {
    /// Media URL or bare identifier (bare ids are expanded to a canonical
    /// watch URL)
    #[serde(default)]
    pub url: String,
}

/// Response body for POST /api/info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InfoResponse {
    /// Media title ("Unknown" when the extractor reports none)
    pub title: String,
    /// Duration in whole seconds (0 when unknown)
    pub duration: u64,
    /// Thumbnail URL (empty when unknown)
    pub thumbnail: String,
    /// Channel or uploader name ("Unknown" when absent)
    pub channel: String,
}

/// Request body for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PrepareDownloadRequest {
    /// Media identifier to prepare a download for
    #[serde(default, rename = "videoId")]
    pub video_id: String,
    /// Requested output container hint (default: "mp3", advisory only)
    #[serde(default = "default_format")]
    pub format: String,
}

/// Response body for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PrepareDownloadResponse {
    /// Always true on the success path
    pub success: bool,
    /// Relative stream URL embedding token, media id, and format
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    /// Suggested filename for the client's save dialog
    pub filename: String,
}

/// Query parameters for GET /api/stream
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StreamQuery {
    /// Media identifier to fetch and stream
    #[serde(default, rename = "videoId")]
    pub video_id: String,
    /// Requested output container hint (default: "mp3", advisory only)
    #[serde(default = "default_format")]
    pub format: String,
    /// Download token issued by POST /download. Accepted but not required:
    /// known tokens get their registry record tied to the streamed artifact,
    /// unknown or absent tokens stream untracked.
    #[serde(default)]
    pub token: Option<String>,
}

pub(crate) fn default_format() -> String {
    "mp3".to_string()
}
