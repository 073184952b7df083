//! Core types for tokens, download records, and extracted media metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Opaque identifier for an issued download.
///
/// Generated as the MD5 hex digest of `"{media_id}:{format}:{unix_micros}"`.
/// The time component guarantees that repeated requests for the same media
/// and format produce distinct tokens. Tokens are unguessable enough to avoid
/// casual collision but are not a security boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DownloadToken(pub String);

impl DownloadToken {
    /// Issue a fresh token for the given media id and format at `issued_at`.
    pub fn issue(media_id: &str, format: &str, issued_at: DateTime<Utc>) -> Self {
        let input = format!("{}:{}:{}", media_id, format, issued_at.timestamp_micros());
        Self(format!("{:x}", md5::compute(input.as_bytes())))
    }

    /// The token value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DownloadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a download record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Token issued, no extraction started yet
    Pending,
    /// The stream endpoint claimed this token and attached its artifact path
    Fetching,
    /// Delivery finished (successfully or not) and the artifact was cleaned up
    Served,
}

/// One entry in the download registry, created at token issuance.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRecord {
    /// The issued token identifying this record
    pub token: DownloadToken,

    /// Caller-supplied identifier for the source media
    pub media_id: String,

    /// Requested output container hint (advisory only - the delivered format
    /// depends on what the extraction tool negotiates)
    pub format: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,

    /// Lifecycle state
    pub status: RecordStatus,

    /// On-disk artifact path, attached once the stream endpoint claims the
    /// token (None until then; may dangle after delivery cleanup)
    #[schema(value_type = Option<String>)]
    pub path: Option<PathBuf>,
}

impl DownloadRecord {
    /// Create a pending record with a freshly issued token.
    pub fn new(media_id: impl Into<String>, format: impl Into<String>) -> Self {
        let media_id = media_id.into();
        let format = format.into();
        let created_at = Utc::now();
        Self {
            token: DownloadToken::issue(&media_id, &format, created_at),
            media_id,
            format,
            created_at,
            status: RecordStatus::Pending,
            path: None,
        }
    }
}

/// Metadata returned by the extraction tool for a single media item.
///
/// All fields carry the defaults the API surface promises: `title` and
/// `channel` fall back to "Unknown", `duration_seconds` to 0, `thumbnail`
/// to the empty string.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Media title ("Unknown" when the tool reports none)
    pub title: String,

    /// Duration in whole seconds (0 when unknown)
    pub duration_seconds: u64,

    /// Thumbnail URL (empty when unknown)
    pub thumbnail: String,

    /// Channel name, falling back to the uploader, falling back to "Unknown"
    pub channel: String,

    /// Output extension the tool reports after a download; the filesystem
    /// probe may override it (the tool does not always honor it exactly)
    pub ext: Option<String>,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            duration_seconds: 0,
            thumbnail: String::new(),
            channel: "Unknown".to_string(),
            ext: None,
        }
    }
}
