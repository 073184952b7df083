//! Extraction collaborator seam.
//!
//! The actual media extraction is delegated to an external tool (yt-dlp)
//! behind the [`AudioExtractor`] trait, so the API layer can be tested with
//! a scripted implementation and alternative backends can be plugged in.

use crate::error::{Error, Result};
use crate::types::MediaInfo;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

mod ytdlp;

pub use ytdlp::YtDlpExtractor;

/// Candidate output extensions probed against the filesystem after a
/// download, in preference order. The tool's reported extension is tried
/// first; it is not always honored exactly.
pub const CANDIDATE_EXTENSIONS: &[&str] = &["m4a", "webm", "opus", "mp3", "wav"];

/// Canonical watch URL prefix for bare media identifiers.
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Interface to the external audio extraction tool.
///
/// Implementations are expected to route traffic through the configured
/// proxy and apply their own socket timeout and retry policy; no timeout or
/// retry is imposed at the calling layer.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Fetch metadata for a media URL without downloading anything.
    async fn probe(&self, url: &str) -> Result<MediaInfo>;

    /// Download the best available audio stream to `output_template`
    /// (a path template containing the tool's extension placeholder) and
    /// return the reported metadata.
    async fn fetch(&self, url: &str, output_template: &str) -> Result<MediaInfo>;
}

/// Build the canonical watch URL for a bare media identifier.
pub fn watch_url(media_id: &str) -> String {
    format!("{WATCH_URL_BASE}{media_id}")
}

/// Expand caller input to an extraction target: full URLs pass through,
/// bare identifiers become canonical watch URLs.
pub fn canonical_watch_url(input: &str) -> String {
    if input.starts_with("http") {
        input.to_string()
    } else {
        watch_url(input)
    }
}

/// Build a unique artifact base path (no extension) for a media id inside
/// `temp_dir`. The random suffix keeps concurrent requests for the same
/// media id from colliding; path separators in the id are neutralized so
/// the artifact always lands directly in `temp_dir`.
pub fn unique_artifact_base(temp_dir: &Path, media_id: &str) -> PathBuf {
    let safe_id: String = media_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let suffix: u32 = rand::random();
    temp_dir.join(format!("{safe_id}_{suffix:08x}"))
}

/// Locate the real artifact produced for `base` by probing the reported
/// extension followed by [`CANDIDATE_EXTENSIONS`].
///
/// On success returns the resolved path and the extension that matched.
/// On a total miss, a wildcard scan of the directory collects any
/// partially-matching files into an [`Error::ArtifactNotFound`] diagnostic.
pub fn resolve_artifact(
    base: &Path,
    reported_ext: Option<&str>,
    media_id: &str,
) -> Result<(PathBuf, String)> {
    let mut candidates: Vec<&str> = Vec::with_capacity(CANDIDATE_EXTENSIONS.len() + 1);
    if let Some(ext) = reported_ext {
        candidates.push(ext);
    }
    for ext in CANDIDATE_EXTENSIONS {
        if !candidates.contains(ext) {
            candidates.push(ext);
        }
    }

    for ext in candidates {
        let path = PathBuf::from(format!("{}.{}", base.display(), ext));
        if path.is_file() {
            return Ok((path, ext.to_string()));
        }
    }

    Err(Error::ArtifactNotFound {
        media_id: media_id.to_string(),
        files: scan_partial_matches(base),
    })
}

/// List files in the artifact directory whose names share the base's prefix.
fn scan_partial_matches(base: &Path) -> Vec<String> {
    let Some(parent) = base.parent() else {
        return Vec::new();
    };
    let Some(prefix) = base.file_name().and_then(|name| name.to_str()) else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| name.starts_with(prefix))
        .collect();
    files.sort();
    files
}

/// Map a resolved extension to the Content-Type served to the client.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "webm" => "audio/webm",
        "opus" => "audio/opus",
        _ => "audio/mp4",
    }
}
