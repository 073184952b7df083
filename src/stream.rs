//! One-shot streamed delivery of a downloaded artifact.
//!
//! [`FileStream`] yields the file in fixed-size chunks as an HTTP body;
//! the embedded [`CleanupGuard`] deletes the file when the stream is
//! dropped, which happens on every exit path: full delivery, an I/O error
//! mid-transfer, or the client disconnecting. The same artifact can never
//! be streamed twice.

use crate::registry::DownloadRegistry;
use crate::types::DownloadToken;
use axum::body::Bytes;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;

/// Chunk size for streamed responses.
pub const CHUNK_SIZE: usize = 8192;

/// Deletes an artifact (and finalizes its registry record, when tracked)
/// on drop.
///
/// Scoped acquisition with guaranteed cleanup: constructing the guard is
/// taking ownership of the artifact's remaining lifetime.
pub struct CleanupGuard {
    path: PathBuf,
    tracked: Option<(Arc<DownloadRegistry>, DownloadToken)>,
}

impl CleanupGuard {
    /// Guard an untracked artifact (no registry record to finalize).
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            tracked: None,
        }
    }

    /// Guard an artifact tied to a registry record; the record is marked
    /// served once cleanup runs.
    pub fn tracked(path: PathBuf, registry: Arc<DownloadRegistry>, token: DownloadToken) -> Self {
        Self {
            path,
            tracked: Some((registry, token)),
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed served artifact");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove served artifact");
            }
        }

        if let Some((registry, token)) = self.tracked.take() {
            registry.mark_served(&token);
        }
    }
}

/// Chunked byte stream over a downloaded artifact, with cleanup on drop.
pub struct FileStream {
    inner: ReaderStream<tokio::fs::File>,
    _guard: CleanupGuard,
}

impl FileStream {
    /// Open the artifact for streaming. The guard travels with the stream,
    /// so the file is removed no matter how delivery ends.
    pub async fn open(path: &Path, guard: CleanupGuard) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self {
            inner: ReaderStream::with_capacity(file, CHUNK_SIZE),
            _guard: guard,
        })
    }
}

impl Stream for FileStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DownloadRecord;
    use crate::types::RecordStatus;
    use futures::StreamExt;

    #[test]
    fn guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc123_00000001.m4a");
        std::fs::write(&path, b"audio").unwrap();

        drop(CleanupGuard::new(path.clone()));

        assert!(!path.exists());
    }

    #[test]
    fn guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.m4a");
        drop(CleanupGuard::new(path));
    }

    #[test]
    fn tracked_guard_marks_record_served() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc123_00000001.m4a");
        std::fs::write(&path, b"audio").unwrap();

        let registry = Arc::new(DownloadRegistry::new());
        let record = DownloadRecord::new("abc123", "mp3");
        let token = record.token.clone();
        registry.insert(record);

        drop(CleanupGuard::tracked(
            path.clone(),
            registry.clone(),
            token.clone(),
        ));

        assert!(!path.exists());
        assert_eq!(
            registry.get(token.as_str()).unwrap().status,
            RecordStatus::Served
        );
    }

    #[tokio::test]
    async fn stream_yields_full_content_in_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc123_00000001.m4a");
        // Three full chunks plus a partial tail
        let content = vec![7u8; CHUNK_SIZE * 3 + 100];
        tokio::fs::write(&path, &content).await.unwrap();

        let mut stream = FileStream::open(&path, CleanupGuard::new(path.clone()))
            .await
            .unwrap();

        let mut collected = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            assert!(chunk.len() <= CHUNK_SIZE);
            collected.extend_from_slice(&chunk);
            chunks += 1;
        }

        assert_eq!(collected, content);
        assert!(chunks >= 4, "expected at least 4 chunks, got {chunks}");

        drop(stream);
        assert!(!path.exists(), "file should be deleted after delivery");
    }

    #[tokio::test]
    async fn file_is_deleted_even_when_stream_is_abandoned_mid_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc123_00000001.m4a");
        tokio::fs::write(&path, vec![7u8; CHUNK_SIZE * 4]).await.unwrap();

        let mut stream = FileStream::open(&path, CleanupGuard::new(path.clone()))
            .await
            .unwrap();

        // Simulate a client disconnect after one chunk.
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), CHUNK_SIZE);
        drop(stream);

        assert!(!path.exists(), "abandoned transfer must still clean up");
    }
}
