//! In-memory registry of issued download tokens.
//!
//! The registry is process-lifetime only: no persistence, no cross-process
//! sharing. A single mutex guards the map; it is never held across an await
//! point, so request handlers and the janitor contend only for the duration
//! of a map operation.

use crate::types::{DownloadRecord, DownloadToken, RecordStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Token-indexed map of pending downloads with TTL-based eviction.
#[derive(Debug, Default)]
pub struct DownloadRegistry {
    records: Mutex<HashMap<String, DownloadRecord>>,
}

impl DownloadRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keyed by its token.
    pub fn insert(&self, record: DownloadRecord) {
        let mut records = self.lock();
        records.insert(record.token.as_str().to_string(), record);
    }

    /// Look up a record by token.
    pub fn get(&self, token: &str) -> Option<DownloadRecord> {
        self.lock().get(token).cloned()
    }

    /// Attach the real artifact path to a known record and mark it as
    /// fetching. Returns false when the token is unknown, in which case the
    /// caller streams untracked.
    pub fn attach_artifact(&self, token: &str, path: PathBuf) -> bool {
        let mut records = self.lock();
        match records.get_mut(token) {
            Some(record) => {
                record.path = Some(path);
                record.status = RecordStatus::Fetching;
                true
            }
            None => false,
        }
    }

    /// Mark a record as served (delivery finished and artifact cleaned up).
    pub fn mark_served(&self, token: &DownloadToken) {
        let mut records = self.lock();
        if let Some(record) = records.get_mut(token.as_str()) {
            record.status = RecordStatus::Served;
        }
    }

    /// Remove every record older than `max_age` and best-effort delete its
    /// on-disk artifact. Returns the swept records.
    ///
    /// Deletion errors are logged and otherwise ignored: the file may already
    /// be gone (the stream responder deletes after delivery) or never have
    /// existed (the token was issued but the stream endpoint never claimed it).
    pub fn sweep_expired(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<DownloadRecord> {
        let expired: Vec<DownloadRecord> = {
            let mut records = self.lock();
            let tokens: Vec<String> = records
                .iter()
                .filter(|(_, record)| {
                    now.signed_duration_since(record.created_at)
                        .to_std()
                        .map(|age| age > max_age)
                        .unwrap_or(false)
                })
                .map(|(token, _)| token.clone())
                .collect();
            tokens
                .into_iter()
                .filter_map(|token| records.remove(&token))
                .collect()
        };

        for record in &expired {
            let Some(path) = &record.path else { continue };
            match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed expired artifact");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove expired artifact");
                }
            }
        }

        expired
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry holds no records.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DownloadRecord>> {
        // A poisoned mutex means a panic mid-map-operation; the map itself
        // is still structurally sound, so keep serving.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
