//! Temporary files for pasted images.
//!
//! The directory listing is the only record of what has been written; there
//! is no index file. Every file this store creates is named
//! `paste-<unix-ms>-<random>.<ext>`, and the sweep only considers names with
//! the `paste-` prefix and an extension, so unrelated files sharing the
//! directory are never touched.

use crate::config::ClipboardConfig;
use crate::mime::extension_for_mime;
use anyhow::{Context, Result};
use futures_util::future::join_all;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Prefix shared by every file the store writes.
pub const FILE_PREFIX: &str = "paste-";

const SUFFIX_LEN: usize = 8;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// What happened to a single sweep candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepOutcome {
    Removed,
    Fresh,
    NotAFile,
    StatFailed,
    RemoveFailed,
}

/// Pasted-image store rooted at one directory.
#[derive(Debug, Clone)]
pub struct TempImageStore {
    dir: PathBuf,
    max_age: Duration,
}

impl TempImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    pub fn from_config(config: &ClipboardConfig) -> Self {
        Self::new(config.save_dir(), config.max_age)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the store directory (and parents). Idempotent.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))
    }

    /// Write `bytes` to a fresh `paste-*` file and return its absolute path.
    ///
    /// Names are not checked for collisions; two pastes would need the same
    /// millisecond and the same 8-character suffix.
    pub async fn persist(&self, mime_type: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = std::path::absolute(&self.dir)
            .with_context(|| format!("Failed to resolve {}", self.dir.display()))?;
        let path = dir.join(temp_file_name(
            mime_type,
            chrono::Utc::now().timestamp_millis(),
        ));

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write pasted image {}", path.display()))?;

        debug!(path = %path.display(), mime = mime_type, bytes = bytes.len(), "Persisted pasted image");
        Ok(path)
    }

    /// Remove `paste-*` files older than the configured max age.
    pub async fn sweep(&self) {
        self.sweep_at(SystemTime::now()).await;
    }

    /// Sweep as if the current time were `now`.
    ///
    /// Best-effort: an unreadable directory counts as empty, and a file that
    /// cannot be inspected or removed is skipped without failing the rest.
    pub async fn sweep_at(&self, now: SystemTime) {
        let names = list_candidates(&self.dir).await;
        if names.is_empty() {
            return;
        }

        let outcomes = join_all(
            names
                .iter()
                .map(|name| self.sweep_one(self.dir.join(name), now)),
        )
        .await;

        let removed = outcomes
            .iter()
            .filter(|o| **o == SweepOutcome::Removed)
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, SweepOutcome::StatFailed | SweepOutcome::RemoveFailed))
            .count();
        debug!(
            dir = %self.dir.display(),
            candidates = outcomes.len(),
            removed,
            failed,
            "Swept pasted images"
        );
    }

    async fn sweep_one(&self, path: PathBuf, now: SystemTime) -> SweepOutcome {
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not stat sweep candidate");
                return SweepOutcome::StatFailed;
            }
        };

        if !metadata.is_file() {
            return SweepOutcome::NotAFile;
        }

        let Ok(modified) = metadata.modified() else {
            return SweepOutcome::StatFailed;
        };

        // Modification times in the future count as fresh
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= self.max_age {
            return SweepOutcome::Fresh;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => SweepOutcome::Removed,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove stale pasted image");
                SweepOutcome::RemoveFailed
            }
        }
    }
}

/// Whether a directory entry name is eligible for the sweep.
pub fn is_sweep_candidate(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.contains('.')
}

/// `paste-<timestamp_ms>-<8 base36 chars>.<ext>`
pub fn temp_file_name(mime_type: &str, timestamp_ms: i64) -> String {
    format!(
        "{}{}-{}.{}",
        FILE_PREFIX,
        timestamp_ms,
        random_suffix(SUFFIX_LEN),
        extension_for_mime(mime_type)
    )
}

fn random_suffix(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..BASE36.len());
            BASE36[idx] as char
        })
        .collect()
}

async fn list_candidates(dir: &Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Pasted image directory not readable");
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if let Some(name) = entry.file_name().to_str() {
                    if is_sweep_candidate(name) {
                        names.push(name.to_string());
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Stopped listing pasted images");
                break;
            }
        }
    }
    names
}
