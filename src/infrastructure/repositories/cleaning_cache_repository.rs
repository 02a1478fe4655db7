use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Persisted result of one cleaning pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCleaning {
    pub cleaned_text: String,
    pub changed: bool,
    #[serde(default)]
    pub changes: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub model: String,
}

/// Hex SHA-256 of the exact text bytes
pub fn cache_key(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Content-addressed cleaning cache, one JSON file per entry.
///
/// Entries are never rewritten once present. An entry that fails to parse is
/// deleted and reported as a miss.
pub struct CleaningCacheRepository {
    dir: PathBuf,
}

impl CleaningCacheRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, text: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(text)))
    }

    pub async fn get(&self, text: &str) -> Option<CachedCleaning> {
        let path = self.entry_path(text);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_slice::<CachedCleaning>(&bytes) {
            Ok(entry) => {
                tracing::debug!(path = %path.display(), "Cleaning cache hit");
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupted cache entry, removing"
                );
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    if e.kind() != ErrorKind::NotFound {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to remove corrupted cache entry");
                    }
                }
                None
            }
        }
    }

    /// Store `entry` for `text` unless an entry already exists.
    pub async fn put(&self, text: &str, entry: &CachedCleaning) -> std::io::Result<()> {
        let path = self.entry_path(text);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_vec_pretty(entry)?;
        let staging = self
            .dir
            .join(format!("{}.json.tmp-{}", cache_key(text), Uuid::new_v4()));
        tokio::fs::write(&staging, json).await?;

        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        tracing::debug!(path = %path.display(), "Cleaning cache entry written");
        Ok(())
    }
}
