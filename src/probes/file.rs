//! On-disk probe metadata cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::{CacheError, LoadResult, ProbeDirectory};
use crate::time::Clock;

/// JSON file holding probe metadata keyed by probe id.
///
/// The layout is a flat object, `{"1001": {"asn_v4": 3333, ...}, ...}`.
///
/// # Atomic Writes
///
/// Saving writes `{path}.tmp` first and renames it over `{path}`, so a
/// concurrently running invocation sees either the old or the new file,
/// never a partial one.
#[derive(Debug, Clone)]
pub struct FileProbeCache {
    path: PathBuf,
}

impl FileProbeCache {
    /// Creates a cache backed by the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache.
    #[must_use]
    pub fn load(&self) -> LoadResult {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        match serde_json::from_str::<ProbeDirectory>(&content) {
            Ok(directory) => LoadResult::Loaded(directory),
            Err(e) => LoadResult::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            },
        }
    }

    /// Returns how long ago the cache file was last written, or `None` if
    /// there is no file or its modification time is unavailable.
    ///
    /// A modification time in the future counts as zero age.
    #[must_use]
    pub fn age(&self, clock: &impl Clock) -> Option<Duration> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(clock.now().duration_since(modified).unwrap_or_default())
    }

    /// Returns true if the cache is missing or older than `max_age`.
    #[must_use]
    pub fn is_stale(&self, clock: &impl Clock, max_age: Duration) -> bool {
        self.age(clock).is_none_or(|age| age > max_age)
    }

    /// Replaces the cache file with `directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub async fn save(&self, directory: &ProbeDirectory) -> Result<(), CacheError> {
        self.write(directory, None).await
    }

    /// Replaces the cache file without making it look fresher.
    ///
    /// The previous modification time is carried over. A cache written for
    /// the first time is dated at the Unix epoch so it stays stale.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub async fn save_keeping_age(&self, directory: &ProbeDirectory) -> Result<(), CacheError> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        self.write(directory, Some(modified)).await
    }

    async fn write(
        &self,
        directory: &ProbeDirectory,
        modified: Option<SystemTime>,
    ) -> Result<(), CacheError> {
        let path = self.path.clone();
        let content = serde_json::to_string(directory).map_err(CacheError::Serialize)?;

        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &content, modified))
            .await
            .map_err(|e| CacheError::Write(std::io::Error::other(e)))?
    }

    fn save_blocking(
        path: &Path,
        content: &str,
        modified: Option<SystemTime>,
    ) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CacheError::Write)?;
            }
        }

        // cache.json -> cache.json.tmp, not cache.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
        std::fs::write(&temp_path, content).map_err(CacheError::Write)?;
        if let Some(time) = modified {
            std::fs::File::options()
                .write(true)
                .open(&temp_path)
                .and_then(|file| file.set_modified(time))
                .map_err(CacheError::Write)?;
        }
        std::fs::rename(&temp_path, path).map_err(CacheError::Write)?;

        Ok(())
    }
}
