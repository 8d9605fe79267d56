use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use log::{debug, info};

use super::config::CleaningConfig;
use super::error::IngestionError;
use super::loader::load_and_clean;
use super::model::CleanedTable;

/// What makes two loads of a path interchangeable: the resolved path plus
/// its modification time and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    pub fn of(path: &Path) -> Result<Self, IngestionError> {
        let io_err = |source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        };
        let resolved = path.canonicalize().map_err(io_err)?;
        let meta = std::fs::metadata(&resolved).map_err(io_err)?;
        Ok(Self {
            path: resolved,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct CacheEntry {
    identity: SourceIdentity,
    table: Arc<CleanedTable>,
}

/// Memoizes the cleaned table of the most recently loaded source.
///
/// The entry is reused while its [`SourceIdentity`] is unchanged and replaced
/// whole when the source changes or another source is loaded. Callers hold
/// `Arc`s, so a table handed out earlier stays complete and valid after a
/// replacement.
pub struct TableCache {
    config: CleaningConfig,
    current: Mutex<Option<CacheEntry>>,
    parses: AtomicUsize,
}

impl TableCache {
    pub fn new(config: CleaningConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
            parses: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Return the cleaned table for `path`, parsing only if it is not the
    /// cached source or has changed since the cached load.
    pub fn load(&self, path: &Path) -> Result<Arc<CleanedTable>, IngestionError> {
        let identity = SourceIdentity::of(path)?;

        if let Some(entry) = self.lock().as_ref() {
            if entry.identity == identity {
                debug!("cache hit for {}", identity.path.display());
                return Ok(Arc::clone(&entry.table));
            }
            if entry.identity.path == identity.path {
                info!("{} changed on disk, reloading", identity.path.display());
            }
        }

        let table = Arc::new(load_and_clean(&identity.path, &self.config)?);
        self.parses.fetch_add(1, Ordering::Relaxed);

        *self.lock() = Some(CacheEntry {
            identity,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// Resolved path of the source currently held, if any.
    pub fn cached_source(&self) -> Option<PathBuf> {
        self.lock().as_ref().map(|entry| entry.identity.path.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// How many times a source has actually been parsed.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        // The entry is replaced whole, so a poisoned slot is still consistent.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}
