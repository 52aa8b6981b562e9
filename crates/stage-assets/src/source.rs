//! Where asset bytes come from.
//!
//! `AssetSource` is the seam between the loader and the outside world:
//! `DiskSource` reads an asset directory through tokio's filesystem API,
//! `MemorySource` serves bytes registered up front (embedded assets, tests).

use crate::error::AssetError;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Fetches raw asset bytes by resolved path.
pub trait AssetSource: Send + Sync + 'static {
    /// Fetch the bytes stored at `path`.
    ///
    /// # Errors
    /// `AssetLoadFailure` when the path does not exist or cannot be read.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send;
}

// ─── Disk ────────────────────────────────────────────────────────────────

/// Serves files below a root directory (the "public" folder).
#[derive(Debug, Clone)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DiskSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.root.join(path);
        log::debug!("Reading {}", full.display());
        tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AssetError::load(path, format!("not found ({})", full.display()))
            }
            _ => AssetError::load(path, e),
        })
    }
}

// ─── Memory ──────────────────────────────────────────────────────────────

/// Serves bytes registered with `with_file`. Counts fetches per path and
/// can simulate latency so concurrent loads overlap.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Arc<[u8]>>,
    latency: Option<Duration>,
    total: AtomicUsize,
    per_path: Mutex<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    /// Sleep this long inside every fetch.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Total fetches issued, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Fetches issued for one path.
    pub fn fetches_of(&self, path: &str) -> usize {
        self.per_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

impl AssetSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .per_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default() += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.files
            .get(path)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::load(path, "not found"))
    }
}

/// Share a source between loaders (and keep a handle to inspect it).
impl<S: AssetSource> AssetSource for Arc<S> {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send {
        S::fetch(self, path)
    }
}
