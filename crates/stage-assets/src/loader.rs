//! The asset loader: manifest bundles and single paths, cached per path.

use crate::cache::ResourceCache;
use crate::error::AssetError;
use crate::manifest::Manifest;
use crate::resource::{self, AssetKind, FontFace, Resource};
use crate::source::AssetSource;
use crate::spritesheet::{Spritesheet, SpritesheetDoc};
use stage_core::Texture;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinSet;

/// The resources of one manifest bundle, keyed by logical name.
#[derive(Debug, Clone)]
pub struct Bundle {
    name: String,
    resources: HashMap<String, Resource>,
}

impl Bundle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.get(name).and_then(Resource::as_texture)
    }

    /// Logical names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }
}

struct Inner<S> {
    source: S,
    manifest: Option<Manifest>,
    cache: ResourceCache,
    fetches: AtomicUsize,
}

/// Loads and caches assets from an `AssetSource`.
///
/// Cloning is cheap and clones share one cache, so a path is fetched once
/// no matter which clone asks for it.
pub struct AssetLoader<S: AssetSource> {
    inner: Arc<Inner<S>>,
}

type Resolving = Pin<Box<dyn Future<Output = Result<Resource, AssetError>> + Send>>;

impl<S: AssetSource> Clone for AssetLoader<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: AssetSource> fmt::Debug for AssetLoader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetLoader")
            .field("manifest", &self.inner.manifest)
            .field("cached", &self.inner.cache.len())
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}

impl<S: AssetSource> AssetLoader<S> {
    /// A loader without a manifest. Only `load_single` and the typed
    /// helpers are usable; every bundle lookup fails.
    pub fn new(source: S) -> Self {
        Self::build(source, None)
    }

    pub fn with_manifest(source: S, manifest: Manifest) -> Self {
        Self::build(source, Some(manifest))
    }

    /// Fetch the manifest at `manifest_path` through `source` and install it.
    ///
    /// # Errors
    /// `InvalidManifest` if the document cannot be fetched or parsed.
    pub async fn init(source: S, manifest_path: &str) -> Result<Self, AssetError> {
        let bytes = source
            .fetch(&normalize_path(manifest_path))
            .await
            .map_err(|e| AssetError::InvalidManifest(e.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| AssetError::InvalidManifest(format!("{manifest_path}: {e}")))?;
        let manifest = Manifest::from_json(&text)?;
        log::info!(
            "Installed manifest {manifest_path} ({} bundles)",
            manifest.bundles.len()
        );
        Ok(Self::with_manifest(source, manifest))
    }

    fn build(source: S, manifest: Option<Manifest>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                manifest,
                cache: ResourceCache::new(),
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.inner.manifest.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Load every asset of a manifest bundle.
    ///
    /// Assets load concurrently. The result holds exactly the declared
    /// names; the first failure is returned without waiting for the rest.
    /// Loads still in flight keep running and land in the cache.
    pub async fn load_bundle(&self, name: &str) -> Result<Bundle, AssetError> {
        let decl = self
            .inner
            .manifest
            .as_ref()
            .filter(|_| !name.is_empty())
            .and_then(|m| m.bundle(name))
            .ok_or_else(|| AssetError::ManifestNotFound {
                bundle: name.to_string(),
            })?;

        log::info!("Loading bundle {name} ({} assets)", decl.assets.len());

        let mut tasks = JoinSet::new();
        for asset in &decl.assets {
            let loader = self.clone();
            let alias = asset.name.clone();
            let src = asset.src.clone();
            tasks.spawn(async move {
                let resource = loader.load_single(&src).await;
                (alias, resource)
            });
        }

        let mut resources = HashMap::with_capacity(decl.assets.len());
        while let Some(joined) = tasks.join_next().await {
            let (alias, resource) =
                joined.map_err(|e| AssetError::load(name, format!("load task failed: {e}")))?;
            match resource {
                Ok(resource) => {
                    resources.insert(alias, resource);
                }
                Err(e) => {
                    log::error!("Bundle {name} failed: {e}");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(Bundle {
            name: name.to_string(),
            resources,
        })
    }

    /// Load one asset by path, decoding it according to its extension.
    pub async fn load_single(&self, path: &str) -> Result<Resource, AssetError> {
        let key = normalize_path(path);
        let kind = AssetKind::from_path(&key);
        self.cached(&key, kind).await
    }

    pub async fn load_texture(&self, path: &str) -> Result<Texture, AssetError> {
        match self.load_single(path).await? {
            Resource::Texture(texture) => Ok(texture),
            other => Err(mismatch(path, "texture", &other)),
        }
    }

    pub async fn load_font(&self, path: &str) -> Result<Arc<FontFace>, AssetError> {
        match self.load_single(path).await? {
            Resource::Font(font) => Ok(font),
            other => Err(mismatch(path, "font", &other)),
        }
    }

    pub async fn load_spritesheet(&self, path: &str) -> Result<Arc<Spritesheet>, AssetError> {
        match self.load_single(path).await? {
            Resource::Spritesheet(sheet) => Ok(sheet),
            other => Err(mismatch(path, "spritesheet", &other)),
        }
    }

    /// Fetches issued to the source so far.
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    /// Paths whose load has finished, sorted.
    pub fn cached_paths(&self) -> Vec<String> {
        self.inner.cache.keys()
    }

    /// Resolve `key` at most once; everyone else awaits its outcome.
    ///
    /// The resolution runs on its own task, so a caller that stops waiting
    /// never leaves the cell empty for the others.
    async fn cached(&self, key: &str, kind: AssetKind) -> Result<Resource, AssetError> {
        let slot = self.inner.cache.slot(key);
        if let Some(done) = slot.get() {
            log::trace!("Cache hit {key}");
            return done.clone();
        }

        let loader = self.clone();
        let owned = key.to_string();
        let task = tokio::spawn(async move {
            slot.get_or_init(|| loader.resolve(owned, kind))
                .await
                .clone()
        });
        task.await
            .map_err(|e| AssetError::load(key, format!("load task failed: {e}")))?
    }

    fn resolve(&self, key: String, kind: AssetKind) -> Resolving {
        let loader = self.clone();
        Box::pin(async move {
            match kind {
                AssetKind::Spritesheet => loader.resolve_spritesheet(&key).await,
                kind => loader.resolve_leaf(&key, kind).await,
            }
        })
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.source.fetch(path).await
    }

    async fn resolve_leaf(&self, path: &str, kind: AssetKind) -> Result<Resource, AssetError> {
        match kind {
            AssetKind::Font => {
                let bytes = self.fetch(path).await.map_err(|e| match e {
                    AssetError::AssetLoadFailure { path, reason } => {
                        AssetError::FontLoadFailure { path, reason }
                    }
                    other => other,
                })?;
                Ok(Resource::Font(Arc::new(resource::decode_font(path, bytes)?)))
            }
            AssetKind::Image => {
                let bytes = self.fetch(path).await?;
                Ok(Resource::Texture(resource::decode_texture(path, &bytes)?))
            }
            AssetKind::Spritesheet => Err(AssetError::load(path, "not a leaf asset")),
        }
    }

    async fn resolve_spritesheet(&self, path: &str) -> Result<Resource, AssetError> {
        let bytes = self.fetch(path).await?;
        let doc = SpritesheetDoc::parse(path, &bytes)?;

        let image_path = resolve_relative(path, doc.image());
        let kind = AssetKind::from_path(&image_path);
        if kind != AssetKind::Image {
            return Err(AssetError::load(
                path,
                format!("meta.image {:?} is not an image", doc.image()),
            ));
        }
        let base = self.cached(&image_path, kind).await?;
        let base = match base {
            Resource::Texture(texture) => texture,
            other => return Err(mismatch(&image_path, "texture", &other)),
        };

        Ok(Resource::Spritesheet(Arc::new(Spritesheet::from_doc(
            path, doc, base,
        )?)))
    }
}

fn mismatch(path: &str, expected: &str, found: &Resource) -> AssetError {
    AssetError::load(path, format!("expected a {expected}, found a {}", found.kind()))
}

/// Canonical cache key: forward slashes, no leading `./` or `/`, and `.`
/// and `..` segments folded.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Resolve `relative` against the directory containing `base_file`.
pub fn resolve_relative(base_file: &str, relative: &str) -> String {
    let base = normalize_path(base_file);
    match base.rsplit_once('/') {
        Some((dir, _)) => normalize_path(&format!("{dir}/{relative}")),
        None => normalize_path(relative),
    }
}
