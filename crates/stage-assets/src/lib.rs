//! stage-assets: manifest-driven asset loading.
//!
//! Bundles and single paths are fetched from an `AssetSource`, decoded by
//! extension (images, fonts, spritesheets) and cached per resolved path.
//! Concurrent requests for a path join the load already in flight.

pub mod cache;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod resource;
pub mod source;
pub mod spritesheet;

pub use cache::ResourceCache;
pub use error::AssetError;
pub use loader::{AssetLoader, Bundle, normalize_path, resolve_relative};
pub use manifest::{AssetDecl, BundleDecl, Manifest};
pub use resource::{AssetKind, FontFace, Resource};
pub use source::{AssetSource, DiskSource, MemorySource};
pub use spritesheet::Spritesheet;
