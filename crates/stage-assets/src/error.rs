use thiserror::Error;

/// Asset loading errors.
///
/// `Clone` so that every caller waiting on the same in-flight load
/// receives the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The bundle is not declared in the manifest (or no manifest is installed).
    #[error("Bundle not found in manifest: {bundle:?}")]
    ManifestNotFound { bundle: String },

    /// The manifest document could not be read or is malformed.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Fetching or decoding an asset failed.
    #[error("Failed to load asset {path:?}: {reason}")]
    AssetLoadFailure { path: String, reason: String },

    /// A font could not be fetched or parsed. Never silently replaced by a fallback family.
    #[error("Failed to load font {path:?}: {reason}")]
    FontLoadFailure { path: String, reason: String },
}

impl AssetError {
    pub(crate) fn load(path: &str, reason: impl ToString) -> Self {
        AssetError::AssetLoadFailure {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn font(path: &str, reason: impl ToString) -> Self {
        AssetError::FontLoadFailure {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The asset path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            AssetError::AssetLoadFailure { path, .. } | AssetError::FontLoadFailure { path, .. } => {
                Some(path)
            }
            AssetError::ManifestNotFound { .. } | AssetError::InvalidManifest(_) => None,
        }
    }
}
