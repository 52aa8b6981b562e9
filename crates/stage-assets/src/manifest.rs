//! Asset manifest: named bundles of `{name, src}` declarations.
//!
//! JSON layout:
//!
//! ```json
//! { "bundles": [
//!     { "name": "game_screen",
//!       "assets": [ { "alias": "bubble_bomb", "src": "images/game-screen/bubble_bomb.png" } ] }
//! ] }
//! ```
//!
//! `alias` may also be spelled `name`, and `src` may be spelled `srcPath`.

use crate::error::AssetError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Immutable set of bundle declarations, read once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    pub bundles: Vec<BundleDecl>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BundleDecl {
    pub name: String,
    pub assets: Vec<AssetDecl>,
}

/// One logical asset name and the path it resolves to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetDecl {
    #[serde(alias = "alias")]
    pub name: String,
    #[serde(alias = "srcPath")]
    pub src: String,
}

impl Manifest {
    /// Parse and validate a manifest document.
    ///
    /// # Errors
    /// `InvalidManifest` for malformed JSON, empty names, duplicate bundle
    /// names, or duplicate asset names within a bundle.
    pub fn from_json(text: &str) -> Result<Self, AssetError> {
        let manifest: Manifest =
            serde_json::from_str(text).map_err(|e| AssetError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AssetError::InvalidManifest(format!("{}: {e}", path.display())))?;
        let manifest = Self::from_json(&text)?;
        log::info!(
            "Loaded manifest {} ({} bundles)",
            path.display(),
            manifest.bundles.len()
        );
        Ok(manifest)
    }

    pub fn bundle(&self, name: &str) -> Option<&BundleDecl> {
        self.bundles.iter().find(|b| b.name == name)
    }

    pub fn bundle_names(&self) -> impl Iterator<Item = &str> {
        self.bundles.iter().map(|b| b.name.as_str())
    }

    fn validate(&self) -> Result<(), AssetError> {
        let mut bundle_names = HashSet::new();
        for bundle in &self.bundles {
            if bundle.name.is_empty() {
                return Err(AssetError::InvalidManifest("bundle with empty name".into()));
            }
            if !bundle_names.insert(bundle.name.as_str()) {
                return Err(AssetError::InvalidManifest(format!(
                    "duplicate bundle '{}'",
                    bundle.name
                )));
            }

            let mut asset_names = HashSet::new();
            for asset in &bundle.assets {
                if asset.name.is_empty() || asset.src.is_empty() {
                    return Err(AssetError::InvalidManifest(format!(
                        "bundle '{}' has an asset with an empty name or src",
                        bundle.name
                    )));
                }
                if !asset_names.insert(asset.name.as_str()) {
                    return Err(AssetError::InvalidManifest(format!(
                        "duplicate asset '{}' in bundle '{}'",
                        asset.name, bundle.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BUNDLE_MANIFEST: &str = r#"{
        "bundles": [
            {
                "name": "game_screen",
                "assets": [
                    { "alias": "bubble_bomb", "src": "images/game-screen/bubble_bomb.png" },
                    { "alias": "sample", "src": "images/game-screen/sample.png" }
                ]
            },
            {
                "name": "title_screen",
                "assets": [ { "name": "logo", "srcPath": "images/title/logo.png" } ]
            }
        ]
    }"#;

    #[test]
    fn parses_bundle_layout_and_aliases() {
        let m = Manifest::from_json(BUNDLE_MANIFEST).unwrap();
        assert_eq!(
            m.bundle_names().collect::<Vec<_>>(),
            vec!["game_screen", "title_screen"]
        );
        let title = m.bundle("title_screen").unwrap();
        assert_eq!(
            title.assets,
            vec![AssetDecl {
                name: "logo".into(),
                src: "images/title/logo.png".into(),
            }]
        );
        assert!(m.bundle("missing").is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Manifest::from_json("{ not json").unwrap_err();
        assert!(matches!(err, AssetError::InvalidManifest(_)));
    }

    #[test]
    fn rejects_duplicate_bundles() {
        let doc = r#"{ "bundles": [
            { "name": "a", "assets": [] },
            { "name": "a", "assets": [] }
        ] }"#;
        let err = Manifest::from_json(doc).unwrap_err();
        assert_eq!(err, AssetError::InvalidManifest("duplicate bundle 'a'".into()));
    }

    #[test]
    fn rejects_duplicate_asset_names() {
        let doc = r#"{ "bundles": [ { "name": "a", "assets": [
            { "alias": "x", "src": "x.png" },
            { "alias": "x", "src": "y.png" }
        ] } ] }"#;
        assert!(Manifest::from_json(doc).is_err());
    }

    #[test]
    fn rejects_empty_names() {
        let doc = r#"{ "bundles": [ { "name": "", "assets": [] } ] }"#;
        assert!(Manifest::from_json(doc).is_err());
    }
}
