//! TexturePacker-style spritesheets.
//!
//! A JSON document names rectangular frames inside one image. Both the
//! "hash" (`"frames": { "name": {...} }`) and "array"
//! (`"frames": [ { "filename": "name", ... } ]`) layouts are accepted.
//! Every sub-texture shares the base image.

use crate::error::AssetError;
use serde::Deserialize;
use stage_core::{Frame, Texture};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Deserialize)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Deserialize)]
struct FrameDecl {
    frame: Rect,
    #[serde(default)]
    rotated: bool,
}

#[derive(Debug, Deserialize)]
struct NamedFrameDecl {
    filename: String,
    #[serde(flatten)]
    decl: FrameDecl,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Frames {
    Hash(BTreeMap<String, FrameDecl>),
    Array(Vec<NamedFrameDecl>),
}

#[derive(Debug, Deserialize)]
struct Meta {
    image: String,
}

/// Parsed spritesheet JSON, before its image is loaded.
#[derive(Debug, Deserialize)]
pub struct SpritesheetDoc {
    frames: Frames,
    meta: Meta,
}

impl SpritesheetDoc {
    pub fn parse(path: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        serde_json::from_slice(bytes)
            .map_err(|e| AssetError::load(path, format!("spritesheet parse failed: {e}")))
    }

    /// Image path as written in `meta.image`, relative to the JSON file.
    pub fn image(&self) -> &str {
        &self.meta.image
    }
}

/// Named sub-textures cut from one base texture.
#[derive(Debug)]
pub struct Spritesheet {
    path: String,
    base: Texture,
    textures: HashMap<String, Texture>,
}

impl Spritesheet {
    /// Cut the frames of `doc` out of `base`.
    ///
    /// # Errors
    /// `AssetLoadFailure` if a frame lies outside the base image.
    pub fn from_doc(path: &str, doc: SpritesheetDoc, base: Texture) -> Result<Self, AssetError> {
        let frames: Vec<(String, FrameDecl)> = match doc.frames {
            Frames::Hash(map) => map.into_iter().collect(),
            Frames::Array(list) => list.into_iter().map(|f| (f.filename, f.decl)).collect(),
        };

        let mut textures = HashMap::with_capacity(frames.len());
        for (name, decl) in frames {
            let r = decl.frame;
            if r.x < 0.0 || r.y < 0.0 || r.x + r.w > base.width() || r.y + r.h > base.height() {
                return Err(AssetError::load(
                    path,
                    format!("frame '{name}' lies outside the {}x{} image", base.width(), base.height()),
                ));
            }
            if decl.rotated {
                log::warn!("{path}: frame '{name}' is rotated; drawing it unrotated");
            }
            let frame = Frame {
                x: r.x,
                y: r.y,
                width: r.w,
                height: r.h,
            };
            textures.insert(name, Texture::with_frame(base.source().clone(), frame));
        }

        log::debug!("Spritesheet {path}: {} frames", textures.len());
        Ok(Self {
            path: path.to_string(),
            base,
            textures,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn base(&self) -> &Texture {
        &self.base
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    /// Frame names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.textures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const HASH_SHEET: &str = r#"{
        "frames": {
            "button-mark.png": { "frame": { "x": 0, "y": 0, "w": 32, "h": 32 }, "rotated": false },
            "button-undo.png": { "frame": { "x": 32, "y": 0, "w": 32, "h": 24 } }
        },
        "meta": { "image": "cvc-assets.png", "size": { "w": 64, "h": 32 } }
    }"#;

    #[test]
    fn hash_layout_shares_base_source() {
        let doc = SpritesheetDoc::parse("sprites/cvc-assets.json", HASH_SHEET.as_bytes()).unwrap();
        assert_eq!(doc.image(), "cvc-assets.png");

        let base = Texture::solid("sprites/cvc-assets.png", 64, 32, [0, 0, 0, 255]);
        let sheet = Spritesheet::from_doc("sprites/cvc-assets.json", doc, base).unwrap();

        assert_eq!(sheet.names(), vec!["button-mark.png", "button-undo.png"]);
        let undo = sheet.texture("button-undo.png").unwrap();
        assert_eq!((undo.width(), undo.height()), (32.0, 24.0));
        assert_eq!(undo.frame().x, 32.0);
        assert!(Arc::ptr_eq(undo.source(), sheet.base().source()));
        assert!(sheet.texture("nope.png").is_none());
    }

    #[test]
    fn array_layout_is_accepted() {
        let doc = r#"{
            "frames": [ { "filename": "a", "frame": { "x": 0, "y": 0, "w": 1, "h": 1 } } ],
            "meta": { "image": "a.png" }
        }"#;
        let doc = SpritesheetDoc::parse("a.json", doc.as_bytes()).unwrap();
        let sheet = Spritesheet::from_doc("a.json", doc, Texture::solid("a.png", 1, 1, [0; 4])).unwrap();
        assert_eq!(sheet.names(), vec!["a"]);
    }

    #[test]
    fn frame_outside_image_fails() {
        let doc = SpritesheetDoc::parse("s.json", HASH_SHEET.as_bytes()).unwrap();
        let small = Texture::solid("s.png", 16, 16, [0; 4]);
        let err = Spritesheet::from_doc("s.json", doc, small).unwrap_err();
        assert!(matches!(err, AssetError::AssetLoadFailure { .. }));
    }

    #[test]
    fn missing_meta_fails_to_parse() {
        let err = SpritesheetDoc::parse("s.json", br#"{ "frames": {} }"#).unwrap_err();
        assert_eq!(err.path(), Some("s.json"));
    }
}
