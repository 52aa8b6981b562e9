//! Resource handles and the decoders that produce them.

use crate::error::AssetError;
use crate::spritesheet::Spritesheet;
use stage_core::{Texture, TextureSource};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// What a path decodes to, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Font,
    Spritesheet,
}

impl AssetKind {
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_str() {
            "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" => AssetKind::Image,
            "ttf" | "otf" | "ttc" | "woff" | "woff2" => AssetKind::Font,
            "json" => AssetKind::Spritesheet,
            other => {
                log::warn!("Unknown extension {other:?} for {path}, decoding as image");
                AssetKind::Image
            }
        }
    }
}

/// Lowercased extension of the file name, empty when it has none.
fn extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// A parsed font file.
pub struct FontFace {
    path: String,
    family: String,
    data: Arc<[u8]>,
}

impl FontFace {
    /// Family name to reference in text styles.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("path", &self.path)
            .field("family", &self.family)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A loaded, ready-to-render asset. Cloning shares the underlying data.
#[derive(Debug, Clone)]
pub enum Resource {
    Texture(Texture),
    Font(Arc<FontFace>),
    Spritesheet(Arc<Spritesheet>),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Texture(_) => "texture",
            Resource::Font(_) => "font",
            Resource::Spritesheet(_) => "spritesheet",
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            Resource::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&Arc<FontFace>> {
        match self {
            Resource::Font(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_spritesheet(&self) -> Option<&Arc<Spritesheet>> {
        match self {
            Resource::Spritesheet(s) => Some(s),
            _ => None,
        }
    }

    /// Identity comparison: both handles refer to the same cached data.
    pub fn same_as(&self, other: &Resource) -> bool {
        match (self, other) {
            (Resource::Texture(a), Resource::Texture(b)) => a.ptr_eq(b),
            (Resource::Font(a), Resource::Font(b)) => Arc::ptr_eq(a, b),
            (Resource::Spritesheet(a), Resource::Spritesheet(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ─── Decoders ────────────────────────────────────────────────────────────

/// Decode an image into an RGBA8 texture.
pub fn decode_texture(path: &str, bytes: &[u8]) -> Result<Texture, AssetError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AssetError::load(path, format!("image decode failed: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Decoded {path} ({width}x{height})");
    Ok(Texture::new(Arc::new(TextureSource::new(
        path,
        width,
        height,
        rgba.into_raw(),
    ))))
}

/// Parse a TrueType/OpenType font and read its family name.
///
/// WOFF/WOFF2 containers are compressed and rejected with a
/// `FontLoadFailure` naming the format.
pub fn decode_font(path: &str, bytes: Vec<u8>) -> Result<FontFace, AssetError> {
    match bytes.get(0..4) {
        Some(b"wOFF") => return Err(AssetError::font(path, "WOFF container is not supported")),
        Some(b"wOF2") => return Err(AssetError::font(path, "WOFF2 container is not supported")),
        _ => {}
    }

    let family = {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| AssetError::font(path, format!("font parse failed: {e}")))?;
        family_name(&face).ok_or_else(|| AssetError::font(path, "font has no family name"))?
    };

    log::debug!("Parsed font {path} (family {family:?})");
    Ok(FontFace {
        path: path.to_string(),
        family,
        data: bytes.into(),
    })
}

/// Typographic family if present, else the legacy family name.
fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    use ttf_parser::name_id::{FAMILY, TYPOGRAPHIC_FAMILY};

    let lookup = |id: u16| {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == id)
            .find_map(|name| name.to_string())
    };
    lookup(TYPOGRAPHIC_FAMILY).or_else(|| lookup(FAMILY))
}
