//! Decoded images and the rectangular frames sprites are cut from.
//!
//! A `TextureSource` owns the RGBA8 pixels of one image file. A `Texture`
//! is a cheap handle: a shared source plus the frame it shows. Spritesheet
//! sub-textures share one source and differ only in their frame.

use std::fmt;
use std::sync::Arc;

/// RGBA8 pixels of one decoded image, row-major.
pub struct TextureSource {
    path: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureSource {
    pub fn new(path: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            pixels,
        }
    }

    /// Resolved path the pixels were loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for TextureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureSource")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Rectangle within a texture source, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A shared texture source and the frame of it that is displayed.
#[derive(Debug, Clone)]
pub struct Texture {
    source: Arc<TextureSource>,
    frame: Frame,
}

impl Texture {
    /// Texture covering the whole source.
    pub fn new(source: Arc<TextureSource>) -> Self {
        let frame = Frame {
            x: 0.0,
            y: 0.0,
            width: source.width() as f32,
            height: source.height() as f32,
        };
        Self { source, frame }
    }

    /// Texture showing `frame` of `source`.
    pub fn with_frame(source: Arc<TextureSource>, frame: Frame) -> Self {
        Self { source, frame }
    }

    /// A single-colour texture. Useful as a placeholder and in tests.
    pub fn solid(path: &str, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat((width * height) as usize);
        Self::new(Arc::new(TextureSource::new(path, width, height, pixels)))
    }

    pub fn source(&self) -> &Arc<TextureSource> {
        &self.source
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn width(&self) -> f32 {
        self.frame.width
    }

    pub fn height(&self) -> f32 {
        self.frame.height
    }

    /// Identity comparison: same shared source and same frame.
    pub fn ptr_eq(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.source, &other.source) && self.frame == other.frame
    }
}
