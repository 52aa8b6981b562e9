//! Render targets a stage is attached to.

use crate::paint::{PaintStats, Painter};
use crate::stage::Stage;
use stage_core::Viewport;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vello::Scene;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can display a stage.
pub trait Surface {
    /// Size the scene should be laid out for.
    fn viewport(&self) -> Viewport;

    /// Display the current state of `stage`.
    fn present(&mut self, stage: &Stage) -> Result<(), RenderError>;
}

/// Writes each presented frame as an SVG document.
#[derive(Debug)]
pub struct SvgSurface {
    path: PathBuf,
    viewport: Viewport,
    href_base: String,
    frames: usize,
}

impl SvgSurface {
    pub fn new(path: impl Into<PathBuf>, viewport: Viewport) -> Self {
        Self {
            path: path.into(),
            viewport,
            href_base: String::new(),
            frames: 0,
        }
    }

    /// Prefix for image `href`s, so the document can find the asset files.
    #[must_use]
    pub fn with_href_base(mut self, base: impl Into<String>) -> Self {
        self.href_base = base.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Surface for SvgSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn present(&mut self, stage: &Stage) -> Result<(), RenderError> {
        let svg = stage.to_svg(&self.href_base);
        std::fs::write(&self.path, svg).map_err(|source| RenderError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.frames += 1;
        log::info!("Wrote {} (frame {})", self.path.display(), self.frames);
        Ok(())
    }
}

/// Paints each presented frame into an in-memory Vello scene, ready to be
/// handed to a GPU renderer.
pub struct SceneSurface {
    viewport: Viewport,
    painter: Painter,
    scene: Scene,
    last: Option<PaintStats>,
}

impl SceneSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            painter: Painter::new(),
            scene: Scene::new(),
            last: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Stats of the most recent frame, `None` before the first present.
    pub fn last_frame(&self) -> Option<PaintStats> {
        self.last
    }
}

impl Surface for SceneSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn present(&mut self, stage: &Stage) -> Result<(), RenderError> {
        self.scene.reset();
        let stats = stage.paint(&mut self.painter, &mut self.scene);
        log::debug!("Painted frame: {stats:?}");
        self.last = Some(stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_core::{Color, SceneGraph};

    #[test]
    fn svg_surface_writes_document() {
        let path = std::env::temp_dir().join(format!("stage-render-{}.svg", std::process::id()));
        let mut surface = SvgSurface::new(&path, Viewport::default());
        let stage = Stage::new(SceneGraph::new(), surface.viewport())
            .with_background(Color::from_rgb_u32(0xffea00).with_alpha(0.5));

        surface.present(&stage).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(surface.frames(), 1);
        assert!(written.contains("fill=\"#FFEA00\" fill-opacity=\"0.5\""));
    }

    #[test]
    fn svg_surface_reports_unwritable_path() {
        let mut surface = SvgSurface::new("/nonexistent-dir/scene.svg", Viewport::default());
        let stage = Stage::new(SceneGraph::new(), surface.viewport());
        let err = surface.present(&stage).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/scene.svg"));
        assert_eq!(surface.frames(), 0);
    }

    #[test]
    fn scene_surface_records_frames() {
        let mut surface = SceneSurface::new(Viewport::default());
        assert!(surface.last_frame().is_none());
        let stage = Stage::new(SceneGraph::new(), surface.viewport()).with_background(Color::WHITE);
        surface.present(&stage).unwrap();
        assert_eq!(surface.last_frame().map(|s| s.fills), Some(1));
    }
}
