//! Scene graph → Vello drawing commands.
//!
//! Walks the scene front-to-back in paint order, accumulating each node's
//! translate/scale into an `Affine`, and emits fills, strokes and images.
//! Decoded texture sources are uploaded to `peniko::Image`s once and
//! reused across frames.

use kurbo::{Affine, Circle, Rect, Stroke};
use peniko::{Blob, Fill, Image, ImageFormat, Mix};
use stage_core::{
    Color, GraphicsItem, NodeIndex, NodeKind, SceneGraph, Shape, Texture, TextureSource,
    Viewport, WorldTransform,
};
use std::collections::HashMap;
use std::sync::Arc;
use vello::Scene;

/// What one `paint` call emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub fills: usize,
    pub strokes: usize,
    pub images: usize,
    pub texts: usize,
}

/// Paints scene graphs into Vello scenes, caching image uploads.
#[derive(Default)]
pub struct Painter {
    /// Keyed by source address; the stored `Arc` keeps that address live.
    images: HashMap<usize, (Arc<TextureSource>, Image)>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the entire scene graph.
    ///
    /// Call once per frame with a freshly-cleared `Scene`.
    pub fn paint(
        &mut self,
        scene: &mut Scene,
        graph: &SceneGraph,
        viewport: Viewport,
        background: Option<Color>,
    ) -> PaintStats {
        let mut stats = PaintStats::default();
        if let Some(bg) = background {
            let rect = Rect::new(0.0, 0.0, viewport.width as f64, viewport.height as f64);
            scene.fill(Fill::NonZero, Affine::IDENTITY, to_peniko(bg, 1.0), None, &rect);
            stats.fills += 1;
        }
        for child in graph.children(graph.root) {
            self.paint_node(scene, graph, child, WorldTransform::IDENTITY, &mut stats);
        }
        stats
    }

    /// Number of distinct texture sources uploaded so far.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }

    fn paint_node(
        &mut self,
        scene: &mut Scene,
        graph: &SceneGraph,
        idx: NodeIndex,
        parent: WorldTransform,
        stats: &mut PaintStats,
    ) {
        let Some(node) = graph.node(idx) else {
            return;
        };
        if !node.visible {
            return;
        }

        let world = parent.then(&node.transform);
        let affine = to_affine(&world);
        let anchor = node.transform.anchor;

        match &node.kind {
            NodeKind::Root | NodeKind::Container => {}
            NodeKind::Graphics(g) => {
                for item in g.items() {
                    paint_item(scene, affine, item, stats);
                }
            }
            NodeKind::Text { content, style } => {
                log::trace!(
                    "TEXT {} {:?} {}px {:?} at ({}, {})",
                    node.id,
                    content,
                    style.font_size,
                    style.font_family,
                    world.tx,
                    world.ty
                );
                // Glyph shaping needs a font context; text is exported through SVG.
                stats.texts += 1;
            }
            NodeKind::Sprite { texture } => {
                let x = -(anchor.x * texture.width()) as f64;
                let y = -(anchor.y * texture.height()) as f64;
                self.paint_sprite(scene, affine, texture, x, y);
                stats.images += 1;
            }
        }

        for child in graph.children(idx) {
            self.paint_node(scene, graph, child, world, stats);
        }
    }

    fn paint_sprite(&mut self, scene: &mut Scene, affine: Affine, texture: &Texture, x: f64, y: f64) {
        let image = self.image_for(texture.source());
        let frame = texture.frame();
        let (fw, fh) = (frame.width as f64, frame.height as f64);
        let offset = Affine::translate((x - frame.x as f64, y - frame.y as f64));

        let whole = frame.x == 0.0
            && frame.y == 0.0
            && frame.width == texture.source().width() as f32
            && frame.height == texture.source().height() as f32;
        if whole {
            scene.draw_image(image, affine * offset);
        } else {
            let clip = Rect::new(x, y, x + fw, y + fh);
            scene.push_layer(Mix::Clip, 1.0, affine, &clip);
            scene.draw_image(image, affine * offset);
            scene.pop_layer();
        }
    }

    fn image_for(&mut self, source: &Arc<TextureSource>) -> &Image {
        let (_, image) = self
            .images
            .entry(Arc::as_ptr(source) as usize)
            .or_insert_with(|| {
                log::debug!("Uploading {} ({}x{})", source.path(), source.width(), source.height());
                let blob = Blob::from(source.pixels().to_vec());
                let image = Image::new(blob, ImageFormat::Rgba8, source.width(), source.height());
                (Arc::clone(source), image)
            });
        image
    }
}

fn to_affine(w: &WorldTransform) -> Affine {
    Affine::new([
        w.sx as f64,
        0.0,
        0.0,
        w.sy as f64,
        w.tx as f64,
        w.ty as f64,
    ])
}

fn to_peniko(color: Color, alpha: f32) -> peniko::Color {
    let [r, g, b, a] = color.with_alpha(alpha).to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

// ─── Fill and stroke ─────────────────────────────────────────────────────

fn paint_item(scene: &mut Scene, affine: Affine, item: &GraphicsItem, stats: &mut PaintStats) {
    match item.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let rect = Rect::new(x as f64, y as f64, (x + width) as f64, (y + height) as f64);
            fill_and_stroke(scene, affine, &rect, item, stats);
        }
        Shape::Circle { x, y, radius } => {
            let circle = Circle::new((x as f64, y as f64), radius as f64);
            fill_and_stroke(scene, affine, &circle, item, stats);
        }
    }
}

fn fill_and_stroke<S: kurbo::Shape>(
    scene: &mut Scene,
    affine: Affine,
    shape: &S,
    item: &GraphicsItem,
    stats: &mut PaintStats,
) {
    if let Some(fill) = item.fill {
        scene.fill(Fill::NonZero, affine, to_peniko(fill.color, fill.alpha), None, shape);
        stats.fills += 1;
    }
    if let Some(stroke) = item.stroke {
        let style = Stroke::new(stroke.width as f64);
        scene.stroke(&style, affine, to_peniko(stroke.color, stroke.alpha), None, shape);
        stats.strokes += 1;
    }
}
