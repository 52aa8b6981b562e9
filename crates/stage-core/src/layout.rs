//! Transform resolution.
//!
//! Converts each node's parent-relative transform into absolute
//! `ResolvedBounds`. Transforms are translate + scale only; anchors shift
//! a sprite's or text's content relative to its position. Containers are
//! auto-sized to the union of their children.

use crate::model::*;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// The render surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Accumulated translate + scale from a node's frame to surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub tx: f32,
    pub ty: f32,
    pub sx: f32,
    pub sy: f32,
}

impl WorldTransform {
    pub const IDENTITY: WorldTransform = WorldTransform {
        tx: 0.0,
        ty: 0.0,
        sx: 1.0,
        sy: 1.0,
    };

    /// Compose with a child's local transform.
    pub fn then(&self, local: &Transform) -> WorldTransform {
        WorldTransform {
            tx: self.tx + self.sx * local.position.x,
            ty: self.ty + self.sy * local.position.y,
            sx: self.sx * local.scale.x,
            sy: self.sy * local.scale.y,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.tx + self.sx * p.x, self.ty + self.sy * p.y)
    }

    /// Map a box, normalising negative scales.
    pub fn apply_bounds(&self, b: &ResolvedBounds) -> ResolvedBounds {
        let a = self.apply(Point::new(b.x, b.y));
        let c = self.apply(Point::new(b.x + b.width, b.y + b.height));
        ResolvedBounds {
            x: a.x.min(c.x),
            y: a.y.min(c.y),
            width: (c.x - a.x).abs(),
            height: (c.y - a.y).abs(),
        }
    }
}

// ─── Text metrics ────────────────────────────────────────────────────────

/// Average glyph advance as a fraction of the font size.
const CHAR_ADVANCE: f32 = 0.6;
/// Line height as a fraction of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Approximate single-line text extent. Deterministic, font-independent.
pub fn measure_text(content: &str, style: &TextStyle) -> (f32, f32) {
    let chars = content.chars().count() as f32;
    (
        chars * style.font_size * CHAR_ADVANCE,
        style.font_size * LINE_HEIGHT,
    )
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Content box of a leaf node in its own (unscaled) frame.
/// `None` for containers and the root.
pub fn content_bounds(node: &SceneNode) -> Option<ResolvedBounds> {
    let anchored = |width: f32, height: f32| ResolvedBounds {
        x: -node.transform.anchor.x * width,
        y: -node.transform.anchor.y * height,
        width,
        height,
    };

    match &node.kind {
        NodeKind::Root | NodeKind::Container => None,
        NodeKind::Graphics(g) => g.bounds(),
        NodeKind::Text { content, style } => {
            let (w, h) = measure_text(content, style);
            Some(anchored(w, h))
        }
        NodeKind::Sprite { texture } => Some(anchored(texture.width(), texture.height())),
    }
}

/// Box of a node's subtree in its own frame (before its own transform).
fn frame_bounds(graph: &SceneGraph, idx: NodeIndex) -> Option<ResolvedBounds> {
    let node = graph.node(idx)?;
    match node.kind {
        NodeKind::Root | NodeKind::Container => graph
            .children(idx)
            .into_iter()
            .filter_map(|child| parent_bounds(graph, child))
            .reduce(|a, b| a.union(&b)),
        _ => content_bounds(node),
    }
}

/// Box of a node's subtree in its parent's frame.
fn parent_bounds(graph: &SceneGraph, idx: NodeIndex) -> Option<ResolvedBounds> {
    let node = graph.node(idx)?;
    let local = WorldTransform::IDENTITY.then(&node.transform);
    frame_bounds(graph, idx).map(|b| local.apply_bounds(&b))
}

impl SceneGraph {
    /// Scale-adjusted `(width, height)` of a node's subtree.
    /// Always computed from the current transform; nothing is cached.
    pub fn size(&self, idx: NodeIndex) -> Option<(f32, f32)> {
        parent_bounds(self, idx).map(|b| (b.width, b.height))
    }

    pub fn width(&self, idx: NodeIndex) -> Option<f32> {
        self.size(idx).map(|(w, _)| w)
    }

    pub fn height(&self, idx: NodeIndex) -> Option<f32> {
        self.size(idx).map(|(_, h)| h)
    }
}

/// Resolve absolute bounds of every node.
///
/// The root gets the viewport; containers get the union of their
/// children; empty containers get a zero-size box at their origin.
pub fn resolve_bounds(
    graph: &SceneGraph,
    viewport: Viewport,
) -> HashMap<NodeIndex, ResolvedBounds> {
    let mut bounds: HashMap<NodeIndex, ResolvedBounds> = HashMap::new();

    bounds.insert(
        graph.root,
        ResolvedBounds {
            x: 0.0,
            y: 0.0,
            width: viewport.width,
            height: viewport.height,
        },
    );

    for child in graph.children(graph.root) {
        resolve_node(graph, child, WorldTransform::IDENTITY, &mut bounds);
    }

    bounds
}

fn resolve_node(
    graph: &SceneGraph,
    idx: NodeIndex,
    parent: WorldTransform,
    bounds: &mut HashMap<NodeIndex, ResolvedBounds>,
) -> Option<ResolvedBounds> {
    let node = &graph.graph[idx];
    let world = parent.then(&node.transform);

    let resolved = match node.kind {
        NodeKind::Root | NodeKind::Container => graph
            .children(idx)
            .into_iter()
            .filter_map(|child| resolve_node(graph, child, world, bounds))
            .reduce(|a, b| a.union(&b)),
        _ => content_bounds(node).map(|b| world.apply_bounds(&b)),
    };

    let entry = resolved.unwrap_or(ResolvedBounds {
        x: world.tx,
        y: world.ty,
        width: 0.0,
        height: 0.0,
    });
    bounds.insert(idx, entry);
    resolved
}
