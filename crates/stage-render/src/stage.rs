//! The attached scene: graph, viewport and clear colour, plus pointer input.

use crate::hit::hit_test;
use crate::paint::{PaintStats, Painter};
use crate::svg::{SvgOptions, render_svg};
use stage_core::{
    Color, NodeIndex, PointerEvent, ResolvedBounds, SceneGraph, Viewport, resolve_bounds,
};
use std::collections::HashMap;
use vello::Scene;

#[derive(Debug)]
pub struct Stage {
    graph: SceneGraph,
    viewport: Viewport,
    background: Option<Color>,
}

impl Stage {
    pub fn new(graph: SceneGraph, viewport: Viewport) -> Self {
        Self {
            graph,
            viewport,
            background: None,
        }
    }

    /// Clear colour, alpha included.
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Absolute bounds of every node, from the current transforms.
    pub fn bounds(&self) -> HashMap<NodeIndex, ResolvedBounds> {
        resolve_bounds(&self.graph, self.viewport)
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<NodeIndex> {
        hit_test(&self.graph, &self.bounds(), x, y)
    }

    /// Deliver a pointer-down at (x, y) to the topmost interactive node.
    /// Returns the node that was hit, if any.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<NodeIndex> {
        let hit = self.hit_test(x, y)?;
        let fired = self.graph.emit_pointer_down(hit, &PointerEvent::down(x, y));
        log::debug!("pointer down at ({x}, {y}) hit {hit:?}, {fired} listeners");
        Some(hit)
    }

    pub fn to_svg(&self, href_base: &str) -> String {
        let options = SvgOptions {
            background: self.background,
            href_base: href_base.to_string(),
        };
        render_svg(&self.graph, self.viewport, &options)
    }

    pub fn paint(&self, painter: &mut Painter, scene: &mut Scene) -> PaintStats {
        painter.paint(scene, &self.graph, self.viewport, self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_core::{EventMode, NodeId, SceneNode, Texture};

    fn clickable_stage() -> (Stage, NodeIndex) {
        let mut graph = SceneGraph::new();
        let mut node = SceneNode::sprite(
            NodeId::intern("stage_button"),
            Texture::solid("b.png", 20, 20, [0; 4]),
        );
        node.set_anchor(0.5, 0.5);
        node.set_position(100.0, 100.0);
        node.event_mode = EventMode::Static;
        let idx = graph.add_node(graph.root, node);
        graph.on_pointer_down(
            idx,
            Box::new(|node: &mut SceneNode, _: &PointerEvent| {
                let (x, y) = (node.x(), node.y());
                node.set_position(x + 1.0, y);
            }),
        );
        (Stage::new(graph, Viewport::default()), idx)
    }

    #[test]
    fn pointer_down_fires_listener_of_hit_node() {
        let (mut stage, idx) = clickable_stage();
        assert_eq!(stage.pointer_down(100.0, 100.0), Some(idx));
        assert_eq!(stage.graph().node(idx).unwrap().x(), 101.0);
    }

    #[test]
    fn pointer_down_on_background_does_nothing() {
        let (mut stage, idx) = clickable_stage();
        assert_eq!(stage.pointer_down(700.0, 500.0), None);
        assert_eq!(stage.graph().node(idx).unwrap().x(), 100.0);
    }

    #[test]
    fn hit_testing_follows_moved_nodes() {
        let (mut stage, idx) = clickable_stage();
        stage.graph_mut().node_mut(idx).unwrap().set_position(300.0, 300.0);
        assert_eq!(stage.hit_test(100.0, 100.0), None);
        assert_eq!(stage.hit_test(300.0, 300.0), Some(idx));
    }
}
