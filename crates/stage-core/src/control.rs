//! Interactive controls.
//!
//! A `Button` is a plain record of the coordinates it was created with,
//! paired with the index of a sprite that the scene graph owns. The
//! record never changes; the sprite can be moved and scaled freely.

use crate::id::NodeId;
use crate::model::{SceneGraph, SceneNode};
use crate::texture::Texture;
use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Button {
    node: NodeIndex,
    origin_x: f32,
    origin_y: f32,
}

impl Button {
    /// Wrap an existing node.
    pub fn new(node: NodeIndex, origin_x: f32, origin_y: f32) -> Self {
        Self {
            node,
            origin_x,
            origin_y,
        }
    }

    /// Add a sprite for `texture` under `parent` and wrap it.
    ///
    /// The sprite starts at the scene default position `(0, 0)`; the
    /// origin is recorded, not applied.
    pub fn spawn(
        graph: &mut SceneGraph,
        parent: NodeIndex,
        id: NodeId,
        texture: Texture,
        origin_x: f32,
        origin_y: f32,
    ) -> Self {
        let node = graph.add_node(parent, SceneNode::sprite(id, texture));
        Self::new(node, origin_x, origin_y)
    }

    pub fn node(&self) -> NodeIndex {
        self.node
    }

    pub fn origin_x(&self) -> f32 {
        self.origin_x
    }

    pub fn origin_y(&self) -> f32 {
        self.origin_y
    }

    /// Current scale-adjusted height of the sprite.
    pub fn rendered_height(&self, graph: &SceneGraph) -> Option<f32> {
        graph.height(self.node)
    }
}
