//! Core scene-graph data model.
//!
//! The scene is a tree whose nodes are visual elements (sprites, text,
//! vector graphics) or plain containers. Edges go parent → child and every
//! node has at most one parent. A node's position is only meaningful in
//! its parent's coordinate frame. The tree is write-once: nodes are added
//! during scene assembly and live until the graph is dropped.

use crate::id::NodeId;
use crate::input::{Cursor, EventMode, Listeners, PointerEvent, PointerListener};
use crate::layout::WorldTransform;
use crate::texture::Texture;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Deserializer};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` value.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        let r = (rgb >> 16) & 0xFF;
        let g = (rgb >> 8) & 0xFF;
        let b = rgb & 0xFF;
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| {
            let hi = hex_val(bytes[i])?;
            let lo = hex_val(bytes[i + 1])?;
            Some((hi << 4 | lo) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB` (opaque) or `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Same color with alpha multiplied by `alpha`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: self.a * alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Accepts `"#ffea00"`-style strings or packed `0xRRGGBB` integers.
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Packed(u32),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Color::from_hex(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{s}'"))),
            Repr::Packed(v) => Ok(Color::from_rgb_u32(v)),
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point,
    pub scale: Point,
    /// Origin of the node's own content as a fraction of its size.
    /// `(0.5, 0.5)` centres a sprite on its position. Containers ignore it.
    pub anchor: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point::new(0.0, 0.0),
            scale: Point::new(1.0, 1.0),
            anchor: Point::new(0.0, 0.0),
        }
    }
}

// ─── Graphics ────────────────────────────────────────────────────────────

/// A primitive in a `Graphics` node, in the node's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
    },
}

impl Shape {
    pub fn bounds(&self) -> ResolvedBounds {
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => ResolvedBounds {
                x,
                y,
                width,
                height,
            },
            Shape::Circle { x, y, radius } => ResolvedBounds {
                x: x - radius,
                y: y - radius,
                width: radius * 2.0,
                height: radius * 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub color: Color,
    /// Opacity 0.0 .. 1.0, multiplied with the color's own alpha.
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color,
    pub alpha: f32,
}

/// One shape with its fill and stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsItem {
    pub shape: Shape,
    pub fill: Option<FillStyle>,
    pub stroke: Option<StrokeStyle>,
}

/// Retained vector drawing: a list of filled and/or stroked shapes.
///
/// Built fluently: `Graphics::new().rect(..).fill(..).stroke(..)`.
/// `fill` and `stroke` apply to the most recently added shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graphics {
    items: SmallVec<[GraphicsItem; 2]>,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rect(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.items.push(GraphicsItem {
            shape: Shape::Rect {
                x,
                y,
                width,
                height,
            },
            fill: None,
            stroke: None,
        });
        self
    }

    #[must_use]
    pub fn circle(mut self, x: f32, y: f32, radius: f32) -> Self {
        self.items.push(GraphicsItem {
            shape: Shape::Circle { x, y, radius },
            fill: None,
            stroke: None,
        });
        self
    }

    #[must_use]
    pub fn fill(mut self, fill: FillStyle) -> Self {
        if let Some(item) = self.items.last_mut() {
            item.fill = Some(fill);
        }
        self
    }

    #[must_use]
    pub fn stroke(mut self, stroke: StrokeStyle) -> Self {
        if let Some(item) = self.items.last_mut() {
            item.stroke = Some(stroke);
        }
        self
    }

    pub fn items(&self) -> &[GraphicsItem] {
        &self.items
    }

    /// Union of all shapes, strokes included (half the width outside).
    pub fn bounds(&self) -> Option<ResolvedBounds> {
        self.items
            .iter()
            .map(|item| {
                let b = item.shape.bounds();
                match item.stroke {
                    Some(s) => b.inflate(s.width / 2.0),
                    None => b,
                }
            })
            .reduce(|a, b| a.union(&b))
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill: Color,
    pub font_family: String,
    pub font_size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            font_family: "Arial".into(),
            font_size: 26.0,
        }
    }
}

// ─── Scene Graph Nodes ───────────────────────────────────────────────────

/// The node kinds in the scene tree.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Root of the scene (the stage).
    Root,

    /// Groups children under one transform; draws nothing itself.
    Container,

    /// Vector shapes.
    Graphics(Graphics),

    /// Single-line text label.
    Text { content: String, style: TextStyle },

    /// Textured quad.
    Sprite { texture: Texture },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Container => "container",
            NodeKind::Graphics(_) => "graphics",
            NodeKind::Text { .. } => "text",
            NodeKind::Sprite { .. } => "sprite",
        }
    }
}

/// A single node in the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Interned label, e.g. `@bubble_bomb`.
    pub id: NodeId,

    pub kind: NodeKind,

    /// Position, scale and anchor relative to the parent.
    pub transform: Transform,

    pub event_mode: EventMode,

    pub cursor: Cursor,

    pub visible: bool,
}

impl SceneNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            transform: Transform::default(),
            event_mode: EventMode::default(),
            cursor: Cursor::default(),
            visible: true,
        }
    }

    pub fn sprite(id: NodeId, texture: Texture) -> Self {
        Self::new(id, NodeKind::Sprite { texture })
    }

    pub fn text(id: NodeId, content: impl Into<String>, style: TextStyle) -> Self {
        Self::new(
            id,
            NodeKind::Text {
                content: content.into(),
                style,
            },
        )
    }

    pub fn graphics(id: NodeId, graphics: Graphics) -> Self {
        Self::new(id, NodeKind::Graphics(graphics))
    }

    pub fn container(id: NodeId) -> Self {
        Self::new(id, NodeKind::Container)
    }

    pub fn x(&self) -> f32 {
        self.transform.position.x
    }

    pub fn y(&self) -> f32 {
        self.transform.position.y
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.transform.position.set(x, y);
    }

    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.transform.scale.set(x, y);
    }

    pub fn set_anchor(&mut self, x: f32, y: f32) {
        self.transform.anchor.set(x, y);
    }
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// The complete scene — a tree of `SceneNode` values plus pointer listeners.
#[derive(Debug)]
pub struct SceneGraph {
    /// The underlying directed graph (parent → child edges).
    pub graph: StableDiGraph<SceneNode, ()>,

    /// The root node index.
    pub root: NodeIndex,

    /// Index from NodeId → NodeIndex for fast lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,

    listeners: Listeners,
}

impl SceneGraph {
    /// Create a new empty scene graph with a root node.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root_id = NodeId::intern("root");
        let root = graph.add_node(SceneNode::new(root_id, NodeKind::Root));

        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);

        Self {
            graph,
            root,
            id_index,
            listeners: Listeners::default(),
        }
    }

    /// Add a node as the last child of `parent`. Returns the new node's index.
    ///
    /// A `parent` that is not in this graph attaches the node to the root.
    /// A repeated id rebinds `get_by_id` to the newest node.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let parent = if self.graph.contains_node(parent) {
            parent
        } else {
            log::warn!("{id}: parent {parent:?} is not in this graph, attaching to root");
            self.root
        };
        log::debug!("add {} {id} under {:?}", node.kind.name(), parent);
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        if let Some(previous) = self.id_index.insert(id, idx) {
            log::warn!("{id} already names {previous:?}, now {idx:?}");
        }
        idx
    }

    /// Number of nodes, root excluded.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&SceneNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut SceneNode> {
        self.graph.node_weight_mut(idx)
    }

    /// Look up a node by its `@id`.
    pub fn get_by_id(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Look up a node mutably by its `@id`.
    pub fn get_by_id_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Get the index for a NodeId.
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Get the parent index of a node.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in insertion (paint) order.
    ///
    /// Sorted by `NodeIndex`: nodes are never removed, so index order is
    /// insertion order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Register a pointer-down listener on `idx`.
    pub fn on_pointer_down(&mut self, idx: NodeIndex, listener: PointerListener) {
        self.listeners.add(idx, listener);
    }

    pub fn has_pointer_listeners(&self, idx: NodeIndex) -> bool {
        self.listeners.has(idx)
    }

    /// Deliver a pointer-down to the listeners of `idx`.
    /// Returns how many listeners ran.
    pub fn emit_pointer_down(&mut self, idx: NodeIndex, event: &PointerEvent) -> usize {
        let Some(node) = self.graph.node_weight_mut(idx) else {
            return 0;
        };
        self.listeners.fire(idx, node, event)
    }

    /// Accumulated transform from the root down to (and including) `idx`.
    pub fn world_transform(&self, idx: NodeIndex) -> Option<WorldTransform> {
        let node = self.node(idx)?;
        let parent = match self.parent(idx) {
            Some(p) => self.world_transform(p)?,
            None => WorldTransform::IDENTITY,
        };
        Some(parent.then(&node.transform))
    }

    /// Position of the node's origin in surface coordinates.
    pub fn global_position(&self, idx: NodeIndex) -> Option<Point> {
        let parent = match self.parent(idx) {
            Some(p) => self.world_transform(p)?,
            None => WorldTransform::IDENTITY,
        };
        let node = self.node(idx)?;
        Some(parent.apply(node.transform.position))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Resolved positions ──────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ResolvedBounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &ResolvedBounds) -> ResolvedBounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        ResolvedBounds {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    /// Grow by `d` on every side.
    pub fn inflate(&self, d: f32) -> ResolvedBounds {
        ResolvedBounds {
            x: self.x - d,
            y: self.y - d,
            width: self.width + d * 2.0,
            height: self.height + d * 2.0,
        }
    }
}
