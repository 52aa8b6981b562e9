//! Pointer input: events, per-node event modes and listener storage.
//!
//! Only pointer-down is dispatched. Listeners receive the node they are
//! registered on mutably, so a listener can reposition its own sprite.

use crate::model::SceneNode;
use petgraph::graph::NodeIndex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// How a node takes part in pointer hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventMode {
    /// Neither the node nor its children are hit-tested.
    None,
    /// The node itself is not a target; its children may be.
    #[default]
    Passive,
    /// The node receives pointer events.
    Static,
}

/// Cursor shown while hovering an interactive node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    /// CSS cursor keyword.
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
        }
    }
}

/// A pointer press in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    /// Pressure from 0.0 (none) to 1.0 (max). Mouse is always 1.0.
    pub pressure: f32,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: 1.0,
        }
    }
}

/// Callback invoked with the node it was registered on.
pub type PointerListener = Box<dyn FnMut(&mut SceneNode, &PointerEvent) + Send>;

/// Pointer-down listeners keyed by node.
#[derive(Default)]
pub struct Listeners {
    down: HashMap<NodeIndex, SmallVec<[PointerListener; 1]>>,
}

impl Listeners {
    pub fn add(&mut self, idx: NodeIndex, listener: PointerListener) {
        self.down.entry(idx).or_default().push(listener);
    }

    pub fn has(&self, idx: NodeIndex) -> bool {
        self.down.get(&idx).is_some_and(|l| !l.is_empty())
    }

    /// Run every listener of `idx` in registration order.
    /// Returns how many were invoked.
    pub fn fire(&mut self, idx: NodeIndex, node: &mut SceneNode, event: &PointerEvent) -> usize {
        match self.down.get_mut(&idx) {
            Some(listeners) => {
                for listener in listeners.iter_mut() {
                    listener(node, event);
                }
                listeners.len()
            }
            None => 0,
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self.down.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("Listeners").field("down", &counts).finish()
    }
}
