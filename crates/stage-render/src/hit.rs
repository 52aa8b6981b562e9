//! Hit testing: point → interactive node lookup.
//!
//! Reverse-walks the scene (front-to-back) and returns the topmost node
//! whose event mode is `Static` and whose resolved bounds contain the
//! point. `EventMode::None` and hidden nodes prune their whole subtree.

use stage_core::{EventMode, NodeIndex, NodeKind, ResolvedBounds, SceneGraph};
use std::collections::HashMap;

/// Find the topmost interactive node at (px, py).
/// Returns `None` if nothing interactive is hit.
pub fn hit_test(
    graph: &SceneGraph,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
    px: f32,
    py: f32,
) -> Option<NodeIndex> {
    hit_test_node(graph, graph.root, bounds, px, py)
}

fn hit_test_node(
    graph: &SceneGraph,
    idx: NodeIndex,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
    px: f32,
    py: f32,
) -> Option<NodeIndex> {
    let node = graph.node(idx)?;
    if !node.visible || node.event_mode == EventMode::None {
        return None;
    }

    // Last painted = topmost
    for child in graph.children(idx).into_iter().rev() {
        if let Some(hit) = hit_test_node(graph, child, bounds, px, py) {
            return Some(hit);
        }
    }

    if node.event_mode == EventMode::Static
        && !matches!(node.kind, NodeKind::Root)
        && let Some(b) = bounds.get(&idx)
        && b.contains(px, py)
    {
        return Some(idx);
    }

    None
}
