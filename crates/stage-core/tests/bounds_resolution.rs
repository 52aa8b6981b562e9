//! Integration tests: transform and bounds resolution (stage-core).
//!
//! Builds small scenes across modules and checks the absolute boxes
//! produced by `resolve_bounds` against hand-computed values.

use pretty_assertions::assert_eq;
use stage_core::*;

const VIEWPORT: Viewport = Viewport {
    width: 800.0,
    height: 600.0,
};

fn rect_graphics(w: f32, h: f32) -> Graphics {
    Graphics::new().rect(0.0, 0.0, w, h).fill(FillStyle {
        color: Color::WHITE,
        alpha: 1.0,
    })
}

#[test]
fn root_covers_viewport() {
    let graph = SceneGraph::new();
    let bounds = resolve_bounds(&graph, VIEWPORT);
    assert_eq!(
        bounds[&graph.root],
        ResolvedBounds {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    );
}

#[test]
fn nested_containers_compose_translate_and_scale() {
    let mut graph = SceneGraph::new();

    let mut outer = SceneNode::container(NodeId::intern("outer"));
    outer.set_position(100.0, 50.0);
    outer.set_scale(2.0, 2.0);
    let outer = graph.add_node(graph.root, outer);

    let mut inner = SceneNode::container(NodeId::intern("inner"));
    inner.set_position(10.0, 10.0);
    let inner = graph.add_node(outer, inner);

    let leaf = graph.add_node(
        inner,
        SceneNode::graphics(NodeId::intern("leaf"), rect_graphics(20.0, 5.0)),
    );

    let bounds = resolve_bounds(&graph, VIEWPORT);
    let expected = ResolvedBounds {
        x: 120.0,
        y: 70.0,
        width: 40.0,
        height: 10.0,
    };
    assert_eq!(bounds[&leaf], expected);
    assert_eq!(bounds[&inner], expected);
    assert_eq!(bounds[&outer], expected);
    assert_eq!(graph.global_position(leaf), Some(Point::new(120.0, 70.0)));
}

#[test]
fn moving_a_node_moves_its_bounds() {
    let mut graph = SceneGraph::new();
    let mut sprite = SceneNode::sprite(
        NodeId::intern("mover"),
        Texture::solid("m.png", 10, 10, [0; 4]),
    );
    sprite.set_anchor(0.5, 0.5);
    let idx = graph.add_node(graph.root, sprite);

    for step in 1..=3 {
        let node = graph.node_mut(idx).unwrap();
        let (x, y) = (node.x(), node.y());
        node.set_position(x - 10.0, y + 10.0);

        let b = resolve_bounds(&graph, VIEWPORT)[&idx];
        let s = step as f32;
        assert_eq!((b.x, b.y), (-10.0 * s - 5.0, 10.0 * s - 5.0));
    }
}

#[test]
fn button_height_follows_parent_scale() {
    let mut graph = SceneGraph::new();
    let mut parent = SceneNode::container(NodeId::intern("button_parent"));
    parent.set_scale(1.0, 3.0);
    let parent = graph.add_node(graph.root, parent);

    let button = Button::spawn(
        &mut graph,
        parent,
        NodeId::intern("scaled_button"),
        Texture::solid("b.png", 40, 16, [0; 4]),
        500.0,
        0.0,
    );

    // Local height ignores the parent's scale; resolved bounds do not.
    assert_eq!(button.rendered_height(&graph), Some(16.0));
    let b = resolve_bounds(&graph, VIEWPORT)[&button.node()];
    assert_eq!(b.height, 48.0);
}
