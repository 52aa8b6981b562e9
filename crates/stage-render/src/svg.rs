//! Scene graph → standalone SVG document.
//!
//! Every node becomes a `<g>` carrying its local translate/scale, so the
//! document mirrors the scene hierarchy. Sprites reference their image
//! file by path; spritesheet frames are cropped with a nested `<svg>`
//! viewBox.

use stage_core::{
    Color, Cursor, EventMode, GraphicsItem, NodeIndex, NodeKind, SceneGraph, Shape, Texture,
    TextStyle, Transform, Viewport, measure_text,
};
use std::fmt::Write;

/// Export settings.
#[derive(Debug, Clone, Default)]
pub struct SvgOptions {
    /// Clear colour painted under the scene (alpha already applied).
    pub background: Option<Color>,
    /// Prefix joined to texture paths in `href`s, e.g. the asset directory.
    pub href_base: String,
}

pub fn render_svg(graph: &SceneGraph, viewport: Viewport, options: &SvgOptions) -> String {
    let (w, h) = (viewport.width, viewport.height);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );

    if let Some(bg) = options.background {
        let _ = writeln!(
            svg,
            "  <rect width=\"{w}\" height=\"{h}\"{} />",
            paint_attrs("fill", bg, 1.0)
        );
    }

    for child in graph.children(graph.root) {
        render_node_svg(&mut svg, graph, child, options, 1);
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_node_svg(
    out: &mut String,
    graph: &SceneGraph,
    idx: NodeIndex,
    options: &SvgOptions,
    depth: usize,
) {
    let Some(node) = graph.node(idx) else {
        return;
    };
    if !node.visible {
        return;
    }

    let pad = "  ".repeat(depth);
    let _ = write!(out, "{pad}<g id=\"{}\"", escape(node.id.as_str()));
    if let Some(t) = transform_attr(&node.transform) {
        let _ = write!(out, " transform=\"{t}\"");
    }
    if node.event_mode == EventMode::Static && node.cursor == Cursor::Pointer {
        let _ = write!(out, " style=\"cursor: {}\"", node.cursor.as_css());
    }
    out.push_str(">\n");

    let inner = "  ".repeat(depth + 1);
    let anchor = node.transform.anchor;
    match &node.kind {
        NodeKind::Root | NodeKind::Container => {}
        NodeKind::Graphics(g) => {
            for item in g.items() {
                out.push_str(&inner);
                graphics_item_svg(out, item);
            }
        }
        NodeKind::Text { content, style } => {
            let (tw, th) = measure_text(content, style);
            out.push_str(&inner);
            text_svg(out, content, style, 0.0 - anchor.x * tw, 0.0 - anchor.y * th);
        }
        NodeKind::Sprite { texture } => {
            let x = 0.0 - anchor.x * texture.width();
            let y = 0.0 - anchor.y * texture.height();
            out.push_str(&inner);
            sprite_svg(out, texture, x, y, &options.href_base);
        }
    }

    for child in graph.children(idx) {
        render_node_svg(out, graph, child, options, depth + 1);
    }

    let _ = writeln!(out, "{pad}</g>");
}

fn transform_attr(t: &Transform) -> Option<String> {
    let mut parts = Vec::new();
    if t.position.x != 0.0 || t.position.y != 0.0 {
        parts.push(format!("translate({}, {})", t.position.x, t.position.y));
    }
    if t.scale.x != 1.0 || t.scale.y != 1.0 {
        parts.push(format!("scale({}, {})", t.scale.x, t.scale.y));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn graphics_item_svg(out: &mut String, item: &GraphicsItem) {
    let fill = match item.fill {
        Some(f) => paint_attrs("fill", f.color, f.alpha),
        None => " fill=\"none\"".to_string(),
    };
    let stroke = match item.stroke {
        Some(s) => format!(
            "{} stroke-width=\"{}\"",
            paint_attrs("stroke", s.color, s.alpha),
            s.width
        ),
        None => String::new(),
    };

    match item.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let _ = writeln!(
                out,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\"{fill}{stroke} />"
            );
        }
        Shape::Circle { x, y, radius } => {
            let _ = writeln!(out, "<circle cx=\"{x}\" cy=\"{y}\" r=\"{radius}\"{fill}{stroke} />");
        }
    }
}

fn text_svg(out: &mut String, content: &str, style: &TextStyle, x: f32, y: f32) {
    let _ = writeln!(
        out,
        "<text x=\"{x}\" y=\"{y}\" font-family=\"{}\" font-size=\"{}\"{} dominant-baseline=\"hanging\">{}</text>",
        escape(&style.font_family),
        style.font_size,
        paint_attrs("fill", style.fill, 1.0),
        escape(content)
    );
}

fn sprite_svg(out: &mut String, texture: &Texture, x: f32, y: f32, href_base: &str) {
    let source = texture.source();
    let href = escape(&join_href(href_base, source.path()));
    let frame = texture.frame();
    let (sw, sh) = (source.width(), source.height());

    let full = frame.x == 0.0
        && frame.y == 0.0
        && frame.width == sw as f32
        && frame.height == sh as f32;
    if full {
        let _ = writeln!(
            out,
            "<image href=\"{href}\" x=\"{x}\" y=\"{y}\" width=\"{sw}\" height=\"{sh}\" />"
        );
    } else {
        let _ = writeln!(
            out,
            "<svg x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\"><image href=\"{href}\" width=\"{sw}\" height=\"{sh}\" /></svg>",
            frame.width, frame.height, frame.x, frame.y, frame.width, frame.height
        );
    }
}

/// `fill="#RRGGBB" fill-opacity="a"` with the colour's own alpha folded in.
fn paint_attrs(attr: &str, color: Color, alpha: f32) -> String {
    let opacity = color.a * alpha;
    let hex = Color::rgba(color.r, color.g, color.b, 1.0).to_hex();
    if (opacity - 1.0).abs() < f32::EPSILON {
        format!(" {attr}=\"{hex}\"")
    } else {
        format!(" {attr}=\"{hex}\" {attr}-opacity=\"{opacity}\"")
    }
}

fn join_href(base: &str, path: &str) -> String {
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
