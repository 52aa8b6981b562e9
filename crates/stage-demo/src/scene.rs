//! Scene assembly: resolve every resource first, then build the graph.

use stage_assets::{AssetError, AssetLoader, AssetSource, Bundle, Spritesheet};
use stage_core::{
    Button, Color, Cursor, EventMode, FillStyle, Graphics, NodeId, NodeIndex, PointerEvent,
    SceneGraph, SceneNode, StrokeStyle, TextStyle, Texture, Viewport, measure_text,
};

pub const GAME_SCREEN: &str = "game_screen";
pub const BACKGROUND: &str = "bubble_bomb";
pub const SAMPLE_PATH: &str = "images/game-screen/sample.png";
pub const FONT_PATH: &str = "fonts/DejaVuSansMono-Oblique.ttf";
pub const SPRITESHEET_PATH: &str = "sprites/cvc-assets.json";
pub const BUTTON_MARK: &str = "button-mark.png";
pub const BUTTON_UNDO: &str = "button-undo.png";

/// Pointer-down nudge applied to the sample sprite. Unbounded: repeated
/// clicks walk the sprite off-screen.
pub const NUDGE_X: f32 = -10.0;
pub const NUDGE_Y: f32 = 10.0;

/// Everything `build_scene` draws from, already loaded.
#[derive(Debug, Clone)]
pub struct DemoResources {
    pub background: Texture,
    pub sample: Texture,
    pub font_family: String,
    pub button_mark: Texture,
    pub button_undo: Texture,
}

/// Resolve the bundle, the sample texture, the headline font and the
/// spritesheet. Any failure is returned as-is; nothing is retried.
pub async fn load_demo_resources<S: AssetSource>(
    loader: &AssetLoader<S>,
) -> Result<DemoResources, AssetError> {
    let (game_screen, sample, font, sheet) = tokio::try_join!(
        loader.load_bundle(GAME_SCREEN),
        loader.load_texture(SAMPLE_PATH),
        loader.load_font(FONT_PATH),
        loader.load_spritesheet(SPRITESHEET_PATH),
    )?;
    log::info!(
        "Resources ready: bundle {} ({} assets), font {:?}",
        game_screen.name(),
        game_screen.len(),
        font.family()
    );

    Ok(DemoResources {
        background: bundle_texture(&game_screen, BACKGROUND)?,
        sample,
        font_family: font.family().to_string(),
        button_mark: frame(&sheet, BUTTON_MARK)?,
        button_undo: frame(&sheet, BUTTON_UNDO)?,
    })
}

fn bundle_texture(bundle: &Bundle, name: &str) -> Result<Texture, AssetError> {
    bundle
        .texture(name)
        .cloned()
        .ok_or_else(|| AssetError::AssetLoadFailure {
            path: format!("{}/{name}", bundle.name()),
            reason: "bundle has no texture with this name".into(),
        })
}

fn frame(sheet: &Spritesheet, name: &str) -> Result<Texture, AssetError> {
    sheet
        .texture(name)
        .cloned()
        .ok_or_else(|| AssetError::AssetLoadFailure {
            path: sheet.path().to_string(),
            reason: format!("no frame named {name:?}"),
        })
}

/// The assembled graph and handles to the nodes callers interact with.
#[derive(Debug)]
pub struct Scene {
    pub graph: SceneGraph,
    pub sample: NodeIndex,
    pub square: NodeIndex,
    pub headline: NodeIndex,
    pub button: Button,
}

/// The rectangle drawn twice: once on the stage, once inside the container.
fn yellow_rect() -> Graphics {
    Graphics::new()
        .rect(200.0, 200.0, 200.0, 180.0)
        .fill(FillStyle {
            color: Color::from_rgb_u32(0xffea00),
            alpha: 0.5,
        })
        .stroke(StrokeStyle {
            width: 8.0,
            color: Color::from_rgb_u32(0x00ff00),
            alpha: 1.0,
        })
}

/// Build the demo scene in paint order.
pub fn build_scene(viewport: Viewport, res: &DemoResources) -> Scene {
    let mut graph = SceneGraph::new();
    let root = graph.root;

    // Background
    graph.add_node(
        root,
        SceneNode::sprite(NodeId::intern("bubble_bomb"), res.background.clone()),
    );

    // Shapes
    graph.add_node(root, SceneNode::graphics(NodeId::intern("rectangle"), yellow_rect()));

    // Text
    graph.add_node(
        root,
        SceneNode::text(NodeId::intern("hello"), "Hello Stage", TextStyle::default()),
    );

    // Interactive sprite
    let mut sprite = SceneNode::sprite(NodeId::intern("sample"), res.sample.clone());
    sprite.set_scale(1.0, 1.0);
    sprite.set_position(400.0, 100.0);
    sprite.set_anchor(0.5, 0.5);
    sprite.event_mode = EventMode::Static;
    sprite.cursor = Cursor::Pointer;
    let sample = graph.add_node(root, sprite);
    graph.on_pointer_down(
        sample,
        Box::new(|node: &mut SceneNode, _: &PointerEvent| {
            let (x, y) = (node.x(), node.y());
            node.set_position(x + NUDGE_X, y + NUDGE_Y);
        }),
    );

    // Container at the centre
    let mut shapes = SceneNode::container(NodeId::intern("shapes"));
    let center = viewport.center();
    shapes.set_position(center.x, center.y);
    let shapes = graph.add_node(root, shapes);
    let square = graph.add_node(shapes, SceneNode::graphics(NodeId::intern("square"), yellow_rect()));
    if let Some(p) = graph.global_position(square) {
        log::info!("Global positions of square are: X:{} and Y:{}", p.x, p.y);
    }

    // Headline in the loaded font
    let style = TextStyle {
        fill: Color::from_rgb_u32(0x323232),
        font_family: res.font_family.clone(),
        font_size: 72.0,
    };
    let content = "My Ludicrous Headline";
    let (w, h) = measure_text(content, &style);
    let mut headline = SceneNode::text(NodeId::intern("headline"), content, style);
    headline.set_position((viewport.width - w) / 2.0, (viewport.height - h) / 2.0);
    let headline = graph.add_node(root, headline);

    // Spritesheet frames
    let mut mark = SceneNode::sprite(NodeId::intern("button_mark"), res.button_mark.clone());
    let y = mark.y();
    mark.set_position(mark.x(), y + 50.0);
    graph.add_node(root, mark);

    let button = Button::spawn(
        &mut graph,
        root,
        NodeId::intern("button_undo"),
        res.button_undo.clone(),
        500.0,
        0.0,
    );
    if let Some(node) = graph.node_mut(button.node()) {
        let y = node.y();
        node.set_position(500.0, y);
    }
    match button.rendered_height(&graph) {
        Some(h) => log::info!("Height of button is: {h}"),
        None => log::warn!("Button node missing from graph"),
    }
    log::info!("OrigX of button is: {}", button.origin_x());

    log::debug!("Scene built: {} nodes", graph.len());
    Scene {
        graph,
        sample,
        square,
        headline,
        button,
    }
}
