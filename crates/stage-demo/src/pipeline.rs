//! The demo pipeline:
//!
//! `init` (manifest) → `load_demo_resources` → `build_scene` → `attach`.
//!
//! Each step takes its inputs explicitly. Nothing reaches the surface until
//! every resource has resolved, so a failed load leaves the surface
//! untouched.

use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::scene::{Scene, build_scene, load_demo_resources};
use stage_assets::{AssetLoader, AssetSource};
use stage_core::{Button, Color, NodeIndex, Viewport};
use stage_render::{Stage, Surface};
use std::sync::{Arc, Mutex, PoisonError};

/// What external tooling can observe about a running demo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugSnapshot {
    pub bundles: Vec<String>,
    pub cached_paths: Vec<String>,
    pub viewport: Option<Viewport>,
    pub nodes: usize,
    pub frames: usize,
}

/// Optional inspection hook. Clones share one snapshot.
#[derive(Debug, Clone, Default)]
pub struct DebugHandle {
    state: Arc<Mutex<DebugSnapshot>>,
}

impl DebugHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DebugSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut DebugSnapshot)) {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Install the manifest and hand back a loader for it.
pub async fn init<S: AssetSource>(
    source: S,
    manifest_path: &str,
    debug: Option<&DebugHandle>,
) -> Result<AssetLoader<S>, DemoError> {
    let loader = AssetLoader::init(source, manifest_path).await?;
    if let Some(debug) = debug {
        let bundles = loader
            .manifest()
            .map(|m| m.bundle_names().map(str::to_string).collect())
            .unwrap_or_default();
        debug.update(|s| s.bundles = bundles);
    }
    Ok(loader)
}

/// An attached scene: the stage, the surface showing it, and the handles
/// the demo interacts with.
pub struct Demo<S: Surface> {
    stage: Stage,
    surface: S,
    sample: NodeIndex,
    button: Button,
    debug: Option<DebugHandle>,
}

impl<S: Surface> Demo<S> {
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The pointer-interactive sample sprite.
    pub fn sample(&self) -> NodeIndex {
        self.sample
    }

    pub fn button(&self) -> Button {
        self.button
    }

    /// Deliver a pointer-down and re-present the stage.
    pub fn click(&mut self, x: f32, y: f32) -> Result<Option<NodeIndex>, DemoError> {
        let hit = self.stage.pointer_down(x, y);
        self.present()?;
        Ok(hit)
    }

    /// Click wherever the sample sprite currently is.
    pub fn click_sample(&mut self) -> Result<Option<NodeIndex>, DemoError> {
        match self.stage.graph().global_position(self.sample) {
            Some(p) => self.click(p.x, p.y),
            None => Ok(None),
        }
    }

    fn present(&mut self) -> Result<(), DemoError> {
        self.surface.present(&self.stage)?;
        if let Some(debug) = &self.debug {
            debug.update(|s| s.frames += 1);
        }
        Ok(())
    }
}

/// Put a built scene on a surface and present the first frame.
pub fn attach<S: Surface>(
    surface: S,
    scene: Scene,
    background: Color,
    debug: Option<&DebugHandle>,
) -> Result<Demo<S>, DemoError> {
    let viewport = surface.viewport();
    let nodes = scene.graph.len();
    let stage = Stage::new(scene.graph, viewport).with_background(background);
    let mut demo = Demo {
        stage,
        surface,
        sample: scene.sample,
        button: scene.button,
        debug: debug.cloned(),
    };
    if let Some(debug) = debug {
        debug.update(|s| {
            s.viewport = Some(viewport);
            s.nodes = nodes;
        });
    }
    demo.present()?;
    log::info!("Attached scene: {nodes} nodes on {}x{}", viewport.width, viewport.height);
    Ok(demo)
}

/// The whole pipeline against one source and one surface.
pub async fn run<Src: AssetSource, S: Surface>(
    source: Src,
    surface: S,
    config: &DemoConfig,
    debug: Option<&DebugHandle>,
) -> Result<Demo<S>, DemoError> {
    let loader = init(source, &config.manifest, debug).await?;
    let resources = load_demo_resources(&loader).await?;
    if let Some(debug) = debug {
        let cached = loader.cached_paths();
        debug.update(|s| s.cached_paths = cached);
    }

    let scene = build_scene(surface.viewport(), &resources);
    attach(surface, scene, config.background_color(), debug)
}
