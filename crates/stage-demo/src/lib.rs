//! stage-demo: assembles the demo scene from the asset bundles and hosts it
//! on a render surface.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scene;

pub use config::{CliArgs, DemoConfig};
pub use error::DemoError;
pub use pipeline::{DebugHandle, DebugSnapshot, Demo, attach, init, run};
pub use scene::{DemoResources, Scene, build_scene, load_demo_resources};
