use stage_assets::AssetError;
use stage_render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop the demo.
#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Failed to read config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
