pub mod control;
pub mod id;
pub mod input;
pub mod layout;
pub mod model;
pub mod texture;

pub use control::Button;
pub use id::NodeId;
pub use input::{Cursor, EventMode, PointerEvent, PointerListener};
pub use layout::{Viewport, WorldTransform, measure_text, resolve_bounds};
pub use model::*;
pub use texture::{Frame, Texture, TextureSource};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
