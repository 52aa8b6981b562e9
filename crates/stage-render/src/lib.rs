pub mod hit;
pub mod paint;
pub mod stage;
pub mod surface;
pub mod svg;

pub use hit::hit_test;
pub use paint::{PaintStats, Painter};
pub use stage::Stage;
pub use surface::{RenderError, SceneSurface, Surface, SvgSurface};
pub use svg::{SvgOptions, render_svg};
