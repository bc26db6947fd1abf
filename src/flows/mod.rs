pub mod extract;
pub mod import;
pub mod render;

pub use render::{RenderConfig, RenderSummary, Renderer};
