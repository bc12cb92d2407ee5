//! Presentation layer
//!
//! Renderers consume a [`Frame`] captured after each update and never touch
//! the simulation directly.

pub mod frame;
pub mod text;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use frame::{Frame, Hud, Sprite};
pub use text::TextRenderer;

#[cfg(target_arch = "wasm32")]
pub use dom::DomRenderer;

/// Something that can draw a frame
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}
