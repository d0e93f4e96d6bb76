pub mod defs;
mod geometry;
pub mod layout;
pub mod polygon;
mod render;
pub mod scale;
mod shape;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use geometry::{Margins, Rect, Transform};
pub use layout::{Alignment, ContentMode};
pub use render::RenderTarget;
pub use scale::ScaleError;
pub use shape::{rectangle_points, Mesh, Shape, Text, TextStyle, Texture, Vertex};

pub use glam as math;
pub use glyph_brush::FontId;
pub use palette as color;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerState {
    None,
    Over,
    Press,
}
