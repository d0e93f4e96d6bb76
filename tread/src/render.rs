use crate::{Mesh, Rect, Text};

/// Sink that widgets draw into once per frame.
pub trait RenderTarget {
    fn draw_mesh(&mut self, mesh: &Mesh);
    /// Draws `text` at its transform. Rotation is ignored.
    fn draw_text(&mut self, text: &Text);
    /// Bounds of `text` with its transform ignored.
    fn text_bounds(&mut self, text: &Text) -> Rect;
}
