use glam::Vec2;
use palette::LinSrgba;

use crate::{
    defs, polygon,
    scale::normalized_scale,
    widget::{Widget, WidgetBase, WidgetKind},
    Rect, RenderTarget, Shape, Texture,
};

/// Texture shown inside a regular polygon frame.
///
/// The frame is generated on the unit circle and stretched to `size` (times
/// the scale factor) every time the image is drawn.
pub struct Image {
    base: WidgetBase,
    frame: Shape,
    num_vertices: u32,
    size: Vec2,
    scale_factor: f32,
    rotation: f32,
}

impl Widget for Image {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Image
    }
    fn base(&self) -> &WidgetBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }
    fn draw(&mut self, target: &mut dyn RenderTarget) {
        if self.is_hidden() {
            return;
        }
        self.apply_transform();
        self.frame.draw(target);
    }
}

impl Image {
    pub fn new() -> Self {
        Self::build(None, defs::DEFAULT_SHAPE_NUM_VERTICES)
    }
    pub fn with_texture(texture: Texture) -> Self {
        Self::build(Some(texture), defs::DEFAULT_SHAPE_NUM_VERTICES)
    }
    pub fn with_vertices(texture: Texture, num_vertices: u32) -> Self {
        Self::build(Some(texture), num_vertices)
    }

    fn build(texture: Option<Texture>, num_vertices: u32) -> Self {
        let mut image = Image {
            base: WidgetBase::default(),
            frame: Shape::polygon(Vec::new()),
            num_vertices: 0,
            size: Vec2::ONE,
            scale_factor: 1.,
            rotation: 0.,
        };
        image.frame.texture = texture;
        image.set_num_vertices(num_vertices);
        image
    }

    /// Stretches the frame to the requested size. If the frame has no extent
    /// the previous scale is kept.
    fn apply_size_and_scale(&mut self) {
        let raw = self.frame.local_bounds().size;
        match normalized_scale(raw, self.size, self.scale_factor) {
            Ok(scale) => self.frame.transform.scale = scale,
            Err(error) => log::error!("Image frame not rescaled: {error}"),
        }
    }

    fn apply_transform(&mut self) {
        self.apply_size_and_scale();
        self.frame.transform.position = self.base.anchor();
        self.frame.transform.origin = self.base.origin();
        self.frame.transform.rotation = self.rotation;
    }

    pub fn texture(&self) -> Option<Texture> {
        self.frame.texture
    }
    pub fn set_texture(&mut self, texture: Texture) {
        self.frame.texture = Some(texture);
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }
    pub fn scale(&self) -> f32 {
        self.scale_factor
    }
    pub fn set_scale(&mut self, factor: f32) {
        self.scale_factor = factor;
    }

    /// The vertex count in use, after any fallback for invalid counts.
    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }
    /// Replaces the frame with a freshly generated polygon. Colors, border and
    /// texture carry over.
    pub fn set_num_vertices(&mut self, num_vertices: u32) {
        let points = polygon::generate(num_vertices);
        self.num_vertices = points.len() as u32;
        self.frame.set_points(points);
    }

    pub fn border_thickness(&self) -> f32 {
        self.frame.outline_thickness
    }
    pub fn set_border_thickness(&mut self, thickness: f32) {
        self.frame.outline_thickness = thickness;
    }
    pub fn border_color(&self) -> LinSrgba {
        self.frame.outline_color
    }
    pub fn set_border_color(&mut self, color: LinSrgba) {
        self.frame.outline_color = color;
    }
    /// Tint multiplied with the texture.
    pub fn color_filter(&self) -> LinSrgba {
        self.frame.fill_color
    }
    pub fn set_color_filter(&mut self, color: LinSrgba) {
        self.frame.fill_color = color;
    }

    /// Radians.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = angle;
    }
    pub fn rotate(&mut self, angle: f32) {
        self.rotation += angle;
    }

    pub fn frame(&self) -> &Shape {
        &self.frame
    }
    pub fn local_bounds(&self) -> Rect {
        self.frame.local_bounds()
    }
    /// Bounds as of the last draw.
    pub fn global_bounds(&self) -> Rect {
        self.frame.global_bounds()
    }
}

impl Default for Image {
    fn default() -> Self {
        Image::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, RecordingTarget};
    use approx::assert_abs_diff_eq;
    use glam::UVec2;
    use log::Level;

    fn texture() -> Texture {
        Texture::new(7, UVec2::new(64, 64))
    }

    #[test]
    fn frame_is_stretched_to_size() {
        let mut image = Image::with_vertices(texture(), 4);
        image.set_size(Vec2::new(100., 50.));
        image.set_scale(2.);
        image.set_position(Vec2::new(300., 200.));
        let mut target = RecordingTarget::default();
        image.draw(&mut target);

        let bounds = image.global_bounds();
        assert_abs_diff_eq!(bounds.width(), 200., epsilon = 1e-3);
        assert_abs_diff_eq!(bounds.height(), 100., epsilon = 1e-3);
        assert_eq!(target.meshes.len(), 1);
        assert_eq!(target.meshes[0].texture, Some(texture()));
        assert_eq!(target.meshes[0].vertices.len(), 4);
    }

    #[test]
    fn border_counts_towards_raw_bounds() {
        let mut image = Image::with_vertices(texture(), 4);
        image.set_size(Vec2::new(100., 100.));
        image.set_border_thickness(0.5);
        let mut target = RecordingTarget::default();
        image.draw(&mut target);
        let bounds = image.global_bounds();
        assert_abs_diff_eq!(bounds.width(), 100., epsilon = 1e-3);
        assert_eq!(target.meshes.len(), 2);
    }

    #[test]
    fn changing_vertex_count_regenerates_frame() {
        let mut image = Image::with_texture(texture());
        image.set_border_color(defs::BLACK);
        assert_eq!(image.num_vertices(), 3);
        image.set_num_vertices(8);
        assert_eq!(image.num_vertices(), 8);
        assert_eq!(image.frame().point_count(), 8);
        assert_eq!(image.frame().points(), polygon::generate(8).as_slice());
        assert_eq!(image.border_color(), defs::BLACK);
        assert_eq!(image.texture(), Some(texture()));
    }

    #[test]
    fn invalid_vertex_count_falls_back() {
        let (image, records) = capture_logs(|| Image::with_vertices(texture(), 2));
        assert_eq!(image.num_vertices(), 3);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Warn);
    }

    #[test]
    fn zero_size_frame_keeps_previous_scale() {
        let mut image = Image::new();
        image.set_size(Vec2::new(10., 10.));
        let mut target = RecordingTarget::default();
        image.draw(&mut target);
        let scale = image.frame().transform.scale;

        image.frame.set_points(vec![Vec2::ZERO, Vec2::ZERO, Vec2::ZERO]);
        let ((), records) = capture_logs(|| image.draw(&mut target));
        assert_eq!(image.frame().transform.scale, scale);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Error);
    }

    #[test]
    fn rotation_accumulates() {
        let mut image = Image::new();
        image.set_rotation(0.5);
        image.rotate(0.25);
        assert_eq!(image.rotation(), 0.75);
        image.draw(&mut RecordingTarget::default());
        assert_eq!(image.frame().transform.rotation, 0.75);
    }

    #[test]
    fn too_many_vertices_draws_nothing() {
        let mut image = Image::with_vertices(texture(), 70_000);
        let mut target = RecordingTarget::default();
        let ((), records) = capture_logs(|| image.draw(&mut target));
        assert!(target.meshes.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Error);
    }
}
