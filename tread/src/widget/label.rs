use glam::Vec2;
use glyph_brush::FontId;
use palette::LinSrgba;

use crate::{
    layout::{content_box, ContentMode},
    shape::rectangle_points,
    widget::{Widget, WidgetBase, WidgetKind},
    Margins, Rect, RenderTarget, Shape, Text, TextStyle,
};

/// Text on a background box. The box either hugs the text or has a fixed
/// base size, and is grown by the margins in both cases.
pub struct Label {
    base: WidgetBase,
    text: Text,
    rect: Shape,
    rect_size: Vec2,
    content_mode: ContentMode,
    margins: Margins,
}

/// Where the label's shapes end up for one frame.
#[derive(Clone, Debug)]
pub struct LabelLayout {
    pub rect: Shape,
    pub text: Text,
}

impl Widget for Label {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Label
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
        let layout = self.layout(target);
        layout.rect.draw(target);
        target.draw_text(&layout.text);
    }
}

impl Label {
    pub fn new() -> Self {
        Self::with_text("")
    }
    pub fn with_text(text: &str) -> Self {
        Label {
            base: WidgetBase::default(),
            text: Text::new(text),
            rect: Shape::rectangle(Vec2::ZERO),
            rect_size: Vec2::ZERO,
            content_mode: ContentMode::AutoFit,
            margins: Margins::ZERO,
        }
    }

    /// Places the text, then sizes and places the box. The text is positioned
    /// before it is measured, so auto-fit boxes follow it exactly.
    pub fn layout(&self, target: &mut dyn RenderTarget) -> LabelLayout {
        let anchor = self.base.anchor();
        let mut text = self.text.clone();
        text.transform.position = anchor;
        text.transform.origin = self.base.origin();

        let bounds = content_box(
            self.content_mode,
            anchor,
            self.rect_size,
            self.margins,
            || text.global_bounds(target),
        );

        let mut rect = self.rect.clone();
        rect.set_points(rectangle_points(bounds.size));
        rect.transform.position = bounds.position;
        rect.transform.origin = match self.content_mode {
            // Measured text bounds already include the position and origin
            ContentMode::AutoFit => Vec2::ZERO,
            ContentMode::Fixed => self.base.origin(),
        };
        LabelLayout { rect, text }
    }
    pub fn local_bounds(&self, target: &mut dyn RenderTarget) -> Rect {
        self.layout(target).rect.local_bounds()
    }
    pub fn global_bounds(&self, target: &mut dyn RenderTarget) -> Rect {
        self.layout(target).rect.global_bounds()
    }

    pub fn text(&self) -> &str {
        &self.text.string
    }
    pub fn set_text(&mut self, string: &str) {
        self.text.string = string.to_owned();
    }
    pub fn clear(&mut self) {
        self.text.string.clear();
    }

    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }
    pub fn set_content_mode(&mut self, mode: ContentMode) {
        self.content_mode = mode;
    }

    /// Rejects the whole update if any side is negative.
    pub fn set_margins(&mut self, top: f32, bottom: f32, left: f32, right: f32) {
        if let Some(margins) = Margins::checked(top, bottom, left, right) {
            self.margins = margins;
        }
    }
    pub fn margins(&self) -> Margins {
        self.margins
    }
    pub fn margin_top(&self) -> f32 {
        self.margins.top
    }
    pub fn margin_bottom(&self) -> f32 {
        self.margins.bottom
    }
    pub fn margin_left(&self) -> f32 {
        self.margins.left
    }
    pub fn margin_right(&self) -> f32 {
        self.margins.right
    }

    pub fn font(&self) -> FontId {
        self.text.font
    }
    pub fn set_font(&mut self, font: FontId) {
        self.text.font = font;
    }
    pub fn character_size(&self) -> u32 {
        self.text.character_size
    }
    pub fn set_character_size(&mut self, size: u32) {
        self.text.character_size = size;
    }
    pub fn text_style(&self) -> TextStyle {
        self.text.style
    }
    pub fn set_text_style(&mut self, style: TextStyle) {
        self.text.style = style;
    }
    pub fn text_color(&self) -> LinSrgba {
        self.text.fill_color
    }
    pub fn set_text_color(&mut self, color: LinSrgba) {
        self.text.fill_color = color;
    }
    pub fn text_outline_color(&self) -> LinSrgba {
        self.text.outline_color
    }
    pub fn set_text_outline_color(&mut self, color: LinSrgba) {
        self.text.outline_color = color;
    }
    pub fn text_outline_thickness(&self) -> f32 {
        self.text.outline_thickness
    }
    pub fn set_text_outline_thickness(&mut self, thickness: f32) {
        self.text.outline_thickness = thickness;
    }

    pub fn background_color(&self) -> LinSrgba {
        self.rect.fill_color
    }
    pub fn set_background_color(&mut self, color: LinSrgba) {
        self.rect.fill_color = color;
    }
    pub fn border_color(&self) -> LinSrgba {
        self.rect.outline_color
    }
    pub fn set_border_color(&mut self, color: LinSrgba) {
        self.rect.outline_color = color;
    }
    pub fn border_thickness(&self) -> f32 {
        self.rect.outline_thickness
    }
    pub fn set_border_thickness(&mut self, thickness: f32) {
        self.rect.outline_thickness = thickness;
    }

    /// Base size of the box in [`ContentMode::Fixed`], margins excluded.
    pub fn rect_size(&self) -> Vec2 {
        self.rect_size
    }
    pub fn set_rect_size(&mut self, size: Vec2) {
        self.rect_size = size;
    }

    pub fn scale_text(&mut self, factor: Vec2) {
        self.text.transform.scale_by(factor);
    }
    pub fn scale_rect(&mut self, factor: Vec2) {
        self.rect.transform.scale_by(factor);
    }
    pub fn text_scale(&self) -> Vec2 {
        self.text.transform.scale
    }
    pub fn rect_scale(&self) -> Vec2 {
        self.rect.transform.scale
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, RecordingTarget};
    use log::Level;

    // RecordingTarget measures 10 chars at size 20 as 100x20, offset (0, 5)
    fn ten_chars() -> Label {
        let mut label = Label::with_text("abcdefghij");
        label.set_character_size(20);
        label.set_margins(2., 3., 4., 5.);
        label
    }

    #[test]
    fn negative_margin_keeps_previous_margins() {
        let mut label = Label::new();
        label.set_margins(1., 1., 1., 1.);
        let ((), records) = capture_logs(|| label.set_margins(-1., 2., 3., 4.));
        assert_eq!(label.margins(), Margins::splat(1.));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Warn);
    }

    #[test]
    fn auto_fit_box_wraps_text() {
        let mut label = ten_chars();
        label.set_position(Vec2::new(30., 40.));
        label.move_by(Vec2::new(5., 5.));
        let mut target = RecordingTarget::default();
        let layout = label.layout(&mut target);

        let text_bounds = layout.text.global_bounds(&mut target);
        assert_eq!(text_bounds, Rect::new(35., 50., 100., 20.));
        assert_eq!(layout.rect.global_bounds(), Rect::new(31., 48., 109., 25.));
    }

    #[test]
    fn fixed_box_uses_rect_size() {
        let mut label = ten_chars();
        label.set_text("x");
        label.set_content_mode(ContentMode::Fixed);
        label.set_rect_size(Vec2::new(100., 20.));
        label.set_position(Vec2::new(30., 40.));
        label.move_by(Vec2::new(5., 5.));
        let mut target = RecordingTarget::default();
        let bounds = label.global_bounds(&mut target);
        assert_eq!(bounds, Rect::new(31., 43., 109., 25.));
        assert_eq!(label.rect_size(), Vec2::new(100., 20.));
    }

    #[test]
    fn switching_modes_keeps_base_size() {
        let mut label = ten_chars();
        label.set_rect_size(Vec2::new(7., 8.));
        label.set_content_mode(ContentMode::Fixed);
        label.set_content_mode(ContentMode::AutoFit);
        assert_eq!(label.rect_size(), Vec2::new(7., 8.));
        let mut target = RecordingTarget::default();
        assert_eq!(label.local_bounds(&mut target).size, Vec2::new(109., 25.));
    }

    #[test]
    fn layout_is_repeatable() {
        let mut label = ten_chars();
        label.set_position(Vec2::new(0.1, 0.2));
        label.scale_text(Vec2::new(1.3, 0.7));
        let mut target = RecordingTarget::default();
        let first = label.layout(&mut target).rect.global_bounds();
        let second = label.layout(&mut target).rect.global_bounds();
        assert_eq!(first.position.to_array(), second.position.to_array());
        assert_eq!(first.size.to_array(), second.size.to_array());

        // Drawing twice draws the same box twice
        label.draw(&mut target);
        label.draw(&mut target);
        assert_eq!(target.meshes[0], target.meshes[1]);
    }

    #[test]
    fn draws_box_before_text() {
        let mut label = ten_chars();
        label.set_border_thickness(1.);
        let mut target = RecordingTarget::default();
        label.draw(&mut target);
        assert_eq!(target.meshes.len(), 2);
        assert_eq!(target.texts.len(), 1);
        assert_eq!(target.order, vec!["mesh", "mesh", "text"]);
        assert_eq!(target.texts[0].string, "abcdefghij");
    }

    #[test]
    fn scaling_is_multiplicative() {
        let mut label = Label::new();
        label.scale_text(Vec2::splat(2.));
        label.scale_text(Vec2::new(1.5, 3.));
        label.scale_rect(Vec2::splat(0.5));
        assert_eq!(label.text_scale(), Vec2::new(3., 6.));
        assert_eq!(label.rect_scale(), Vec2::splat(0.5));
    }

    #[test]
    fn clear_empties_text() {
        let mut label = Label::with_text("score");
        label.clear();
        assert_eq!(label.text(), "");
    }
}
