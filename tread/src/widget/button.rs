use glam::Vec2;
use glyph_brush::FontId;
use palette::LinSrgba;
use tiny_tanks::{impl_add_event_listener, Event};

use crate::{
    defs,
    layout::{align_within, content_box, Alignment, ContentMode},
    scale::normalized_scale,
    shape::rectangle_points,
    widget::{Widget, WidgetBase, WidgetKind},
    Margins, PointerState, Rect, RenderTarget, Shape, Text,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ButtonShape {
    Rectangle,
    /// Circle approximated with `point_count` points, stretched to fill the box.
    Circle { point_count: u32 },
}

/// Clickable box with an optional caption.
///
/// The box is laid out like a label's: in [`ContentMode::Fixed`] (the default)
/// it is `size` grown by the margins and the caption is aligned inside it, in
/// [`ContentMode::AutoFit`] it hugs the caption.
pub struct Button {
    base: WidgetBase,
    kind: ButtonShape,
    shape: Shape,
    size: Vec2,
    text: Text,
    alignment: Alignment,
    margins: Margins,
    content_mode: ContentMode,
    rotation: f32,
    hoverable: bool,
    clickable: bool,
    state: PointerState,
    pressed: Event<()>,
}

#[derive(Clone, Debug)]
pub struct ButtonLayout {
    /// The content box, before rotation.
    pub bounds: Rect,
    pub shape: Shape,
    pub text: Text,
}

impl Widget for Button {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Button
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
        layout.shape.draw(target);
        if !layout.text.string.is_empty() {
            target.draw_text(&layout.text);
        }
    }
}

impl Button {
    fn with_shape(kind: ButtonShape, shape: Shape, size: Vec2) -> Self {
        let mut shape = shape;
        shape.fill_color = defs::DEFAULT_WIDGET_BACKGROUND;
        Button {
            base: WidgetBase::default(),
            kind,
            shape,
            size,
            text: Text::default(),
            alignment: Alignment::Center,
            margins: Margins::ZERO,
            content_mode: ContentMode::Fixed,
            rotation: 0.,
            hoverable: true,
            clickable: true,
            state: PointerState::None,
            pressed: Event::new(),
        }
    }

    pub fn rectangle(size: Vec2) -> Self {
        Self::with_shape(ButtonShape::Rectangle, Shape::rectangle(size), size)
    }
    pub fn circle(radius: f32, point_count: u32) -> Self {
        let shape = Shape::circle(radius, point_count);
        let point_count = shape.point_count() as u32;
        Self::with_shape(
            ButtonShape::Circle { point_count },
            shape,
            Vec2::splat(radius * 2.),
        )
    }
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }
    pub fn with_background(mut self, color: LinSrgba) -> Self {
        self.set_background_color(color);
        self
    }

    pub fn layout(&self, target: &mut dyn RenderTarget) -> ButtonLayout {
        let anchor = self.base.anchor();
        let mut text = self.text.clone();
        text.transform.position = anchor;
        text.transform.origin = self.base.origin();
        // Top left of the base area, where the origin lands on the anchor
        let corner = anchor - self.base.origin();

        let bounds = content_box(
            self.content_mode,
            corner,
            self.size,
            self.margins,
            || text.global_bounds(target),
        );
        if self.content_mode == ContentMode::Fixed && !text.string.is_empty() {
            let inner = Rect {
                position: corner,
                size: self.size,
            };
            let offset = align_within(self.alignment, inner, text.global_bounds(target));
            text.transform.translate(offset);
        }

        let mut shape = self.shape.clone();
        match self.kind {
            ButtonShape::Rectangle => shape.set_points(rectangle_points(bounds.size)),
            ButtonShape::Circle { .. } => {
                match normalized_scale(shape.inside_bounds().size, bounds.size, 1.) {
                    Ok(scale) => shape.transform.scale = scale,
                    Err(error) => log::error!("Button circle not rescaled: {error}"),
                }
            }
        }
        // Rotate around the middle of the box
        shape.transform.origin = shape.inside_bounds().center();
        shape.transform.position = bounds.center();
        shape.transform.rotation = self.rotation;
        ButtonLayout {
            bounds,
            shape,
            text,
        }
    }
    pub fn global_bounds(&self, target: &mut dyn RenderTarget) -> Rect {
        self.layout(target).shape.global_bounds()
    }

    /// Feeds the pointer state over this button. A press that follows hovering
    /// fires the `pressed` listeners.
    pub fn handle_pointer(&mut self, state: PointerState) {
        if !self.hoverable {
            self.state = PointerState::None;
            return;
        }
        if self.clickable
            && !self.is_hidden()
            && self.state == PointerState::Over
            && state == PointerState::Press
        {
            self.pressed.emit(&());
        }
        self.state = state;
    }
    pub fn is_hovered(&self) -> bool {
        self.state != PointerState::None
    }
    pub fn pointer_state(&self) -> PointerState {
        self.state
    }

    pub fn shape(&self) -> ButtonShape {
        self.kind
    }
    /// Base size of the box, margins excluded.
    pub fn size(&self) -> Vec2 {
        self.size
    }
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn is_visible(&self) -> bool {
        !self.is_hidden()
    }
    pub fn set_visible(&mut self, visible: bool) {
        self.set_hidden(!visible);
    }
    pub fn is_hoverable(&self) -> bool {
        self.hoverable
    }
    pub fn set_hoverable(&mut self, hoverable: bool) {
        self.hoverable = hoverable;
        if !hoverable {
            self.state = PointerState::None;
        }
    }
    pub fn is_clickable(&self) -> bool {
        self.clickable
    }
    pub fn set_clickable(&mut self, clickable: bool) {
        self.clickable = clickable;
    }

    pub fn text(&self) -> &str {
        &self.text.string
    }
    pub fn set_text(&mut self, text: &str) {
        self.text.string = text.to_owned();
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
    pub fn text_color(&self) -> LinSrgba {
        self.text.fill_color
    }
    pub fn set_text_color(&mut self, color: LinSrgba) {
        self.text.fill_color = color;
    }
    pub fn text_alignment(&self) -> Alignment {
        self.alignment
    }
    pub fn set_text_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }
    pub fn set_content_mode(&mut self, mode: ContentMode) {
        self.content_mode = mode;
    }
    pub fn margins(&self) -> Margins {
        self.margins
    }
    /// Rejects the whole update if any side is negative.
    pub fn set_margins(&mut self, top: f32, bottom: f32, left: f32, right: f32) {
        if let Some(margins) = Margins::checked(top, bottom, left, right) {
            self.margins = margins;
        }
    }

    pub fn background_color(&self) -> LinSrgba {
        self.shape.fill_color
    }
    pub fn set_background_color(&mut self, color: LinSrgba) {
        self.shape.fill_color = color;
    }
    pub fn border_color(&self) -> LinSrgba {
        self.shape.outline_color
    }
    pub fn set_border_color(&mut self, color: LinSrgba) {
        self.shape.outline_color = color;
    }
    pub fn border_thickness(&self) -> f32 {
        self.shape.outline_thickness
    }
    pub fn set_border_thickness(&mut self, thickness: f32) {
        self.shape.outline_thickness = thickness;
    }

    /// Radians. Only the shape rotates; the caption stays upright.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
    pub fn rotate(&mut self, angle: f32) {
        self.rotation += angle;
    }
}

impl_add_event_listener!(Button, pressed, (), add_pressed_listener);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, RecordingTarget};
    use approx::assert_abs_diff_eq;
    use std::{cell::Cell, rc::Rc};

    fn counting(button: &mut Button) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let count1 = count.clone();
        button.add_pressed_listener(move |&()| count1.set(count1.get() + 1));
        count
    }

    #[test]
    fn press_after_hover_fires_once() {
        let mut button = Button::rectangle(Vec2::new(128., 32.));
        let count = counting(&mut button);
        button.handle_pointer(PointerState::Press);
        assert_eq!(count.get(), 0);
        button.handle_pointer(PointerState::None);
        button.handle_pointer(PointerState::Over);
        assert!(button.is_hovered());
        button.handle_pointer(PointerState::Press);
        button.handle_pointer(PointerState::Press);
        assert_eq!(count.get(), 1);
        button.handle_pointer(PointerState::Over);
        button.handle_pointer(PointerState::Press);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn flags_gate_clicks() {
        let mut button = Button::rectangle(Vec2::new(128., 32.));
        let count = counting(&mut button);

        button.set_clickable(false);
        button.handle_pointer(PointerState::Over);
        button.handle_pointer(PointerState::Press);
        assert_eq!(count.get(), 0);
        assert!(button.is_hovered());

        button.set_clickable(true);
        button.set_hoverable(false);
        button.handle_pointer(PointerState::Over);
        assert!(!button.is_hovered());
        button.handle_pointer(PointerState::Press);
        assert_eq!(count.get(), 0);

        button.set_hoverable(true);
        let ((), _) = capture_logs(|| button.set_visible(false));
        button.handle_pointer(PointerState::Over);
        button.handle_pointer(PointerState::Press);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn fixed_box_adds_margins_and_centers_caption() {
        let mut button = Button::rectangle(Vec2::new(100., 20.)).with_text("ab");
        button.set_character_size(10);
        button.set_margins(2., 3., 4., 5.);
        button.set_position(Vec2::new(50., 60.));
        let mut target = RecordingTarget::default();
        let layout = button.layout(&mut target);
        assert_eq!(layout.bounds, Rect::new(46., 58., 109., 25.));
        assert_eq!(layout.shape.global_bounds(), layout.bounds);

        // Caption is 10x10, centered in the 100x20 base area at (50, 60)
        let caption = layout.text.global_bounds(&mut target);
        assert_eq!(caption, Rect::new(95., 65., 10., 10.));
    }

    #[test]
    fn caption_alignment() {
        let mut button = Button::rectangle(Vec2::new(100., 20.)).with_text("ab");
        button.set_character_size(10);
        button.set_text_alignment(Alignment::Left);
        let mut target = RecordingTarget::default();
        let caption = button.layout(&mut target).text.global_bounds(&mut target);
        assert_eq!(caption.position, Vec2::new(0., 5.));

        button.set_text_alignment(Alignment::Bottom);
        let caption = button.layout(&mut target).text.global_bounds(&mut target);
        assert_eq!(caption.position, Vec2::new(45., 10.));
    }

    #[test]
    fn auto_fit_box_hugs_caption() {
        let mut button = Button::rectangle(Vec2::ZERO).with_text("abcdefghij");
        button.set_character_size(20);
        button.set_content_mode(ContentMode::AutoFit);
        button.set_margins(2., 3., 4., 5.);
        let mut target = RecordingTarget::default();
        let layout = button.layout(&mut target);
        assert_eq!(layout.bounds.size, Vec2::new(109., 25.));
    }

    #[test]
    fn circle_is_stretched_to_box() {
        let mut button = Button::circle(10., 16);
        button.set_size(Vec2::new(60., 30.));
        let mut target = RecordingTarget::default();
        let bounds = button.global_bounds(&mut target);
        assert_abs_diff_eq!(bounds.width(), 60., epsilon = 1e-3);
        assert_abs_diff_eq!(bounds.height(), 30., epsilon = 1e-3);
        assert_eq!(button.shape(), ButtonShape::Circle { point_count: 16 });
    }

    #[test]
    fn rotation_turns_shape_about_its_center() {
        let mut button = Button::rectangle(Vec2::new(40., 20.));
        button.set_position(Vec2::new(100., 100.));
        button.rotate(std::f32::consts::FRAC_PI_2);
        let mut target = RecordingTarget::default();
        let bounds = button.global_bounds(&mut target);
        assert_abs_diff_eq!(bounds.center().x, 120., epsilon = 1e-3);
        assert_abs_diff_eq!(bounds.center().y, 110., epsilon = 1e-3);
        assert_abs_diff_eq!(bounds.width(), 20., epsilon = 1e-3);
        assert_abs_diff_eq!(bounds.height(), 40., epsilon = 1e-3);
    }

    #[test]
    fn origin_is_placed_on_position() {
        let mut button = Button::rectangle(Vec2::new(40., 20.)).with_text("go");
        button.set_character_size(10);
        button.set_position(Vec2::new(100., 100.));
        let mut target = RecordingTarget::default();
        assert_eq!(button.global_bounds(&mut target), Rect::new(100., 100., 40., 20.));

        button.set_origin(Vec2::new(20., 10.));
        let layout = button.layout(&mut target);
        assert_eq!(layout.bounds, Rect::new(80., 90., 40., 20.));
        assert_eq!(layout.shape.global_bounds(), layout.bounds);
        let caption = layout.text.global_bounds(&mut target);
        assert_eq!(caption.center(), Vec2::new(100., 100.));
    }

    #[test]
    fn draws_shape_and_caption() {
        let mut button = Button::rectangle(Vec2::new(40., 20.));
        let mut target = RecordingTarget::default();
        button.draw(&mut target);
        assert_eq!(target.order, vec!["mesh"]);

        button.set_text("go");
        button.set_border_thickness(2.);
        let mut target = RecordingTarget::default();
        button.draw(&mut target);
        assert_eq!(target.order, vec!["mesh", "mesh", "text"]);
        let background: [f32; 4] = defs::DEFAULT_WIDGET_BACKGROUND.into();
        assert_eq!(target.meshes[0].vertices[0].color, background);
    }
}
