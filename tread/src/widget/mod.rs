mod button;
mod image;
mod label;

pub use button::{Button, ButtonLayout, ButtonShape};
pub use image::Image;
pub use label::{Label, LabelLayout};

use glam::Vec2;

use crate::RenderTarget;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WidgetKind {
    Button,
    Label,
    Image,
}

impl WidgetKind {
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Button => "Button",
            WidgetKind::Label => "Label",
            WidgetKind::Image => "Image",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// State every widget carries: where it is, the point it is placed by, how far
/// it has been moved since, and whether it is drawn at all.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct WidgetBase {
    position: Vec2,
    origin: Vec2,
    delta_offset: Vec2,
    visibility: Visibility,
}

impl WidgetBase {
    pub fn position(&self) -> Vec2 {
        self.position
    }
    pub fn origin(&self) -> Vec2 {
        self.origin
    }
    pub fn delta_offset(&self) -> Vec2 {
        self.delta_offset
    }
    /// Position with the accumulated movement applied.
    pub fn anchor(&self) -> Vec2 {
        self.position + self.delta_offset
    }
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

pub trait Widget: 'static {
    fn kind(&self) -> WidgetKind;
    fn base(&self) -> &WidgetBase;
    fn base_mut(&mut self) -> &mut WidgetBase;
    fn draw(&mut self, target: &mut dyn RenderTarget);

    fn position(&self) -> Vec2 {
        self.base().position
    }
    fn set_position(&mut self, position: Vec2) {
        self.base_mut().position = position;
    }
    fn origin(&self) -> Vec2 {
        self.base().origin
    }
    fn set_origin(&mut self, origin: Vec2) {
        self.base_mut().origin = origin;
    }
    /// Accumulates `delta` on top of the position.
    fn move_by(&mut self, delta: Vec2) {
        self.base_mut().delta_offset += delta;
    }
    fn is_hidden(&self) -> bool {
        self.base().visibility == Visibility::Hidden
    }
    fn set_hidden(&mut self, hidden: bool) {
        let visibility = if hidden {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };
        log::trace!("{} state change: {:?}", self.kind().name(), visibility);
        self.base_mut().visibility = visibility;
    }
}
