use glam::Vec2;
use tread::{PointerState, Rect};

pub use miniquad::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl TryFrom<miniquad::MouseButton> for MouseButton {
    type Error = ();
    fn try_from(value: miniquad::MouseButton) -> Result<Self, Self::Error> {
        match value {
            miniquad::MouseButton::Left => Ok(MouseButton::Left),
            miniquad::MouseButton::Middle => Ok(MouseButton::Middle),
            miniquad::MouseButton::Right => Ok(MouseButton::Right),
            miniquad::MouseButton::Unknown => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: KeyCode, pressed: bool },
    MouseMotion { position: Vec2 },
    MouseButton { button: MouseButton, pressed: bool },
}

/// Last known mouse position and primary button.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
    pub primary: bool,
}

impl Pointer {
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::MouseMotion { position } => self.position = position,
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => self.primary = pressed,
            _ => (),
        }
    }

    /// Pointer state relative to a widget occupying `bounds`.
    pub fn state_in(&self, bounds: Rect) -> PointerState {
        if !bounds.contains(self.position) {
            PointerState::None
        } else if self.primary {
            PointerState::Press
        } else {
            PointerState::Over
        }
    }
}
