//! Sizing of the box drawn around a widget's content.

use glam::Vec2;

use crate::{Margins, Rect};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ContentMode {
    /// The box hugs the content's current bounds.
    #[default]
    AutoFit,
    /// The box has a user set base size placed at the widget's position.
    Fixed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Alignment {
    Left,
    Right,
    Top,
    Bottom,
    #[default]
    Center,
}

/// Box around some content, grown by `margins` on each side.
///
/// In [`ContentMode::AutoFit`] the content is measured with `measure`, which
/// must return the content's global bounds with its position already applied.
/// In [`ContentMode::Fixed`] the content is `base_size` at `anchor` and
/// `measure` is not called.
pub fn content_box<F>(
    mode: ContentMode,
    anchor: Vec2,
    base_size: Vec2,
    margins: Margins,
    measure: F,
) -> Rect
where
    F: FnOnce() -> Rect,
{
    let content = match mode {
        ContentMode::AutoFit => measure(),
        ContentMode::Fixed => Rect {
            position: anchor,
            size: base_size,
        },
    };
    content.expand(margins)
}

/// Offset that moves `content` into position inside `container`. Left and
/// right alignment center vertically, top and bottom center horizontally.
pub fn align_within(alignment: Alignment, container: Rect, content: Rect) -> Vec2 {
    let centered = container.center() - content.center();
    let target = match alignment {
        Alignment::Center => return centered,
        Alignment::Left => Vec2::new(container.x(), content.y() + centered.y),
        Alignment::Right => Vec2::new(
            container.max().x - content.width(),
            content.y() + centered.y,
        ),
        Alignment::Top => Vec2::new(content.x() + centered.x, container.y()),
        Alignment::Bottom => Vec2::new(
            content.x() + centered.x,
            container.max().y - content.height(),
        ),
    };
    target - content.position
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGINS: Margins = Margins {
        top: 2.,
        bottom: 3.,
        left: 4.,
        right: 5.,
    };

    #[test]
    fn auto_fit_wraps_measured_content() {
        let content = Rect::new(10., 12., 100., 20.);
        let rect = content_box(ContentMode::AutoFit, Vec2::ZERO, Vec2::ZERO, MARGINS, || content);
        assert_eq!(rect.size, Vec2::new(109., 25.));
        assert_eq!(rect.position, Vec2::new(6., 10.));
    }

    #[test]
    fn fixed_uses_base_size_at_anchor() {
        let rect = content_box(
            ContentMode::Fixed,
            Vec2::new(50., 60.),
            Vec2::new(100., 20.),
            MARGINS,
            || panic!("fixed mode must not measure content"),
        );
        assert_eq!(rect.size, Vec2::new(109., 25.));
        assert_eq!(rect.position, Vec2::new(46., 58.));
    }

    #[test]
    fn repeated_layout_is_identical() {
        let content = Rect::new(0.3, 0.7, 99.9, 19.1);
        let layout = || content_box(ContentMode::AutoFit, Vec2::ZERO, Vec2::ZERO, MARGINS, || content);
        let first = layout();
        let second = layout();
        assert_eq!(first.position.to_array().map(f32::to_bits), second.position.to_array().map(f32::to_bits));
        assert_eq!(first.size.to_array().map(f32::to_bits), second.size.to_array().map(f32::to_bits));
    }

    #[test]
    fn alignment_offsets() {
        let container = Rect::new(0., 0., 100., 50.);
        let content = Rect::new(10., 10., 20., 10.);
        let moved = |alignment| content.position + align_within(alignment, container, content);
        assert_eq!(moved(Alignment::Center), Vec2::new(40., 20.));
        assert_eq!(moved(Alignment::Left), Vec2::new(0., 20.));
        assert_eq!(moved(Alignment::Right), Vec2::new(80., 20.));
        assert_eq!(moved(Alignment::Top), Vec2::new(40., 0.));
        assert_eq!(moved(Alignment::Bottom), Vec2::new(40., 40.));
    }
}
