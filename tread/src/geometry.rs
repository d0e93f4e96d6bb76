use glam::{Affine2, Vec2};

#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        position: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }
    pub fn from_size(size: Vec2) -> Self {
        Rect {
            position: Vec2::ZERO,
            size,
        }
    }
    /// Smallest rect containing every point. Empty input gives [`Rect::ZERO`].
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Rect {
            position: min,
            size: max - min,
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }
    pub fn y(&self) -> f32 {
        self.position.y
    }
    pub fn width(&self) -> f32 {
        self.size.x
    }
    pub fn height(&self) -> f32 {
        self.size.y
    }
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }
    pub fn center(&self) -> Vec2 {
        self.position + (self.size / 2.)
    }
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [
            self.position,
            Vec2::new(max.x, self.position.y),
            max,
            Vec2::new(self.position.x, max.y),
        ]
    }

    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= self.position.x
            && position.x < self.position.x + self.size.x
            && position.y >= self.position.y
            && position.y < self.position.y + self.size.y
    }

    /// Grows the rect outwards by each margin.
    pub fn expand(mut self, margins: Margins) -> Rect {
        self.position.x -= margins.left;
        self.position.y -= margins.top;
        self.size.x += margins.horizontal();
        self.size.y += margins.vertical();
        self
    }

    /// Axis aligned bounds of the rect after `matrix` is applied.
    pub fn transformed(&self, matrix: &Affine2) -> Rect {
        Rect::from_points(self.corners().map(|p| matrix.transform_point2(p)))
    }
}

/// Space kept between content and the box drawn around it.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub const ZERO: Margins = Margins {
        top: 0.,
        bottom: 0.,
        left: 0.,
        right: 0.,
    };

    pub fn new(top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Margins {
            top,
            bottom,
            left,
            right,
        }
    }
    pub fn splat(v: f32) -> Self {
        Margins::new(v, v, v, v)
    }

    /// Builds margins only if every side is non-negative. Each rejected side is
    /// reported with a warning, and nothing is returned if any side was rejected.
    pub fn checked(top: f32, bottom: f32, left: f32, right: f32) -> Option<Self> {
        let mut ok = true;
        for (side, value) in [
            ("top", top),
            ("bottom", bottom),
            ("left", left),
            ("right", right),
        ] {
            if !(value >= 0.) {
                log::warn!("Unable to set a negative {side} margin: {value}");
                ok = false;
            }
        }
        ok.then(|| Margins::new(top, bottom, left, right))
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Placement of a shape or text: `position` is where `origin` (in local
/// coordinates) ends up after scaling and rotating around it.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Transform {
    pub position: Vec2,
    pub origin: Vec2,
    pub scale: Vec2,
    /// Radians, clockwise on screen (y points down).
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
            * Affine2::from_translation(-self.origin)
    }
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.matrix().transform_point2(point)
    }
    pub fn apply_rect(&self, rect: Rect) -> Rect {
        rect.transformed(&self.matrix())
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
    pub fn scale_by(&mut self, factor: Vec2) {
        self.scale *= factor;
    }
    pub fn rotate(&mut self, angle: f32) {
        self.rotation += angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use approx::assert_abs_diff_eq;
    use log::Level;

    #[test]
    fn bounds_of_points() {
        let rect = Rect::from_points([
            Vec2::new(3., -1.),
            Vec2::new(-2., 4.),
            Vec2::new(0., 0.),
        ]);
        assert_eq!(rect, Rect::new(-2., -1., 5., 5.));
        assert_eq!(Rect::from_points(Vec::<Vec2>::new()), Rect::ZERO);
    }

    #[test]
    fn expand_by_margins() {
        let rect = Rect::new(10., 20., 100., 20.).expand(Margins::new(2., 3., 4., 5.));
        assert_eq!(rect, Rect::new(6., 18., 109., 25.));
    }

    #[test]
    fn negative_margin_rejects_all_sides() {
        let (margins, records) = capture_logs(|| Margins::checked(-1., 2., 3., -4.));
        assert_eq!(margins, None);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(level, _)| *level == Level::Warn));
        assert!(records[0].1.contains("top"));
        assert!(records[1].1.contains("right"));

        let (margins, records) = capture_logs(|| Margins::checked(0., 2., 3., 4.));
        assert_eq!(margins, Some(Margins::new(0., 2., 3., 4.)));
        assert!(records.is_empty());
    }

    #[test]
    fn transform_applies_origin_scale_then_position() {
        let transform = Transform {
            position: Vec2::new(100., 50.),
            origin: Vec2::new(1., 1.),
            scale: Vec2::new(2., 3.),
            rotation: 0.,
        };
        assert_eq!(transform.apply(Vec2::new(1., 1.)), Vec2::new(100., 50.));
        assert_eq!(transform.apply(Vec2::new(2., 2.)), Vec2::new(102., 53.));
        assert_eq!(
            transform.apply_rect(Rect::new(0., 0., 2., 2.)),
            Rect::new(98., 47., 4., 6.)
        );
    }

    #[test]
    fn rotated_rect_bounds() {
        let transform = Transform {
            rotation: std::f32::consts::FRAC_PI_2,
            ..Default::default()
        };
        let rect = transform.apply_rect(Rect::new(0., 0., 4., 2.));
        assert_abs_diff_eq!(rect.x(), -2., epsilon = 1e-5);
        assert_abs_diff_eq!(rect.y(), 0., epsilon = 1e-5);
        assert_abs_diff_eq!(rect.width(), 2., epsilon = 1e-5);
        assert_abs_diff_eq!(rect.height(), 4., epsilon = 1e-5);
    }
}
