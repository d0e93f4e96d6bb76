use glam::{UVec2, Vec2};
use glyph_brush::FontId;
use palette::LinSrgba;
use std::{
    num::TryFromIntError,
    ops::{BitOr, BitOrAssign},
};

use crate::{defs, polygon, render::RenderTarget, Rect, Transform};

/// Handle to an image owned by the render backend. Widgets only carry it around.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Texture {
    key: u32,
    size: UVec2,
}

impl Texture {
    pub fn new(key: u32, size: UVec2) -> Self {
        Texture { key, size }
    }
    pub fn key(&self) -> u32 {
        self.key
    }
    pub fn size(&self) -> UVec2 {
        self.size
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec2,
    pub uv: Vec2,
    pub color: [f32; 4],
}

/// Indexed triangle list in screen coordinates.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Mesh {
    pub texture: Option<Texture>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Axis aligned quad, used for underlines and other decorations.
    pub fn quad(rect: Rect, color: LinSrgba) -> Mesh {
        let color = color.into();
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        Mesh {
            texture: None,
            vertices: rect
                .corners()
                .into_iter()
                .zip(uvs)
                .map(|(position, uv)| Vertex {
                    position,
                    uv,
                    color,
                })
                .collect(),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }
}

/// Convex outline made of points, drawn filled (optionally textured) with an
/// optional border.
#[derive(Clone, Debug)]
pub struct Shape {
    points: Vec<Vec2>,
    pub transform: Transform,
    pub fill_color: LinSrgba,
    pub outline_color: LinSrgba,
    /// Positive values grow the border outwards, negative values inwards.
    pub outline_thickness: f32,
    pub texture: Option<Texture>,
}

impl Shape {
    pub fn polygon(points: Vec<Vec2>) -> Self {
        Shape {
            points,
            transform: Transform::default(),
            fill_color: defs::WHITE,
            outline_color: defs::WHITE,
            outline_thickness: 0.,
            texture: None,
        }
    }
    pub fn rectangle(size: Vec2) -> Self {
        Self::polygon(rectangle_points(size))
    }
    /// Circle approximated with `point_count` points, starting at the top.
    /// Its local bounds are `(0, 0, 2 * radius, 2 * radius)`.
    pub fn circle(radius: f32, point_count: u32) -> Self {
        let point_count = polygon::checked_vertex_count(point_count);
        let step = std::f32::consts::TAU / point_count as f32;
        let points = (0..point_count)
            .map(|i| {
                let angle = i as f32 * step - std::f32::consts::FRAC_PI_2;
                Vec2::new(radius + angle.cos() * radius, radius + angle.sin() * radius)
            })
            .collect();
        Self::polygon(points)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
    pub fn set_points(&mut self, points: Vec<Vec2>) {
        self.points = points;
    }

    /// Bounds of the points alone, ignoring the border.
    pub fn inside_bounds(&self) -> Rect {
        Rect::from_points(self.points.iter().copied())
    }
    /// Untransformed bounds, border included.
    pub fn local_bounds(&self) -> Rect {
        if self.outline_thickness == 0. {
            self.inside_bounds()
        } else {
            Rect::from_points(self.points.iter().copied().chain(self.outline_points()))
        }
    }
    pub fn global_bounds(&self) -> Rect {
        self.transform.apply_rect(self.local_bounds())
    }

    /// Outer edge of the border, one point per shape point.
    pub fn outline_points(&self) -> Vec<Vec2> {
        let count = self.points.len();
        if count < 3 {
            return Vec::new();
        }
        let center = self.inside_bounds().center();
        (0..count)
            .map(|i| {
                let p0 = self.points[(i + count - 1) % count];
                let p1 = self.points[i];
                let p2 = self.points[(i + 1) % count];

                let mut n1 = edge_normal(p0, p1);
                let mut n2 = edge_normal(p1, p2);
                // Normals must face away from the shape's center
                if n1.dot(center - p1) > 0. {
                    n1 = -n1;
                }
                if n2.dot(center - p1) > 0. {
                    n2 = -n2;
                }
                let factor = 1. + n1.dot(n2);
                let normal = if factor.abs() > f32::EPSILON {
                    (n1 + n2) / factor
                } else {
                    n1
                };
                p1 + normal * self.outline_thickness
            })
            .collect()
    }

    /// Filled interior as a triangle fan, transformed to screen coordinates.
    /// Texture coordinates stretch the whole texture over the inside bounds.
    /// Shapes with too many points for `u16` indices give an empty mesh.
    pub fn fill_mesh(&self) -> Mesh {
        let Ok(indices) = fan_indices(self.points.len()) else {
            log::error!(
                "Shape with {} points cannot be filled, the limit is {}",
                self.points.len(),
                MAX_FILL_POINTS
            );
            return Mesh::default();
        };
        let matrix = self.transform.matrix();
        let bounds = self.inside_bounds();
        let color = self.fill_color.into();
        let vertices = self
            .points
            .iter()
            .map(|&p| Vertex {
                position: matrix.transform_point2(p),
                uv: uv_in(bounds, p),
                color,
            })
            .collect();
        Mesh {
            texture: self.texture,
            vertices,
            indices,
        }
    }

    /// Border as a closed strip between the points and [`Shape::outline_points`].
    pub fn outline_mesh(&self) -> Option<Mesh> {
        if self.outline_thickness == 0. || self.points.len() < 3 {
            return None;
        }
        let Ok(indices) = strip_indices(self.points.len()) else {
            log::error!(
                "Shape with {} points cannot have a border, the limit is {}",
                self.points.len(),
                MAX_OUTLINE_POINTS
            );
            return None;
        };
        let matrix = self.transform.matrix();
        let color = self.outline_color.into();
        let outer = self.outline_points();
        let mut vertices = Vec::with_capacity(self.points.len() * 2);
        for (&inner, &outer) in self.points.iter().zip(outer.iter()) {
            for position in [inner, outer] {
                vertices.push(Vertex {
                    position: matrix.transform_point2(position),
                    uv: Vec2::ZERO,
                    color,
                });
            }
        }
        Some(Mesh {
            texture: None,
            vertices,
            indices,
        })
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        let fill = self.fill_mesh();
        if !fill.is_empty() {
            target.draw_mesh(&fill);
        }
        if let Some(outline) = self.outline_mesh() {
            target.draw_mesh(&outline);
        }
    }
}

/// Most points a filled shape can have.
pub const MAX_FILL_POINTS: usize = u16::MAX as usize + 1;
/// Most points a shape with a border can have; the border doubles the vertices.
pub const MAX_OUTLINE_POINTS: usize = MAX_FILL_POINTS / 2;

fn fan_indices(count: usize) -> Result<Vec<u16>, TryFromIntError> {
    (1..count.saturating_sub(1))
        .flat_map(|i| [0, i, i + 1])
        .map(u16::try_from)
        .collect()
}

fn strip_indices(count: usize) -> Result<Vec<u16>, TryFromIntError> {
    (0..count)
        .flat_map(|i| {
            let inner = i * 2;
            let next = ((i + 1) % count) * 2;
            [inner, inner + 1, next, next, inner + 1, next + 1]
        })
        .map(u16::try_from)
        .collect()
}

/// Corners of a rect of `size` at the origin, clockwise on screen.
pub fn rectangle_points(size: Vec2) -> Vec<Vec2> {
    vec![
        Vec2::ZERO,
        Vec2::new(size.x, 0.),
        size,
        Vec2::new(0., size.y),
    ]
}

fn edge_normal(p1: Vec2, p2: Vec2) -> Vec2 {
    Vec2::new(p1.y - p2.y, p2.x - p1.x).normalize_or_zero()
}

fn uv_in(bounds: Rect, p: Vec2) -> Vec2 {
    let offset = p - bounds.position;
    Vec2::new(
        if bounds.width() > 0. {
            offset.x / bounds.width()
        } else {
            0.
        },
        if bounds.height() > 0. {
            offset.y / bounds.height()
        } else {
            0.
        },
    )
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct TextStyle(u8);

impl TextStyle {
    pub const REGULAR: TextStyle = TextStyle(0);
    pub const BOLD: TextStyle = TextStyle(1 << 0);
    pub const ITALIC: TextStyle = TextStyle(1 << 1);
    pub const UNDERLINED: TextStyle = TextStyle(1 << 2);
    pub const STRIKE_THROUGH: TextStyle = TextStyle(1 << 3);

    pub fn contains(self, other: TextStyle) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TextStyle {
    type Output = TextStyle;
    fn bitor(self, rhs: TextStyle) -> TextStyle {
        TextStyle(self.0 | rhs.0)
    }
}
impl BitOrAssign for TextStyle {
    fn bitor_assign(&mut self, rhs: TextStyle) {
        self.0 |= rhs.0;
    }
}

/// A run of text. Glyph metrics belong to the font, which only the render
/// target can see, so bounds are measured through [`RenderTarget::text_bounds`].
#[derive(Clone, Debug)]
pub struct Text {
    pub string: String,
    pub font: FontId,
    /// Pixel height of the glyphs before scaling.
    pub character_size: u32,
    pub style: TextStyle,
    pub fill_color: LinSrgba,
    pub outline_color: LinSrgba,
    pub outline_thickness: f32,
    /// Rotation is not applied to text.
    pub transform: Transform,
}

impl Default for Text {
    fn default() -> Self {
        Text {
            string: String::new(),
            font: Default::default(),
            character_size: defs::DEFAULT_CHARACTER_SIZE,
            style: TextStyle::REGULAR,
            fill_color: defs::DEFAULT_TEXT_COLOR,
            outline_color: defs::DEFAULT_TEXT_COLOR,
            outline_thickness: 0.,
            transform: Transform::default(),
        }
    }
}

impl Text {
    pub fn new(string: &str) -> Self {
        Text {
            string: string.to_owned(),
            ..Default::default()
        }
    }

    pub fn global_bounds(&self, target: &mut dyn RenderTarget) -> Rect {
        self.transform.apply_rect(target.text_bounds(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, RecordingTarget};
    use approx::assert_abs_diff_eq;
    use log::Level;

    #[test]
    fn rectangle_fill_is_two_triangles() {
        let mut shape = Shape::rectangle(Vec2::new(4., 2.));
        shape.transform.position = Vec2::new(10., 10.);
        let mesh = shape.fill_mesh();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.bounds(), Rect::new(10., 10., 4., 2.));
        assert_eq!(mesh.vertices[2].uv, Vec2::ONE);
        assert!(shape.outline_mesh().is_none());
    }

    #[test]
    fn outline_extends_local_bounds() {
        let mut shape = Shape::rectangle(Vec2::new(10., 10.));
        shape.outline_thickness = 2.;
        let bounds = shape.local_bounds();
        assert_abs_diff_eq!(bounds.x(), -2., epsilon = 1e-5);
        assert_abs_diff_eq!(bounds.y(), -2., epsilon = 1e-5);
        assert_abs_diff_eq!(bounds.width(), 14., epsilon = 1e-5);
        assert_abs_diff_eq!(bounds.height(), 14., epsilon = 1e-5);
        assert_eq!(shape.inside_bounds(), Rect::new(0., 0., 10., 10.));

        let outline = shape.outline_mesh().unwrap();
        assert_eq!(outline.vertices.len(), 8);
        assert_eq!(outline.triangle_count(), 8);
    }

    #[test]
    fn inward_outline_keeps_bounds() {
        let mut shape = Shape::rectangle(Vec2::new(10., 10.));
        shape.outline_thickness = -2.;
        assert_eq!(shape.local_bounds(), Rect::new(0., 0., 10., 10.));
    }

    #[test]
    fn circle_points_start_at_top() {
        let shape = Shape::circle(5., 4);
        let points = shape.points();
        assert_eq!(points.len(), 4);
        assert_abs_diff_eq!(points[0].x, 5., epsilon = 1e-5);
        assert_abs_diff_eq!(points[0].y, 0., epsilon = 1e-5);
        assert_abs_diff_eq!(points[1].x, 10., epsilon = 1e-5);
        assert_abs_diff_eq!(points[1].y, 5., epsilon = 1e-5);
        let bounds = shape.local_bounds();
        assert_abs_diff_eq!(bounds.width(), 10., epsilon = 1e-5);
        assert_abs_diff_eq!(bounds.height(), 10., epsilon = 1e-5);
    }

    #[test]
    fn index_limits() {
        assert_eq!(fan_indices(MAX_FILL_POINTS).unwrap().last(), Some(&u16::MAX));
        assert!(fan_indices(MAX_FILL_POINTS + 1).is_err());
        assert_eq!(strip_indices(MAX_OUTLINE_POINTS).unwrap().iter().max(), Some(&u16::MAX));
        assert!(strip_indices(MAX_OUTLINE_POINTS + 1).is_err());
    }

    #[test]
    fn oversized_shape_is_skipped_with_error() {
        let mut shape = Shape::circle(10., 70_000);
        shape.outline_thickness = 1.;
        let mut target = RecordingTarget::default();
        let ((), records) = capture_logs(|| shape.draw(&mut target));
        assert!(target.meshes.is_empty());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(level, _)| *level == Level::Error));

        let mut shape = Shape::circle(10., 40_000);
        shape.outline_thickness = 1.;
        let ((), records) = capture_logs(|| shape.draw(&mut target));
        assert_eq!(target.meshes.len(), 1);
        assert_eq!(target.meshes[0].vertices.len(), 40_000);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn text_style_flags() {
        let style = TextStyle::BOLD | TextStyle::UNDERLINED;
        assert!(style.contains(TextStyle::BOLD));
        assert!(style.contains(TextStyle::UNDERLINED));
        assert!(!style.contains(TextStyle::ITALIC));
        assert!(style.contains(TextStyle::REGULAR));
    }
}
