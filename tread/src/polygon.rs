//! Regular polygons on the unit circle, used as stand-ins for round shapes.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_4, TAU};

use crate::defs::DEFAULT_SHAPE_NUM_VERTICES;

/// Angle of the first vertex.
pub const START_ANGLE: f32 = FRAC_PI_4;

/// Returns `vertex_count`, or the default count with a warning if it cannot
/// describe a polygon.
pub fn checked_vertex_count(vertex_count: u32) -> u32 {
    if vertex_count < 3 {
        log::warn!("Could not create shape with vertices: {vertex_count} < 3");
        DEFAULT_SHAPE_NUM_VERTICES
    } else {
        vertex_count
    }
}

/// Evenly spaced points on the unit circle, in increasing angle order starting
/// at [`START_ANGLE`]. The order is the winding order of the polygon.
pub fn generate(vertex_count: u32) -> Vec<Vec2> {
    let vertex_count = checked_vertex_count(vertex_count);
    let step = TAU / vertex_count as f32;
    (0..vertex_count)
        .map(|i| Vec2::from_angle(START_ANGLE + i as f32 * step))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use approx::assert_abs_diff_eq;
    use log::Level;

    fn angle_of(p: Vec2) -> f32 {
        p.y.atan2(p.x).rem_euclid(TAU)
    }

    #[test]
    fn points_lie_on_unit_circle() {
        for n in 3..=64 {
            let points = generate(n);
            assert_eq!(points.len(), n as usize);
            for p in &points {
                assert_abs_diff_eq!(p.length(), 1., epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn angles_increase_from_start() {
        for n in [3, 4, 6, 17] {
            let points = generate(n);
            let step = TAU / n as f32;
            assert_abs_diff_eq!(angle_of(points[0]), START_ANGLE, epsilon = 1e-5);
            for (i, p) in points.iter().enumerate() {
                let expected = START_ANGLE + i as f32 * step;
                assert_abs_diff_eq!(p.x, expected.cos(), epsilon = 1e-5);
                assert_abs_diff_eq!(p.y, expected.sin(), epsilon = 1e-5);
            }
            // Unwrapped angles are strictly increasing
            let mut previous = angle_of(points[0]);
            let mut turns = 0.;
            for p in &points[1..] {
                let mut angle = angle_of(*p) + turns;
                if angle < previous {
                    turns += TAU;
                    angle += TAU;
                }
                assert!(angle > previous);
                previous = angle;
            }
        }
    }

    #[test]
    fn square_corners() {
        let points = generate(4);
        let h = std::f32::consts::FRAC_1_SQRT_2;
        let expected = [
            Vec2::new(h, h),
            Vec2::new(-h, h),
            Vec2::new(-h, -h),
            Vec2::new(h, -h),
        ];
        for (p, e) in points.iter().zip(expected) {
            assert_abs_diff_eq!(p.x, e.x, epsilon = 1e-5);
            assert_abs_diff_eq!(p.y, e.y, epsilon = 1e-5);
        }
    }

    #[test]
    fn too_few_vertices_fall_back_to_triangle() {
        let (triangle, records) = capture_logs(|| generate(3));
        assert!(records.is_empty());
        for n in 0..3 {
            let (points, records) = capture_logs(|| generate(n));
            assert_eq!(points, triangle);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].0, Level::Warn);
        }
    }
}
