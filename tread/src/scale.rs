use glam::Vec2;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScaleError {
    #[error("cannot scale shape with raw bounds {width}x{height} to a target size")]
    DegenerateBounds { width: f32, height: f32 },
}

/// Per-axis scale that maps a shape with unscaled bounds `raw` onto `size`,
/// multiplied by the uniform `factor`. The factor is not clamped.
pub fn normalized_scale(raw: Vec2, size: Vec2, factor: f32) -> Result<Vec2, ScaleError> {
    if !is_usable_extent(raw.x) || !is_usable_extent(raw.y) {
        return Err(ScaleError::DegenerateBounds {
            width: raw.x,
            height: raw.y,
        });
    }
    Ok(Vec2::new(
        (size.x / raw.x) * factor,
        (size.y / raw.y) * factor,
    ))
}

fn is_usable_extent(extent: f32) -> bool {
    extent != 0. && extent.is_finite()
}
