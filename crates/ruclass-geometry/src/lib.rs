//! RuClass – frame geometry layer
//!
//! Builds the affine transform that maps a full camera frame onto the
//! classifier's fixed input crop: recentre, rotate by the sensor/screen
//! orientation difference, scale (stretch or aspect-preserving fill) and
//! move back into the destination frame. Callers cache the result per
//! resolution/rotation and invert it to project crop coordinates back
//! onto the frame for overlays.

use serde::{Deserialize, Serialize};

mod affine;
mod preview;

pub use affine::{Affine2D, RectF};
pub use preview::{choose_optimal_size, MINIMUM_PREVIEW_SIZE};

/// Display rotation reported by the host window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl ScreenRotation {
    pub fn degrees(self) -> i32 {
        match self {
            ScreenRotation::Rotation0 => 0,
            ScreenRotation::Rotation90 => 90,
            ScreenRotation::Rotation180 => 180,
            ScreenRotation::Rotation270 => 270,
        }
    }
}

/// Rotation to feed [`build_transform`]: sensor orientation minus screen
/// orientation. Not normalised, may be negative.
pub fn relative_rotation(sensor_degrees: i32, screen: ScreenRotation) -> i32 {
    sensor_degrees - screen.degrees()
}

/// Whether a rotation swaps the frame's axes (90°, 270°, -90°, ...).
pub fn is_transposed(rotation_degrees: i32) -> bool {
    (rotation_degrees.unsigned_abs() as u64 + 90) % 180 == 0
}

/// Transform from a `src_w`×`src_h` frame into a `dst_w`×`dst_h` frame.
///
/// * `rotation_degrees` – applied about the source centre; multiples of 90
///   are expected, anything else is accepted with a warning.
/// * `maintain_aspect` – scale uniformly by the larger of the two axis
///   factors so the destination is filled completely (edges of the source
///   may be cropped). Otherwise each axis is stretched independently.
///
/// All sizes must be positive.
pub fn build_transform(
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
    rotation_degrees: i32,
    maintain_aspect: bool,
) -> Affine2D {
    let mut matrix = Affine2D::IDENTITY;

    if rotation_degrees != 0 {
        if rotation_degrees % 90 != 0 {
            log::warn!("Rotation of {rotation_degrees} % 90 != 0");
        }

        // centre of the source at the origin
        matrix.post_translate(-(src_w as f32) / 2.0, -(src_h as f32) / 2.0);
        matrix.post_rotate(rotation_degrees as f32);
    }

    let transpose = is_transposed(rotation_degrees);
    let (in_w, in_h) = if transpose { (src_h, src_w) } else { (src_w, src_h) };

    if in_w != dst_w || in_h != dst_h {
        let scale_x = dst_w as f32 / in_w as f32;
        let scale_y = dst_h as f32 / in_h as f32;

        if maintain_aspect {
            let scale = scale_x.max(scale_y);
            matrix.post_scale(scale, scale);
        } else {
            matrix.post_scale(scale_x, scale_y);
        }
    }

    if rotation_degrees != 0 {
        matrix.post_translate(dst_w as f32 / 2.0, dst_h as f32 / 2.0);
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_maps(m: &Affine2D, from: (f32, f32), to: (f32, f32)) {
        let (x, y) = m.map_point(from.0, from.1);
        assert!(
            (x - to.0).abs() < 1e-3 && (y - to.1).abs() < 1e-3,
            "{from:?} mapped to ({x}, {y}), expected {to:?}"
        );
    }

    #[test]
    fn same_size_no_rotation_is_identity() {
        assert!(build_transform(640, 480, 640, 480, 0, true).is_identity());
    }

    #[test]
    fn half_scale() {
        let m = build_transform(100, 100, 50, 50, 0, false);
        assert_eq!(m, Affine2D::scale(0.5, 0.5));
    }

    #[test]
    fn quarter_turn_maps_corners() {
        let m = build_transform(100, 200, 200, 100, 90, false);
        // effective source is 200×100, no scaling needed
        assert_eq!(m.sx.abs() + m.sy.abs(), 0.0);
        assert_maps(&m, (0.0, 0.0), (200.0, 0.0));
        assert_maps(&m, (100.0, 0.0), (200.0, 100.0));
        assert_maps(&m, (100.0, 200.0), (0.0, 100.0));
        assert_maps(&m, (0.0, 200.0), (0.0, 0.0));
    }

    #[test]
    fn half_turn_keeps_axes() {
        let m = build_transform(40, 20, 40, 20, 180, false);
        assert_maps(&m, (0.0, 0.0), (40.0, 20.0));
        assert_maps(&m, (40.0, 20.0), (0.0, 0.0));
    }

    #[test]
    fn fill_uses_larger_factor() {
        let m = build_transform(640, 480, 224, 224, 0, true);
        assert_eq!(m.sx, m.sy);
        assert_eq!(m.sx, 224.0 / 480.0);
        // fill: the crop is covered, width overflows
        assert!(640.0 * m.sx >= 224.0);
    }

    #[test]
    fn fill_after_transpose() {
        let m = build_transform(640, 480, 224, 224, 90, true);
        let r = m.map_rect(&RectF::from_size(640, 480));
        // rotated frame is 480 wide: width fits exactly, height overflows evenly
        assert!(r.left.abs() < 1e-3 && (r.right - 224.0).abs() < 1e-3);
        assert!((r.height() - 224.0 * 640.0 / 480.0).abs() < 1e-2);
        assert!((r.top + r.bottom - 224.0).abs() < 1e-2);
        assert!(r.contains_rect(&RectF::from_size(224, 224), 1e-3));
    }

    #[test]
    fn stretch_scales_axes_independently() {
        let m = build_transform(640, 480, 320, 120, 0, false);
        assert_eq!((m.sx, m.sy), (0.5, 0.25));
    }

    #[test]
    fn odd_rotation_is_accepted() {
        let m = build_transform(100, 100, 100, 100, 45, false);
        // centre stays fixed
        assert_maps(&m, (50.0, 50.0), (50.0, 50.0));
        assert!(m.invert().is_some());
    }

    #[test]
    fn negative_rotation_transposes() {
        assert!(is_transposed(-90));
        assert!(is_transposed(270));
        assert!(!is_transposed(-180));
        assert!(!is_transposed(0));
        assert!(!is_transposed(i32::MIN));
    }

    #[test]
    fn inverse_round_trips_points() {
        let m = build_transform(1280, 720, 224, 224, 270, true);
        let inv = m.invert().expect("invertible");
        for p in [(0.0, 0.0), (1279.0, 719.0), (640.0, 360.0), (3.5, 700.25)] {
            let (x, y) = m.map_point(p.0, p.1);
            let back = inv.map_point(x, y);
            assert!((back.0 - p.0).abs() < 1e-2 && (back.1 - p.1).abs() < 1e-2, "{p:?} -> {back:?}");
        }
    }

    #[test]
    fn relative_rotation_subtracts_screen() {
        assert_eq!(relative_rotation(90, ScreenRotation::Rotation0), 90);
        assert_eq!(relative_rotation(90, ScreenRotation::Rotation270), -180);
        assert_eq!(ScreenRotation::default().degrees(), 0);
    }

    #[test]
    fn transform_serializes() {
        let m = build_transform(100, 100, 50, 50, 0, false);
        let json = serde_json::to_string(&m).unwrap();
        let back: Affine2D = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
