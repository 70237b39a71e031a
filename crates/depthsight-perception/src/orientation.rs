//! Mounting-orientation compensation.
//!
//! Rotates sensor-relative points about the sensor's optical center by the
//! mounting angles, then translates by the mounting offset. The rotation runs
//! before the translation: translating first would spin the cloud around the
//! wrong origin.
//!
//! Each rotation is planar: the point's two in-plane components are converted
//! to polar form, the angle is advanced by the mounting angle modulo 360°,
//! and the components are converted back. Rotation order is fixed — roll
//! (y–z, when enabled), then elevation (x–z), then azimuth (x–y).

use crate::model::CameraExtrinsics;
use crate::point::{SensorPoint, WorldPoint};

/// Lifts sensor-relative points into world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct OrientationCompensator {
    extrinsics: CameraExtrinsics,
}

/// Rotate the in-plane components `(a, b)` by `deg` degrees.
fn rotate_plane(a: f64, b: f64, deg: f64) -> (f64, f64) {
    let radius = (a * a + b * b).sqrt();
    let current = b.atan2(a).to_degrees().rem_euclid(360.0);
    let new = (current + deg).rem_euclid(360.0).to_radians();
    (radius * new.cos(), radius * new.sin())
}

impl OrientationCompensator {
    pub fn new(extrinsics: CameraExtrinsics) -> Self {
        Self { extrinsics }
    }

    /// Transform one point into world coordinates.
    #[inline]
    pub fn compensate_one(&self, p: SensorPoint) -> WorldPoint {
        let (mut x, mut y, mut z) = (p.x, p.y, p.z);
        if self.extrinsics.enable_roll {
            (y, z) = rotate_plane(y, z, self.extrinsics.roll);
        }
        (x, z) = rotate_plane(x, z, self.extrinsics.elevation);
        (x, y) = rotate_plane(x, y, self.extrinsics.azimuth);
        WorldPoint::new(
            x + self.extrinsics.x,
            y + self.extrinsics.y,
            z + self.extrinsics.z,
        )
    }

    /// Transform a batch of points. Order is preserved.
    pub fn compensate(&self, points: &[SensorPoint]) -> Vec<WorldPoint> {
        points.iter().map(|&p| self.compensate_one(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_at_origin() -> CameraExtrinsics {
        CameraExtrinsics::at_origin()
    }

    #[test]
    fn zero_angles_zero_offset_is_identity() {
        let comp = OrientationCompensator::new(level_at_origin());
        let points = [
            SensorPoint::new(1.0, -2.0, 3.0),
            SensorPoint::new(0.0, 0.0, 0.0),
            SensorPoint::new(-0.5, 0.25, 4.5),
        ];
        for (src, dst) in points.iter().zip(comp.compensate(&points)) {
            assert!((dst.x - src.x).abs() < 1e-12);
            assert!((dst.y - src.y).abs() < 1e-12);
            assert!((dst.z - src.z).abs() < 1e-12);
        }
    }

    #[test]
    fn elevation_then_azimuth_matches_hand_computed_point() {
        // elevation 10°, azimuth 20° applied to (1, 0, 0):
        //   elevation (x–z): (1, 0)  -> (cos10°, sin10°)
        //   azimuth   (x–y): (cos10°, 0) -> (cos10°·cos20°, cos10°·sin20°)
        let mut e = level_at_origin();
        e.elevation = 10.0;
        e.azimuth = 20.0;
        let comp = OrientationCompensator::new(e);

        let p = comp.compensate_one(SensorPoint::new(1.0, 0.0, 0.0));
        assert!((p.x - 0.925416578398323).abs() < 1e-9, "x={}", p.x);
        assert!((p.y - 0.336824088833465).abs() < 1e-9, "y={}", p.y);
        assert!((p.z - 0.173648177666930).abs() < 1e-9, "z={}", p.z);
    }

    #[test]
    fn rotation_order_is_not_commutative() {
        // Applying azimuth before elevation would give
        // (cos20°·cos10°, sin20°, cos20°·sin10°); assert the pipeline does
        // not produce that point.
        let mut e = level_at_origin();
        e.elevation = 10.0;
        e.azimuth = 20.0;
        let comp = OrientationCompensator::new(e);

        let p = comp.compensate_one(SensorPoint::new(1.0, 0.0, 0.0));
        let reversed_y = 0.342020143325669;
        let reversed_z = 0.163175911166535;
        assert!((p.y - reversed_y).abs() > 1e-6);
        assert!((p.z - reversed_z).abs() > 1e-6);
    }

    #[test]
    fn roll_is_ignored_unless_enabled() {
        let mut e = level_at_origin();
        e.roll = 90.0;
        let comp = OrientationCompensator::new(e);

        let p = comp.compensate_one(SensorPoint::new(0.0, 1.0, 0.0));
        assert!((p.y - 1.0).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn enabled_roll_rotates_the_yz_plane() {
        let mut e = level_at_origin();
        e.roll = 90.0;
        e.enable_roll = true;
        let comp = OrientationCompensator::new(e);

        // 90° roll carries +y into +z.
        let p = comp.compensate_one(SensorPoint::new(0.0, 1.0, 0.0));
        assert!(p.y.abs() < 1e-9, "y={}", p.y);
        assert!((p.z - 1.0).abs() < 1e-9, "z={}", p.z);
    }

    #[test]
    fn translation_happens_after_rotation() {
        // With a 90° azimuth, (1, 0, 0) rotates to (0, 1, 0) about the
        // sensor's own center and only then moves by the mounting offset.
        let mut e = level_at_origin();
        e.azimuth = 90.0;
        e.x = 1.0;
        e.y = 1.0;
        let comp = OrientationCompensator::new(e);

        let p = comp.compensate_one(SensorPoint::new(1.0, 0.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-9, "x={}", p.x);
        assert!((p.y - 2.0).abs() < 1e-9, "y={}", p.y);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn offset_only_mounting_translates_points() {
        let e = CameraExtrinsics::default();
        let comp = OrientationCompensator::new(e);

        let p = comp.compensate_one(SensorPoint::new(0.5, 0.0, 2.0));
        assert!((p.x - (-2.5)).abs() < 1e-12);
        assert!((p.y - 0.0).abs() < 1e-12);
        assert!((p.z - 3.7).abs() < 1e-12);
    }

    #[test]
    fn points_on_the_rotation_axis_are_fixed() {
        let mut e = level_at_origin();
        e.azimuth = 45.0;
        let comp = OrientationCompensator::new(e);

        // (0, 0, z) has zero radius in the x–y plane.
        let p = comp.compensate_one(SensorPoint::new(0.0, 0.0, 1.5));
        assert!(p.x.abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((p.z - 1.5).abs() < 1e-12);
    }
}
