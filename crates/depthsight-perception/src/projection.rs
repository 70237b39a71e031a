//! Pinhole back-projection of depth samples.
//!
//! One scalar implementation, [`PointCloudProjector::project_one`], computes
//! the transform; the batch form is a row-major wrapper over it, so the two
//! code paths cannot drift apart.

use depthsight_types::DepthFrame;

use crate::model::CameraIntrinsics;
use crate::point::SensorPoint;

/// Converts `(pixel, depth)` samples into sensor-relative metric coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointCloudProjector {
    intrinsics: CameraIntrinsics,
    scale: f64,
}

impl PointCloudProjector {
    /// `scale` divides native depth units into meters (1000 for millimeter
    /// depth).
    pub fn new(intrinsics: CameraIntrinsics, scale: f64) -> Self {
        Self { intrinsics, scale }
    }

    /// Back-project a single depth sample at pixel `(px, py)`.
    ///
    /// A depth of 0 yields a degenerate point on the origin plane; filtering
    /// such samples is the caller's responsibility.
    #[inline]
    pub fn project_one(&self, px: f64, py: f64, depth: f64) -> SensorPoint {
        let x = (px - self.intrinsics.cx) * depth / self.intrinsics.fx / self.scale;
        let y = (py - self.intrinsics.cy) * depth / self.intrinsics.fy / self.scale;
        let z = depth / self.scale;
        SensorPoint::new(x, y, z)
    }

    /// Back-project an entire depth image, row-major: the point for pixel
    /// `(col, row)` lands at index `row * width + col`.
    pub fn project(&self, frame: &DepthFrame) -> Vec<SensorPoint> {
        let mut points = Vec::with_capacity(frame.width() * frame.height());
        for row in 0..frame.height() {
            for col in 0..frame.width() {
                points.push(self.project_one(col as f64, row as f64, frame.at(col, row) as f64));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CameraIntrinsics, DEFAULT_DEPTH_SCALE};

    fn projector() -> PointCloudProjector {
        PointCloudProjector::new(CameraIntrinsics::kinect_v2(), DEFAULT_DEPTH_SCALE)
    }

    #[test]
    fn batch_matches_scalar_for_single_sample() {
        let p = projector();
        let mut frame = DepthFrame::new(8, 6);
        frame.set(3, 2, 500.0);

        let cloud = p.project(&frame);
        assert_eq!(cloud.len(), 48);

        let scalar = p.project_one(3.0, 2.0, 500.0);
        let batch = cloud[2 * 8 + 3];
        assert!((batch.x - scalar.x).abs() < 1e-12);
        assert!((batch.y - scalar.y).abs() < 1e-12);
        assert!((batch.z - scalar.z).abs() < 1e-12);
    }

    #[test]
    fn projection_is_distance_linear() {
        let p = projector();
        let near = p.project_one(100.0, 50.0, 750.0);
        let far = p.project_one(100.0, 50.0, 1500.0);
        assert!((far.z - 2.0 * near.z).abs() < 1e-12);
        assert!((far.x - 2.0 * near.x).abs() < 1e-12);
        assert!((far.y - 2.0 * near.y).abs() < 1e-12);
    }

    #[test]
    fn zero_depth_degenerates_to_origin_plane() {
        let p = projector();
        let pt = p.project_one(400.0, 300.0, 0.0);
        assert_eq!(pt, SensorPoint::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn millimeter_depth_lands_in_meters() {
        let p = projector();
        let pt = p.project_one(254.878, 205.395, 2000.0);
        // On the optical axis: x = y = 0, z = 2 m.
        assert!(pt.x.abs() < 1e-12);
        assert!(pt.y.abs() < 1e-12);
        assert!((pt.z - 2.0).abs() < 1e-12);
    }
}
