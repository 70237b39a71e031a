//! Sensor calibration and mounting parameters.
//!
//! Both structs are plain data, loaded once from configuration at startup and
//! passed by reference into every pipeline call.

use depthsight_types::SightError;
use serde::{Deserialize, Serialize};

/// Unit scale dividing native depth samples into meters. The reference sensor
/// reports millimeters, so 1000.
pub const DEFAULT_DEPTH_SCALE: f64 = 1000.0;

/// Optical calibration of the depth camera.
///
/// Focal lengths and the principal point are in pixels; `k1..k3` are radial
/// and `p1`/`p2` tangential lens-distortion coefficients. Values come from
/// the sensor's factory calibration and are never computed here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Principal point x (pixel)
    pub cx: f64,
    /// Principal point y (pixel)
    pub cy: f64,
    /// Focal length x (pixel)
    pub fx: f64,
    /// Focal length y (pixel)
    pub fy: f64,
    /// Radial distortion coefficient, 1st-order
    pub k1: f64,
    /// Radial distortion coefficient, 2nd-order
    pub k2: f64,
    /// Radial distortion coefficient, 3rd-order
    pub k3: f64,
    /// Tangential distortion coefficient
    pub p1: f64,
    /// Tangential distortion coefficient
    pub p2: f64,
}

impl CameraIntrinsics {
    /// Build intrinsics with zero distortion.
    ///
    /// # Errors
    ///
    /// Returns [`SightError::Config`] when either focal length is not
    /// strictly positive.
    pub fn new(cx: f64, cy: f64, fx: f64, fy: f64) -> Result<Self, SightError> {
        let intrinsics = Self {
            cx,
            cy,
            fx,
            fy,
            k1: 0.0,
            k2: 0.0,
            k3: 0.0,
            p1: 0.0,
            p2: 0.0,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Attach lens-distortion coefficients.
    pub fn with_distortion(mut self, k1: f64, k2: f64, k3: f64, p1: f64, p2: f64) -> Self {
        self.k1 = k1;
        self.k2 = k2;
        self.k3 = k3;
        self.p1 = p1;
        self.p2 = p2;
        self
    }

    /// Factory calibration of the Kinect v2 IR camera.
    pub fn kinect_v2() -> Self {
        Self {
            cx: 254.878,
            cy: 205.395,
            fx: 365.456,
            fy: 365.456,
            k1: 0.0905474,
            k2: -0.26819,
            k3: 0.0950862,
            p1: 0.0,
            p2: 0.0,
        }
    }

    /// Check the focal-length invariant. Deserialized values bypass
    /// [`CameraIntrinsics::new`], so configuration loading calls this.
    ///
    /// # Errors
    ///
    /// Returns [`SightError::Config`] when `fx` or `fy` is not strictly
    /// positive.
    pub fn validate(&self) -> Result<(), SightError> {
        if self.fx <= 0.0 || self.fy <= 0.0 {
            return Err(SightError::Config(format!(
                "focal lengths must be positive, got fx={} fy={}",
                self.fx, self.fy
            )));
        }
        Ok(())
    }
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self::kinect_v2()
    }
}

/// Physical mounting of the sensor relative to the world reference point:
/// position in meters, orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraExtrinsics {
    /// Lateral offset in meters.
    pub x: f64,
    /// Forward offset in meters.
    pub y: f64,
    /// Mounting height in meters.
    pub z: f64,
    /// Roll in degrees. Only applied when `enable_roll` is set.
    pub roll: f64,
    /// Yaw in degrees.
    pub azimuth: f64,
    /// Pitch in degrees.
    pub elevation: f64,
    /// Tripod-style mounts do not roll, so the roll rotation is off unless an
    /// inertial unit supplies a live angle.
    #[serde(default)]
    pub enable_roll: bool,
}

impl CameraExtrinsics {
    /// A sensor mounted exactly at the world reference point, level.
    pub fn at_origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            roll: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            enable_roll: false,
        }
    }
}

impl Default for CameraExtrinsics {
    /// The reference rig's mounting: 3 m left of the viewport center,
    /// 1.7 m off the floor, level.
    fn default() -> Self {
        Self {
            x: -3.0,
            y: 0.0,
            z: 1.7,
            roll: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            enable_roll: false,
        }
    }
}

/// Complete camera description: calibration + mounting + depth unit scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub intrinsics: CameraIntrinsics,
    pub extrinsics: CameraExtrinsics,
    /// Divides native depth samples into meters.
    pub depth_scale: f64,
}

impl CameraModel {
    pub fn new(intrinsics: CameraIntrinsics, extrinsics: CameraExtrinsics) -> Self {
        Self {
            intrinsics,
            extrinsics,
            depth_scale: DEFAULT_DEPTH_SCALE,
        }
    }

    pub fn with_depth_scale(mut self, scale: f64) -> Self {
        self.depth_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_non_positive_focal_length() {
        assert!(CameraIntrinsics::new(250.0, 200.0, 0.0, 365.0).is_err());
        assert!(CameraIntrinsics::new(250.0, 200.0, 365.0, -1.0).is_err());
        assert!(CameraIntrinsics::new(250.0, 200.0, 365.0, 365.0).is_ok());
    }

    #[test]
    fn kinect_v2_factory_values() {
        let k = CameraIntrinsics::kinect_v2();
        assert!((k.fx - 365.456).abs() < 1e-9);
        assert!((k.cx - 254.878).abs() < 1e-9);
        assert!(k.validate().is_ok());
    }

    #[test]
    fn with_distortion_keeps_pinhole_parameters() {
        let k = CameraIntrinsics::new(250.0, 200.0, 365.0, 365.0)
            .unwrap()
            .with_distortion(0.09, -0.26, 0.09, 0.0, 0.0);
        assert!((k.fx - 365.0).abs() < 1e-9);
        assert!((k.k2 + 0.26).abs() < 1e-9);
    }

    #[test]
    fn default_extrinsics_do_not_roll() {
        let e = CameraExtrinsics::default();
        assert!(!e.enable_roll);
        assert!((e.z - 1.7).abs() < 1e-9);
    }

    #[test]
    fn model_carries_default_scale() {
        let m = CameraModel::new(CameraIntrinsics::kinect_v2(), CameraExtrinsics::at_origin());
        assert!((m.depth_scale - 1000.0).abs() < 1e-9);
        let m = m.with_depth_scale(1.0);
        assert!((m.depth_scale - 1.0).abs() < 1e-9);
    }
}
