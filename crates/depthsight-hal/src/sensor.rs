//! Generic depth-sensor trait and supporting types.

use depthsight_types::{ColorFrame, DepthFrame, SightError};

/// One acquisition result: a depth image and the color image registered to
/// it. Registration (undistortion + depth/color alignment) happens inside the
/// driver; the pipeline receives the two images already co-located.
///
/// Dropping a `FramePair` releases the underlying buffers.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub depth: DepthFrame,
    pub color: ColorFrame,
}

/// A depth camera or other range-imaging device.
///
/// Acquisition is blocking and synchronous: `wait_for_frame` suspends until
/// the device produces the next frame pair. It is the only blocking point in
/// a pipeline iteration.
pub trait DepthSensor: Send {
    /// Stable identifier for this device, e.g. `"kinect2_front"`.
    fn id(&self) -> &str;

    /// Block until the next depth/color frame pair is available.
    ///
    /// # Errors
    ///
    /// Returns [`SightError::HardwareFault`] if the device fails to deliver a
    /// frame (e.g. USB transfer stall, device disconnected).
    fn wait_for_frame(&mut self) -> Result<FramePair, SightError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockSensor {
        id: String,
    }

    impl DepthSensor for MockSensor {
        fn id(&self) -> &str {
            &self.id
        }

        fn wait_for_frame(&mut self) -> Result<FramePair, SightError> {
            Ok(FramePair {
                depth: DepthFrame::new(4, 4),
                color: ColorFrame::new(4, 4),
            })
        }
    }

    #[test]
    fn mock_sensor_delivers_matching_frames() {
        let mut sensor = MockSensor {
            id: "front_depth".to_string(),
        };
        assert_eq!(sensor.id(), "front_depth");
        let pair = sensor.wait_for_frame().unwrap();
        assert_eq!(pair.depth.width(), pair.color.width());
        assert_eq!(pair.depth.height(), pair.color.height());
    }
}
