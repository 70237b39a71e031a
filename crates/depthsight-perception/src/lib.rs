//! `depthsight-perception` – camera geometry.
//!
//! Turns raw depth samples into metric 3-D coordinates and lifts them out of
//! the sensor's frame of reference into the world frame.
//!
//! # Modules
//!
//! - [`model`] – [`CameraIntrinsics`][model::CameraIntrinsics] /
//!   [`CameraExtrinsics`][model::CameraExtrinsics] /
//!   [`CameraModel`][model::CameraModel]: the sensor's optical calibration and
//!   physical mounting, loaded once at startup and immutable thereafter.
//! - [`point`] – [`SensorPoint`][point::SensorPoint] and
//!   [`WorldPoint`][point::WorldPoint]: the two flavors of 3-D point. They are
//!   distinct types on purpose — a sensor-relative point cannot be handed to a
//!   consumer expecting world coordinates.
//! - [`projection`] – [`PointCloudProjector`][projection::PointCloudProjector]:
//!   pinhole back-projection of depth samples into sensor-relative meters.
//! - [`orientation`] – [`OrientationCompensator`][orientation::OrientationCompensator]:
//!   rotates sensor-relative points by the mounting angles and translates them
//!   to the world origin.

pub mod model;
pub mod orientation;
pub mod point;
pub mod projection;

pub use model::{CameraExtrinsics, CameraIntrinsics, CameraModel, DEFAULT_DEPTH_SCALE};
pub use orientation::OrientationCompensator;
pub use point::{SensorPoint, WorldPoint};
pub use projection::PointCloudProjector;
