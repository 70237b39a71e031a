//! `depthsight-hal` – hardware and image-processing seams.
//!
//! The pipeline never talks to a physical sensor or an image-processing
//! library directly; it goes through the traits defined here. Production
//! deployments plug in a real depth-camera driver and an OpenCV-backed
//! implementation; headless tests and CI use the bundled simulation.
//!
//! # Modules
//!
//! - [`sensor`] – [`DepthSensor`][sensor::DepthSensor]: blocking frame
//!   acquisition, one [`FramePair`][sensor::FramePair] per call.
//! - [`segment`] – [`Segmenter`][segment::Segmenter] and
//!   [`ImageOps`][segment::ImageOps]: region extraction and the raster
//!   primitives the extractor builds its candidate masks with.
//! - [`sim`] – [`SimDepthSensor`][sim::SimDepthSensor]: synthesizes frames
//!   from a configurable scene of disk-shaped obstacles.
//! - [`raster`] – [`RasterOps`][raster::RasterOps] /
//!   [`BlobSegmenter`][raster::BlobSegmenter]: pure-Rust software
//!   implementations of the image-processing traits.

pub mod raster;
pub mod segment;
pub mod sensor;
pub mod sim;

pub use raster::{BlobSegmenter, RasterOps};
pub use segment::{ImageOps, Segmenter};
pub use sensor::{DepthSensor, FramePair};
pub use sim::{SimDepthSensor, SimDisk, SimScene};
