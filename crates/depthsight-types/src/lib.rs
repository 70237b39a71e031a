//! `depthsight-types` – shared data vocabulary.
//!
//! Every crate in the workspace speaks in these types: raw image buffers
//! ([`frame`]), pixel-space geometry and segmentation results ([`region`]),
//! the internal event envelope ([`Event`]), and the global error enum
//! ([`SightError`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod frame;
pub mod region;

pub use frame::{ColorFrame, DepthFrame, Mask, DEPTH_HEIGHT, DEPTH_WIDTH};
pub use region::{CandidateRegion, Ellipse, PixelPoint, Rect, RotatedRect, ShapeDescriptors};

/// Envelope for every message routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. "depthsight-runtime::frame_loop"
    pub source: String,
    pub payload: EventPayload,
}

/// Variants of data that can be routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// An already-encoded outbound message, mirrored onto the bus for
    /// in-process observers. `topic` is the external routing key.
    ObstacleWire { topic: String, payload: Vec<u8> },
    /// Per-frame pipeline summary.
    FrameStats {
        candidates: usize,
        detections: usize,
        elapsed_ms: u64,
    },
    /// A recoverable fault somewhere in the pipeline.
    Fault { component: String, message: String },
}

/// Global error type spanning device failures, shape fitting, and transport.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SightError {
    #[error("no depth device connected")]
    DeviceNotFound,

    #[error("hardware fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("shape fit failed: {0}")]
    ShapeFit(String),

    #[error("event channel error: {0}")]
    Channel(String),

    #[error("wire encoding error: {0}")]
    Wire(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed frame: {0}")]
    Frame(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_roundtrip() {
        let event = Event {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: "depthsight-runtime::frame_loop".to_string(),
            payload: EventPayload::FrameStats {
                candidates: 4,
                detections: 1,
                elapsed_ms: 12,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
    }

    #[test]
    fn wire_payload_roundtrip() {
        let payload = EventPayload::ObstacleWire {
            topic: "obstacle.position".to_string(),
            payload: vec![0x0d, 0x00, 0x00, 0x80, 0x3f],
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: EventPayload = serde_json::from_str(&json).unwrap();
        match back {
            EventPayload::ObstacleWire { topic, payload } => {
                assert_eq!(topic, "obstacle.position");
                assert_eq!(payload.len(), 5);
            }
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn sight_error_display() {
        let err = SightError::DeviceNotFound;
        assert!(err.to_string().contains("no depth device"));

        let err2 = SightError::HardwareFault {
            component: "depth_sensor".to_string(),
            details: "usb transfer stalled".to_string(),
        };
        assert!(err2.to_string().contains("depth_sensor"));
    }
}
