//! The outbound message contract.
//!
//! Downstream navigation consumers read a protobuf `ObstaclePosition`
//! message — four required float fields — published on the fixed
//! `obstacle.position` routing key. The schema is an external contract shared
//! with those consumers; this module owns only the Rust expression of it.

use depthsight_types::SightError;
use prost::Message;

/// Routing key every obstacle-position message is published on.
pub const OBSTACLE_POSITION_TOPIC: &str = "obstacle.position";

/// One detected obstacle, as consumers see it: world position plus physical
/// diameter, all in single-precision floats.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ObstaclePosition {
    #[prost(float, tag = "1")]
    pub x_position: f32,
    #[prost(float, tag = "2")]
    pub y_position: f32,
    #[prost(float, tag = "3")]
    pub z_position: f32,
    #[prost(float, tag = "4")]
    pub diameter: f32,
}

/// Encode a message into its wire bytes.
pub fn encode(message: &ObstaclePosition) -> Vec<u8> {
    message.encode_to_vec()
}

/// Decode wire bytes back into a message.
///
/// # Errors
///
/// Returns [`SightError::Wire`] for malformed bytes.
pub fn decode(bytes: &[u8]) -> Result<ObstaclePosition, SightError> {
    ObstaclePosition::decode(bytes).map_err(|e| SightError::Wire(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_preserves_fields() {
        let message = ObstaclePosition {
            x_position: -2.75,
            y_position: 0.043,
            z_position: 1.921,
            diameter: 112.4,
        };
        let bytes = encode(&message);
        let back = decode(&bytes).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn wire_layout_is_four_fixed32_fields() {
        let message = ObstaclePosition {
            x_position: 1.0,
            y_position: 2.0,
            z_position: 3.0,
            diameter: 4.5,
        };
        let bytes = encode(&message);
        // Four (tag, fixed32) pairs: 5 bytes each.
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes[0], 0x0d); // field 1, wire type 5
        assert_eq!(bytes[5], 0x15); // field 2
        assert_eq!(bytes[10], 0x1d); // field 3
        assert_eq!(bytes[15], 0x25); // field 4
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode(&[0xff, 0xff, 0xff]),
            Err(SightError::Wire(_))
        ));
    }

    #[test]
    fn decode_of_empty_bytes_yields_zeroed_message() {
        // Proto3 semantics: absent fields read as zero.
        let message = decode(&[]).unwrap();
        assert_eq!(message.diameter, 0.0);
    }
}
