//! `depthsight-middleware` – event routing and outbound publishing.
//!
//! Routes detection events between the pipeline and its consumers without
//! caring what produced them.
//!
//! # Modules
//!
//! - [`bus`] – Headless, typed, topic-based publish/subscribe event bus built
//!   on Tokio broadcast channels.
//! - [`wire`] – The outbound message contract: a protobuf message with the
//!   four obstacle fields, on the fixed `obstacle.position` routing key.
//! - [`publisher`] – [`Publisher`][publisher::Publisher]: the seam to the
//!   external transport, plus in-process implementations.

pub mod bus;
pub mod publisher;
pub mod wire;

pub use bus::{EventBus, Topic, TopicReceiver};
pub use publisher::{BusPublisher, Publisher, RecordingPublisher};
pub use wire::{ObstaclePosition, OBSTACLE_POSITION_TOPIC};
