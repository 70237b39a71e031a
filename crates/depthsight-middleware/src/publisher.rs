//! The outbound-transport seam.
//!
//! The pipeline publishes to an external broker through its own exchange and
//! connection machinery; none of that lives here. The frame loop only knows
//! the [`Publisher`] trait: one `publish(topic, payload)` call per accepted
//! detection, awaited before the next frame is acquired, with no internal
//! retry.
//!
//! Two in-process implementations ship with the workspace:
//!
//! - [`BusPublisher`] – mirrors every outbound message onto the internal
//!   [`EventBus`] so in-process observers can watch the detection stream.
//! - [`RecordingPublisher`] – captures messages for assertions in tests.

use async_trait::async_trait;
use chrono::Utc;
use depthsight_types::{Event, EventPayload, SightError};
use std::sync::Mutex;
use tracing::trace;
use uuid::Uuid;

use crate::bus::{EventBus, Topic};

/// The external publish capability: deliver `payload` on `topic`.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one encoded message.
    ///
    /// # Errors
    ///
    /// Returns [`SightError::Channel`] when the transport rejects the
    /// message. The caller treats that as a frame-level failure; retrying is
    /// the transport's business, not ours.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), SightError>;
}

/// Publishes onto the in-process [`EventBus`] `Detections` lane.
///
/// Having no subscribers is a normal condition, not a delivery failure.
#[derive(Clone, Debug)]
pub struct BusPublisher {
    bus: EventBus,
    source: String,
}

impl BusPublisher {
    pub fn new(bus: EventBus, source: impl Into<String>) -> Self {
        Self {
            bus,
            source: source.into(),
        }
    }
}

#[async_trait]
impl Publisher for BusPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), SightError> {
        let event = Event {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: self.source.clone(),
            payload: EventPayload::ObstacleWire {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            },
        };
        match self.bus.publish_to(Topic::Detections, event) {
            Ok(receivers) => {
                trace!(topic, receivers, "detection mirrored to bus");
                Ok(())
            }
            // Nobody listening right now; the message is simply unobserved.
            Err(SightError::Channel(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Captures every published message; for tests.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    records: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in order.
    pub fn records(&self) -> Vec<(String, Vec<u8>)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), SightError> {
        self.records
            .lock()
            .map_err(|_| SightError::Channel("recording publisher poisoned".to_string()))?
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}
