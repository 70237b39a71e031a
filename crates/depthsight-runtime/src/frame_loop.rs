//! [`FrameLoop`] – the per-frame pipeline orchestrator.
//!
//! One [`tick`][FrameLoop::tick] drives a complete iteration:
//!
//! 1. **Acquire** – block on the sensor for the next depth/color pair.
//! 2. **Binarize** – threshold the depth image at 0 (any return is
//!    foreground).
//! 3. **Segment** – hand the binary image to the segmentation capability and
//!    collect candidate regions.
//! 4. **Extract** – run the obstacle extractor over the candidates.
//! 5. **Publish** – encode each detection as an `ObstaclePosition` wire
//!    message and await the external publish before touching the next frame;
//!    per-frame statistics go to the internal bus afterwards.
//!
//! The pipeline is strictly sequential: nothing about frame *n+1* starts
//! until every detection of frame *n* is published. A slow transport
//! therefore throttles frame throughput directly, which is the intended
//! back-pressure. The only state that crosses an iteration boundary is the
//! shutdown flag.
//!
//! # Failure policy
//!
//! Per-candidate failures are contained inside the extractor. Anything else
//! that goes wrong during an iteration — acquisition fault, publish failure —
//! fails that frame only: [`run`][FrameLoop::run] logs it, raises a `Fault`
//! event on the `SystemAlerts` lane, and moves on to the next frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use depthsight_extract::{ExtractorConfig, ObstacleExtractor};
use depthsight_hal::{DepthSensor, ImageOps, Segmenter};
use depthsight_middleware::{wire, EventBus, Publisher, Topic, OBSTACLE_POSITION_TOPIC};
use depthsight_perception::CameraModel;
use depthsight_types::{Event, EventPayload, SightError};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Configuration bundle for [`FrameLoop`].
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Camera calibration, mounting, and depth unit scale.
    pub model: CameraModel,
    /// Extraction bounds.
    pub extractor: ExtractorConfig,
    /// Optional pause between iterations, reproducing the reference rig's
    /// fixed cadence. `None` runs frames back to back.
    pub frame_interval: Option<Duration>,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            model: CameraModel::new(Default::default(), Default::default()),
            extractor: ExtractorConfig::default(),
            frame_interval: None,
        }
    }
}

/// Summary of one completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Candidate regions the segmenter produced.
    pub candidates: usize,
    /// Detections accepted and published.
    pub detections: usize,
}

/// The pipeline orchestrator. Owns every stage for the lifetime of the
/// process.
pub struct FrameLoop {
    sensor: Box<dyn DepthSensor>,
    segmenter: Box<dyn Segmenter>,
    ops: Box<dyn ImageOps>,
    publisher: Box<dyn Publisher>,
    extractor: ObstacleExtractor,
    bus: EventBus,
    frame_interval: Option<Duration>,
}

impl FrameLoop {
    /// `bus` carries the loop's statistics and fault events; sharing it with
    /// the rest of the process lets observers watch the pipeline without
    /// touching the external transport.
    pub fn new(
        config: FrameLoopConfig,
        sensor: Box<dyn DepthSensor>,
        segmenter: Box<dyn Segmenter>,
        ops: Box<dyn ImageOps>,
        publisher: Box<dyn Publisher>,
        bus: EventBus,
    ) -> Self {
        Self {
            sensor,
            segmenter,
            ops,
            publisher,
            extractor: ObstacleExtractor::new(config.model, config.extractor),
            bus,
            frame_interval: config.frame_interval,
        }
    }

    /// Return a clone of the shared [`EventBus`] so observers can subscribe
    /// to statistics and faults.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    /// Run one complete pipeline iteration.
    ///
    /// # Errors
    ///
    /// Returns the first acquisition or publish error encountered. The frame
    /// is abandoned; the caller decides whether to continue with the next
    /// one ([`run`][Self::run] does).
    pub async fn tick(&mut self) -> Result<FrameReport, SightError> {
        let started = Instant::now();

        // ── 1. Acquire ────────────────────────────────────────────────────
        let pair = self.sensor.wait_for_frame()?;

        // ── 2–3. Binarize + segment ───────────────────────────────────────
        let binary = self.ops.threshold_binary(&pair.depth);
        let regions = self.segmenter.segment(&binary);

        // ── 4. Extract ────────────────────────────────────────────────────
        let detections = self
            .extractor
            .extract(&pair.depth, &regions, self.ops.as_ref());

        // ── 5. Publish ────────────────────────────────────────────────────
        // Each detection is encoded whole and awaited before the next frame
        // is requested; the transport's pace is the pipeline's pace.
        for detection in &detections {
            let message = wire::ObstaclePosition {
                x_position: detection.position.x as f32,
                y_position: detection.position.y as f32,
                z_position: detection.position.z as f32,
                diameter: detection.diameter as f32,
            };
            self.publisher
                .publish(OBSTACLE_POSITION_TOPIC, &wire::encode(&message))
                .await?;
        }

        let report = FrameReport {
            candidates: regions.len(),
            detections: detections.len(),
        };

        // Best-effort statistics; an unobserved lane is fine.
        let _ = self.bus.publish_to(
            Topic::Telemetry,
            self.make_event(EventPayload::FrameStats {
                candidates: report.candidates,
                detections: report.detections,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
        );

        Ok(report)
    }

    /// Loop [`tick`][Self::tick] until `shutdown` is raised.
    ///
    /// The flag is checked between frames only — there is no mid-frame
    /// cancellation point.
    pub async fn run(&mut self, shutdown: Arc<AtomicBool>) {
        info!(sensor = %self.sensor.id(), "frame loop started");
        while !shutdown.load(Ordering::SeqCst) {
            match self.tick().await {
                Ok(report) => {
                    debug!(
                        candidates = report.candidates,
                        detections = report.detections,
                        "frame processed"
                    );
                }
                Err(e) => {
                    // Frame-fatal, process-continuing: the next iteration
                    // starts from scratch.
                    error!(error = %e, "frame failed; continuing with next frame");
                    let _ = self.bus.publish_to(
                        Topic::SystemAlerts,
                        self.make_event(EventPayload::Fault {
                            component: "frame_loop".to_string(),
                            message: e.to_string(),
                        }),
                    );
                }
            }
            if let Some(interval) = self.frame_interval {
                tokio::time::sleep(interval).await;
            }
        }
        info!("frame loop stopped");
    }

    fn make_event(&self, payload: EventPayload) -> Event {
        Event {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            source: "depthsight-runtime::frame_loop".to_string(),
            payload,
        }
    }
}
