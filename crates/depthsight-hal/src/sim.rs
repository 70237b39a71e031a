//! Simulated depth sensor for headless testing and CI.
//!
//! [`SimDepthSensor`] synthesizes the frames a real time-of-flight camera
//! would deliver: a configurable scene of disk-shaped obstacles, each with a
//! pixel position, pixel diameter, and depth return. Everything outside a
//! disk reads as "no return" (0) unless a background depth is configured.

use depthsight_types::{ColorFrame, DepthFrame, DEPTH_HEIGHT, DEPTH_WIDTH, SightError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sensor::{DepthSensor, FramePair};

/// One synthetic obstacle: a filled disk of constant depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimDisk {
    /// Disk center, pixel column.
    pub center_x: u32,
    /// Disk center, pixel row.
    pub center_y: u32,
    /// Disk diameter in pixels.
    pub diameter_px: u32,
    /// Depth return inside the disk, native sensor units.
    pub depth: f32,
}

/// A synthetic scene rendered into every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimScene {
    pub width: usize,
    pub height: usize,
    /// Depth return outside the disks; 0 = no return.
    pub background: f32,
    pub disks: Vec<SimDisk>,
}

impl Default for SimScene {
    /// One mid-range obstacle centered in a Kinect-sized frame.
    fn default() -> Self {
        Self {
            width: DEPTH_WIDTH,
            height: DEPTH_HEIGHT,
            background: 0.0,
            disks: vec![SimDisk {
                center_x: 254,
                center_y: 205,
                diameter_px: 40,
                depth: 1000.0,
            }],
        }
    }
}

/// A depth sensor that renders a [`SimScene`] on every acquisition.
#[derive(Debug, Clone)]
pub struct SimDepthSensor {
    id: String,
    scene: SimScene,
    frames_served: u64,
}

impl SimDepthSensor {
    pub fn new(id: impl Into<String>, scene: SimScene) -> Self {
        Self {
            id: id.into(),
            scene,
            frames_served: 0,
        }
    }

    /// Number of frames delivered so far.
    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }

    fn render_depth(&self) -> DepthFrame {
        let mut frame = DepthFrame::new(self.scene.width, self.scene.height);
        if self.scene.background != 0.0 {
            for row in 0..self.scene.height {
                for col in 0..self.scene.width {
                    frame.set(col, row, self.scene.background);
                }
            }
        }
        for disk in &self.scene.disks {
            let radius = disk.diameter_px as f64 / 2.0;
            let (cx, cy) = (disk.center_x as f64, disk.center_y as f64);
            let col_min = ((cx - radius).floor().max(0.0)) as usize;
            let row_min = ((cy - radius).floor().max(0.0)) as usize;
            let col_max = ((cx + radius).ceil() as usize).min(self.scene.width.saturating_sub(1));
            let row_max = ((cy + radius).ceil() as usize).min(self.scene.height.saturating_sub(1));
            for row in row_min..=row_max {
                for col in col_min..=col_max {
                    let d = ((col as f64 - cx).powi(2) + (row as f64 - cy).powi(2)).sqrt();
                    if d <= radius {
                        frame.set(col, row, disk.depth);
                    }
                }
            }
        }
        frame
    }
}

impl DepthSensor for SimDepthSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn wait_for_frame(&mut self) -> Result<FramePair, SightError> {
        self.frames_served += 1;
        debug!(
            sensor = %self.id,
            frame = self.frames_served,
            disks = self.scene.disks.len(),
            "rendering simulated frame"
        );
        Ok(FramePair {
            depth: self.render_depth(),
            color: ColorFrame::new(self.scene.width, self.scene.height),
        })
    }
}
