//! Per-candidate obstacle extraction.
//!
//! For every candidate region the extractor runs the same decision sequence:
//!
//! 1. Size gate: the circle-equivalent diameter of the region's pixel area
//!    must fall inside a tunable window — too small is sensor noise, too
//!    large is a wall or the floor.
//! 2. Shape fit: ellipse, bounding rectangle, and principal-axis descriptors
//!    are fitted to the contour; the bounding-rect width becomes the working
//!    pixel diameter (it tracks the body of the obstacle better than the
//!    ellipse fit does).
//! 3. Mask probe: the fitted ellipse is rasterized, shifted down by a quarter
//!    diameter (the contour hugs the obstacle's upper edge, the body sits
//!    below it), and eroded away from the boundary. The median of the
//!    non-zero masked depth samples is the distance estimate; the deepest
//!    masked pixel is the obstacle's far point.
//! 4. Distance gate: estimates beyond the configured maximum are discarded.
//! 5. Geometry: the far point is back-projected and lifted into world
//!    coordinates; the physical diameter follows the thin-lens relation
//!    `pixels · distance / fx`.
//!
//! A candidate that fails geometrically (degenerate contour, mask with no
//! depth returns) produces a [`CandidateError`] that is logged and skipped;
//! the remaining candidates in the frame always run. The extractor holds no
//! mutable state, so re-running it over a frozen frame yields identical
//! results.

use depthsight_hal::ImageOps;
use depthsight_perception::{
    CameraModel, OrientationCompensator, PointCloudProjector, WorldPoint,
};
use depthsight_types::{CandidateRegion, DepthFrame, Mask};
use thiserror::Error;
use tracing::{debug, warn};

/// Tunable bounds of the extraction heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    /// Lower bound on the circle-equivalent pixel diameter.
    pub low_diameter_px: f64,
    /// Upper bound on the circle-equivalent pixel diameter.
    pub high_diameter_px: f64,
    /// Upper bound on the distance estimate, native depth units.
    pub max_distance: f64,
    /// Erosion passes applied to the candidate mask.
    pub mask_erode_iterations: u32,
}

impl Default for ExtractorConfig {
    /// The bounds the reference rig was tuned with.
    fn default() -> Self {
        Self {
            low_diameter_px: 20.0,
            high_diameter_px: 100.0,
            max_distance: 3000.0,
            mask_erode_iterations: 3,
        }
    }
}

/// One detected obstacle: world position and physical diameter (native depth
/// units, millimeters on the reference hardware).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleDetection {
    pub position: WorldPoint,
    pub diameter: f64,
}

/// A contained per-candidate failure. The extractor logs it and moves on to
/// the next candidate; it never aborts the frame.
#[derive(Error, Debug, Clone)]
pub enum CandidateError {
    #[error("shape fit failed: {0}")]
    ShapeFit(String),

    #[error("candidate mask contains no depth returns")]
    EmptyMask,
}

/// The per-frame obstacle extraction core.
///
/// Construct once at startup from the camera description and the tuned
/// bounds; call [`extract`][Self::extract] once per frame.
#[derive(Debug, Clone)]
pub struct ObstacleExtractor {
    projector: PointCloudProjector,
    compensator: OrientationCompensator,
    fx: f64,
    config: ExtractorConfig,
}

impl ObstacleExtractor {
    pub fn new(model: CameraModel, config: ExtractorConfig) -> Self {
        Self {
            projector: PointCloudProjector::new(model.intrinsics, model.depth_scale),
            compensator: OrientationCompensator::new(model.extrinsics),
            fx: model.intrinsics.fx,
            config,
        }
    }

    /// Evaluate every candidate region against the depth frame.
    ///
    /// Returns one detection per accepted candidate — zero, one, or many per
    /// frame. Overlapping candidates are not merged or deduplicated.
    pub fn extract(
        &self,
        depth: &DepthFrame,
        regions: &[CandidateRegion],
        ops: &dyn ImageOps,
    ) -> Vec<ObstacleDetection> {
        let mut detections = Vec::new();
        for (index, region) in regions.iter().enumerate() {
            match self.evaluate(depth, region, ops) {
                Ok(Some(detection)) => detections.push(detection),
                Ok(None) => {
                    debug!(candidate = index, area = region.area, "candidate rejected");
                }
                Err(error) => {
                    warn!(candidate = index, %error, "candidate skipped");
                }
            }
        }
        detections
    }

    fn evaluate(
        &self,
        depth: &DepthFrame,
        region: &CandidateRegion,
        ops: &dyn ImageOps,
    ) -> Result<Option<ObstacleDetection>, CandidateError> {
        let equivalent_diameter = (4.0 * region.area / std::f64::consts::PI).sqrt();
        if equivalent_diameter <= self.config.low_diameter_px
            || equivalent_diameter >= self.config.high_diameter_px
        {
            return Ok(None);
        }

        let shape = ops
            .fit_shape(region)
            .map_err(|e| CandidateError::ShapeFit(e.to_string()))?;

        // The bounding width estimates the obstacle's extent more reliably
        // than the ellipse axis once the contour is ragged.
        let diameter_px = f64::from(shape.bounding_rect.width);

        let mut mask = Mask::new(depth.width(), depth.height());
        ops.fill_ellipse(&mut mask, &shape.ellipse);
        // The contour traces the obstacle's visible edge; the solid body sits
        // a quarter diameter below it.
        let mask = ops.shift_down(&mask, diameter_px / 4.0);
        let mask = ops.erode(&mask, self.config.mask_erode_iterations);

        let foreground = ops.median_blur(&depth.masked(&mask));

        let (distance_estimate, far_point) =
            probe_masked_depth(&foreground).ok_or(CandidateError::EmptyMask)?;

        if distance_estimate >= self.config.max_distance {
            return Ok(None);
        }

        let (far_col, far_row, far_depth) = far_point;
        let sensor_point =
            self.projector
                .project_one(far_col as f64, far_row as f64, f64::from(far_depth));
        let position = self.compensator.compensate_one(sensor_point);

        let diameter = diameter_px * (1.0 / self.fx) * distance_estimate;

        Ok(Some(ObstacleDetection { position, diameter }))
    }
}

/// Median of the non-zero samples plus the location and value of the deepest
/// sample. Returns `None` when every sample is zero.
fn probe_masked_depth(frame: &DepthFrame) -> Option<(f64, (usize, usize, f32))> {
    let mut values: Vec<f32> = Vec::new();
    let mut far: Option<(usize, usize, f32)> = None;
    for row in 0..frame.height() {
        for col in 0..frame.width() {
            let sample = frame.at(col, row);
            if sample <= 0.0 {
                continue;
            }
            values.push(sample);
            if far.is_none_or(|(_, _, depth)| sample > depth) {
                far = Some((col, row, sample));
            }
        }
    }
    let far = far?;

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 1 {
        f64::from(values[mid])
    } else {
        (f64::from(values[mid - 1]) + f64::from(values[mid])) / 2.0
    };
    Some((median, far))
}
