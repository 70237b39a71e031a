//! Image-processing capability traits.
//!
//! Segmentation and raster morphology are standard image-processing
//! operations, not something this workspace reimplements for production use.
//! Both traits exist so the extraction pipeline can run against any provider:
//! the bundled software implementation ([`raster`][crate::raster]) for
//! headless operation, or an OpenCV-backed one on deployments that link it.

use depthsight_types::{CandidateRegion, DepthFrame, Ellipse, Mask, ShapeDescriptors, SightError};

/// Turns a binary image into candidate obstacle regions.
///
/// Implementations run their own noise-removal/morphology chain internally;
/// callers only see the resulting contours. Regions live for one frame.
pub trait Segmenter: Send + Sync {
    fn segment(&self, binary: &Mask) -> Vec<CandidateRegion>;
}

/// Raster primitives used to build and probe per-candidate masks.
///
/// Morphological operations use a 5×5 square structuring element, the kernel
/// the reference hardware was tuned with.
pub trait ImageOps: Send + Sync {
    /// Binarize a depth image with a fixed threshold at 0: every pixel with a
    /// depth return becomes foreground.
    fn threshold_binary(&self, depth: &DepthFrame) -> Mask;

    /// Morphological erosion, `iterations` passes.
    fn erode(&self, mask: &Mask, iterations: u32) -> Mask;

    /// Morphological dilation, `iterations` passes.
    fn dilate(&self, mask: &Mask, iterations: u32) -> Mask;

    /// Rasterize a filled ellipse into `mask`.
    fn fill_ellipse(&self, mask: &mut Mask, ellipse: &Ellipse);

    /// Translate the mask contents down by `rows` pixels, zero-filling the
    /// vacated top rows.
    fn shift_down(&self, mask: &Mask, rows: f64) -> Mask;

    /// 5×5 median filter over a depth image.
    fn median_blur(&self, frame: &DepthFrame) -> DepthFrame;

    /// Fit shape descriptors (centroid, bounding rectangle, ellipse, oriented
    /// rectangle) to a region's contour.
    ///
    /// # Errors
    ///
    /// Returns [`SightError::ShapeFit`] for degenerate regions — fewer than
    /// five contour points, or a contour with no spatial extent.
    fn fit_shape(&self, region: &CandidateRegion) -> Result<ShapeDescriptors, SightError>;
}
