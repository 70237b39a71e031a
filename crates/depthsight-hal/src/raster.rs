//! Software implementations of the image-processing seams.
//!
//! [`RasterOps`] and [`BlobSegmenter`] implement the [`ImageOps`] and
//! [`Segmenter`] traits in plain Rust so the whole pipeline runs in headless
//! tests, CI, and simulated deployments with no native imaging library. They
//! favor clarity over throughput; an OpenCV-backed provider replaces them
//! where frame rate matters.

use depthsight_types::{
    CandidateRegion, DepthFrame, Ellipse, Mask, PixelPoint, Rect, RotatedRect, ShapeDescriptors,
    SightError,
};

use crate::segment::{ImageOps, Segmenter};

/// Half-width of the 5×5 square structuring element.
const KERNEL_RADIUS: isize = 2;

/// Minimum contour points for an ellipse fit.
const MIN_FIT_POINTS: usize = 5;

/// Pure-Rust raster primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterOps;

impl RasterOps {
    pub fn new() -> Self {
        Self
    }

    fn morphology(&self, mask: &Mask, iterations: u32, erode: bool) -> Mask {
        let (w, h) = (mask.width(), mask.height());
        let mut current = mask.clone();
        for _ in 0..iterations {
            let mut next = Mask::new(w, h);
            for row in 0..h {
                for col in 0..w {
                    let mut all_set = true;
                    let mut any_set = false;
                    for dy in -KERNEL_RADIUS..=KERNEL_RADIUS {
                        for dx in -KERNEL_RADIUS..=KERNEL_RADIUS {
                            let c = col as isize + dx;
                            let r = row as isize + dy;
                            let set = c >= 0
                                && r >= 0
                                && (c as usize) < w
                                && (r as usize) < h
                                && current.at(c as usize, r as usize) != 0;
                            all_set &= set;
                            any_set |= set;
                        }
                    }
                    let keep = if erode { all_set } else { any_set };
                    if keep {
                        next.set(col, row, 255);
                    }
                }
            }
            current = next;
        }
        current
    }
}

impl ImageOps for RasterOps {
    fn threshold_binary(&self, depth: &DepthFrame) -> Mask {
        let mut mask = Mask::new(depth.width(), depth.height());
        for row in 0..depth.height() {
            for col in 0..depth.width() {
                if depth.at(col, row) > 0.0 {
                    mask.set(col, row, 255);
                }
            }
        }
        mask
    }

    fn erode(&self, mask: &Mask, iterations: u32) -> Mask {
        self.morphology(mask, iterations, true)
    }

    fn dilate(&self, mask: &Mask, iterations: u32) -> Mask {
        self.morphology(mask, iterations, false)
    }

    fn fill_ellipse(&self, mask: &mut Mask, ellipse: &Ellipse) {
        let (cx, cy) = ellipse.center;
        let a = ellipse.axes.0 / 2.0;
        let b = ellipse.axes.1 / 2.0;
        if a <= 0.0 || b <= 0.0 {
            return;
        }
        let theta = ellipse.angle_deg.to_radians();
        let (sin, cos) = theta.sin_cos();

        let reach = a.max(b) + 1.0;
        let col_min = ((cx - reach).floor().max(0.0)) as usize;
        let row_min = ((cy - reach).floor().max(0.0)) as usize;
        let col_max = ((cx + reach).ceil() as usize).min(mask.width().saturating_sub(1));
        let row_max = ((cy + reach).ceil() as usize).min(mask.height().saturating_sub(1));

        for row in row_min..=row_max {
            for col in col_min..=col_max {
                let dx = col as f64 - cx;
                let dy = row as f64 - cy;
                // Rotate into the ellipse's own axes.
                let rx = dx * cos + dy * sin;
                let ry = -dx * sin + dy * cos;
                if (rx / a).powi(2) + (ry / b).powi(2) <= 1.0 {
                    mask.set(col, row, 255);
                }
            }
        }
    }

    fn shift_down(&self, mask: &Mask, rows: f64) -> Mask {
        let shift = rows.round() as isize;
        let (w, h) = (mask.width(), mask.height());
        let mut out = Mask::new(w, h);
        for row in 0..h {
            let src = row as isize - shift;
            if src < 0 || src as usize >= h {
                continue;
            }
            for col in 0..w {
                out.set(col, row, mask.at(col, src as usize));
            }
        }
        out
    }

    fn median_blur(&self, frame: &DepthFrame) -> DepthFrame {
        let (w, h) = (frame.width(), frame.height());
        let mut out = DepthFrame::new(w, h);
        let mut window: Vec<f32> = Vec::with_capacity(25);
        for row in 0..h {
            for col in 0..w {
                window.clear();
                for dy in -KERNEL_RADIUS..=KERNEL_RADIUS {
                    for dx in -KERNEL_RADIUS..=KERNEL_RADIUS {
                        let c = col as isize + dx;
                        let r = row as isize + dy;
                        if c >= 0 && r >= 0 && (c as usize) < w && (r as usize) < h {
                            window.push(frame.at(c as usize, r as usize));
                        }
                    }
                }
                window.sort_by(|a, b| a.total_cmp(b));
                out.set(col, row, window[window.len() / 2]);
            }
        }
        out
    }

    fn fit_shape(&self, region: &CandidateRegion) -> Result<ShapeDescriptors, SightError> {
        let contour = &region.contour;
        if contour.len() < MIN_FIT_POINTS {
            return Err(SightError::ShapeFit(format!(
                "contour has {} points, need at least {}",
                contour.len(),
                MIN_FIT_POINTS
            )));
        }

        let n = contour.len() as f64;
        let (mut mx, mut my) = (0.0, 0.0);
        for p in contour {
            mx += p.x as f64;
            my += p.y as f64;
        }
        mx /= n;
        my /= n;

        // Second central moments of the boundary points.
        let (mut mu20, mut mu02, mut mu11) = (0.0, 0.0, 0.0);
        for p in contour {
            let dx = p.x as f64 - mx;
            let dy = p.y as f64 - my;
            mu20 += dx * dx;
            mu02 += dy * dy;
            mu11 += dx * dy;
        }
        mu20 /= n;
        mu02 /= n;
        mu11 /= n;

        let common = (4.0 * mu11 * mu11 + (mu20 - mu02).powi(2)).sqrt();
        let lambda1 = (mu20 + mu02 + common) / 2.0;
        let lambda2 = (mu20 + mu02 - common) / 2.0;
        if lambda2 <= 1e-12 {
            return Err(SightError::ShapeFit(
                "contour has no spatial extent along its minor axis".to_string(),
            ));
        }
        let angle_rad = 0.5 * (2.0 * mu11).atan2(mu20 - mu02);

        // For points distributed on an ellipse boundary the variance along a
        // principal axis is (semi-axis)² / 2.
        let semi_major = (2.0 * lambda1).sqrt();
        let semi_minor = (2.0 * lambda2).sqrt();
        let ellipse = Ellipse {
            center: (mx, my),
            axes: (2.0 * semi_major, 2.0 * semi_minor),
            angle_deg: angle_rad.to_degrees(),
        };

        let min_x = contour.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = contour.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = contour.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = contour.iter().map(|p| p.y).max().unwrap_or(0);
        let bounding_rect = Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        };

        // Oriented bounding box along the principal axes.
        let (sin, cos) = angle_rad.sin_cos();
        let (mut lo1, mut hi1) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut lo2, mut hi2) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in contour {
            let dx = p.x as f64 - mx;
            let dy = p.y as f64 - my;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            lo1 = lo1.min(u);
            hi1 = hi1.max(u);
            lo2 = lo2.min(v);
            hi2 = hi2.max(v);
        }
        let mid1 = (lo1 + hi1) / 2.0;
        let mid2 = (lo2 + hi2) / 2.0;
        let min_area_rect = RotatedRect {
            center: (mx + mid1 * cos - mid2 * sin, my + mid1 * sin + mid2 * cos),
            size: (hi1 - lo1, hi2 - lo2),
            angle_deg: angle_rad.to_degrees(),
        };

        Ok(ShapeDescriptors {
            centroid: (mx, my),
            bounding_rect,
            ellipse,
            min_area_rect,
        })
    }
}

/// Connected-component blob segmentation over a binary image.
///
/// Optionally runs erosion/dilation passes first to knock out speckle noise,
/// then labels 8-connected foreground components and returns each component's
/// boundary contour and pixel area. Components below `min_area_px` are
/// discarded as noise.
#[derive(Debug, Clone, Copy)]
pub struct BlobSegmenter {
    erode_iterations: u32,
    dilate_iterations: u32,
    min_area_px: f64,
    ops: RasterOps,
}

impl BlobSegmenter {
    pub fn new() -> Self {
        Self {
            erode_iterations: 0,
            dilate_iterations: 0,
            min_area_px: 9.0,
            ops: RasterOps::new(),
        }
    }

    /// Enable a pre-segmentation noise-removal pass.
    pub fn with_morphology(mut self, erode_iterations: u32, dilate_iterations: u32) -> Self {
        self.erode_iterations = erode_iterations;
        self.dilate_iterations = dilate_iterations;
        self
    }

    pub fn with_min_area(mut self, min_area_px: f64) -> Self {
        self.min_area_px = min_area_px;
        self
    }
}

impl Default for BlobSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for BlobSegmenter {
    fn segment(&self, binary: &Mask) -> Vec<CandidateRegion> {
        let mut cleaned = binary.clone();
        if self.erode_iterations > 0 {
            cleaned = self.ops.erode(&cleaned, self.erode_iterations);
        }
        if self.dilate_iterations > 0 {
            cleaned = self.ops.dilate(&cleaned, self.dilate_iterations);
        }

        let (w, h) = (cleaned.width(), cleaned.height());
        let mut visited = vec![false; w * h];
        let mut regions = Vec::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start_row in 0..h {
            for start_col in 0..w {
                if visited[start_row * w + start_col] || cleaned.at(start_col, start_row) == 0 {
                    continue;
                }

                // Flood-fill one 8-connected component.
                let mut pixels: Vec<(usize, usize)> = Vec::new();
                visited[start_row * w + start_col] = true;
                stack.push((start_col, start_row));
                while let Some((col, row)) = stack.pop() {
                    pixels.push((col, row));
                    for dy in -1isize..=1 {
                        for dx in -1isize..=1 {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            let c = col as isize + dx;
                            let r = row as isize + dy;
                            if c < 0 || r < 0 || c as usize >= w || r as usize >= h {
                                continue;
                            }
                            let (c, r) = (c as usize, r as usize);
                            if !visited[r * w + c] && cleaned.at(c, r) != 0 {
                                visited[r * w + c] = true;
                                stack.push((c, r));
                            }
                        }
                    }
                }

                let area = pixels.len() as f64;
                if area < self.min_area_px {
                    continue;
                }

                // Boundary pixels: any component pixel with a 4-neighbor
                // outside the component (or outside the image).
                let contour: Vec<PixelPoint> = pixels
                    .iter()
                    .filter(|&&(col, row)| {
                        [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)].iter().any(
                            |&(dx, dy)| {
                                let c = col as isize + dx;
                                let r = row as isize + dy;
                                c < 0
                                    || r < 0
                                    || c as usize >= w
                                    || r as usize >= h
                                    || cleaned.at(c as usize, r as usize) == 0
                            },
                        )
                    })
                    .map(|&(col, row)| PixelPoint::new(col as u32, row as u32))
                    .collect();

                regions.push(CandidateRegion { contour, area });
            }
        }
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_mask(width: usize, height: usize, cx: f64, cy: f64, radius: f64) -> Mask {
        let mut mask = Mask::new(width, height);
        for row in 0..height {
            for col in 0..width {
                let d = ((col as f64 - cx).powi(2) + (row as f64 - cy).powi(2)).sqrt();
                if d <= radius {
                    mask.set(col, row, 255);
                }
            }
        }
        mask
    }

    fn circle_contour(cx: f64, cy: f64, radius: f64) -> Vec<PixelPoint> {
        let mut points = Vec::new();
        let steps = (radius * 8.0).max(16.0) as usize;
        for i in 0..steps {
            let t = i as f64 / steps as f64 * std::f64::consts::TAU;
            let x = (cx + radius * t.cos()).round() as u32;
            let y = (cy + radius * t.sin()).round() as u32;
            let p = PixelPoint::new(x, y);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        points
    }

    #[test]
    fn threshold_marks_depth_returns_only() {
        let ops = RasterOps::new();
        let mut depth = DepthFrame::new(4, 4);
        depth.set(1, 2, 850.0);
        let mask = ops.threshold_binary(&depth);
        assert_eq!(mask.at(1, 2), 255);
        assert_eq!(mask.count_set(), 1);
    }

    #[test]
    fn erode_shrinks_and_dilate_grows() {
        let ops = RasterOps::new();
        let mask = disk_mask(64, 64, 32.0, 32.0, 15.0);
        let before = mask.count_set();

        let eroded = ops.erode(&mask, 1);
        assert!(eroded.count_set() < before);

        let dilated = ops.dilate(&mask, 1);
        assert!(dilated.count_set() > before);
    }

    #[test]
    fn erode_removes_speckle() {
        let ops = RasterOps::new();
        let mut mask = Mask::new(32, 32);
        // 3×3 speck: smaller than the 5×5 kernel, one erosion kills it.
        for row in 10..13 {
            for col in 10..13 {
                mask.set(col, row, 255);
            }
        }
        let eroded = ops.erode(&mask, 1);
        assert_eq!(eroded.count_set(), 0);
    }

    #[test]
    fn fill_ellipse_covers_expected_area() {
        let ops = RasterOps::new();
        let mut mask = Mask::new(64, 64);
        ops.fill_ellipse(
            &mut mask,
            &Ellipse {
                center: (32.0, 32.0),
                axes: (20.0, 20.0),
                angle_deg: 0.0,
            },
        );
        assert_eq!(mask.at(32, 32), 255);
        assert_eq!(mask.at(0, 0), 0);
        // ~ π·10² for a 20 px circle.
        let area = mask.count_set() as f64;
        let expected = std::f64::consts::PI * 100.0;
        assert!((area - expected).abs() / expected < 0.1, "area={area}");
    }

    #[test]
    fn shift_down_translates_content() {
        let ops = RasterOps::new();
        let mut mask = Mask::new(8, 8);
        mask.set(3, 1, 255);
        let shifted = ops.shift_down(&mask, 4.2);
        assert_eq!(shifted.at(3, 5), 255);
        assert_eq!(shifted.at(3, 1), 0);
    }

    #[test]
    fn median_blur_removes_salt_noise() {
        let ops = RasterOps::new();
        let mut frame = DepthFrame::new(16, 16);
        for row in 0..16 {
            for col in 0..16 {
                frame.set(col, row, 1000.0);
            }
        }
        frame.set(8, 8, 9000.0);
        let blurred = ops.median_blur(&frame);
        assert_eq!(blurred.at(8, 8), 1000.0);
    }

    #[test]
    fn fit_shape_recovers_circle_geometry() {
        let ops = RasterOps::new();
        let contour = circle_contour(40.0, 30.0, 12.0);
        let region = CandidateRegion {
            area: std::f64::consts::PI * 144.0,
            contour,
        };
        let shape = ops.fit_shape(&region).unwrap();

        assert!((shape.centroid.0 - 40.0).abs() < 0.5);
        assert!((shape.centroid.1 - 30.0).abs() < 0.5);
        // Both ellipse axes ≈ the diameter.
        assert!((shape.ellipse.axes.0 - 24.0).abs() < 1.5);
        assert!((shape.ellipse.axes.1 - 24.0).abs() < 1.5);
        // Bounding rect spans the diameter (inclusive pixel bounds).
        assert_eq!(shape.bounding_rect.width, 25);
        assert!((shape.min_area_rect.size.0 - 24.0).abs() < 1.5);
    }

    #[test]
    fn fit_shape_rejects_tiny_contours() {
        let ops = RasterOps::new();
        let region = CandidateRegion {
            contour: vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(1, 0),
                PixelPoint::new(2, 0),
                PixelPoint::new(3, 0),
            ],
            area: 4.0,
        };
        assert!(matches!(
            ops.fit_shape(&region),
            Err(SightError::ShapeFit(_))
        ));
    }

    #[test]
    fn fit_shape_rejects_collinear_contours() {
        let ops = RasterOps::new();
        let region = CandidateRegion {
            contour: (0..10).map(|i| PixelPoint::new(i, 5)).collect(),
            area: 10.0,
        };
        assert!(matches!(
            ops.fit_shape(&region),
            Err(SightError::ShapeFit(_))
        ));
    }

    #[test]
    fn segmenter_finds_separate_blobs() {
        let segmenter = BlobSegmenter::new();
        let mut mask = disk_mask(128, 64, 30.0, 30.0, 10.0);
        let second = disk_mask(128, 64, 90.0, 30.0, 6.0);
        for row in 0..64 {
            for col in 0..128 {
                if second.at(col, row) != 0 {
                    mask.set(col, row, 255);
                }
            }
        }

        let mut regions = segmenter.segment(&mask);
        regions.sort_by(|a, b| b.area.total_cmp(&a.area));
        assert_eq!(regions.len(), 2);
        assert!((regions[0].area - std::f64::consts::PI * 100.0).abs() < 25.0);
        assert!((regions[1].area - std::f64::consts::PI * 36.0).abs() < 15.0);
        assert!(!regions[0].contour.is_empty());
    }

    #[test]
    fn segmenter_discards_specks() {
        let segmenter = BlobSegmenter::new();
        let mut mask = Mask::new(32, 32);
        mask.set(5, 5, 255);
        mask.set(6, 5, 255);
        assert!(segmenter.segment(&mask).is_empty());
    }

    #[test]
    fn morphology_pass_removes_noise_before_labeling() {
        let segmenter = BlobSegmenter::new().with_morphology(1, 1);
        let mut mask = disk_mask(64, 64, 32.0, 32.0, 12.0);
        // 3×3 speck that one erosion eliminates.
        for row in 2..5 {
            for col in 2..5 {
                mask.set(col, row, 255);
            }
        }
        let regions = segmenter.segment(&mask);
        assert_eq!(regions.len(), 1);
    }
}
