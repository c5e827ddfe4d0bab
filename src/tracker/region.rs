//! Connected regions of signature-matching pixels.

use nalgebra::Point2;

use crate::tracker::color::ColorSignature;
use crate::tracker::frame::Frame;
use crate::tracker::rect::Rect;

/// A 4-connected set of pixels that match the tracking signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pixel_count: usize,
    sum_x: f64,
    sum_y: f64,
    weight: f64,
    weighted_x: f64,
    weighted_y: f64,
    min: (usize, usize),
    max: (usize, usize),
    seed: (usize, usize),
    capped: bool,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            pixel_count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            weight: 0.0,
            weighted_x: 0.0,
            weighted_y: 0.0,
            min: (usize::MAX, usize::MAX),
            max: (0, 0),
            seed: (0, 0),
            capped: false,
        }
    }
}

impl Region {
    fn add(&mut self, x: usize, y: usize, confidence: f32) {
        let (fx, fy, w) = (x as f64, y as f64, f64::from(confidence));
        if self.pixel_count == 0 {
            self.seed = (x, y);
        }
        self.pixel_count += 1;
        self.sum_x += fx;
        self.sum_y += fy;
        self.weight += w;
        self.weighted_x += w * fx;
        self.weighted_y += w * fy;
        self.min = (self.min.0.min(x), self.min.1.min(y));
        self.max = (self.max.0.max(x), self.max.1.max(y));
    }

    /// Number of pixels in the region.
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// First pixel visited; always part of the region when it is non-empty.
    pub fn seed(&self) -> (usize, usize) {
        self.seed
    }

    /// Growth stopped at the pixel cap, so the region may be incomplete.
    pub fn is_capped(&self) -> bool {
        self.capped
    }

    /// Mean pixel position, optionally weighted by match confidence.
    ///
    /// Falls back to the plain mean when every pixel matched with zero
    /// confidence (all exactly on the tolerance boundary).
    pub fn centroid(&self, confidence_weighted: bool) -> Option<Point2<f64>> {
        if self.pixel_count == 0 {
            return None;
        }
        if confidence_weighted && self.weight > f64::EPSILON {
            return Some(Point2::new(
                self.weighted_x / self.weight,
                self.weighted_y / self.weight,
            ));
        }
        let n = self.pixel_count as f64;
        Some(Point2::new(self.sum_x / n, self.sum_y / n))
    }

    /// Radius of the disc with the same area.
    pub fn equivalent_radius(&self) -> f64 {
        (self.pixel_count as f64 / std::f64::consts::PI).sqrt()
    }

    /// Tight bounding box, bottom-right exclusive.
    pub fn bounds(&self) -> Rect {
        if self.pixel_count == 0 {
            return Rect::default();
        }
        Rect::from_tlbr(self.min.0, self.min.1, self.max.0 + 1, self.max.1 + 1)
    }
}

/// Label every 4-connected matching region inside `window`.
pub fn label_regions(frame: &Frame, signature: &ColorSignature, window: Rect) -> Vec<Region> {
    if window.is_empty() {
        return Vec::new();
    }
    let mut confidence = Vec::with_capacity(window.area());
    for y in window.y..window.y + window.height {
        for x in window.x..window.x + window.width {
            confidence.push(signature.matches_rgb(frame.rgb(x, y)));
        }
    }

    let mut visited = vec![false; window.area()];
    let mut regions = Vec::new();
    for seed in 0..window.area() {
        if visited[seed] || confidence[seed].is_none() {
            continue;
        }
        let region = grow(window, seed, &mut visited, usize::MAX, |idx| confidence[idx]);
        regions.push(region);
    }
    regions
}

/// Grow the single region containing `seed`, visiting at most `max_pixels`.
///
/// Returns an empty region when the seed itself does not match. A region cut
/// short by the cap reports [`Region::is_capped`].
pub fn flood_from(
    frame: &Frame,
    signature: &ColorSignature,
    seed: (usize, usize),
    max_pixels: usize,
) -> Region {
    let window = Rect::full(frame.width(), frame.height());
    if !window.contains(seed.0, seed.1) {
        return Region::default();
    }
    let mut visited = vec![false; window.area()];
    let seed_idx = seed.1 * window.width + seed.0;
    grow(window, seed_idx, &mut visited, max_pixels, |idx| {
        signature.matches_rgb(frame.rgb(idx % window.width, idx / window.width))
    })
}

fn grow<F>(
    window: Rect,
    seed: usize,
    visited: &mut [bool],
    max_pixels: usize,
    confidence_at: F,
) -> Region
where
    F: Fn(usize) -> Option<f32>,
{
    let mut region = Region::default();
    if confidence_at(seed).is_none() {
        return region;
    }

    let w = window.width;
    let h = window.height;
    let mut stack = vec![seed];
    visited[seed] = true;

    while let Some(idx) = stack.pop() {
        let Some(conf) = confidence_at(idx) else {
            continue;
        };
        let (lx, ly) = (idx % w, idx / w);
        region.add(window.x + lx, window.y + ly, conf);
        if region.pixel_count >= max_pixels {
            region.capped = true;
            break;
        }

        let mut visit = |n: usize| {
            if !visited[n] && confidence_at(n).is_some() {
                visited[n] = true;
                stack.push(n);
            }
        };
        if lx > 0 {
            visit(idx - 1);
        }
        if lx + 1 < w {
            visit(idx + 1);
        }
        if ly > 0 {
            visit(idx - w);
        }
        if ly + 1 < h {
            visit(idx + w);
        }
    }
    region
}
