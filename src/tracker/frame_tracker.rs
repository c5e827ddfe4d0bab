//! Per-frame localization of the calibrated color blob.

use nalgebra::Point2;
use tracing::{debug, trace};

use crate::config::TrackingConfig;
use crate::tracker::color::ColorSignature;
use crate::tracker::frame::Frame;
use crate::tracker::rect::Rect;
use crate::tracker::region::{self, Region};

/// Pixel-space position of the tracked blob.
pub type Centroid = Point2<f64>;

/// Where a centroid was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Inside the window around the previous centroid.
    Window,
    /// Full-frame fallback after the window came up short.
    FullFrame,
}

/// A located blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub centroid: Centroid,
    pub pixel_count: usize,
    pub scope: SearchScope,
}

/// Locates the signature color in each frame.
///
/// Stateless between calls: temporal coherence comes from the `previous`
/// hint passed by the caller.
#[derive(Debug, Clone, Default)]
pub struct FrameTracker {
    config: TrackingConfig,
}

impl FrameTracker {
    /// Create a tracker with the given search configuration.
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// Get the tracker configuration.
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Centroid of the best-matching region, or `None` when nothing large
    /// enough matches in either the windowed or the full-frame search.
    pub fn locate(
        &self,
        frame: &Frame,
        signature: &ColorSignature,
        previous: Option<Centroid>,
    ) -> Option<Centroid> {
        self.detect(frame, signature, previous).map(|d| d.centroid)
    }

    /// Like [`locate`](Self::locate) but also reports region size and search scope.
    ///
    /// A windowed hit cut off by the window is regrown over the whole frame
    /// before its centroid is taken.
    pub fn detect(
        &self,
        frame: &Frame,
        signature: &ColorSignature,
        previous: Option<Centroid>,
    ) -> Option<Detection> {
        let full = Rect::full(frame.width(), frame.height());

        if let Some(prev) = previous {
            let window = Rect::around(
                prev.x,
                prev.y,
                self.config.search_half_size,
                frame.width(),
                frame.height(),
            );
            if window != full {
                let regions = self.candidate_regions(frame, signature, window);
                if let Some(best) = self.select(&regions, previous) {
                    let det = if best.bounds().clipped_by(&window, &full) {
                        let whole = region::flood_from(frame, signature, best.seed(), usize::MAX);
                        trace!(
                            clipped = best.pixel_count(),
                            whole = whole.pixel_count(),
                            "regrew region cut by search window"
                        );
                        self.detection(&whole, SearchScope::Window)
                    } else {
                        self.detection(best, SearchScope::Window)
                    };
                    if det.is_some() {
                        return det;
                    }
                }
                debug!(?window, "windowed search came up short, scanning full frame");
            }
        }

        let regions = self.candidate_regions(frame, signature, full);
        let det = self
            .select(&regions, previous)
            .and_then(|best| self.detection(best, SearchScope::FullFrame));
        if det.is_none() {
            trace!("no matching region in frame");
        }
        det
    }

    fn candidate_regions(
        &self,
        frame: &Frame,
        signature: &ColorSignature,
        window: Rect,
    ) -> Vec<Region> {
        region::label_regions(frame, signature, window)
            .into_iter()
            .filter(|r| r.pixel_count() >= self.config.min_region_pixels)
            .collect()
    }

    /// Nearest region to the previous centroid wins; without a hint, the largest.
    fn select<'a>(
        &self,
        regions: &'a [Region],
        previous: Option<Centroid>,
    ) -> Option<&'a Region> {
        let weighted = self.config.confidence_weighted;
        let candidates = regions
            .iter()
            .filter_map(|r| r.centroid(weighted).map(|c| (c, r)));

        let best = match previous {
            Some(prev) => candidates.min_by(|a, b| {
                nalgebra::distance(&a.0, &prev).total_cmp(&nalgebra::distance(&b.0, &prev))
            }),
            None => candidates.max_by_key(|(_, r)| r.pixel_count()),
        };
        best.map(|(_, r)| r)
    }

    fn detection(&self, region: &Region, scope: SearchScope) -> Option<Detection> {
        region
            .centroid(self.config.confidence_weighted)
            .map(|centroid| Detection {
                centroid,
                pixel_count: region.pixel_count(),
                scope,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::FrameBuilder;
    use crate::tracker::color::{Hsv, Tolerance};
    use approx::assert_abs_diff_eq;

    const BAR: [u8; 3] = [240, 200, 20];
    const GYM: [u8; 3] = [50, 50, 60];

    fn signature() -> ColorSignature {
        let tol = Tolerance {
            hue: 18.0,
            saturation: 0.3,
            value: 0.35,
        };
        ColorSignature::new(Hsv::from_rgb(BAR), tol, 0.15)
    }

    #[test]
    fn test_locate_single_blob() {
        let frame = FrameBuilder::new(320, 240)
            .background(GYM)
            .disc(100.0, 80.0, 12.0, BAR)
            .build()
            .unwrap();
        let tracker = FrameTracker::default();

        let c = tracker.locate(&frame, &signature(), None).unwrap();
        assert_abs_diff_eq!(c.x, 100.0, epsilon = 0.5);
        assert_abs_diff_eq!(c.y, 80.0, epsilon = 0.5);
    }

    #[test]
    fn test_windowed_search_with_hint() {
        let frame = FrameBuilder::new(640, 480)
            .background(GYM)
            .disc(300.0, 200.0, 15.0, BAR)
            .build()
            .unwrap();
        let tracker = FrameTracker::new(TrackingConfig {
            search_half_size: 50,
            ..TrackingConfig::default()
        });

        let det = tracker
            .detect(&frame, &signature(), Some(Point2::new(310.0, 190.0)))
            .unwrap();
        assert_eq!(det.scope, SearchScope::Window);
        assert_abs_diff_eq!(det.centroid.x, 300.0, epsilon = 0.5);
    }

    #[test]
    fn test_falls_back_to_full_frame() {
        let frame = FrameBuilder::new(640, 480)
            .background(GYM)
            .disc(500.0, 400.0, 15.0, BAR)
            .build()
            .unwrap();
        let tracker = FrameTracker::new(TrackingConfig {
            search_half_size: 50,
            ..TrackingConfig::default()
        });

        let det = tracker
            .detect(&frame, &signature(), Some(Point2::new(100.0, 100.0)))
            .unwrap();
        assert_eq!(det.scope, SearchScope::FullFrame);
        assert_abs_diff_eq!(det.centroid.x, 500.0, epsilon = 0.5);
        assert_abs_diff_eq!(det.centroid.y, 400.0, epsilon = 0.5);
    }

    #[test]
    fn test_prefers_region_nearest_previous() {
        // Larger look-alike far away, smaller true target near the hint.
        let frame = FrameBuilder::new(640, 480)
            .background(GYM)
            .disc(100.0, 100.0, 30.0, BAR)
            .disc(500.0, 300.0, 10.0, BAR)
            .build()
            .unwrap();
        let tracker = FrameTracker::new(TrackingConfig {
            search_half_size: 1000,
            ..TrackingConfig::default()
        });

        let near = tracker
            .locate(&frame, &signature(), Some(Point2::new(495.0, 305.0)))
            .unwrap();
        assert_abs_diff_eq!(near.x, 500.0, epsilon = 0.5);

        // Without a hint the largest region wins.
        let largest = tracker.locate(&frame, &signature(), None).unwrap();
        assert_abs_diff_eq!(largest.x, 100.0, epsilon = 0.5);
    }

    #[test]
    fn test_window_cut_region_is_regrown() {
        // Plate larger than the window; the hint lags 100 px below it.
        let frame = FrameBuilder::new(800, 800)
            .background(GYM)
            .disc(400.0, 400.0, 150.0, BAR)
            .build()
            .unwrap();
        let tracker = FrameTracker::default();

        let det = tracker
            .detect(&frame, &signature(), Some(Point2::new(400.0, 500.0)))
            .unwrap();
        assert_eq!(det.scope, SearchScope::Window);
        assert_abs_diff_eq!(det.centroid.x, 400.0, epsilon = 0.5);
        assert_abs_diff_eq!(det.centroid.y, 400.0, epsilon = 0.5);

        let disc_area = std::f64::consts::PI * 150.0 * 150.0;
        assert!((det.pixel_count as f64 - disc_area).abs() < 0.01 * disc_area);
    }

    #[test]
    fn test_small_specks_ignored() {
        let frame = FrameBuilder::new(200, 200)
            .background(GYM)
            .rect(50, 50, 3, 3, BAR)
            .build()
            .unwrap();
        assert!(FrameTracker::default().locate(&frame, &signature(), None).is_none());
    }

    #[test]
    fn test_no_match_returns_none() {
        let frame = FrameBuilder::new(200, 200).background(GYM).build().unwrap();
        let tracker = FrameTracker::default();
        assert!(
            tracker
                .locate(&frame, &signature(), Some(Point2::new(100.0, 100.0)))
                .is_none()
        );
    }
}
