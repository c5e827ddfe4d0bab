//! Rep segmentation by vertical direction reversal.

use crate::analysis::kinematics::VelocitySample;
use crate::tracker::{ScaleCalibration, TrackedPoint};

/// One concentric (upward) phase of the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct RepSegment {
    /// Zero-based position in the set
    pub index: usize,
    /// Seconds from trajectory start
    pub start_time: f64,
    pub end_time: f64,
    /// Vertical travel in centimeters
    pub rom_cm: f64,
    /// Mean smoothed speed over the phase (m/s)
    pub mean_velocity: f64,
    /// Peak smoothed speed over the phase (m/s)
    pub peak_velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    /// Image y decreasing
    Up,
    Down,
}

/// Indices of confirmed vertical extrema, including the first and last.
///
/// A reversal is confirmed only once the bar travels `threshold_px` back
/// from the running extreme, so jitter smaller than that never splits a
/// phase. Returns a single index (or none) when the bar never moves that far.
pub fn turning_points(points: &[TrackedPoint], threshold_px: f64) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut pivots = vec![0];
    let mut trend = None;
    let (mut highest, mut lowest) = (0, 0);
    let mut ext = 0;

    for (i, p) in points.iter().enumerate().skip(1) {
        match trend {
            None => {
                if p.y < points[highest].y {
                    highest = i;
                }
                if p.y > points[lowest].y {
                    lowest = i;
                }
                if points[lowest].y - p.y >= threshold_px {
                    pivots[0] = lowest;
                    trend = Some(Trend::Up);
                    ext = i;
                } else if p.y - points[highest].y >= threshold_px {
                    pivots[0] = highest;
                    trend = Some(Trend::Down);
                    ext = i;
                }
            }
            Some(Trend::Up) => {
                if p.y < points[ext].y {
                    ext = i;
                } else if p.y - points[ext].y >= threshold_px {
                    pivots.push(ext);
                    trend = Some(Trend::Down);
                    ext = i;
                }
            }
            Some(Trend::Down) => {
                if p.y > points[ext].y {
                    ext = i;
                } else if points[ext].y - p.y >= threshold_px {
                    pivots.push(ext);
                    trend = Some(Trend::Up);
                    ext = i;
                }
            }
        }
    }

    if trend.is_some() {
        pivots.push(ext);
    }
    pivots
}

/// Split `points` into concentric reps of at least `min_displacement_cm`.
pub(crate) fn segment(
    points: &[TrackedPoint],
    profile: &[VelocitySample],
    scale: &ScaleCalibration,
    min_displacement_cm: f64,
) -> Vec<RepSegment> {
    let Some(origin) = points.first().map(|p| p.t) else {
        return Vec::new();
    };
    let threshold_px = min_displacement_cm * scale.pixels_per_cm();
    let pivots = turning_points(points, threshold_px);

    pivots
        .windows(2)
        .filter_map(|w| {
            let (a, b) = (&points[w[0]], &points[w[1]]);
            let rise_px = a.y - b.y;
            (rise_px >= threshold_px).then_some((a, b, rise_px))
        })
        .enumerate()
        .map(|(index, (a, b, rise_px))| {
            let start_time = a.t - origin;
            let end_time = b.t - origin;
            let speeds: Vec<f64> = profile
                .iter()
                .filter(|s| s.time > start_time && s.time <= end_time)
                .map(|s| s.velocity)
                .collect();
            let rom_cm = scale.px_to_cm(rise_px);
            let mean_velocity = if speeds.is_empty() {
                rom_cm / 100.0 / (end_time - start_time)
            } else {
                speeds.iter().sum::<f64>() / speeds.len() as f64
            };
            let peak_velocity = speeds.iter().copied().fold(mean_velocity, f64::max);
            RepSegment {
                index,
                start_time,
                end_time,
                rom_cm,
                mean_velocity,
                peak_velocity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Vertical positions sampled at 10 Hz.
    fn path(ys: &[f64]) -> Vec<TrackedPoint> {
        ys.iter()
            .enumerate()
            .map(|(i, &y)| TrackedPoint::new(100.0, y, i as f64 * 0.1))
            .collect()
    }

    #[test]
    fn test_turning_points_zigzag() {
        let pts = path(&[100.0, 120.0, 140.0, 130.0, 90.0, 60.0, 65.0, 100.0, 140.0]);
        assert_eq!(turning_points(&pts, 15.0), vec![0, 2, 5, 8]);
    }

    #[test]
    fn test_jitter_does_not_split() {
        let pts = path(&[100.0, 102.0, 99.0, 101.0, 98.0]);
        assert_eq!(turning_points(&pts, 10.0), vec![0]);
    }

    #[test]
    fn test_start_pivot_moves_to_true_extreme() {
        // Small dip before the press starts.
        let pts = path(&[100.0, 104.0, 108.0, 80.0, 50.0]);
        assert_eq!(turning_points(&pts, 15.0), vec![2, 4]);
    }

    #[test]
    fn test_segment_counts_concentric_phases() {
        // Two reps: down, up, down, up.
        let pts = path(&[
            100.0, 140.0, 180.0, 220.0, 180.0, 140.0, 100.0, 140.0, 180.0, 220.0, 160.0, 100.0,
        ]);
        let scale = ScaleCalibration::from_pixels_per_cm(2.0).unwrap();
        let profile: Vec<VelocitySample> = (1..pts.len())
            .map(|i| VelocitySample {
                time: pts[i].t - pts[0].t,
                velocity: 1.0,
            })
            .collect();

        let reps = segment(&pts, &profile, &scale, 5.0);
        assert_eq!(reps.len(), 2);
        assert_eq!(reps[0].index, 0);
        assert!((reps[0].rom_cm - 60.0).abs() < 1e-9);
        assert!((reps[0].start_time - 0.3).abs() < 1e-9);
        assert!((reps[0].end_time - 0.6).abs() < 1e-9);
        assert!((reps[1].mean_velocity - 1.0).abs() < 1e-9);
        assert!((reps[1].rom_cm - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_descent_only_has_no_reps() {
        let pts = path(&[100.0, 150.0, 200.0]);
        let scale = ScaleCalibration::from_pixels_per_cm(1.0).unwrap();
        assert!(segment(&pts, &[], &scale, 5.0).is_empty());
    }
}
