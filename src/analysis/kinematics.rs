//! Velocity, range of motion and rep figures from a sealed trajectory.

use tracing::{debug, warn};

use crate::analysis::reps::{self, RepSegment};
use crate::analysis::smoothing::moving_average;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::tracker::{ScaleCalibration, TrackedPoint, Trajectory};

const CM_PER_M: f64 = 100.0;

/// One point of the velocity profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    /// Seconds since the first trajectory point
    pub time: f64,
    /// Smoothed speed in m/s
    pub velocity: f64,
}

/// Point pairs left out of the velocity profile, by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroppedPairs {
    /// Pairs whose timestamps did not increase
    pub non_increasing_time: usize,
    /// Pairs whose implied speed exceeded the velocity ceiling
    pub over_ceiling: usize,
}

impl DroppedPairs {
    /// Total pairs dropped for any cause.
    pub fn total(&self) -> usize {
        self.non_increasing_time + self.over_ceiling
    }
}

/// Sealed output of one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingResult {
    /// Mean of the smoothed velocity profile (m/s)
    pub average_velocity: f64,
    /// Largest smoothed velocity magnitude (m/s)
    pub peak_velocity: f64,
    /// Vertical extent of the usable path (cm)
    pub rom_cm: f64,
    pub velocity_profile: Vec<VelocitySample>,
    /// Raw point sequence for path rendering
    pub points: Trajectory,
    pub reps: Vec<RepSegment>,
    pub dropped_pairs: DroppedPairs,
}

/// Converts a pixel-space trajectory into real-world kinematics.
#[derive(Debug, Clone, Default)]
pub struct KinematicsAnalyzer {
    config: AnalysisConfig,
}

impl KinematicsAnalyzer {
    /// Create an analyzer with the given thresholds.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Get the analyzer configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a sealed trajectory under `scale`.
    ///
    /// Pairs with `dt <= 0` or an implied speed above the ceiling are dropped,
    /// not clamped. Fails with [`Error::InsufficientData`] when no pair survives.
    pub fn analyze(&self, trajectory: &Trajectory, scale: &ScaleCalibration) -> Result<TrackingResult> {
        let Some(origin) = trajectory.first().map(|p| p.t) else {
            return Err(Error::InsufficientData { usable: 0 });
        };

        let mut times = Vec::with_capacity(trajectory.len());
        let mut speeds = Vec::with_capacity(trajectory.len());
        let mut usable: Vec<TrackedPoint> = Vec::with_capacity(trajectory.len());
        let mut dropped_pairs = DroppedPairs::default();

        for pair in trajectory.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let dt = b.t - a.t;
            if dt <= 0.0 {
                dropped_pairs.non_increasing_time += 1;
                continue;
            }
            let distance_cm = scale.px_to_cm(nalgebra::distance(&a.position(), &b.position()));
            let speed = distance_cm / CM_PER_M / dt;
            if !speed.is_finite() || speed > self.config.velocity_ceiling_mps {
                dropped_pairs.over_ceiling += 1;
                continue;
            }

            if usable.last() != Some(&a) {
                usable.push(a);
            }
            usable.push(b);
            times.push(b.t - origin);
            speeds.push(speed);
        }

        if dropped_pairs.non_increasing_time > 0 {
            warn!(
                pairs = dropped_pairs.non_increasing_time,
                "dropped point pairs with non-increasing timestamps"
            );
        }
        if dropped_pairs.over_ceiling > 0 {
            warn!(
                pairs = dropped_pairs.over_ceiling,
                ceiling = self.config.velocity_ceiling_mps,
                "dropped point pairs above the velocity ceiling"
            );
        }
        if speeds.is_empty() {
            return Err(Error::InsufficientData { usable: 0 });
        }

        let smoothed = moving_average(&speeds, self.config.smoothing_window);
        let average_velocity = smoothed.iter().sum::<f64>() / smoothed.len() as f64;
        let peak_velocity = smoothed.iter().map(|v| v.abs()).fold(0.0, f64::max);

        let (min_y, max_y) = usable
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let rom_cm = scale.px_to_cm(max_y - min_y);

        let velocity_profile: Vec<VelocitySample> = times
            .into_iter()
            .zip(smoothed)
            .map(|(time, velocity)| VelocitySample { time, velocity })
            .collect();

        let reps = reps::segment(
            &usable,
            &velocity_profile,
            scale,
            self.config.min_rep_displacement_cm,
        );

        debug!(
            samples = velocity_profile.len(),
            average_velocity,
            peak_velocity,
            rom_cm,
            reps = reps.len(),
            "analyzed trajectory"
        );

        Ok(TrackingResult {
            average_velocity,
            peak_velocity,
            rom_cm,
            velocity_profile,
            points: trajectory.clone(),
            reps,
            dropped_pairs,
        })
    }
}
