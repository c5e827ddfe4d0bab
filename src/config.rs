//! Tunable thresholds for calibration, tracking and analysis.
//!
//! Every constant below is a default only; the structs accept partial JSON
//! overrides so a camera/lighting setup can be tuned without recompiling.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Radius of the neighborhood sampled around the calibration tap.
pub const DEFAULT_SAMPLE_RADIUS: usize = 6;
/// Diameter of a standard bumper plate.
pub const DEFAULT_REFERENCE_DIAMETER_CM: f64 = 45.0;
pub const DEFAULT_HUE_TOLERANCE: f32 = 18.0;
pub const DEFAULT_SATURATION_TOLERANCE: f32 = 0.30;
pub const DEFAULT_VALUE_TOLERANCE: f32 = 0.35;
pub const DEFAULT_MAX_HUE_SPREAD: f32 = 12.0;
pub const DEFAULT_MAX_SATURATION_SPREAD: f32 = 0.12;
pub const DEFAULT_MAX_VALUE_SPREAD: f32 = 0.12;
/// Below this saturation hue is noise and is ignored when matching.
pub const DEFAULT_ACHROMATIC_SATURATION: f32 = 0.15;
/// Covers a whole 4K frame, so only a pathological config truncates a blob.
pub const DEFAULT_MAX_FLOOD_PIXELS: usize = 1 << 23;

/// Half the side of the windowed search around the previous centroid.
pub const DEFAULT_SEARCH_HALF_SIZE: usize = 200;
pub const DEFAULT_MIN_REGION_PIXELS: usize = 20;
pub const DEFAULT_MAX_MISSED_FRAMES: u32 = 10;

/// Instantaneous speeds above this are treated as tracking glitches.
pub const DEFAULT_VELOCITY_CEILING_MPS: f64 = 5.0;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;
pub const DEFAULT_MIN_REP_DISPLACEMENT_CM: f64 = 5.0;

pub const DEFAULT_RECENT_WINDOW: usize = 60;

/// Configuration for [`ColorCalibrator`](crate::ColorCalibrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub sample_radius: usize,
    pub reference_diameter_cm: f64,
    pub hue_tolerance: f32,
    pub saturation_tolerance: f32,
    pub value_tolerance: f32,
    pub max_hue_spread: f32,
    pub max_saturation_spread: f32,
    pub max_value_spread: f32,
    pub achromatic_saturation: f32,
    pub max_flood_pixels: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sample_radius: DEFAULT_SAMPLE_RADIUS,
            reference_diameter_cm: DEFAULT_REFERENCE_DIAMETER_CM,
            hue_tolerance: DEFAULT_HUE_TOLERANCE,
            saturation_tolerance: DEFAULT_SATURATION_TOLERANCE,
            value_tolerance: DEFAULT_VALUE_TOLERANCE,
            max_hue_spread: DEFAULT_MAX_HUE_SPREAD,
            max_saturation_spread: DEFAULT_MAX_SATURATION_SPREAD,
            max_value_spread: DEFAULT_MAX_VALUE_SPREAD,
            achromatic_saturation: DEFAULT_ACHROMATIC_SATURATION,
            max_flood_pixels: DEFAULT_MAX_FLOOD_PIXELS,
        }
    }
}

/// Configuration for [`FrameTracker`](crate::FrameTracker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub search_half_size: usize,
    pub min_region_pixels: usize,
    /// Consecutive misses tolerated before the session reports tracking lost.
    pub max_missed_frames: u32,
    pub confidence_weighted: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            search_half_size: DEFAULT_SEARCH_HALF_SIZE,
            min_region_pixels: DEFAULT_MIN_REGION_PIXELS,
            max_missed_frames: DEFAULT_MAX_MISSED_FRAMES,
            confidence_weighted: true,
        }
    }
}

/// Configuration for [`KinematicsAnalyzer`](crate::KinematicsAnalyzer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub velocity_ceiling_mps: f64,
    /// Centered moving-average width; must be odd.
    pub smoothing_window: usize,
    pub min_rep_displacement_cm: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            velocity_ceiling_mps: DEFAULT_VELOCITY_CEILING_MPS,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            min_rep_displacement_cm: DEFAULT_MIN_REP_DISPLACEMENT_CM,
        }
    }
}

/// Top-level configuration for a recording session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VbtConfig {
    pub calibration: CalibrationConfig,
    pub tracking: TrackingConfig,
    pub analysis: AnalysisConfig,
    /// Number of trailing points kept for the live overlay.
    pub recent_window: usize,
}

impl Default for VbtConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            tracking: TrackingConfig::default(),
            analysis: AnalysisConfig::default(),
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }
}

impl VbtConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section; the first violation wins.
    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()?;
        self.tracking.validate()?;
        self.analysis.validate()?;
        if self.recent_window == 0 {
            return Err(invalid("recent_window must be positive"));
        }
        Ok(())
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_radius == 0 {
            return Err(invalid("calibration.sample_radius must be positive"));
        }
        positive("calibration.reference_diameter_cm", self.reference_diameter_cm)?;
        for (name, value) in [
            ("calibration.hue_tolerance", self.hue_tolerance),
            ("calibration.saturation_tolerance", self.saturation_tolerance),
            ("calibration.value_tolerance", self.value_tolerance),
            ("calibration.max_hue_spread", self.max_hue_spread),
            ("calibration.max_saturation_spread", self.max_saturation_spread),
            ("calibration.max_value_spread", self.max_value_spread),
        ] {
            positive(name, f64::from(value))?;
        }
        if !(0.0..=1.0).contains(&self.achromatic_saturation) {
            return Err(invalid("calibration.achromatic_saturation must lie in [0, 1]"));
        }
        if self.max_flood_pixels == 0 {
            return Err(invalid("calibration.max_flood_pixels must be positive"));
        }
        Ok(())
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.search_half_size == 0 {
            return Err(invalid("tracking.search_half_size must be positive"));
        }
        if self.min_region_pixels == 0 {
            return Err(invalid("tracking.min_region_pixels must be positive"));
        }
        Ok(())
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        positive("analysis.velocity_ceiling_mps", self.velocity_ceiling_mps)?;
        positive("analysis.min_rep_displacement_cm", self.min_rep_displacement_cm)?;
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(invalid("analysis.smoothing_window must be odd"));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{name} must be positive and finite, got {value}")))
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidConfig(msg.to_string())
}
