//! Error types for calibration, recording and analysis.

use thiserror::Error;

/// Why a calibration tap was rejected.
///
/// Every variant is recoverable: the caller should prompt for another tap.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationFailure {
    #[error("tap ({x}, {y}) lies outside the {width}x{height} frame")]
    TapOutOfBounds {
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    },

    #[error("tap ({x}, {y}) is within {radius} px of the frame edge")]
    TapNearEdge { x: usize, y: usize, radius: usize },

    #[error("sample around the tap is not a solid color (hue spread {hue_spread:.1}, saturation spread {saturation_spread:.3}, value spread {value_spread:.3})")]
    HighVariance {
        hue_spread: f32,
        saturation_spread: f32,
        value_spread: f32,
    },

    #[error("estimated blob radius {radius_px:.1} px is outside (1, {max_radius_px:.1})")]
    DegenerateBlob { radius_px: f64, max_radius_px: f64 },

    #[error("blob around the tap exceeds the {max_pixels} px flood limit")]
    BlobTooLarge { max_pixels: usize },
}

/// Errors that can occur in the bar-path core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("calibration failed: {0}")]
    CalibrationFailed(#[from] CalibrationFailure),

    #[error("insufficient data: {usable} usable velocity samples")]
    InsufficientData { usable: usize },

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid state: expected {expected}, session is {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for bar-path operations.
pub type Result<T> = std::result::Result<T, Error>;
