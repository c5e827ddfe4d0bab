//! Tap-to-calibrate: derive the tracking color and the pixel scale from a
//! reference object of known size.

use nalgebra::Point2;
use tracing::debug;

use crate::config::CalibrationConfig;
use crate::error::{CalibrationFailure, Error, Result};
use crate::tracker::color::{ColorSignature, Hsv, Tolerance};
use crate::tracker::frame::Frame;
use crate::tracker::region;

/// Pixels per real-world centimeter. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleCalibration {
    pixels_per_cm: f64,
}

impl ScaleCalibration {
    /// Wrap a known scale. Fails on zero, negative or non-finite input.
    pub fn from_pixels_per_cm(pixels_per_cm: f64) -> Result<Self> {
        if !pixels_per_cm.is_finite() || pixels_per_cm <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "scale must be positive and finite, got {pixels_per_cm}"
            )));
        }
        Ok(Self { pixels_per_cm })
    }

    /// Scale from the on-screen radius of the reference blob.
    ///
    /// The reference is measured as blob radius against the plate's nominal
    /// diameter, so a 45 cm plate seen with a 90 px radius gives 2 px/cm.
    pub fn from_blob_radius(radius_px: f64, reference_diameter_cm: f64) -> Result<Self> {
        Self::from_pixels_per_cm(radius_px / reference_diameter_cm)
    }

    /// Pixels per centimeter.
    #[inline]
    pub fn pixels_per_cm(&self) -> f64 {
        self.pixels_per_cm
    }

    /// Convert a pixel distance to centimeters.
    #[inline]
    pub fn px_to_cm(&self, px: f64) -> f64 {
        px / self.pixels_per_cm
    }
}

/// Color signature and scale a recording is collected under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub signature: ColorSignature,
    pub scale: ScaleCalibration,
    /// Centroid of the reference blob at calibration time.
    pub anchor: Point2<f64>,
    pub blob_radius_px: f64,
}

/// Samples a tapped neighborhood and derives a [`Calibration`].
#[derive(Debug, Clone, Default)]
pub struct ColorCalibrator {
    config: CalibrationConfig,
}

impl ColorCalibrator {
    /// Create a calibrator, rejecting an invalid configuration up front.
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Caller guarantees `config` already passed validation.
    pub(crate) fn from_validated(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Get the calibrator configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrate on `frame` around the tap at `(tap_x, tap_y)`.
    ///
    /// Pure function of its inputs. Never falls back to a default scale.
    pub fn calibrate(&self, frame: &Frame, tap_x: f64, tap_y: f64) -> Result<Calibration> {
        let (width, height) = (frame.width(), frame.height());
        if !frame.contains(tap_x, tap_y) {
            return Err(CalibrationFailure::TapOutOfBounds {
                x: tap_x,
                y: tap_y,
                width,
                height,
            }
            .into());
        }

        let x = tap_x.floor() as usize;
        let y = tap_y.floor() as usize;
        let r = self.config.sample_radius;
        if x < r || y < r || x + r >= width || y + r >= height {
            return Err(CalibrationFailure::TapNearEdge { x, y, radius: r }.into());
        }

        let samples = self.sample_disc(frame, x, y);
        let stats = SampleStats::from_samples(&samples, self.config.achromatic_saturation);
        if stats.hue_spread > self.config.max_hue_spread
            || stats.saturation_spread > self.config.max_saturation_spread
            || stats.value_spread > self.config.max_value_spread
        {
            return Err(CalibrationFailure::HighVariance {
                hue_spread: stats.hue_spread,
                saturation_spread: stats.saturation_spread,
                value_spread: stats.value_spread,
            }
            .into());
        }

        let tolerance = Tolerance {
            hue: self.config.hue_tolerance,
            saturation: self.config.saturation_tolerance,
            value: self.config.value_tolerance,
        };
        let signature =
            ColorSignature::new(stats.center, tolerance, self.config.achromatic_saturation);

        let blob = region::flood_from(frame, &signature, (x, y), self.config.max_flood_pixels);
        if blob.is_capped() {
            return Err(CalibrationFailure::BlobTooLarge {
                max_pixels: self.config.max_flood_pixels,
            }
            .into());
        }
        let radius_px = blob.equivalent_radius();
        let max_radius_px = width.min(height) as f64 / 2.0;
        let anchor = match blob.centroid(false) {
            Some(c) if radius_px > 1.0 && radius_px < max_radius_px => c,
            _ => {
                return Err(CalibrationFailure::DegenerateBlob {
                    radius_px,
                    max_radius_px,
                }
                .into());
            }
        };

        let scale =
            ScaleCalibration::from_blob_radius(radius_px, self.config.reference_diameter_cm)?;

        debug!(
            hue = stats.center.hue,
            saturation = stats.center.saturation,
            value = stats.center.value,
            radius_px,
            bounds = ?blob.bounds(),
            pixels_per_cm = scale.pixels_per_cm(),
            "calibrated reference blob"
        );

        Ok(Calibration {
            signature,
            scale,
            anchor,
            blob_radius_px: radius_px,
        })
    }

    fn sample_disc(&self, frame: &Frame, cx: usize, cy: usize) -> Vec<Hsv> {
        let r = self.config.sample_radius as isize;
        let mut samples = Vec::with_capacity((2 * r as usize + 1).pow(2));
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let px = cx.wrapping_add_signed(dx);
                let py = cy.wrapping_add_signed(dy);
                samples.push(Hsv::from_rgb(frame.rgb(px, py)));
            }
        }
        samples
    }
}

/// Robust center and spread of the sampled neighborhood.
struct SampleStats {
    center: Hsv,
    hue_spread: f32,
    saturation_spread: f32,
    value_spread: f32,
}

impl SampleStats {
    fn from_samples(samples: &[Hsv], achromatic_saturation: f32) -> Self {
        let saturations: Vec<f32> = samples.iter().map(|s| s.saturation).collect();
        let values: Vec<f32> = samples.iter().map(|s| s.value).collect();
        let saturation = median(&saturations);
        let value = median(&values);

        // Hue is an angle: average on the unit circle.
        let n = samples.len() as f32;
        let (sin, cos) = samples.iter().fold((0.0f32, 0.0f32), |(s, c), h| {
            let rad = h.hue.to_radians();
            (s + rad.sin(), c + rad.cos())
        });
        let (mean_sin, mean_cos) = (sin / n, cos / n);
        let hue = mean_sin.atan2(mean_cos).to_degrees();
        let resultant = (mean_sin * mean_sin + mean_cos * mean_cos).sqrt().min(1.0);

        let hue_spread = if saturation < achromatic_saturation {
            0.0
        } else if resultant <= f32::EPSILON {
            180.0
        } else {
            (-2.0 * resultant.ln()).max(0.0).sqrt().to_degrees()
        };

        Self {
            center: Hsv::new(hue, saturation, value),
            hue_spread,
            saturation_spread: std_dev(&saturations),
            value_spread: std_dev(&values),
        }
    }
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn std_dev(values: &[f32]) -> f32 {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n).sqrt()
}
