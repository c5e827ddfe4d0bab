//! HSV color model and the calibrated tracking signature.

/// Color in HSV space: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Hsv {
    /// Hue in degrees is wrapped into `[0, 360)`.
    pub fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            value,
        }
    }

    /// Convert an RGB8 triple.
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let r = rgb[0] as f32 / 255.0;
        let g = rgb[1] as f32 / 255.0;
        let b = rgb[2] as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta <= f32::EPSILON {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max <= f32::EPSILON { 0.0 } else { delta / max };

        Self::new(hue, saturation, max)
    }
}

/// Shortest angular distance between two hues, in degrees `[0, 180]`.
#[inline]
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Per-channel tolerance radii around a signature center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

/// The color a session tracks, fixed at calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSignature {
    center: Hsv,
    tolerance: Tolerance,
    /// Hue is ignored for near-gray centers.
    hue_significant: bool,
}

impl ColorSignature {
    /// Create a signature around `center`.
    pub fn new(center: Hsv, tolerance: Tolerance, achromatic_saturation: f32) -> Self {
        Self {
            center,
            tolerance,
            hue_significant: center.saturation >= achromatic_saturation,
        }
    }

    /// Calibrated color.
    pub fn center(&self) -> Hsv {
        self.center
    }

    /// Per-channel match tolerance.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Match confidence in `[0, 1]`, or `None` when any channel is out of tolerance.
    ///
    /// Confidence is one minus the worst normalized channel distance, so a
    /// pixel exactly at the center scores 1.
    #[inline]
    pub fn confidence(&self, hsv: Hsv) -> Option<f32> {
        let ds = (hsv.saturation - self.center.saturation).abs() / self.tolerance.saturation;
        let dv = (hsv.value - self.center.value).abs() / self.tolerance.value;
        let mut worst = ds.max(dv);
        if self.hue_significant {
            worst = worst.max(hue_distance(hsv.hue, self.center.hue) / self.tolerance.hue);
        }
        if worst > 1.0 { None } else { Some(1.0 - worst) }
    }

    /// [`confidence`](Self::confidence) for an RGB8 pixel.
    #[inline]
    pub fn matches_rgb(&self, rgb: [u8; 3]) -> Option<f32> {
        self.confidence(Hsv::from_rgb(rgb))
    }
}
