//! Pixel buffers handed to the tracker by the camera layer.

use ndarray::Array3;

use crate::error::{Error, Result};

/// Owned RGB8 frame stored as `(height, width, 3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    /// Create a frame filled with a single color.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Result<Self> {
        check_dims(width, height)?;
        let pixels = Array3::from_shape_fn((height, width, 3), |(_, _, c)| rgb[c]);
        Ok(Self { pixels })
    }

    /// Create a frame from tightly packed RGB8 bytes.
    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        check_dims(width, height)?;
        check_len(width, height, 3, data.len())?;
        let pixels = Array3::from_shape_vec((height, width, 3), data)
            .map_err(|e| Error::InvalidFrame(e.to_string()))?;
        Ok(Self { pixels })
    }

    /// Create a frame from tightly packed RGBA8 bytes. Alpha is discarded.
    pub fn from_rgba(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        check_dims(width, height)?;
        check_len(width, height, 4, data.len())?;
        let pixels = Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
            data[(y * width + x) * 4 + c]
        });
        Ok(Self { pixels })
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Color at `(x, y)`. Callers guarantee the coordinate is in bounds.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
        ]
    }

    /// Overwrite the color at `(x, y)`.
    #[inline]
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        for (c, v) in rgb.into_iter().enumerate() {
            self.pixels[[y, x, c]] = v;
        }
    }

    /// Whether a sub-pixel coordinate falls inside the frame.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width() as f64 && y < self.height() as f64
    }
}

/// A frame paired with its monotonic capture time in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFrame {
    pub frame: Frame,
    pub timestamp: f64,
}

impl TimedFrame {
    /// Pair a frame with its capture time in seconds.
    pub fn new(frame: Frame, timestamp: f64) -> Self {
        Self { frame, timestamp }
    }
}

fn check_dims(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidFrame(format!(
            "frame dimensions must be non-zero, got {width}x{height}"
        )));
    }
    Ok(())
}

fn check_len(width: usize, height: usize, channels: usize, len: usize) -> Result<()> {
    let expected = width * height * channels;
    if len != expected {
        return Err(Error::InvalidFrame(format!(
            "expected {expected} bytes for {width}x{height}x{channels}, got {len}"
        )));
    }
    Ok(())
}
