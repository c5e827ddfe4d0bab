//! Builder for synthetic frames used in replay, tests and benchmarks.

use crate::error::Result;
use crate::tracker::Frame;

#[derive(Debug, Clone, Copy)]
enum Shape {
    Disc {
        cx: f64,
        cy: f64,
        radius: f64,
        rgb: [u8; 3],
    },
    Rect {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        rgb: [u8; 3],
    },
}

/// Builder for `Frame` objects painted from simple shapes.
///
/// Shapes are painted in insertion order over the background and clipped
/// to the frame. Pixel `(x, y)` belongs to a disc when its integer
/// coordinate lies within `radius` of the center.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    width: usize,
    height: usize,
    background: [u8; 3],
    shapes: Vec<Shape>,
}

impl FrameBuilder {
    /// Create a new builder for a `width` x `height` frame on a black background.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            background: [0, 0, 0],
            shapes: Vec::new(),
        }
    }

    /// Set the background color.
    pub fn background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    /// Paint a filled disc centered at `(cx, cy)`.
    pub fn disc(mut self, cx: f64, cy: f64, radius: f64, rgb: [u8; 3]) -> Self {
        self.shapes.push(Shape::Disc {
            cx,
            cy,
            radius,
            rgb,
        });
        self
    }

    /// Paint a filled rectangle in TLWH format.
    pub fn rect(mut self, x: usize, y: usize, width: usize, height: usize, rgb: [u8; 3]) -> Self {
        self.shapes.push(Shape::Rect {
            x,
            y,
            width,
            height,
            rgb,
        });
        self
    }

    /// Build the final `Frame`.
    pub fn build(self) -> Result<Frame> {
        let mut frame = Frame::filled(self.width, self.height, self.background)?;
        for shape in &self.shapes {
            match *shape {
                Shape::Disc {
                    cx,
                    cy,
                    radius,
                    rgb,
                } => {
                    let clip = |v: f64, max: usize| v.clamp(0.0, max as f64) as usize;
                    let x1 = clip((cx - radius).floor(), self.width);
                    let x2 = clip((cx + radius).ceil() + 1.0, self.width);
                    let y1 = clip((cy - radius).floor(), self.height);
                    let y2 = clip((cy + radius).ceil() + 1.0, self.height);
                    let r2 = radius * radius;
                    for y in y1..y2 {
                        for x in x1..x2 {
                            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
                            if dx * dx + dy * dy <= r2 {
                                frame.set_rgb(x, y, rgb);
                            }
                        }
                    }
                }
                Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                    rgb,
                } => {
                    for py in y..(y + height).min(self.height) {
                        for px in x..(x + width).min(self.width) {
                            frame.set_rgb(px, py, rgb);
                        }
                    }
                }
            }
        }
        Ok(frame)
    }
}
