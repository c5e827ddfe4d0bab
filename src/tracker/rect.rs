/// Axis-aligned pixel rectangle used as a search window.
///
/// Coordinates are integer pixel indices. The rectangle covers
/// `x..x + width` horizontally and `y..y + height` vertically, so the
/// bottom-right bound is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: usize,
    /// Top-left y coordinate
    pub y: usize,
    /// Width of the window
    pub width: usize,
    /// Height of the window
    pub height: usize,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions.
    #[inline]
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, exclusive bottom-right x, y).
    #[inline]
    pub fn from_tlbr(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }

    /// Rect covering a whole `width` x `height` frame.
    #[inline]
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Square window of side `2 * half_size + 1` centered on `(cx, cy)`,
    /// clipped to a `frame_width` x `frame_height` frame.
    ///
    /// A center outside the frame still yields the clipped overlap, which
    /// may be empty.
    pub fn around(
        cx: f64,
        cy: f64,
        half_size: usize,
        frame_width: usize,
        frame_height: usize,
    ) -> Self {
        let half = half_size as f64;
        let clip = |v: f64, max: usize| v.round().clamp(0.0, max as f64) as usize;
        let x1 = clip(cx - half, frame_width);
        let y1 = clip(cy - half, frame_height);
        let x2 = clip(cx + half + 1.0, frame_width);
        let y2 = clip(cy + half + 1.0, frame_height);
        Self::from_tlbr(x1, y1, x2, y2)
    }

    /// Convert to TLBR format: (x1, y1, x2, y2), bottom-right exclusive.
    #[inline]
    pub fn to_tlbr(&self) -> [usize; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Get the center point of the rectangle.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Get the area of the rectangle in pixels.
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether the rectangle has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Whether pixel `(x, y)` lies inside the rectangle.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Whether `self`, lying inside `window`, reaches a side of `window` that
    /// is not also a side of `frame`. Content there may continue outside.
    pub fn clipped_by(&self, window: &Rect, frame: &Rect) -> bool {
        let [sx1, sy1, sx2, sy2] = self.to_tlbr();
        let [wx1, wy1, wx2, wy2] = window.to_tlbr();
        let [fx1, fy1, fx2, fy2] = frame.to_tlbr();
        (sx1 == wx1 && wx1 > fx1)
            || (sy1 == wy1 && wy1 > fy1)
            || (sx2 == wx2 && wx2 < fx2)
            || (sy2 == wy2 && wy2 < fy2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_by_window_only() {
        let frame = Rect::full(100, 100);
        let window = Rect::new(20, 20, 40, 40);

        assert!(Rect::new(20, 30, 5, 5).clipped_by(&window, &frame));
        assert!(Rect::new(30, 30, 30, 5).clipped_by(&window, &frame));
        assert!(!Rect::new(25, 25, 10, 10).clipped_by(&window, &frame));

        // window sides shared with the frame do not count
        let corner = Rect::new(0, 0, 40, 40);
        assert!(!Rect::new(0, 0, 10, 10).clipped_by(&corner, &frame));
        assert!(Rect::new(0, 0, 40, 10).clipped_by(&corner, &frame));
    }

    #[test]
    fn test_from_tlbr() {
        let rect = Rect::from_tlbr(10, 20, 40, 60);
        assert_eq!(rect, Rect::new(10, 20, 30, 40));
        assert_eq!(rect.to_tlbr(), [10, 20, 40, 60]);
        assert_eq!(rect.area(), 1200);
    }

    #[test]
    fn test_around_inside_frame() {
        let rect = Rect::around(100.0, 100.0, 10, 640, 480);
        assert_eq!(rect.to_tlbr(), [90, 90, 111, 111]);
        assert_eq!(rect.center(), (100.5, 100.5));
        assert!(rect.contains(100, 100));
        assert!(!rect.contains(111, 100));
    }

    #[test]
    fn test_around_clipped_at_corner() {
        let rect = Rect::around(3.0, 470.0, 10, 640, 480);
        assert_eq!(rect.to_tlbr(), [0, 460, 14, 480]);
    }

    #[test]
    fn test_around_outside_frame_is_empty() {
        let rect = Rect::around(-100.0, 50.0, 10, 640, 480);
        assert!(rect.is_empty());
    }
}
