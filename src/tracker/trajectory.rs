//! Append-only, timestamped bar path for one recording.

use std::ops::Deref;
use std::sync::Arc;

use nalgebra::Point2;

use crate::tracker::track_state::BufferState;

/// One tracked centroid: pixel position plus monotonic time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPoint {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

impl TrackedPoint {
    /// Create a point at pixel `(x, y)` and time `t` seconds.
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    /// Pixel position as a point.
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Sealed, read-only point sequence. Cloning shares the underlying storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    points: Arc<[TrackedPoint]>,
}

impl Trajectory {
    /// Build a trajectory directly from points, keeping only those with
    /// strictly increasing timestamps.
    pub fn from_points<I: IntoIterator<Item = TrackedPoint>>(points: I) -> Self {
        let mut buffer = TrajectoryBuffer::new();
        for p in points {
            buffer.push(p);
        }
        buffer.seal()
    }

    /// Wrap points as-is, skipping the ordering checks.
    #[cfg(test)]
    pub(crate) fn from_unchecked(points: Vec<TrackedPoint>) -> Self {
        Self {
            points: points.into(),
        }
    }

    /// All points in recording order.
    pub fn points(&self) -> &[TrackedPoint] {
        &self.points
    }

    /// Seconds between the first and last point.
    pub fn duration(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => b.t - a.t,
            _ => 0.0,
        }
    }

    /// True when both handles share the same sealed storage.
    pub fn same_storage(&self, other: &Trajectory) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}

impl Deref for Trajectory {
    type Target = [TrackedPoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

/// Result of offering a point to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Accepted,
    /// Timestamp not strictly after the last point, or not finite.
    NonMonotonic,
    /// Buffer already sealed.
    Sealed,
}

/// Collects points while recording; `Empty -> Recording -> Sealed`.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryBuffer {
    points: Vec<TrackedPoint>,
    sealed: Option<Trajectory>,
}

impl TrajectoryBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle state, derived from contents and seal.
    pub fn state(&self) -> BufferState {
        if self.sealed.is_some() {
            BufferState::Sealed
        } else if self.points.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Recording
        }
    }

    /// Append a point. Rejects non-finite values, timestamps not strictly
    /// after the last point, and anything once sealed.
    pub fn push(&mut self, point: TrackedPoint) -> AppendOutcome {
        if self.sealed.is_some() {
            return AppendOutcome::Sealed;
        }
        if !(point.t.is_finite() && point.x.is_finite() && point.y.is_finite()) {
            return AppendOutcome::NonMonotonic;
        }
        if self.points.last().is_some_and(|last| point.t <= last.t) {
            return AppendOutcome::NonMonotonic;
        }
        self.points.push(point);
        AppendOutcome::Accepted
    }

    /// Number of points held, sealed or not.
    pub fn len(&self) -> usize {
        self.sealed
            .as_ref()
            .map_or(self.points.len(), |t| t.points.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent point.
    pub fn last(&self) -> Option<&TrackedPoint> {
        match &self.sealed {
            Some(t) => t.points.last(),
            None => self.points.last(),
        }
    }

    /// The trailing `n` points, for live overlays. Does not affect the buffer.
    pub fn recent(&self, n: usize) -> &[TrackedPoint] {
        let all: &[TrackedPoint] = match &self.sealed {
            Some(t) => &t.points,
            None => &self.points,
        };
        &all[all.len().saturating_sub(n)..]
    }

    /// Seal the buffer and return the full trajectory.
    ///
    /// Sealing again returns the same trajectory.
    pub fn seal(&mut self) -> Trajectory {
        if let Some(t) = &self.sealed {
            return t.clone();
        }
        let trajectory = Trajectory {
            points: std::mem::take(&mut self.points).into(),
        };
        self.sealed = Some(trajectory.clone());
        trajectory
    }
}
