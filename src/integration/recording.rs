//! One recording: per-frame tracking into a trajectory buffer, then analysis.

use tracing::{debug, trace, warn};

use crate::analysis::{KinematicsAnalyzer, TrackingResult};
use crate::config::VbtConfig;
use crate::error::Result;
use crate::tracker::{
    AppendOutcome, BufferState, Calibration, Centroid, Frame, FrameTracker, TrackedPoint,
    Trajectory, TrajectoryBuffer,
};

/// What happened to one frame handed to [`Recording::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Centroid found and appended.
    Tracked(TrackedPoint),
    /// No centroid; the last known one was appended at this timestamp.
    Held { point: TrackedPoint, missed: u32 },
    /// No centroid and nothing to hold yet in this recording.
    Missed { missed: u32 },
    /// More consecutive misses than tolerated. Recording continues; nothing appended.
    TrackingLost { missed: u32 },
    /// Frame refused by the buffer (stale timestamp or already sealed).
    Rejected(AppendOutcome),
    /// Frame arrived while no recording was active.
    NotRecording,
}

/// Handle for an active recording under a fixed calibration.
///
/// Frames must be fed synchronously, at most once per physical frame.
#[derive(Debug, Clone)]
pub struct Recording {
    calibration: Calibration,
    tracker: FrameTracker,
    analyzer: KinematicsAnalyzer,
    buffer: TrajectoryBuffer,
    last_centroid: Option<Centroid>,
    missed: u32,
    max_missed: u32,
    recent_window: usize,
}

impl Recording {
    /// Start collecting a bar path under `calibration`.
    ///
    /// The first frame is searched around the calibration blob.
    pub fn begin(calibration: Calibration, config: &VbtConfig) -> Self {
        debug!(
            pixels_per_cm = calibration.scale.pixels_per_cm(),
            "recording started"
        );
        Self {
            calibration,
            tracker: FrameTracker::new(config.tracking.clone()),
            analyzer: KinematicsAnalyzer::new(config.analysis.clone()),
            buffer: TrajectoryBuffer::new(),
            last_centroid: None,
            missed: 0,
            max_missed: config.tracking.max_missed_frames,
            recent_window: config.recent_window,
        }
    }

    /// Calibration this recording was started under.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Track `frame` and append the result.
    ///
    /// Never fails: misses degrade to holding the last centroid, and past
    /// the tolerated bound to a [`FrameOutcome::TrackingLost`] warning.
    pub fn on_frame(&mut self, frame: &Frame, timestamp: f64) -> FrameOutcome {
        if let Some(rejected) = self.precheck(timestamp) {
            return FrameOutcome::Rejected(rejected);
        }

        let hint = Some(self.last_centroid.unwrap_or(self.calibration.anchor));
        if let Some(c) = self
            .tracker
            .locate(frame, &self.calibration.signature, hint)
        {
            if self.missed > self.max_missed {
                debug!(missed = self.missed, "tracking reacquired");
            }
            self.missed = 0;
            self.last_centroid = Some(c);
            let point = TrackedPoint::new(c.x, c.y, timestamp);
            trace!(x = c.x, y = c.y, t = timestamp, "tracked");
            return match self.buffer.push(point) {
                AppendOutcome::Accepted => FrameOutcome::Tracked(point),
                other => FrameOutcome::Rejected(other),
            };
        }

        self.missed = self.missed.saturating_add(1);
        if self.missed > self.max_missed {
            if self.missed == self.max_missed + 1 {
                warn!(
                    missed = self.missed,
                    bound = self.max_missed,
                    "tracking lost"
                );
            }
            return FrameOutcome::TrackingLost {
                missed: self.missed,
            };
        }

        match self.last_centroid {
            Some(c) => {
                let point = TrackedPoint::new(c.x, c.y, timestamp);
                match self.buffer.push(point) {
                    AppendOutcome::Accepted => FrameOutcome::Held {
                        point,
                        missed: self.missed,
                    },
                    other => FrameOutcome::Rejected(other),
                }
            }
            None => FrameOutcome::Missed {
                missed: self.missed,
            },
        }
    }

    fn precheck(&self, timestamp: f64) -> Option<AppendOutcome> {
        if self.buffer.state() == BufferState::Sealed {
            return Some(AppendOutcome::Sealed);
        }
        let stale = self.buffer.last().is_some_and(|p| timestamp <= p.t);
        (stale || !timestamp.is_finite()).then_some(AppendOutcome::NonMonotonic)
    }

    /// True while the miss run exceeds the tolerated bound.
    pub fn is_tracking_lost(&self) -> bool {
        self.missed > self.max_missed
    }

    /// Points collected so far, held points included.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Trailing points for the live overlay.
    pub fn recent(&self) -> &[TrackedPoint] {
        self.buffer.recent(self.recent_window)
    }

    /// Stop accepting frames. Idempotent.
    pub fn seal(&mut self) -> Trajectory {
        self.buffer.seal()
    }

    /// Seal and analyze.
    pub fn finish(mut self) -> Result<TrackingResult> {
        let trajectory = self.seal();
        debug!(points = trajectory.len(), "recording finished");
        self.analyzer.analyze(&trajectory, &self.calibration.scale)
    }
}
