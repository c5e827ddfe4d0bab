//! BarPathPipeline for draining a frame source through a recording.

use crate::analysis::TrackingResult;
use crate::error::Result;
use crate::integration::recording::{FrameOutcome, Recording};

use super::FrameSource;

/// Per-run tallies of frame outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: usize,
    pub tracked: usize,
    pub held: usize,
    pub missed: usize,
    pub lost: usize,
    pub rejected: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Tracked(_) => self.tracked += 1,
            FrameOutcome::Held { .. } => self.held += 1,
            FrameOutcome::Missed { .. } => self.missed += 1,
            FrameOutcome::TrackingLost { .. } => self.lost += 1,
            FrameOutcome::Rejected(_) | FrameOutcome::NotRecording => self.rejected += 1,
        }
    }
}

/// Bundles a `FrameSource` with an active `Recording`.
///
/// Useful for file replay and offline analysis; a live camera layer would
/// usually call [`Recording::on_frame`] directly from its frame callback.
pub struct BarPathPipeline<S: FrameSource> {
    source: S,
    recording: Recording,
    stats: PipelineStats,
}

impl<S: FrameSource> BarPathPipeline<S> {
    /// Create a new pipeline feeding `source` into `recording`.
    pub fn new(source: S, recording: Recording) -> Self {
        Self {
            source,
            recording,
            stats: PipelineStats::default(),
        }
    }

    /// Pull and process one frame. `Ok(None)` once the source is exhausted.
    pub fn process_next(&mut self) -> std::result::Result<Option<FrameOutcome>, S::Error> {
        let Some(timed) = self.source.next_frame()? else {
            return Ok(None);
        };
        let outcome = self.recording.on_frame(&timed.frame, timed.timestamp);
        self.stats.record(&outcome);
        Ok(Some(outcome))
    }

    /// Process frames until the source is exhausted.
    pub fn run_to_end(&mut self) -> std::result::Result<PipelineStats, S::Error> {
        while self.process_next()?.is_some() {}
        Ok(self.stats)
    }

    /// Tallies so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the active recording.
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Seal the recording and analyze it.
    pub fn finish(self) -> Result<TrackingResult> {
        self.recording.finish()
    }
}
