//! Integration module for connecting camera frame sources with the tracker.
//!
//! This module provides the recording handle driven once per frame, the
//! UI-facing session state machine, and utilities for replaying frames.

mod builder;
mod pipeline;
mod recording;
mod session;
mod source;

pub use builder::FrameBuilder;
pub use pipeline::{BarPathPipeline, PipelineStats};
pub use recording::{FrameOutcome, Recording};
pub use session::{SessionState, VbtSession};
pub use source::{FrameSource, ReplaySource};
