//! # barpath-rs
//!
//! On-device velocity-based training: turns a live camera feed into
//! calibrated barbell kinematics, frame by frame, with no server round-trip.
//!
//! Data flows one way: pixels → centroid → trajectory → kinematics.
//!
//! - [`ColorCalibrator`] samples a tapped reference plate and derives a
//!   [`ColorSignature`] plus a [`ScaleCalibration`] in px/cm.
//! - [`FrameTracker`] finds the signature color in each frame, searching a
//!   window around the previous centroid before falling back to the full frame.
//! - [`TrajectoryBuffer`] collects timestamped centroids and seals them into
//!   a read-only [`Trajectory`].
//! - [`KinematicsAnalyzer`] produces velocity, range of motion and reps as a
//!   [`TrackingResult`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use barpath_rs::{VbtSession, FrameOutcome};
//!
//! let mut session = VbtSession::default();
//! session.calibrate(&first_frame, tap_x, tap_y)?;
//! session.begin_recording()?;
//! for (frame, t) in camera {
//!     if let FrameOutcome::TrackingLost { .. } = session.on_frame(&frame, t) {
//!         // show a "bar not visible" hint, keep recording
//!     }
//! }
//! let result = session.end_recording()?;
//! println!("{:.2} m/s over {:.0} cm", result.average_velocity, result.rom_cm);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod integration;
pub mod tracker;

pub use analysis::{
    DroppedPairs, KinematicsAnalyzer, RepSegment, TrackingResult, VelocitySample,
};
pub use config::{AnalysisConfig, CalibrationConfig, TrackingConfig, VbtConfig};
pub use error::{CalibrationFailure, Error, Result};
pub use integration::{
    BarPathPipeline, FrameBuilder, FrameOutcome, FrameSource, PipelineStats, Recording,
    ReplaySource, SessionState, VbtSession,
};
pub use tracker::{
    AppendOutcome, Calibration, Centroid, ColorCalibrator, ColorSignature, Frame, FrameTracker,
    ScaleCalibration, TimedFrame, TrackedPoint, Trajectory, TrajectoryBuffer,
};
