//! Turning a sealed bar path into real-world kinematics.

mod kinematics;
mod reps;
mod smoothing;

pub use kinematics::{DroppedPairs, KinematicsAnalyzer, TrackingResult, VelocitySample};
pub use reps::{RepSegment, turning_points};
pub use smoothing::moving_average;
