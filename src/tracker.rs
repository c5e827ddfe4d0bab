mod calibrator;
mod color;
mod frame;
mod frame_tracker;
mod rect;
mod region;
mod track_state;
mod trajectory;

pub use calibrator::{Calibration, ColorCalibrator, ScaleCalibration};
pub use color::{ColorSignature, Hsv, Tolerance, hue_distance};
pub use frame::{Frame, TimedFrame};
pub use frame_tracker::{Centroid, Detection, FrameTracker, SearchScope};
pub use rect::Rect;
pub use region::{Region, flood_from, label_regions};
pub use track_state::BufferState;
pub use trajectory::{AppendOutcome, TrackedPoint, Trajectory, TrajectoryBuffer};
