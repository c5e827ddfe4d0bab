//! Trait for frame acquisition backends.

use std::collections::VecDeque;
use std::convert::Infallible;

use crate::tracker::TimedFrame;

/// Capability interface the camera layer implements to feed frames in.
///
/// The core never touches camera APIs directly; a live camera, a decoded
/// video file or an in-memory replay all look the same from here.
///
/// # Example
///
/// ```ignore
/// use barpath_rs::{FrameSource, TimedFrame};
///
/// struct MyCamera {
///     // Your capture handle here
/// }
///
/// impl FrameSource for MyCamera {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<TimedFrame>, Self::Error> {
///         // Grab, convert to RGB8 and timestamp the next frame
///         Ok(None)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error;

    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<TimedFrame>, Self::Error>;
}

/// Replays a fixed list of frames in order.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: VecDeque<TimedFrame>,
}

impl ReplaySource {
    /// Queue `frames` for replay in iteration order.
    pub fn new<I: IntoIterator<Item = TimedFrame>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<TimedFrame>, Self::Error> {
        Ok(self.frames.pop_front())
    }
}
