//! UI-facing state machine: idle, calibrated, recording.

use tracing::{debug, info};

use crate::analysis::TrackingResult;
use crate::config::VbtConfig;
use crate::error::{Error, Result};
use crate::integration::recording::{FrameOutcome, Recording};
use crate::tracker::{Calibration, ColorCalibrator, Frame, TrackedPoint};

/// Where the session is in `Idle -> Ready -> Recording -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No calibration yet
    #[default]
    Idle,
    /// Calibrated, waiting for start
    Ready,
    /// Accepting frames
    Recording,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Recording => "recording",
        }
    }
}

/// Owns one camera's calibration and recording.
///
/// Every failure leaves the session in a state the user can retry from.
#[derive(Debug, Clone)]
pub struct VbtSession {
    config: VbtConfig,
    calibrator: ColorCalibrator,
    calibration: Option<Calibration>,
    recording: Option<Recording>,
}

impl VbtSession {
    /// Create an idle session, validating `config` first.
    pub fn new(config: VbtConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Create an idle session with the default configuration.
    pub fn with_default_config() -> Self {
        Self::from_validated(VbtConfig::default())
    }

    fn from_validated(config: VbtConfig) -> Self {
        Self {
            calibrator: ColorCalibrator::from_validated(config.calibration.clone()),
            config,
            calibration: None,
            recording: None,
        }
    }

    /// Current lifecycle state, derived from what the session holds.
    pub fn state(&self) -> SessionState {
        match (&self.calibration, &self.recording) {
            (_, Some(_)) => SessionState::Recording,
            (Some(_), None) => SessionState::Ready,
            (None, None) => SessionState::Idle,
        }
    }

    /// Get the session configuration.
    pub fn config(&self) -> &VbtConfig {
        &self.config
    }

    /// Active calibration, if any.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Calibrate from a tap. A failed tap keeps any previous calibration.
    pub fn calibrate(&mut self, frame: &Frame, tap_x: f64, tap_y: f64) -> Result<Calibration> {
        self.expect_not_recording("idle or ready")?;
        let calibration = self.calibrator.calibrate(frame, tap_x, tap_y)?;
        self.calibration = Some(calibration);
        info!(
            pixels_per_cm = calibration.scale.pixels_per_cm(),
            "session calibrated"
        );
        Ok(calibration)
    }

    /// Start a recording under the current calibration.
    ///
    /// Fails with [`Error::InvalidState`] when uncalibrated or already recording.
    pub fn begin_recording(&mut self) -> Result<()> {
        let Some(calibration) = self.calibration else {
            return Err(self.invalid_state("ready"));
        };
        self.expect_not_recording("ready")?;
        self.recording = Some(Recording::begin(calibration, &self.config));
        Ok(())
    }

    /// Feed one frame. Outside a recording the frame is ignored.
    pub fn on_frame(&mut self, frame: &Frame, timestamp: f64) -> FrameOutcome {
        match self.recording.as_mut() {
            Some(recording) => recording.on_frame(frame, timestamp),
            None => FrameOutcome::NotRecording,
        }
    }

    /// Live-overlay points; empty outside a recording.
    pub fn recent(&self) -> &[TrackedPoint] {
        match &self.recording {
            Some(recording) => recording.recent(),
            None => &[],
        }
    }

    /// Seal and analyze. The session returns to `Ready` whatever the outcome.
    pub fn end_recording(&mut self) -> Result<TrackingResult> {
        let recording = self
            .recording
            .take()
            .ok_or_else(|| self.invalid_state("recording"))?;
        let result = recording.finish();
        match &result {
            Ok(r) => info!(
                average_velocity = r.average_velocity,
                peak_velocity = r.peak_velocity,
                rom_cm = r.rom_cm,
                "recording analyzed"
            ),
            Err(e) => debug!(error = %e, "recording could not be analyzed"),
        }
        result
    }

    /// Discard a partial recording without analysis.
    pub fn abort(&mut self) {
        if self.recording.take().is_some() {
            debug!("recording aborted");
        }
    }

    /// Drop calibration and any recording.
    pub fn reset(&mut self) {
        self.recording = None;
        self.calibration = None;
    }

    fn expect_not_recording(&self, expected: &'static str) -> Result<()> {
        if self.recording.is_some() {
            return Err(self.invalid_state(expected));
        }
        Ok(())
    }

    fn invalid_state(&self, expected: &'static str) -> Error {
        Error::InvalidState {
            expected,
            actual: self.state().name(),
        }
    }
}

impl Default for VbtSession {
    fn default() -> Self {
        Self::with_default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalibrationFailure;
    use crate::integration::FrameBuilder;

    const BAR: [u8; 3] = [30, 90, 220];
    const GYM: [u8; 3] = [200, 190, 170];

    fn frame_at(y: f64) -> Frame {
        FrameBuilder::new(240, 320)
            .background(GYM)
            .disc(120.0, y, 25.0, BAR)
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_cycle() {
        let mut session = VbtSession::default();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(matches!(
            session.begin_recording(),
            Err(Error::InvalidState { actual: "idle", .. })
        ));

        session.calibrate(&frame_at(250.0), 120.0, 250.0).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.on_frame(&frame_at(250.0), 0.0), FrameOutcome::NotRecording);

        session.begin_recording().unwrap();
        assert_eq!(session.state(), SessionState::Recording);
        assert!(session.calibrate(&frame_at(250.0), 120.0, 250.0).is_err());

        for i in 0..20 {
            session.on_frame(&frame_at(250.0 - 5.0 * i as f64), i as f64 / 30.0);
        }
        assert_eq!(session.recent().len(), 20);

        let result = session.end_recording().unwrap();
        assert_eq!(result.velocity_profile.len(), 19);
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.recent().is_empty());
    }

    #[test]
    fn test_failed_analysis_returns_to_ready() {
        let mut session = VbtSession::default();
        session.calibrate(&frame_at(250.0), 120.0, 250.0).unwrap();
        session.begin_recording().unwrap();
        session.on_frame(&frame_at(250.0), 0.0);

        assert!(matches!(
            session.end_recording(),
            Err(Error::InsufficientData { .. })
        ));
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.end_recording().is_err());
    }

    #[test]
    fn test_failed_tap_keeps_previous_calibration() {
        let mut session = VbtSession::default();
        let first = session.calibrate(&frame_at(250.0), 120.0, 250.0).unwrap();

        let err = session.calibrate(&frame_at(250.0), 1.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::CalibrationFailed(CalibrationFailure::TapNearEdge { .. })
        ));
        assert_eq!(session.calibration(), Some(&first));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_abort_and_reset() {
        let mut session = VbtSession::default();
        session.calibrate(&frame_at(250.0), 120.0, 250.0).unwrap();
        session.begin_recording().unwrap();
        session.on_frame(&frame_at(250.0), 0.0);

        session.abort();
        assert_eq!(session.state(), SessionState::Ready);

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.calibration().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = VbtConfig::default();
        config.analysis.smoothing_window = 2;
        assert!(matches!(VbtSession::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_default_matches_validated_new() {
        let default = VbtSession::with_default_config();
        let validated = VbtSession::new(VbtConfig::default()).unwrap();
        assert_eq!(default.config(), validated.config());
        assert_eq!(default.state(), SessionState::Idle);

        let mut config = VbtConfig::default();
        config.calibration.reference_diameter_cm = -1.0;
        assert!(matches!(VbtSession::new(config), Err(Error::InvalidConfig(_))));
    }
}
