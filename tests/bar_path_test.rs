use approx::assert_relative_eq;
use proptest::prelude::*;

use barpath_rs::{
    BarPathPipeline, CalibrationConfig, ColorCalibrator, Error, Frame, FrameBuilder, FrameOutcome,
    KinematicsAnalyzer, Recording, ReplaySource, ScaleCalibration, TimedFrame, TrackedPoint,
    Trajectory, VbtConfig, VbtSession,
};

const PLATE: [u8; 3] = [200, 30, 40];
const BACKDROP: [u8; 3] = [40, 60, 90];

const WIDTH: usize = 480;
const HEIGHT: usize = 640;

fn plate_frame(y: f64, radius: f64) -> Frame {
    FrameBuilder::new(WIDTH, HEIGHT)
        .background(BACKDROP)
        .disc(240.0, y, radius, PLATE)
        .build()
        .unwrap()
}

fn empty_frame() -> Frame {
    FrameBuilder::new(WIDTH, HEIGHT).background(BACKDROP).build().unwrap()
}

/// 30 frames over exactly one second, plate rising 300 px.
fn lift_y(i: usize) -> f64 {
    500.0 - 300.0 * i as f64 / 29.0
}

fn lift_t(i: usize) -> f64 {
    i as f64 / 29.0
}

#[test]
fn test_end_to_end_plate_lift() {
    let mut session = VbtSession::default();

    // 45 cm plate at 90 px radius => 2 px/cm
    let cal = session
        .calibrate(&plate_frame(lift_y(0), 90.0), 240.0, lift_y(0))
        .unwrap();
    assert_relative_eq!(cal.scale.pixels_per_cm(), 2.0, max_relative = 0.01);

    session.begin_recording().unwrap();
    for i in 0..30 {
        let outcome = session.on_frame(&plate_frame(lift_y(i), 90.0), lift_t(i));
        assert!(matches!(outcome, FrameOutcome::Tracked(_)), "frame {i}: {outcome:?}");
    }
    let result = session.end_recording().unwrap();

    assert_relative_eq!(result.rom_cm, 150.0, max_relative = 0.02);
    assert_relative_eq!(result.average_velocity, 1.5, max_relative = 0.03);
    assert_relative_eq!(result.peak_velocity, 1.5, max_relative = 0.07);
    assert_eq!(result.velocity_profile.len(), 29);
    assert_eq!(result.points.len(), 30);
    assert_eq!(result.dropped_pairs.total(), 0);
    assert_eq!(result.reps.len(), 1);
    assert_relative_eq!(result.reps[0].rom_cm, 150.0, max_relative = 0.02);

    let last = result.velocity_profile.last().unwrap();
    assert_relative_eq!(last.time, 1.0, max_relative = 1e-9);
}

#[test]
fn test_short_occlusion_is_gap_filled() {
    let config = VbtConfig::default();
    let cal = ColorCalibrator::new(config.calibration.clone())
        .unwrap()
        .calibrate(&plate_frame(lift_y(0), 90.0), 240.0, lift_y(0))
        .unwrap();
    let mut recording = Recording::begin(cal, &config);

    let hidden = 10..15;
    for i in 0..30 {
        let frame = if hidden.contains(&i) {
            empty_frame()
        } else {
            plate_frame(lift_y(i), 90.0)
        };
        let outcome = recording.on_frame(&frame, lift_t(i));
        if hidden.contains(&i) {
            assert!(matches!(outcome, FrameOutcome::Held { .. }), "frame {i}: {outcome:?}");
        }
    }
    assert!(!recording.is_tracking_lost());
    assert_eq!(recording.len(), 30);

    let result = recording.finish().unwrap();
    assert_eq!(result.points.len(), 30);
    // held frames repeat the last centroid
    assert_eq!(result.points[10].y, result.points[9].y);
    assert_eq!(result.points[14].y, result.points[9].y);
}

#[test]
fn test_long_occlusion_warns_without_ending_session() {
    let mut config = VbtConfig::default();
    config.tracking.max_missed_frames = 4;
    let mut session = VbtSession::new(config).unwrap();
    session
        .calibrate(&plate_frame(lift_y(0), 90.0), 240.0, lift_y(0))
        .unwrap();
    session.begin_recording().unwrap();

    let mut lost = 0;
    for i in 0..30 {
        let frame = if (8..15).contains(&i) {
            empty_frame()
        } else {
            plate_frame(lift_y(i), 90.0)
        };
        if let FrameOutcome::TrackingLost { missed } = session.on_frame(&frame, lift_t(i)) {
            assert!(missed > 4);
            lost += 1;
        }
    }
    assert_eq!(lost, 3);

    let result = session.end_recording().unwrap();
    // 8 tracked + 4 held + 15 tracked
    assert_eq!(result.points.len(), 27);
    assert!(result.average_velocity.is_finite());
}

#[test]
fn test_replay_pipeline_matches_session() {
    let config = VbtConfig::default();
    let cal = ColorCalibrator::new(config.calibration.clone())
        .unwrap()
        .calibrate(&plate_frame(lift_y(0), 90.0), 240.0, lift_y(0))
        .unwrap();
    let frames = (0..30).map(|i| TimedFrame::new(plate_frame(lift_y(i), 90.0), lift_t(i)));

    let mut pipeline = BarPathPipeline::new(ReplaySource::new(frames), Recording::begin(cal, &config));
    let stats = pipeline.run_to_end().unwrap();
    assert_eq!(stats.tracked, 30);

    let result = pipeline.finish().unwrap();
    assert_relative_eq!(result.rom_cm, 150.0, max_relative = 0.02);
}

#[test]
fn test_insufficient_data_never_nan() {
    let analyzer = KinematicsAnalyzer::default();
    let scale = ScaleCalibration::from_pixels_per_cm(2.0).unwrap();

    for points in [vec![], vec![TrackedPoint::new(10.0, 10.0, 0.0)]] {
        match analyzer.analyze(&Trajectory::from_points(points), &scale) {
            Err(Error::InsufficientData { usable }) => assert_eq!(usable, 0),
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }
}

#[test]
fn test_rom_from_known_extrema() {
    // bar dips then rises: min y 120, max y 380 at 2.5 px/cm
    let ys = [300.0, 340.0, 380.0, 330.0, 250.0, 180.0, 120.0, 150.0];
    let traj = Trajectory::from_points(
        ys.iter()
            .enumerate()
            .map(|(i, &y)| TrackedPoint::new(200.0 + i as f64, y, i as f64 * 0.1)),
    );
    let scale = ScaleCalibration::from_pixels_per_cm(2.5).unwrap();
    let result = KinematicsAnalyzer::default().analyze(&traj, &scale).unwrap();
    assert_relative_eq!(result.rom_cm, 104.0, max_relative = 1e-9);
    assert_eq!(result.reps.len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_constant_speed_round_trip(
        speed in 0.1f64..3.0,
        px_per_cm in 0.5f64..6.0,
        fps in 24.0f64..120.0,
        frames in 3usize..90,
    ) {
        // px per frame for the target speed
        let step = speed * 100.0 * px_per_cm / fps;
        let traj = Trajectory::from_points(
            (0..frames).map(|i| TrackedPoint::new(50.0, 2000.0 - step * i as f64, i as f64 / fps)),
        );
        let scale = ScaleCalibration::from_pixels_per_cm(px_per_cm).unwrap();
        let result = KinematicsAnalyzer::default().analyze(&traj, &scale).unwrap();

        prop_assert!((result.average_velocity - speed).abs() < 1e-6 * speed.max(1.0));
        prop_assert!((result.peak_velocity - speed).abs() < 1e-6 * speed.max(1.0));
        prop_assert_eq!(result.velocity_profile.len(), frames - 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_successful_calibration_has_positive_scale(
        radius in 4.0f64..150.0,
        diameter in 10.0f64..60.0,
    ) {
        let calibrator = ColorCalibrator::new(CalibrationConfig {
            reference_diameter_cm: diameter,
            ..CalibrationConfig::default()
        })
        .unwrap();
        if let Ok(cal) = calibrator.calibrate(&plate_frame(320.0, radius), 240.0, 320.0) {
            let s = cal.scale.pixels_per_cm();
            prop_assert!(s.is_finite() && s > 0.0);
        }
    }
}
