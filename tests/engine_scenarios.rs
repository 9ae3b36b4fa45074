//! End-to-end repetition counting scenarios

use pretty_assertions::assert_eq;
use rep_flux::angle::joint_angle;
use rep_flux::types::joints;
use rep_flux::{
    ExerciseEngine, FrameStatus, Landmark, LandmarkFrame, Phase, Point, RepEvent, Session,
};

/// Frame whose three joints form `degrees` at the vertex
fn make_frame(ids: [u32; 3], degrees: f64) -> LandmarkFrame {
    let rad = degrees.to_radians();
    LandmarkFrame::new(vec![
        Landmark::new(ids[0], 0.5 + 0.2, 0.5),
        Landmark::new(ids[1], 0.5, 0.5),
        Landmark::new(ids[2], 0.5 + 0.2 * rad.cos(), 0.5 + 0.2 * rad.sin()),
    ])
}

fn knee(degrees: f64) -> LandmarkFrame {
    make_frame(
        [joints::LEFT_HIP, joints::LEFT_KNEE, joints::LEFT_ANKLE],
        degrees,
    )
}

fn elbow(degrees: f64) -> LandmarkFrame {
    make_frame(
        [joints::LEFT_SHOULDER, joints::LEFT_ELBOW, joints::LEFT_WRIST],
        degrees,
    )
}

fn run(engine: &mut ExerciseEngine, frames: &[LandmarkFrame]) -> Vec<rep_flux::FrameResult> {
    frames.iter().map(|frame| engine.process(frame)).collect()
}

#[test]
fn test_angle_properties() {
    let a = Point::new(0.3, 0.9);
    let b = Point::new(0.5, 0.5);
    let c = Point::new(0.9, 0.6);

    let forward = joint_angle(a, b, c);
    assert!((0.0..=180.0).contains(&forward));
    assert!((forward - joint_angle(c, b, a)).abs() < 1e-9);

    assert_eq!(joint_angle(b, b, c), 0.0);
    assert_eq!(joint_angle(a, b, b), 0.0);
}

#[test]
fn test_squat_with_good_depth_counts() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();

    let results = run(&mut engine, &[knee(170.0), knee(80.0), knee(75.0)]);
    assert_eq!(results[2].phase, Phase::Down);
    assert_eq!(results[2].form_score, 100);

    let top = engine.process(&knee(170.0));
    assert_eq!(top.phase, Phase::Up);
    assert_eq!(top.rep_count, 1);
    assert!(matches!(
        top.rep_event,
        Some(RepEvent::Counted { rep_count: 1, form_score: 100, .. })
    ));
}

#[test]
fn test_shallow_squat_never_reaches_down() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();
    let frames: Vec<_> = [170.0, 140.0, 120.0, 120.0, 120.0, 170.0, 130.0, 170.0]
        .into_iter()
        .map(knee)
        .collect();

    for result in run(&mut engine, &frames) {
        assert_ne!(result.phase, Phase::Down);
        assert_eq!(result.rep_event, None);
        assert_eq!(result.rep_count, 0);
    }
    assert_eq!(engine.phase(), Phase::Start);
}

#[test]
fn test_bicep_curl_counts() {
    let mut engine = ExerciseEngine::builtin("bicep_curl").unwrap();

    let results = run(&mut engine, &[elbow(170.0), elbow(40.0), elbow(40.0)]);
    assert_eq!(results[1].phase, Phase::Up);
    assert_eq!(results[2].phase, Phase::Up);
    assert_eq!(results[2].form_score, 100);

    let bottom = engine.process(&elbow(170.0));
    assert_eq!(bottom.rep_count, 1);
    assert_eq!(bottom.phase, Phase::Down);
}

#[test]
fn test_missing_landmark_changes_nothing() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();
    engine.process(&knee(80.0));

    let mut frame = knee(170.0);
    frame.landmarks.retain(|l| l.id != joints::LEFT_ANKLE);
    assert_eq!(frame.landmarks.len(), 2);

    let result = engine.process(&frame);
    assert_eq!(result.status, FrameStatus::MissingLandmarks);
    assert_eq!(
        result.as_tuple(),
        (0, Phase::Down, "Required landmarks not detected", "", 0)
    );
    assert_eq!(engine.phase(), Phase::Down);
    assert_eq!(engine.rep_count(), 0);
}

#[test]
fn test_repeated_frames_count_once() {
    let mut engine = ExerciseEngine::builtin("pushup").unwrap();
    let mut frames = vec![elbow(75.0); 10];
    frames.extend(vec![elbow(170.0); 10]);

    let results = run(&mut engine, &frames);
    let events = results.iter().filter(|r| r.rep_event.is_some()).count();

    assert_eq!(events, 1);
    assert_eq!(engine.rep_count(), 1);
}

#[test]
fn test_poor_form_rep_is_rejected_not_retried() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();

    // Far below parallel scores 40 in the squat bands
    let results = run(&mut engine, &[knee(80.0), knee(40.0), knee(170.0), knee(170.0)]);

    assert!(matches!(
        results[2].rep_event,
        Some(RepEvent::Rejected { form_score: 40, .. })
    ));
    assert_eq!(results[3].rep_event, None);
    assert_eq!(engine.rep_count(), 0);
}

#[test]
fn test_reset_from_any_state() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();
    run(
        &mut engine,
        &[knee(80.0), knee(170.0), knee(80.0), knee(170.0), knee(80.0)],
    );
    assert_eq!(engine.rep_count(), 2);
    assert_eq!(engine.phase(), Phase::Down);

    engine.reset();
    assert_eq!(engine.rep_count(), 0);
    assert_eq!(engine.phase(), Phase::Start);
    assert_eq!(engine.form_score(), 100);
}

#[test]
fn test_milestone_announcements() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();
    let mut announcements = Vec::new();

    for _ in 0..5 {
        engine.process(&knee(80.0));
        if let Some(RepEvent::Counted { announcement, .. }) = engine.process(&knee(170.0)).rep_event
        {
            announcements.push(announcement);
        }
    }

    assert_eq!(announcements.len(), 5);
    assert_eq!(announcements[0], "Perfect Squat! One quality rep!");
    assert_eq!(announcements[1], "Perfect rep 2! Great form!");
    assert_eq!(announcements[4], "Excellent! Five perfect Squats!");
}

#[test]
fn test_session_switch_keeps_readers() {
    let mut session = Session::new(ExerciseEngine::builtin("squat").unwrap());
    let reader = session.reader();

    session.process(&knee(80.0));
    session.process(&knee(170.0));
    assert_eq!(reader.latest().rep_count, 1);

    session.select_exercise(ExerciseEngine::builtin("bicep_curl").unwrap());
    assert_eq!(reader.latest().rep_count, 0);
    assert_eq!(reader.latest().exercise, "Bicep Curl");

    session.process(&elbow(40.0));
    session.process(&elbow(170.0));
    assert_eq!(reader.latest().rep_count, 1);
}

#[test]
fn test_squat_rule_feedback_near_depth() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();
    engine.process(&knee(80.0));

    let result = engine.process(&knee(93.0));
    assert_eq!(result.phase, Phase::Down);
    assert_eq!(result.form_score, 90);
    assert_eq!(result.feedback, "Almost at depth");
    assert_eq!(result.voice_message, "Just a little lower");
}

#[test]
fn test_squat_rule_feedback_shallow_start() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();

    let result = engine.process(&knee(120.0));
    assert_eq!(result.phase, Phase::Start);
    assert_eq!(result.form_score, 95);
    assert_eq!(result.feedback, "Go lower!");
    assert_eq!(result.voice_message, "Squat down below parallel");
}

#[test]
fn test_collapsed_limb_reports_angle_error() {
    let mut engine = ExerciseEngine::builtin("squat").unwrap();
    engine.process(&knee(75.0));

    let mut frame = knee(75.0);
    frame.landmarks[0] = Landmark::new(joints::LEFT_HIP, 0.5, 0.5);
    let result = engine.process(&frame);

    assert_eq!(result.status, FrameStatus::AngleError);
    assert_eq!(result.feedback, "Error calculating angle");
    assert_eq!(engine.phase(), Phase::Down);
}
