use flythrough_engine::Engine;
use flythrough_engine::geom::{Point3, Tolerance};
use flythrough_engine::path::{
    GRAND_TOUR_ANCHORS, InterpolatedPathOptions, PathError, Route, StereoEye, grand_tour_options,
    grand_tour_path, interpolated_path,
};

fn sample_anchor_coordinates() -> Vec<f64> {
    vec![
        120.0, 10.0, 5.0, //
        250.0, 80.0, 30.0, //
        380.0, 20.0, 60.0, //
        300.0, -120.0, 20.0, //
        150.0, -90.0, -10.0,
    ]
}

#[test]
fn engine_generates_frames_from_anchors() {
    let mut engine = Engine::new();
    engine.set_anchors(sample_anchor_coordinates()).expect("valid anchors");
    assert_eq!(engine.anchor_count(), 5);
    engine
        .set_path_options(InterpolatedPathOptions::default().with_fine_samples(10_000))
        .expect("valid options");

    engine.generate(24).expect("generate path");
    assert_eq!(engine.frame_count(), 24);

    let rows = engine.get_frame_rows();
    assert_eq!(rows.len(), 24 * 5);
    for row in rows.chunks_exact(5) {
        assert!(row.iter().all(|v| v.is_finite()));
        assert!((0.0..360.0).contains(&row[4]));
    }

    let diagnostics = engine.diagnostics().expect("diagnostics after generate");
    assert_eq!(diagnostics.frame_count, 24);
    assert_eq!(diagnostics.spline_point_count, 7);
}

#[test]
fn engine_rejects_ragged_coordinates() {
    let mut engine = Engine::new();
    assert!(engine.set_anchors(vec![1.0, 2.0, 3.0, 4.0]).is_err());
    assert_eq!(engine.anchor_count(), 0);
}

#[test]
fn engine_reports_generation_errors() {
    let mut engine = Engine::new();
    engine.set_anchors(vec![1.0, 2.0, 3.0]).expect("one anchor parses");
    assert!(engine.generate(10).is_err());
    assert_eq!(engine.frame_count(), 0);
    assert!(engine.get_frame_rows().is_empty());
}

#[test]
fn engine_changes_invalidate_frames() {
    let mut engine = Engine::new();
    engine.set_anchors(sample_anchor_coordinates()).expect("valid anchors");
    engine
        .set_path_options(InterpolatedPathOptions::default().with_fine_samples(2_000))
        .expect("valid options");
    engine.generate(5).expect("generate path");
    assert_eq!(engine.frame_count(), 5);

    engine.set_closed(true, 50.0).expect("valid closure");
    assert_eq!(engine.frame_count(), 0);
    assert!(engine.diagnostics().is_none());
}

#[test]
fn engine_loads_fixed_routes() {
    let mut engine = Engine::new();
    engine
        .load_route("orion", 10, None)
        .expect("orion route loads");
    assert_eq!(engine.frame_count(), 10);
    assert!(engine.diagnostics().is_none());

    engine
        .load_route("circle_local", 8, Some("right".to_string()))
        .expect("stereo circle loads");
    assert_eq!(engine.frame_count(), 8);

    assert!(engine.load_route("nowhere", 8, None).is_err());
    assert!(engine.load_route("cl", 8, Some("middle".to_string())).is_err());
}

#[test]
fn grand_tour_is_a_closed_loop() {
    let (path, diagnostics) = grand_tour_path(60).expect("grand tour builds");

    assert_eq!(path.len(), 60);
    assert_eq!(diagnostics.anchor_count, GRAND_TOUR_ANCHORS.len());
    assert_eq!(diagnostics.spline_point_count, GRAND_TOUR_ANCHORS.len() + 3);
    assert!(diagnostics.closure_start.is_some());
    assert!(diagnostics.max_norm_error < 1e-9);

    let first = path.frames[0];
    let last = path.frames[59];
    assert_eq!(first.alpha, last.alpha);
    assert_eq!(first.beta, last.beta);
    // Smoothing may move each end a few parsecs off the opening waypoint.
    assert!(first.position.distance_to(last.position) < 25.0);
    assert!(first.position.distance_to(Point3::from(GRAND_TOUR_ANCHORS[0])) < 25.0);
}

#[test]
fn grand_tour_speed_ramps_with_distance() {
    let (_, diagnostics) = grand_tour_path(10).expect("grand tour builds");
    let options = grand_tour_options();
    assert!(diagnostics.min_speed >= 1.0);
    // Linear ramp: waypoints reach beyond 1.2 kpc with a 500 pc scale.
    assert!(diagnostics.max_speed > 3.0);
    assert!(options.closure.closed);
}

#[test]
fn every_route_builds() {
    for route in Route::ALL {
        let path = route.build(12, StereoEye::Center).expect("route builds");
        let expected = if route == Route::PaperRenderings { 3 } else { 12 };
        assert_eq!(path.len(), expected, "{route}");
        assert!(path.iter().all(|f| f.position.is_finite()));
    }
}

#[test]
fn interpolated_path_is_deterministic() {
    let anchors: Vec<Point3> = sample_anchor_coordinates()
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();
    let options = InterpolatedPathOptions::default().with_fine_samples(5_000);
    let (a, _) = interpolated_path(&anchors, 16, &options).expect("first run");
    let (b, _) = interpolated_path(&anchors, 16, &options).expect("second run");
    assert_eq!(a, b);

    let tol = Tolerance::new(1e-9);
    for (fa, fb) in a.iter().zip(&b) {
        assert!(tol.approx_eq_point3(fa.position, fb.position));
    }
}

#[test]
fn zero_frames_fail_before_any_work() {
    let anchors = [Point3::ORIGIN];
    assert!(matches!(
        interpolated_path(&anchors, 0, &InterpolatedPathOptions::default()),
        Err(PathError::InvalidFrameCount { requested: 0, .. })
    ));
}
