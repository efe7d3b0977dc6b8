use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::Point3;
use crate::path::{AttractorField, InterpolatedPathOptions, SpeedField, interpolated_path};

#[test]
fn frames_bunch_up_where_travel_is_slow() {
    let anchors: Vec<Point3> = (0..6)
        .map(|i| Point3::new(10.0 + 400.0 * f64::from(i), 0.0, 0.0))
        .collect();
    let options = InterpolatedPathOptions {
        speed: SpeedField::new(Point3::ORIGIN, 100.0, 100.0, 1.0),
        ..InterpolatedPathOptions::default().with_fine_samples(20_000)
    };
    let (path, _) = interpolated_path(&anchors, 30, &options).unwrap();

    let gaps: Vec<f64> = path
        .frames
        .windows(2)
        .map(|w| w[0].position.distance_to(w[1].position))
        .collect();
    assert!(gaps[0] < gaps[gaps.len() - 1]);
    assert!(gaps[0] * 5.0 < gaps[gaps.len() - 1]);
}

#[test]
fn random_anchor_sets_keep_directions_unit() {
    let mut rng = StdRng::seed_from_u64(17);
    let options = InterpolatedPathOptions {
        attractor: AttractorField::new(Point3::new(0.0, 0.0, -1000.0), 1000.0, 300.0),
        ..InterpolatedPathOptions::default().with_fine_samples(5_000)
    };
    for _ in 0..5 {
        let anchors: Vec<Point3> = (0..6)
            .map(|_| {
                Point3::new(
                    rng.random_range(-800.0..800.0),
                    rng.random_range(-800.0..800.0),
                    rng.random_range(-200.0..200.0),
                )
            })
            .collect();
        let (path, diagnostics) = interpolated_path(&anchors, 20, &options).unwrap();
        assert_eq!(path.len(), 20);
        assert!(diagnostics.max_norm_error < 1e-9);
    }
}
