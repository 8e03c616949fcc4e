use std::collections::HashMap;

use cockpit::vehicle::derived::{MAX_AR_OPACITY, MIN_AR_OPACITY};
use cockpit::vehicle::scenario::template;
use cockpit::vehicle::{
    apply_override, compute_ar_opacity, compute_safety_level, Gear, ScenarioKind, StatePatch,
    SynthesisError, Synthesizer, SCENARIOS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_weights_sum_to_one() {
    let total: f64 = SCENARIOS.iter().map(|s| s.weight).sum();
    assert!((total - 1.0).abs() < 1e-9, "weights sum to {total}");
    assert_eq!(SCENARIOS.len(), 8);
}

#[test]
fn test_thousand_syntheses_stay_in_range() {
    let synth = Synthesizer::new().unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1000 {
        let s = synth.synthesize(&mut rng);
        assert!((1..=5).contains(&s.safety_level), "safety {}", s.safety_level);
        assert!(
            (MIN_AR_OPACITY..=MAX_AR_OPACITY).contains(&s.ar_opacity),
            "opacity {}",
            s.ar_opacity
        );
        // derived fields are never stale
        assert_eq!(s.safety_level, compute_safety_level(&s));
        assert_eq!(s.ar_opacity, compute_ar_opacity(s.safety_level, s.distraction_level));
        assert!(s.validate().is_ok());
    }
}

#[test]
fn test_generated_fields_respect_template_bounds() {
    let synth = Synthesizer::new().unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..2000 {
        let s = synth.synthesize(&mut rng);
        let kind = s.scenario_type.unwrap();
        let t = template(kind).unwrap();
        let (lo, hi) = t.speed.bounds();
        assert!(s.speed >= lo && s.speed <= hi, "{kind:?} speed {}", s.speed);
        let (lo, hi) = t.battery_percentage.bounds();
        assert!(s.battery_percentage >= lo && s.battery_percentage <= hi);
        assert_eq!(s.aeb_triggered, t.aeb_triggered);
        if kind == ScenarioKind::SchoolPickup && s.gear == Gear::Park {
            assert_eq!(s.speed, 0.0, "parked pickup must be still");
        }
    }
}

#[test]
fn test_sampling_converges_to_weights() {
    let synth = Synthesizer::new().unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let draws = 20_000;
    let mut counts: HashMap<ScenarioKind, usize> = HashMap::new();
    for _ in 0..draws {
        *counts.entry(synth.pick(&mut rng).kind).or_insert(0) += 1;
    }
    for scenario in synth.scenarios() {
        let freq = *counts.get(&scenario.kind).unwrap_or(&0) as f64 / draws as f64;
        assert!(
            (freq - scenario.weight).abs() < 0.02,
            "{:?}: observed {freq}, declared {}",
            scenario.kind,
            scenario.weight
        );
    }
}

#[test]
fn test_override_speed_keeps_everything_else() {
    let synth = Synthesizer::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let base = synth.synthesize(&mut rng);
        let patch = StatePatch {
            speed: Some(30.0),
            ..StatePatch::default()
        };
        let merged = synth.synthesize_from(&base, &patch).unwrap();

        let mut expected = base.clone();
        expected.speed = 30.0;
        assert_eq!(merged, expected);
    }
}

#[test]
fn test_override_with_full_prior_record() {
    // The client sends back the whole prior state with one field changed.
    let mut rng = StdRng::seed_from_u64(5);
    let prior = template(ScenarioKind::LowBattery).unwrap().realize(&mut rng);

    let mut body = serde_json::to_value(&prior).unwrap();
    body["battery_percentage"] = serde_json::json!(90.0);
    body["id"] = serde_json::json!("3b0d7e2c-0000-4000-8000-000000000000");
    let patch: StatePatch = serde_json::from_value(body).unwrap();

    let merged = apply_override(&prior, &patch).unwrap();
    assert_eq!(merged.battery_percentage, 90.0);
    // safety_level is taken as given on the override path
    assert_eq!(merged.safety_level, prior.safety_level);
    assert_eq!(merged.speed, prior.speed);
    assert_eq!(merged.gear, prior.gear);
    assert_eq!(merged.location, prior.location);
    assert_eq!(merged.weather, prior.weather);
    assert_eq!(merged.cabin_temp, prior.cabin_temp);
    assert_eq!(merged.front_distance_m, prior.front_distance_m);
}

#[test]
fn test_override_rederives_only_opacity() {
    let mut rng = StdRng::seed_from_u64(11);
    let prior = template(ScenarioKind::EmergencyBrake).unwrap().realize(&mut rng);
    assert_eq!(prior.ar_opacity, 0.8);

    let patch = StatePatch {
        safety_level: Some(5),
        ..StatePatch::default()
    };
    let merged = apply_override(&prior, &patch).unwrap();
    assert_eq!(merged.safety_level, 5);
    assert!(merged.aeb_triggered);
    assert_eq!(merged.ar_opacity, 0.3);

    let patch = StatePatch {
        distraction_level: Some(85.0),
        ..StatePatch::default()
    };
    let merged = apply_override(&prior, &patch).unwrap();
    assert_eq!(merged.safety_level, prior.safety_level);
    assert_eq!(merged.ar_opacity, 0.3);
}

#[test]
fn test_invalid_override_is_rejected() {
    let synth = Synthesizer::new().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let base = synth.synthesize(&mut rng);

    let patch = StatePatch {
        distraction_level: Some(150.0),
        ..StatePatch::default()
    };
    match synth.synthesize_from(&base, &patch) {
        Err(SynthesisError::Override(err)) => assert_eq!(err.field, "distraction_level"),
        other => panic!("expected override rejection, got {other:?}"),
    }

    let patch = StatePatch {
        safety_level: Some(0),
        ..StatePatch::default()
    };
    assert!(synth.synthesize_from(&base, &patch).is_err());
}

#[test]
fn test_standalone_override_draws_nothing() {
    let synth = Synthesizer::new().unwrap();
    let patch = StatePatch {
        speed: Some(0.0),
        gear: Some(Gear::Park),
        safety_level: Some(4),
        distraction_level: Some(10.0),
        battery_percentage: Some(90.0),
        cabin_temp: Some(21.0),
        location: Some("小区车位".into()),
        weather: Some("多云".into()),
        ..StatePatch::default()
    };
    let state = synth.synthesize_standalone(&patch).unwrap();
    assert_eq!(state.safety_level, 4);
    assert_eq!(state.ar_opacity, compute_ar_opacity(4, 10.0));
    assert_eq!(state.fatigue_level, None);
    assert_eq!(state.driving_duration_minutes, None);
    assert_eq!(state.rear_distance_m, None);
    assert_eq!(state.scenario_type, None);

    let partial = StatePatch {
        battery_percentage: Some(90.0),
        ..StatePatch::default()
    };
    match synth.synthesize_standalone(&partial) {
        Err(SynthesisError::Override(err)) => assert_eq!(err.field, "speed"),
        other => panic!("expected missing core reading, got {other:?}"),
    }
}

#[test]
fn test_seeded_synthesis_is_reproducible() {
    let synth = Synthesizer::new().unwrap();
    let a: Vec<_> = {
        let mut rng = StdRng::seed_from_u64(77);
        (0..20).map(|_| synth.synthesize(&mut rng)).collect()
    };
    let b: Vec<_> = {
        let mut rng = StdRng::seed_from_u64(77);
        (0..20).map(|_| synth.synthesize(&mut rng)).collect()
    };
    assert_eq!(a, b);
}
