//! NaN handling with and without the diagnostic check.

use drift_core::TrialMove;
use drift_cost::{Ccg, CostConfig, CostEngine, CostModel};
use drift_field::Field;
use drift_test_utils::{sine_store, three_events};

fn engine(nan_check: bool) -> CostEngine<Ccg> {
    let s = sine_store(10);
    let config = CostConfig {
        nan_check,
        ..CostConfig::default()
    };
    CostEngine::new(
        Ccg::new(s.diffusivity, s.force),
        s.store,
        three_events(),
        s.diffusivity,
        config,
    )
    .unwrap()
}

#[test]
fn nan_flows_through_unchecked() {
    let mut e = engine(false);
    let f = e.model().fields()[1];
    let old = e.fields()[f].sample(2).unwrap();
    let dc = e.apply(&TrialMove::new(f, 2, old, f64::NAN));
    assert!(dc.is_nan());
    assert!(e.total_cost().is_nan());
}

#[test]
fn restoring_after_nan_recovers() {
    let mut e = engine(false);
    let before = e.total_cost();
    let f = e.model().fields()[1];
    let old = e.fields()[f].sample(2).unwrap();
    let trial = TrialMove::new(f, 2, old, f64::NAN);
    e.apply(&trial);
    e.restore(&trial);
    assert!((e.total_cost() - before).abs() <= 1e-12 * before.abs());
}

#[test]
#[should_panic(expected = "NaN cost")]
fn nan_aborts_when_checked() {
    let mut e = engine(true);
    let f = e.model().fields()[1];
    let old = e.fields()[f].sample(2).unwrap();
    e.apply(&TrialMove::new(f, 2, old, f64::NAN));
}

#[test]
fn infinite_cost_is_not_a_nan() {
    let mut e = engine(true);
    let d = e.model().fields()[0];
    let old = e.fields()[d].sample(2).unwrap();
    let dc = e.apply(&TrialMove::new(d, 2, old, -3.0));
    assert_eq!(dc, f64::INFINITY);
}
