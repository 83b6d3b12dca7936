//! Perturb, revert, recompute: the engine must land exactly where it began.

use drift_core::TrialMove;
use drift_cost::{Ccg, CostConfig, CostEngine, CostModel, TrajectoryCost};
use drift_field::Field;
use drift_test_utils::{sine_store, three_events};
use proptest::prelude::*;

fn engine() -> CostEngine<Ccg> {
    let s = sine_store(10);
    CostEngine::new(
        Ccg::new(s.diffusivity, s.force),
        s.store,
        three_events(),
        s.diffusivity,
        CostConfig::default(),
    )
    .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
}

#[test]
fn delta_revert_update_restores_total() {
    let mut e = engine();
    let before = e.total_cost();
    let d = e.model().fields()[0];
    let old = e.fields()[d].sample(2).unwrap();
    let trial = TrialMove::new(d, 2, old, old + 0.25);

    e.set_sample(d, 2, trial.trial_value);
    let dc = e.delta_cost(&trial);
    assert!(dc != 0.0);

    e.set_sample(d, 2, trial.last_value);
    e.revert(&trial);
    e.update_local();
    assert!(close(e.total_cost(), before));
    assert!(close(e.cached_cost(), before));
}

#[test]
fn perturbing_the_wrap_node_reaches_the_last_cell() {
    let mut e = engine();
    let f = e.model().fields()[1];
    let old = e.fields()[f].sample(0).unwrap();
    let before = e.total_cost();
    let dc = e.apply(&TrialMove::new(f, 0, old, old + 1.0));
    // The event at 9.6 interpolates through node 0.
    assert!(dc != 0.0);
    assert!(((e.total_cost() - before) - dc).abs() < 1e-12);
}

#[test]
fn accepted_then_rejected_sequence() {
    let mut e = engine();
    let d = e.model().fields()[0];
    let f = e.model().fields()[1];

    let old = e.fields()[d].sample(3).unwrap();
    e.apply(&TrialMove::new(d, 3, old, old * 1.1));
    e.clone_last();
    let committed = e.total_cost();

    let old = e.fields()[f].sample(2).unwrap();
    let trial = TrialMove::new(f, 2, old, old - 0.7);
    e.apply(&trial);
    e.restore(&trial);
    assert!(close(e.cached_cost(), committed));
    assert!(close(e.total_cost(), committed));
}

#[test]
fn boxed_engine_round_trip() {
    let mut cost: Box<dyn TrajectoryCost> = Box::new(engine());
    let before = cost.total_cost();
    let d = cost.role_fields()[0];
    let old = cost.fields()[d].sample(9).unwrap();
    let trial = TrialMove::new(d, 9, old, 0.2);
    cost.apply(&trial);
    cost.restore(&trial);
    assert!(close(cost.total_cost(), before));
}

proptest! {
    #[test]
    fn delta_tracks_total(
        node in 0usize..10,
        field in 0usize..2,
        step in -0.4f64..0.4,
    ) {
        let mut e = engine();
        let id = e.model().fields()[field];
        let before = e.total_cost();
        let old = e.fields()[id].sample(node).unwrap();
        let trial = TrialMove::new(id, node, old, old + step);

        let dc = e.apply(&trial);
        prop_assert!(((e.total_cost() - before) - dc).abs() < 1e-10);

        e.restore(&trial);
        prop_assert!(close(e.total_cost(), before));
        for l in e.local_costs() {
            prop_assert_eq!(l.curr, l.last);
        }
    }
}
