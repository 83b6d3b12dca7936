//! Field trait compliance test helpers.
//!
//! These functions verify that a Field implementation satisfies the
//! invariants required by the trait contract. Reused across the cubic,
//! zero-order and bicubic test modules.

use crate::field::Field;
use indexmap::IndexSet;

/// Assert that the sample and error columns match the node count.
pub fn assert_columns_complete(field: &dyn Field) {
    assert_eq!(field.samples().len(), field.len(), "samples length");
    assert_eq!(field.errors().len(), field.len(), "errors length");
    assert!(!field.is_empty());
}

/// Assert that evaluating at a node's own position returns its sample.
pub fn assert_interpolates_samples(field: &dyn Field) {
    for j in 0..field.len() {
        let pos: Vec<f64> = (0..field.dimensions())
            .map(|axis| field.node_position(j, axis))
            .collect();
        let v = field.evaluate(&pos);
        let s = field.samples()[j];
        assert!(
            (v - s).abs() <= 1e-12 * s.abs().max(1.0),
            "evaluate at node {j} = {v}, sample = {s}"
        );
    }
}

/// Assert that node lookups invert `node_position`.
pub fn assert_node_lookup_roundtrip(field: &dyn Field) {
    for j in 0..field.len() {
        let at: Vec<f64> = (0..field.dimensions())
            .map(|axis| field.node_position(j, axis))
            .collect();
        assert_eq!(field.nearest_node(&at), j, "nearest_node at node {j}");

        let inside: Vec<f64> = (0..field.dimensions())
            .map(|axis| field.node_position(j, axis) + 0.25 * field.spacing(axis))
            .collect();
        assert_eq!(field.enclosing_node(&inside), j, "enclosing_node in cell {j}");
    }
}

/// Assert that neighbor sets are in range, unique, contain the node, and
/// that the minimal stencil is a subset of the full one.
pub fn assert_neighbors_well_formed(field: &dyn Field) {
    for j in 0..field.len() {
        let full = field.neighbors(j);
        let minimal = field.neighbors_minimal(j);
        let unique: IndexSet<usize> = full.iter().copied().collect();
        assert_eq!(unique.len(), full.len(), "duplicate neighbor of {j}: {full:?}");
        assert!(full.contains(&j), "neighbors({j}) misses {j}");
        for &k in &full {
            assert!(k < field.len(), "neighbor {k} of {j} out of range");
        }
        for k in &minimal {
            assert!(unique.contains(k), "minimal neighbor {k} of {j} not in full set");
        }
    }
}

/// Assert that `set_sample` stores, is visible through `evaluate`, and
/// rejects out-of-range nodes.
pub fn assert_set_sample_roundtrip(field: &mut dyn Field) {
    let j = field.len() / 2;
    let old = field.samples()[j];
    let pos: Vec<f64> = (0..field.dimensions())
        .map(|axis| field.node_position(j, axis))
        .collect();

    assert!(field.set_sample(j, old + 1.0));
    assert_eq!(field.sample(j), Some(old + 1.0));
    let v = field.evaluate(&pos);
    assert!((v - (old + 1.0)).abs() <= 1e-12 * v.abs().max(1.0));

    assert!(field.set_sample(j, old));
    assert_eq!(field.sample(j), Some(old));
    let len = field.len();
    assert!(!field.set_sample(len, 0.0));
    assert_eq!(field.sample(len), None);
}

/// Assert that a field spans itself.
pub fn assert_spans_itself(field: &dyn Field) {
    assert_eq!(field.spanned_by(field), Ok(true));
}

/// Run all compliance checks.
pub fn run_full_compliance(field: &mut dyn Field) {
    assert_columns_complete(field);
    assert_interpolates_samples(field);
    assert_node_lookup_roundtrip(field);
    assert_neighbors_well_formed(field);
    assert_set_sample_roundtrip(field);
    assert_spans_itself(field);
}
