//! Reading fields from text and moving them between grids.

use drift_field::{
    parse_tabulated, parse_volumetric, write_tabulated, AnyField, Boundary, CubicField, Field,
    FieldError, FieldStore, Grid1D, ZeroField,
};

fn linear_force_table() -> String {
    let mut text = String::from("# position force\n");
    for k in 0..17 {
        let x = -2.0 + 0.25 * k as f64;
        text.push_str(&format!("{x} {}\n", -x));
    }
    text
}

#[test]
fn force_table_integrates_to_harmonic_pmf() {
    let force = parse_tabulated(&linear_force_table(), Boundary::Clamp)
        .unwrap()
        .into_cubic()
        .unwrap();
    assert_eq!(force.len(), 17);

    let pmf = force.integral_profile(-1.0);
    let (c_min, v_min) = pmf
        .iter()
        .copied()
        .fold((0.0, f64::INFINITY), |acc, p| if p.1 < acc.1 { p } else { acc });
    assert_eq!(v_min, 0.0);
    assert!(c_min.abs() <= 0.125 + 1e-12, "minimum at {c_min}");

    let (c0, v0) = pmf[0];
    assert_eq!(c0, -1.875);
    assert!((v0 - 1.75).abs() < 0.05, "pmf at left edge {v0}");
}

#[test]
fn one_character_lines_are_skipped() {
    let text = "# r D\nx\n0.0 1.0\n5\n0.5 2.0\n \n1.0 3.0\n";
    let t = parse_tabulated(text, Boundary::Clamp).unwrap();
    assert_eq!(t.values, vec![1.0, 2.0, 3.0]);
    assert_eq!(t.grid.dr(), 0.5);

    let err = parse_tabulated("0.0 1.0\nxy\n0.5 2.0\n", Boundary::Clamp).unwrap_err();
    assert!(matches!(err, FieldError::Parse { line: 2, .. }), "{err}");
}

#[test]
fn coarse_field_maps_onto_fine_grid() {
    let coarse = CubicField::from_fn(
        Grid1D::new(12, -3.0, 0.5, Boundary::Clamp).unwrap(),
        f64::sin,
    );
    let fine = CubicField::uniform(Grid1D::new(40, -2.0, 0.1, Boundary::Clamp).unwrap(), 0.0);
    let mapped = fine.map_from(&coarse).unwrap();
    for j in 0..mapped.len() {
        let x = mapped.node_position(j, 0);
        assert!((mapped.samples()[j] - x.sin()).abs() < 0.03, "node {j} at {x}");
    }

    let narrow = CubicField::uniform(Grid1D::new(4, 0.0, 0.5, Boundary::Clamp).unwrap(), 0.0);
    assert!(matches!(
        fine.map_from(&narrow),
        Err(FieldError::NotSpanned { .. })
    ));
}

#[test]
fn zero_order_copy_keeps_steps() {
    let src = parse_tabulated("0 1\n1 2\n2 3\n3 4\n", Boundary::Clamp)
        .unwrap()
        .into_zero()
        .unwrap();
    let mut out = Vec::new();
    write_tabulated(&src, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let back: ZeroField = parse_tabulated(&text, Boundary::Clamp)
        .unwrap()
        .into_zero()
        .unwrap();
    assert_eq!(back.evaluate(&[1.4]), 2.0);
    assert_eq!(back.evaluate(&[1.6]), 3.0);
    assert_eq!(back.gradient(0, &[1.6]), 0.0);
}

#[test]
fn store_holds_mixed_fields() {
    let grid = parse_volumetric(
        "object 1 class gridpositions counts 2 2 1\n\
         origin 0 0 0\n\
         delta 1 0 0\n\
         delta 0 1 0\n\
         delta 0 0 1\n\
         1 2 3 4\n",
    );
    // Four values on one line is more than the format allows.
    assert!(matches!(grid, Err(FieldError::Parse { line: 6, .. })));

    let surface = parse_volumetric(
        "object 1 class gridpositions counts 2 2 1\n\
         origin 0 0 0\n\
         delta 1 0 0\n\
         delta 0 1 0\n\
         delta 0 0 1\n\
         1 2\n\
         3 4\n",
    )
    .unwrap()
    .into_bicubic(Boundary::Clamp)
    .unwrap();

    let mut store = FieldStore::new();
    let line = store.push(CubicField::uniform(
        Grid1D::new(5, 0.0, 1.0, Boundary::Periodic).unwrap(),
        1.0,
    ));
    let plane = store.push(surface);
    assert_eq!(store.len(), 2);
    assert!(matches!(store[plane], AnyField::Bicubic(_)));
    assert_eq!(store[plane].dimensions(), 2);

    assert!(store.set_sample(line, 2, 5.0));
    assert_eq!(store[line].sample(2), Some(5.0));
    assert!(!store.set_sample(line, 5, 5.0));
    assert_eq!(store[plane].evaluate(&[1.0, 0.0]), 3.0);
}
