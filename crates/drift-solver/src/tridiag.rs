//! Tridiagonal and cyclic-tridiagonal linear solves.
//!
//! Row `i` of the system reads
//! `lower[i] x[i-1] + diag[i] x[i] + upper[i] x[i+1] = rhs[i]`.
//! In the plain system `lower[0]` and `upper[n-1]` are ignored; in the
//! cyclic system they couple the first and last unknowns.

/// Solve a tridiagonal system in place with the Thomas algorithm.
///
/// `rhs` is overwritten with the solution. `scratch` is reused between
/// calls to avoid allocating per step.
pub(crate) fn solve_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &mut [f64],
    scratch: &mut Vec<f64>,
) {
    let n = rhs.len();
    if n == 0 {
        return;
    }
    scratch.clear();
    scratch.resize(n, 0.0);

    let mut pivot = diag[0];
    rhs[0] /= pivot;
    for i in 1..n {
        scratch[i] = upper[i - 1] / pivot;
        pivot = diag[i] - lower[i] * scratch[i];
        rhs[i] = (rhs[i] - lower[i] * rhs[i - 1]) / pivot;
    }
    for i in (0..n - 1).rev() {
        rhs[i] -= scratch[i + 1] * rhs[i + 1];
    }
}

/// Solve a cyclic tridiagonal system in place (Sherman-Morrison).
pub(crate) fn solve_cyclic(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &mut [f64],
    scratch: &mut Vec<f64>,
) {
    let n = rhs.len();
    match n {
        0 => return,
        1 => {
            rhs[0] /= diag[0] + lower[0] + upper[0];
            return;
        }
        2 => {
            // Both off-diagonal entries of a row hit the same neighbor.
            let (a, b) = (diag[0], lower[0] + upper[0]);
            let (c, d) = (lower[1] + upper[1], diag[1]);
            let det = a * d - b * c;
            let (r0, r1) = (rhs[0], rhs[1]);
            rhs[0] = (d * r0 - b * r1) / det;
            rhs[1] = (a * r1 - c * r0) / det;
            return;
        }
        _ => {}
    }

    let corner_top = lower[0];
    let corner_bottom = upper[n - 1];
    let gamma = -diag[0];

    let mut modified = diag.to_vec();
    modified[0] -= gamma;
    modified[n - 1] -= corner_bottom * corner_top / gamma;

    solve_tridiagonal(lower, &modified, upper, rhs, scratch);

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = corner_bottom;
    solve_tridiagonal(lower, &modified, upper, &mut u, scratch);

    let fact = (rhs[0] + corner_top * rhs[n - 1] / gamma)
        / (1.0 + u[0] + corner_top * u[n - 1] / gamma);
    for (x, z) in rhs.iter_mut().zip(&u) {
        *x -= fact * z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(lower: &[f64], diag: &[f64], upper: &[f64], x: &[f64], cyclic: bool) -> Vec<f64> {
        let n = x.len();
        (0..n)
            .map(|i| {
                let mut v = diag[i] * x[i];
                if i > 0 {
                    v += lower[i] * x[i - 1];
                } else if cyclic {
                    v += lower[i] * x[n - 1];
                }
                if i + 1 < n {
                    v += upper[i] * x[i + 1];
                } else if cyclic {
                    v += upper[i] * x[0];
                }
                v
            })
            .collect()
    }

    fn system(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let lower: Vec<f64> = (0..n).map(|i| -0.3 - 0.01 * i as f64).collect();
        let upper: Vec<f64> = (0..n).map(|i| -0.2 + 0.02 * i as f64).collect();
        let diag: Vec<f64> = (0..n).map(|i| 2.0 + 0.1 * (i % 3) as f64).collect();
        let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin() + 1.0).collect();
        (lower, diag, upper, x)
    }

    #[test]
    fn thomas_recovers_solution() {
        let (lower, diag, upper, x) = system(9);
        let mut rhs = apply(&lower, &diag, &upper, &x, false);
        solve_tridiagonal(&lower, &diag, &upper, &mut rhs, &mut Vec::new());
        for (got, want) in rhs.iter().zip(&x) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn cyclic_recovers_solution() {
        for n in [1, 2, 3, 4, 11] {
            let (lower, diag, upper, x) = system(n);
            let mut rhs = if n < 3 {
                // Degenerate rings fold both couplings onto one neighbor.
                (0..n)
                    .map(|i| {
                        let other = (i + 1) % n;
                        diag[i] * x[i] + (lower[i] + upper[i]) * x[other]
                    })
                    .collect()
            } else {
                apply(&lower, &diag, &upper, &x, true)
            };
            solve_cyclic(&lower, &diag, &upper, &mut rhs, &mut Vec::new());
            for (got, want) in rhs.iter().zip(&x) {
                assert!((got - want).abs() < 1e-12, "n = {n}: {got} vs {want}");
            }
        }
    }

    #[test]
    fn empty_system_is_a_no_op() {
        let mut rhs: Vec<f64> = Vec::new();
        solve_tridiagonal(&[], &[], &[], &mut rhs, &mut Vec::new());
        solve_cyclic(&[], &[], &[], &mut rhs, &mut Vec::new());
        assert!(rhs.is_empty());
    }
}
