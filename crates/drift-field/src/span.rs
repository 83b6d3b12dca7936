//! Domain coverage checks between fields.

use crate::error::FieldError;
use crate::field::Field;

/// Whether `src` covers `this` field's domain less one cell on every
/// boundary, axis by axis.
pub(crate) fn check_span<F: Field + ?Sized>(this: &F, src: &dyn Field) -> Result<bool, FieldError> {
    if src.dimensions() != this.dimensions() {
        return Err(FieldError::KindMismatch {
            expected: this.kind(),
            found: src.kind(),
        });
    }
    for axis in 0..this.dimensions() {
        let (lo, hi) = this.bounds(axis);
        let (src_lo, src_hi) = src.bounds(axis);
        let d = this.spacing(axis);
        log::debug!(
            "span check axis {axis}: [{} , {}] within [{src_lo}, {src_hi}]",
            lo + d,
            hi - d
        );
        if lo + d < src_lo || hi - d > src_hi {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BicubicField, Boundary, CubicField, Grid1D, ZeroField};

    fn line(n: usize, r0: f64, dr: f64) -> CubicField {
        CubicField::uniform(Grid1D::new(n, r0, dr, Boundary::Clamp).unwrap(), 0.0)
    }

    #[test]
    fn one_cell_margin_is_allowed() {
        let fine = line(10, 0.0, 0.1);
        let coarse = line(5, 0.05, 0.2);
        assert_eq!(fine.spanned_by(&coarse), Ok(true));
    }

    #[test]
    fn short_source_is_rejected() {
        let fine = line(10, 0.0, 0.1);
        let short = line(2, 0.5, 0.2);
        assert_eq!(fine.spanned_by(&short), Ok(false));
    }

    #[test]
    fn mixed_1d_kinds_are_comparable() {
        let cubic = line(10, 0.0, 0.1);
        let zero = ZeroField::uniform(Grid1D::new(12, -0.1, 0.1, Boundary::Clamp).unwrap(), 1.0);
        assert_eq!(cubic.spanned_by(&zero), Ok(true));
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let cubic = line(10, 0.0, 0.1);
        let plane = BicubicField::uniform(
            Grid1D::new(4, 0.0, 1.0, Boundary::Clamp).unwrap(),
            Grid1D::new(4, 0.0, 1.0, Boundary::Clamp).unwrap(),
            0.0,
        )
        .unwrap();
        assert!(matches!(
            cubic.spanned_by(&plane),
            Err(FieldError::KindMismatch { .. })
        ));
    }
}
