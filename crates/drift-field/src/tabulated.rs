//! Tabulated `position value [error]` files.
//!
//! Lines starting with `#` and lines shorter than two characters are
//! ignored. Every other line must hold two or three numbers. Positions must be evenly spaced and
//! ascending; the spacing is inferred from the first two rows.

use crate::boundary::Boundary;
use crate::cubic::CubicField;
use crate::error::FieldError;
use crate::field::Field;
use crate::grid1d::Grid1D;
use crate::zero::ZeroField;
use std::io::{BufRead, Write};

/// Relative tolerance on row spacing.
const SPACING_TOLERANCE: f64 = 1e-6;

/// A parsed table, ready to become a 1D field.
#[derive(Clone, Debug, PartialEq)]
pub struct Tabulated {
    /// Grid implied by the positions.
    pub grid: Grid1D,
    /// Value column.
    pub values: Vec<f64>,
    /// Error column, zero where absent.
    pub errors: Vec<f64>,
}

impl Tabulated {
    /// Interpolate the table with local cubics.
    pub fn into_cubic(self) -> Result<CubicField, FieldError> {
        CubicField::with_errors(self.grid, self.values, self.errors)
    }

    /// Use the table as a nearest-sample field.
    pub fn into_zero(self) -> Result<ZeroField, FieldError> {
        ZeroField::with_errors(self.grid, self.values, self.errors)
    }
}

fn number(token: &str, line: usize) -> Result<f64, FieldError> {
    token.parse::<f64>().map_err(|_| FieldError::Parse {
        line,
        reason: format!("`{token}` is not a number"),
    })
}

/// Parse the rows of one table. `first_line` offsets reported line numbers.
pub(crate) fn parse_rows<'a>(
    lines: impl Iterator<Item = &'a str>,
    first_line: usize,
    boundary: Boundary,
) -> Result<Tabulated, FieldError> {
    let mut positions = Vec::new();
    let mut values = Vec::new();
    let mut errors = Vec::new();
    let mut line_numbers = Vec::new();

    for (offset, raw) in lines.enumerate() {
        let line = first_line + offset;
        let text = raw.trim();
        if text.len() < 2 || text.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 2 && tokens.len() != 3 {
            return Err(FieldError::Parse {
                line,
                reason: format!("expected 2 or 3 columns, found {}", tokens.len()),
            });
        }
        positions.push(number(tokens[0], line)?);
        values.push(number(tokens[1], line)?);
        errors.push(match tokens.get(2) {
            Some(t) => number(t, line)?,
            None => 0.0,
        });
        line_numbers.push(line);
    }

    if positions.len() < 2 {
        return Err(FieldError::Parse {
            line: first_line,
            reason: format!("need at least two rows, found {}", positions.len()),
        });
    }
    let dr = positions[1] - positions[0];
    for k in 1..positions.len() {
        let step = positions[k] - positions[k - 1];
        if (step - dr).abs() > SPACING_TOLERANCE * dr.abs() || !(step > 0.0) {
            return Err(FieldError::UnevenSpacing {
                line: line_numbers[k],
                expected: dr,
                found: step,
            });
        }
    }

    let grid = Grid1D::new(positions.len(), positions[0], dr, boundary)?;
    Ok(Tabulated {
        grid,
        values,
        errors,
    })
}

/// Parse a tabulated field from text.
///
/// # Examples
///
/// ```
/// use drift_field::{parse_tabulated, Boundary, Field};
///
/// let text = "# r D\n0.0 1.0\n0.5 1.5 0.1\n1.0 2.0\n";
/// let field = parse_tabulated(text, Boundary::Clamp).unwrap().into_cubic().unwrap();
/// assert_eq!(field.len(), 3);
/// assert_eq!(field.errors()[1], 0.1);
/// ```
pub fn parse_tabulated(text: &str, boundary: Boundary) -> Result<Tabulated, FieldError> {
    parse_rows(text.lines(), 1, boundary)
}

/// Read a tabulated field from a buffered reader.
pub fn read_tabulated<R: BufRead>(reader: R, boundary: Boundary) -> Result<Tabulated, FieldError> {
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
    parse_rows(lines.iter().map(String::as_str), 1, boundary)
}

/// Write `position value error` rows for every node of a 1D field.
pub fn write_tabulated<W: Write>(field: &dyn Field, mut out: W) -> Result<(), FieldError> {
    if field.dimensions() != 1 {
        return Err(FieldError::KindMismatch {
            expected: crate::FieldKind::Cubic,
            found: field.kind(),
        });
    }
    for j in 0..field.len() {
        writeln!(
            out,
            "{} {} {}",
            field.node_position(j, 0),
            field.samples()[j],
            field.errors()[j]
        )?;
    }
    Ok(())
}

/// Write `position value` rows from a profile such as
/// [`CubicField::integral_profile`].
pub fn write_profile<W: Write>(profile: &[(f64, f64)], mut out: W) -> Result<(), FieldError> {
    for (r, v) in profile {
        writeln!(out, "{r} {v}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_and_optional_error() {
        let text = "# header\n\n0.0 1.0\n0.25 2.0 0.5\n  0.5   3.0  \n";
        let t = parse_tabulated(text, Boundary::Periodic).unwrap();
        assert_eq!(t.grid.len(), 3);
        assert_eq!(t.grid.dr(), 0.25);
        assert_eq!(t.grid.r0(), 0.0);
        assert!(t.grid.is_periodic());
        assert_eq!(t.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(t.errors, vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn rejects_bad_column_count() {
        let err = parse_tabulated("0.0 1.0\n0.5\n", Boundary::Clamp).unwrap_err();
        assert!(matches!(err, FieldError::Parse { line: 2, .. }), "{err}");
        let err = parse_tabulated("0.0 1.0 2.0 3.0\n", Boundary::Clamp).unwrap_err();
        assert!(matches!(err, FieldError::Parse { line: 1, .. }));
    }

    #[test]
    fn rejects_non_numbers() {
        let err = parse_tabulated("0.0 1.0\n0.5 abc\n", Boundary::Clamp).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn rejects_uneven_or_descending_rows() {
        let err = parse_tabulated("0.0 1\n0.5 1\n1.2 1\n", Boundary::Clamp).unwrap_err();
        assert!(matches!(err, FieldError::UnevenSpacing { line: 3, .. }));
        let err = parse_tabulated("1.0 1\n0.5 1\n0.0 1\n", Boundary::Clamp).unwrap_err();
        assert!(matches!(err, FieldError::UnevenSpacing { .. }));
    }

    #[test]
    fn rejects_single_row() {
        assert!(matches!(
            parse_tabulated("# only\n0.0 1.0\n", Boundary::Clamp),
            Err(FieldError::Parse { .. })
        ));
    }

    #[test]
    fn write_then_read_preserves_field() {
        let grid = Grid1D::new(5, -1.0, 0.25, Boundary::Clamp).unwrap();
        let field = CubicField::from_fn(grid, |x| x * x);
        let mut buf = Vec::new();
        write_tabulated(&field, &mut buf).unwrap();
        let back = read_tabulated(buf.as_slice(), Boundary::Clamp)
            .unwrap()
            .into_cubic()
            .unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn write_profile_rows() {
        let mut buf = Vec::new();
        write_profile(&[(0.5, 1.0), (1.5, 0.0)], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0.5 1\n1.5 0\n");
    }
}
