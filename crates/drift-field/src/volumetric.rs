//! Structured volumetric grids (`object 1 class gridpositions` format).
//!
//! ```text
//! object 1 class gridpositions counts 3 2 1
//! origin 0 0 0
//! delta 0.5 0 0
//! delta 0 0.5 0
//! delta 0 0 1
//! object 2 class gridconnections counts 3 2 1
//! object 3 class array type double rank 0 items 6 data follows
//! 1 2 3
//! 4 5 6
//! ```
//!
//! Values are listed with the last axis varying fastest, one to three per
//! line. Spacing along an axis is the length of its delta vector.

use crate::bicubic::BicubicField;
use crate::boundary::Boundary;
use crate::error::FieldError;
use crate::grid1d::Grid1D;
use std::io::{BufRead, Write};

/// A parsed volumetric grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Volumetric {
    /// Node counts along each axis.
    pub counts: [usize; 3],
    /// Position of the first node.
    pub origin: [f64; 3],
    /// Basis vectors, one per axis.
    pub deltas: [[f64; 3]; 3],
    /// Values in file order.
    pub values: Vec<f64>,
}

impl Volumetric {
    /// Grid spacing along `axis`: the length of its delta vector.
    pub fn spacing(&self, axis: usize) -> f64 {
        self.deltas[axis].iter().map(|d| d * d).sum::<f64>().sqrt()
    }

    /// Build a bicubic field from the first two axes.
    ///
    /// The third axis must have a single node.
    pub fn into_bicubic(self, boundary: Boundary) -> Result<BicubicField, FieldError> {
        if self.counts[2] != 1 {
            return Err(FieldError::InvalidSpacing {
                reason: format!(
                    "a bicubic field needs one node along z, found {}",
                    self.counts[2]
                ),
            });
        }
        let x = Grid1D::new(self.counts[0], self.origin[0], self.spacing(0), boundary)?;
        let y = Grid1D::new(self.counts[1], self.origin[1], self.spacing(1), boundary)?;
        BicubicField::new(x, y, self.values)
    }
}

fn numbers(tokens: &[&str], line: usize) -> Result<Vec<f64>, FieldError> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<f64>().map_err(|_| FieldError::Parse {
                line,
                reason: format!("`{t}` is not a number"),
            })
        })
        .collect()
}

fn triple(tokens: &[&str], line: usize) -> Result<[f64; 3], FieldError> {
    let v = numbers(tokens, line)?;
    match v.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(FieldError::Parse {
            line,
            reason: format!("expected 3 numbers, found {}", v.len()),
        }),
    }
}

/// Parse a volumetric grid from text.
pub fn parse_volumetric(text: &str) -> Result<Volumetric, FieldError> {
    let mut counts: Option<[usize; 3]> = None;
    let mut declared = 0;
    let mut origin: Option<[f64; 3]> = None;
    let mut deltas: Vec<[f64; 3]> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();

        if tokens[0].parse::<f64>().is_ok() {
            if counts.is_none() {
                return Err(FieldError::MissingHeader {
                    entry: "object 1 class gridpositions counts",
                });
            }
            if tokens.len() > 3 {
                return Err(FieldError::Parse {
                    line,
                    reason: format!("expected 1 to 3 values, found {}", tokens.len()),
                });
            }
            values.extend(numbers(&tokens, line)?);
            if values.len() > declared {
                return Err(FieldError::SizeMismatch {
                    declared,
                    found: values.len(),
                });
            }
            continue;
        }

        match tokens[0] {
            "origin" => origin = Some(triple(&tokens[1..], line)?),
            "delta" => {
                if deltas.len() == 3 {
                    return Err(FieldError::Parse {
                        line,
                        reason: "more than three delta lines".to_string(),
                    });
                }
                deltas.push(triple(&tokens[1..], line)?);
            }
            "object" if tokens.get(1) == Some(&"1") && tokens.contains(&"gridpositions") => {
                let at = tokens
                    .iter()
                    .position(|t| *t == "counts")
                    .ok_or(FieldError::Parse {
                        line,
                        reason: "gridpositions line without counts".to_string(),
                    })?;
                let c = triple(&tokens[at + 1..], line)?;
                if c.iter().any(|v| *v < 0.0 || v.fract() != 0.0) {
                    return Err(FieldError::Parse {
                        line,
                        reason: "counts must be non-negative integers".to_string(),
                    });
                }
                let c = [c[0] as usize, c[1] as usize, c[2] as usize];
                declared = c
                    .iter()
                    .try_fold(1usize, |n, &k| n.checked_mul(k))
                    .ok_or(FieldError::Parse {
                        line,
                        reason: format!("counts {c:?} overflow the value count"),
                    })?;
                if declared == 0 {
                    return Err(FieldError::EmptyField);
                }
                counts = Some(c);
            }
            _ => {}
        }
    }

    let counts = counts.ok_or(FieldError::MissingHeader {
        entry: "object 1 class gridpositions counts",
    })?;
    let origin = origin.ok_or(FieldError::MissingHeader { entry: "origin" })?;
    if deltas.len() < 3 {
        return Err(FieldError::MissingHeader { entry: "delta" });
    }
    if values.len() != declared {
        return Err(FieldError::SizeMismatch {
            declared,
            found: values.len(),
        });
    }
    Ok(Volumetric {
        counts,
        origin,
        deltas: [deltas[0], deltas[1], deltas[2]],
        values,
    })
}

/// Read a volumetric grid from a buffered reader.
pub fn read_volumetric<R: BufRead>(reader: R) -> Result<Volumetric, FieldError> {
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
    parse_volumetric(&lines.join("\n"))
}

/// Write a bicubic field in the volumetric format.
pub fn write_volumetric<W: Write>(field: &BicubicField, mut out: W) -> Result<(), FieldError> {
    let (x, y) = (field.x_axis(), field.y_axis());
    let (nx, ny) = (x.len(), y.len());
    let values = crate::Field::samples(field);
    writeln!(out, "object 1 class gridpositions counts {nx} {ny} 1")?;
    writeln!(out, "origin {} {} 0", x.r0(), y.r0())?;
    writeln!(out, "delta {} 0 0", x.dr())?;
    writeln!(out, "delta 0 {} 0", y.dr())?;
    writeln!(out, "delta 0 0 1")?;
    writeln!(out, "object 2 class gridconnections counts {nx} {ny} 1")?;
    writeln!(
        out,
        "object 3 class array type double rank 0 items {} data follows",
        values.len()
    )?;
    for chunk in values.chunks(3) {
        let row: Vec<String> = chunk.iter().map(f64::to_string).collect();
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    const SAMPLE: &str = "# potential
object 1 class gridpositions counts 3 2 1
origin -1 2 0
delta 0.5 0 0
delta 0 0.25 0
delta 0 0 1
object 2 class gridconnections counts 3 2 1
object 3 class array type double rank 0 items 6 data follows
1 2 3
4 5
6
attribute \"dep\" string \"positions\"
";

    #[test]
    fn parses_header_and_values() {
        let v = parse_volumetric(SAMPLE).unwrap();
        assert_eq!(v.counts, [3, 2, 1]);
        assert_eq!(v.origin, [-1.0, 2.0, 0.0]);
        assert_eq!(v.spacing(0), 0.5);
        assert_eq!(v.spacing(1), 0.25);
        assert_eq!(v.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn bicubic_layout_is_y_fastest() {
        let f = parse_volumetric(SAMPLE)
            .unwrap()
            .into_bicubic(Boundary::Clamp)
            .unwrap();
        assert_eq!(f.len(), 6);
        // Node (ix = 1, iy = 1) is the fourth value.
        assert_eq!(f.evaluate(&[-0.5, 2.25]), 4.0);
    }

    #[test]
    fn values_before_header_are_rejected() {
        let err = parse_volumetric("1 2 3\n").unwrap_err();
        assert!(matches!(err, FieldError::MissingHeader { .. }));
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let short = SAMPLE.replace("6\n", "");
        assert_eq!(
            parse_volumetric(&short),
            Err(FieldError::SizeMismatch {
                declared: 6,
                found: 5
            })
        );
        let long = SAMPLE.replace("6\n", "6 7\n");
        assert!(matches!(
            parse_volumetric(&long),
            Err(FieldError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn zero_counts_are_rejected() {
        let empty = SAMPLE.replace("counts 3 2 1\norigin", "counts 0 2 1\norigin");
        assert_eq!(parse_volumetric(&empty), Err(FieldError::EmptyField));
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let huge = SAMPLE.replace(
            "counts 3 2 1\norigin",
            "counts 10000000000 10000000000 10000000000\norigin",
        );
        assert!(matches!(
            parse_volumetric(&huge),
            Err(FieldError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn missing_delta_is_rejected() {
        let text = SAMPLE.replace("delta 0 0 1\n", "");
        assert_eq!(
            parse_volumetric(&text),
            Err(FieldError::MissingHeader { entry: "delta" })
        );
    }

    #[test]
    fn write_then_read_preserves_field() {
        let f = parse_volumetric(SAMPLE)
            .unwrap()
            .into_bicubic(Boundary::Periodic)
            .unwrap();
        let mut buf = Vec::new();
        write_volumetric(&f, &mut buf).unwrap();
        let back = read_volumetric(buf.as_slice())
            .unwrap()
            .into_bicubic(Boundary::Periodic)
            .unwrap();
        assert_eq!(back, f);
    }
}
