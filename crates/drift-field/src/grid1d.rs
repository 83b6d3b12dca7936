//! Uniform 1D grid geometry shared by every field variant.

use crate::boundary::Boundary;
use crate::error::FieldError;
use drift_core::NodeList;

/// A uniform 1D grid of `n` nodes at `r0 + j * dr`.
///
/// The domain is `[r0, r1)` with `r1 = r0 + n * dr`: the last cell ends
/// one step beyond the last node. With [`Boundary::Periodic`] the domain
/// length `n * dr` is the period.
///
/// # Examples
///
/// ```
/// use drift_field::{Boundary, Grid1D};
///
/// let grid = Grid1D::new(10, 0.0, 0.5, Boundary::Periodic).unwrap();
/// assert_eq!(grid.r1(), 5.0);
/// assert_eq!(grid.nearest_node(4.9), 0);
/// assert_eq!(grid.enclosing_node(4.9), 9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid1D {
    n: usize,
    r0: f64,
    dr: f64,
    boundary: Boundary,
}

impl Grid1D {
    /// Create a grid with `n` nodes starting at `r0` with spacing `dr`.
    ///
    /// Returns `Err(FieldError::EmptyField)` if `n == 0` and
    /// `Err(FieldError::InvalidSpacing)` if `dr` is not finite and
    /// positive or `r0` is not finite.
    pub fn new(n: usize, r0: f64, dr: f64, boundary: Boundary) -> Result<Self, FieldError> {
        if n == 0 {
            return Err(FieldError::EmptyField);
        }
        if !(dr > 0.0) || !dr.is_finite() {
            return Err(FieldError::InvalidSpacing {
                reason: format!("spacing must be finite and > 0, got {dr}"),
            });
        }
        if !r0.is_finite() {
            return Err(FieldError::InvalidSpacing {
                reason: format!("origin must be finite, got {r0}"),
            });
        }
        Ok(Self { n, r0, dr, boundary })
    }

    /// Create a grid of `n` cells exactly covering `[r0, r1)`.
    pub fn spanning(r0: f64, r1: f64, n: usize, boundary: Boundary) -> Result<Self, FieldError> {
        if n == 0 {
            return Err(FieldError::EmptyField);
        }
        Self::new(n, r0, (r1 - r0) / n as f64, boundary)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always returns `false`: construction rejects `n == 0`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Position of node 0.
    pub fn r0(&self) -> f64 {
        self.r0
    }

    /// Upper end of the domain, one step beyond the last node.
    pub fn r1(&self) -> f64 {
        self.r0 + self.n as f64 * self.dr
    }

    /// Node spacing.
    pub fn dr(&self) -> f64 {
        self.dr
    }

    /// Domain length (the period when periodic).
    pub fn length(&self) -> f64 {
        self.n as f64 * self.dr
    }

    /// Boundary behavior.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Whether the grid wraps.
    pub fn is_periodic(&self) -> bool {
        self.boundary.is_periodic()
    }

    /// Position of node `j`.
    pub fn node_position(&self, j: usize) -> f64 {
        self.r0 + j as f64 * self.dr
    }

    /// Position of the last node.
    pub fn last_node_position(&self) -> f64 {
        self.node_position(self.n - 1)
    }

    /// Map an arbitrary index onto the grid by the boundary rule.
    pub fn wrap_index(&self, i: i64) -> usize {
        self.boundary.resolve(i, self.n)
    }

    /// Bring a coordinate into `[r0, r1)` when periodic; identity otherwise.
    pub fn wrap(&self, x: f64) -> f64 {
        if self.is_periodic() {
            let l = self.length();
            x - ((x - self.r0) / l).floor() * l
        } else {
            x
        }
    }

    /// Clamp a coordinate to `[r0, last node]` unless periodic.
    pub fn wrap_to_nodes(&self, x: f64) -> f64 {
        if self.is_periodic() {
            self.wrap(x)
        } else {
            x.clamp(self.r0, self.last_node_position())
        }
    }

    /// Node closest to `x`.
    pub fn nearest_node(&self, x: f64) -> usize {
        self.wrap_index(((x - self.r0) / self.dr + 0.5).floor() as i64)
    }

    /// Node at or below `x`: the home node of the cell containing `x`.
    pub fn enclosing_node(&self, x: f64) -> usize {
        self.wrap_index(((x - self.r0) / self.dr).floor() as i64)
    }

    /// Previous node, or `None` at the lower edge of a clamped grid.
    pub fn prev_index(&self, j: usize) -> Option<usize> {
        self.boundary.filter(j as i64 - 1, self.n)
    }

    /// Next node, or `None` at the upper edge of a clamped grid.
    pub fn next_index(&self, j: usize) -> Option<usize> {
        self.boundary.filter(j as i64 + 1, self.n)
    }

    /// Nodes `j + lo ..= j + hi`, wrapped when periodic and dropped off
    /// clamped edges. Duplicates from wrapping a short grid are removed.
    pub fn window(&self, j: usize, lo: i64, hi: i64) -> NodeList {
        let mut out = NodeList::new();
        for k in lo..=hi {
            if let Some(i) = self.boundary.filter(j as i64 + k, self.n) {
                if !out.contains(&i) {
                    out.push(i);
                }
            }
        }
        out
    }

    /// Nodes within `hop` of `j`, or every node when the window covers the grid.
    pub fn region(&self, j: usize, hop: usize) -> NodeList {
        if hop >= self.n {
            return (0..self.n).collect();
        }
        self.window(j, -(hop as i64), hop as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize, periodic: bool) -> Grid1D {
        Grid1D::new(n, -1.0, 0.5, Boundary::from_periodic(periodic)).unwrap()
    }

    #[test]
    fn rejects_bad_geometry() {
        assert_eq!(
            Grid1D::new(0, 0.0, 1.0, Boundary::Clamp),
            Err(FieldError::EmptyField)
        );
        assert!(Grid1D::new(3, 0.0, 0.0, Boundary::Clamp).is_err());
        assert!(Grid1D::new(3, 0.0, f64::NAN, Boundary::Clamp).is_err());
        assert!(Grid1D::new(3, f64::INFINITY, 1.0, Boundary::Clamp).is_err());
    }

    #[test]
    fn geometry() {
        let g = grid(4, false);
        assert_eq!(g.r1(), 1.0);
        assert_eq!(g.length(), 2.0);
        assert_eq!(g.node_position(3), 0.5);
        assert_eq!(g.last_node_position(), 0.5);
    }

    #[test]
    fn spanning_divides_range() {
        let g = Grid1D::spanning(0.0, 2.0, 8, Boundary::Clamp).unwrap();
        assert_eq!(g.dr(), 0.25);
        assert_eq!(g.r1(), 2.0);
    }

    #[test]
    fn node_lookup_clamps_or_wraps() {
        let clamped = grid(4, false);
        assert_eq!(clamped.nearest_node(-5.0), 0);
        assert_eq!(clamped.nearest_node(5.0), 3);
        assert_eq!(clamped.enclosing_node(-0.26), 1);
        assert_eq!(clamped.nearest_node(-0.26), 1);
        assert_eq!(clamped.nearest_node(-0.24), 2);

        let periodic = grid(4, true);
        assert_eq!(periodic.enclosing_node(1.1), 0);
        assert_eq!(periodic.enclosing_node(-1.1), 3);
        assert_eq!(periodic.nearest_node(0.8), 0);
    }

    #[test]
    fn wrap_coordinate() {
        let g = grid(4, true);
        assert!((g.wrap(1.25) - (-0.75)).abs() < 1e-15);
        assert!((g.wrap(-1.5) - 0.5).abs() < 1e-15);
        let c = grid(4, false);
        assert_eq!(c.wrap(7.0), 7.0);
        assert_eq!(c.wrap_to_nodes(7.0), 0.5);
    }

    #[test]
    fn prev_next_at_edges() {
        let c = grid(4, false);
        assert_eq!(c.prev_index(0), None);
        assert_eq!(c.next_index(3), None);
        assert_eq!(c.next_index(1), Some(2));

        let p = grid(4, true);
        assert_eq!(p.prev_index(0), Some(3));
        assert_eq!(p.next_index(3), Some(0));
    }

    #[test]
    fn window_dedups_short_periodic_grid() {
        let p = grid(3, true);
        let w = p.window(0, -2, 1);
        assert_eq!(w.len(), 3);

        let c = grid(10, false);
        assert_eq!(c.window(0, -2, 1).as_slice(), &[0, 1]);
        assert_eq!(c.window(5, -2, 1).as_slice(), &[3, 4, 5, 6]);
    }

    #[test]
    fn region_covers_grid_when_hop_large() {
        let c = grid(6, false);
        assert_eq!(c.region(2, 6).len(), 6);
        assert_eq!(c.region(0, 2).as_slice(), &[0, 1, 2]);
        let p = grid(6, true);
        assert_eq!(p.region(0, 1).as_slice(), &[5, 0, 1]);
    }
}
