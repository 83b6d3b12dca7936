//! Boundary behavior for uniform grids.

/// How a grid treats coordinates and node indices beyond its ends.
///
/// # Examples
///
/// ```
/// use drift_field::Boundary;
///
/// assert_eq!(Boundary::Periodic.resolve(-1, 5), 4);
/// assert_eq!(Boundary::Clamp.resolve(-1, 5), 0);
/// assert_eq!(Boundary::Clamp.resolve(7, 5), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Out-of-range indices map to the nearest end node.
    Clamp,
    /// Out-of-range indices wrap to the opposite side.
    Periodic,
}

impl Boundary {
    /// `Periodic` when `periodic` is true, `Clamp` otherwise.
    pub fn from_periodic(periodic: bool) -> Self {
        if periodic {
            Self::Periodic
        } else {
            Self::Clamp
        }
    }

    /// Whether this boundary wraps.
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Periodic)
    }

    /// Map a possibly out-of-range index into `[0, len)`.
    ///
    /// `len` must be non-zero.
    pub fn resolve(self, i: i64, len: usize) -> usize {
        let n = len as i64;
        match self {
            Self::Periodic => i.rem_euclid(n) as usize,
            Self::Clamp => i.clamp(0, n - 1) as usize,
        }
    }

    /// Map an index into `[0, len)`, or `None` if it falls off a clamped edge.
    pub fn filter(self, i: i64, len: usize) -> Option<usize> {
        match self {
            Self::Periodic => Some(self.resolve(i, len)),
            Self::Clamp => (i >= 0 && i < len as i64).then_some(i as usize),
        }
    }
}
