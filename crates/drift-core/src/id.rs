//! Strongly-typed identifiers and the [`NodeList`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a field within a field store.
///
/// Fields are registered once during setup and assigned sequential IDs.
/// `FieldId(n)` corresponds to the n-th field pushed into the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl FieldId {
    /// Position of this field in its store.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Flat node indices of a stencil or neighbourhood.
///
/// Inline capacity covers the 5x5 window of a bicubic field, so
/// neighbourhood queries never allocate on the hot path.
pub type NodeList = SmallVec<[usize; 25]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_display_and_index() {
        let id = FieldId::from(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn node_list_stays_inline_for_bicubic_window() {
        let list: NodeList = (0..25).collect();
        assert!(!list.spilled());
    }
}
