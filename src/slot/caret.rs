use std::fmt;

use serde::{Deserialize, Serialize};

/// A caret position inside a (possibly nested) structured slot.
///
/// The path is read left to right: every element but the last selects an
/// item at successive nesting levels, the last element is a character offset
/// within the leaf text it lands in. `[2, 0, 3]` is "item 2 of the top level
/// (a bracket), item 0 of its content, offset 3".
///
/// Paths compare lexicographically, which is document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct CaretPos(Vec<usize>);

impl CaretPos {
    /// Caret at the very start of a slot.
    pub fn start() -> Self {
        Self(vec![0, 0])
    }

    /// Create a caret from its raw path.
    ///
    /// Paths shorter than two elements are padded so they always address a
    /// leaf offset.
    pub fn new(mut path: Vec<usize>) -> Self {
        while path.len() < 2 {
            path.push(0);
        }
        Self(path)
    }

    /// Caret at `offset` within item `index` of the top level.
    pub fn at(index: usize, offset: usize) -> Self {
        Self(vec![index, offset])
    }

    /// Item index at the top level.
    pub fn index(&self) -> usize {
        self.0[0]
    }

    /// The raw path.
    pub fn path(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth; 0 for a caret in a top-level field.
    pub fn depth(&self) -> usize {
        self.0.len() - 2
    }
}

impl From<Vec<usize>> for CaretPos {
    fn from(path: Vec<usize>) -> Self {
        Self::new(path)
    }
}

impl From<CaretPos> for Vec<usize> {
    fn from(pos: CaretPos) -> Self {
        pos.0
    }
}

impl fmt::Display for CaretPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        write!(f, "{}", parts.join(","))
    }
}

/// Prefix `index` onto a path produced by a nested level.
pub(crate) fn nest(index: usize, mut sub: Vec<usize>) -> Vec<usize> {
    sub.insert(0, index);
    sub
}
