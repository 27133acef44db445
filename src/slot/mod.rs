//! Structured expression slots.
//!
//! A slot edits an expression (or a type reference) as a tree of plain
//! fields separated by fixed operator glyphs, nested inside bracket pairs
//! and string literals, instead of as flat text. Each keystroke is applied
//! to the tree directly, and the caret is tracked as a path into it.
//!
//! - [`SlotEditor`]: the host-facing slot and its editing operations
//! - [`CaretPos`]: caret paths
//! - [`Dialect`]: expression or type grammar
//! - [`Structured`]: one level of the tree

mod caret;
mod dialect;
mod edit;
mod editor;
mod item;
pub mod literal;
mod operator;
mod structured;

pub use caret::CaretPos;
pub use dialect::{Dialect, Token};
pub use editor::SlotEditor;
pub use item::{Item, SlotKind};
pub use operator::{Operator, Precedence, calculate_precedences};
pub use structured::{Component, DEFAULT_RANGE_FUNCTION, Form, Structured};
