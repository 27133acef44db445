// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. slot::SlotEditor)
    clippy::module_name_repetitions
)]

//! # slotedit
//!
//! Structured expression slots: edit an expression as a tree of fields and
//! operator glyphs, one keystroke at a time.
//!
//! A slot keeps three things consistent as the user types:
//! - The nested tree of fields, operators, brackets and string literals
//! - The caret, as a path into that tree
//! - The flat text, both as shown in the editor and as generated Java
//!
//! ## Example
//!
//! ```
//! use slotedit::slot::{CaretPos, Dialect, SlotEditor};
//!
//! let mut slot = SlotEditor::new(Dialect::Expression);
//! let caret = slot.insert(&CaretPos::start(), "a+(b-c)");
//! assert_eq!(slot.annotated(Some(&caret)), "{a}+{}_({b}-{c})_{$}");
//! assert_eq!(slot.target_code(), "a + (b - c)");
//! ```
//!
//! ## Modules
//!
//! - [`slot`]: The tree, the edit engine and caret paths
//! - [`script`]: Line-oriented edit scripts and sessions
//! - [`config`]: Saved command-line defaults
//! - [`perf`]: Timing scopes and the edit journal

pub mod config;
pub mod perf;
pub mod script;
pub mod slot;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::slot::{CaretPos, Dialect, Form, SlotEditor};
}
