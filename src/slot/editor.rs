use std::fmt;

use tracing::{debug, trace, warn};

use super::caret::CaretPos;
use super::dialect::Dialect;
use super::edit::Outcome;
use super::structured::{Component, DEFAULT_RANGE_FUNCTION, Form, Projection, Structured};

/// An editable structured slot: the tree, plus the operations a host editor
/// forwards keystrokes to.
///
/// Every operation takes the caret the host currently shows and returns the
/// caret to show next. Operations are total: input that means nothing (a
/// stray closing bracket, backspace at the very start, a character the
/// dialect does not allow) leaves the slot unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct SlotEditor {
    root: Structured,
    range_function: String,
}

impl SlotEditor {
    /// Create an empty slot.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            root: Structured::new(dialect),
            range_function: DEFAULT_RANGE_FUNCTION.to_string(),
        }
    }

    /// Create a slot holding `text`, typed in from the start.
    pub fn from_text(dialect: Dialect, text: &str) -> Self {
        let mut slot = Self::new(dialect);
        slot.set_text(text);
        slot
    }

    /// Use a different helper when generating Java for `a..b`.
    #[must_use]
    pub fn with_range_function(mut self, name: impl Into<String>) -> Self {
        self.range_function = name.into();
        self
    }

    pub const fn dialect(&self) -> Dialect {
        self.root.dialect()
    }

    /// The top level of the tree.
    pub const fn root(&self) -> &Structured {
        &self.root
    }

    pub fn start_pos(&self) -> CaretPos {
        CaretPos::start()
    }

    pub fn end_pos(&self) -> CaretPos {
        CaretPos::new(self.root.end_path())
    }

    // --- Editing ---

    /// Type `text` at `pos`, returning the caret after the last character.
    pub fn insert(&mut self, pos: &CaretPos, text: &str) -> CaretPos {
        self.insert_marked(pos, text, None)
    }

    /// Type `text` at `pos`. The first occurrence of `marker` is not typed;
    /// the caret reached at that point is returned instead of the final one.
    pub fn insert_marked(&mut self, pos: &CaretPos, text: &str, marker: Option<char>) -> CaretPos {
        if !self.check_path(pos) {
            return pos.clone();
        }
        trace!(%pos, text, "insert");
        let mut caret = pos.path().to_vec();
        // Later characters may restructure the field the marker fell in, so
        // it is remembered as an offset into the editor text.
        let mut remembered = None;
        for c in text.chars() {
            if remembered.is_none() && Some(c) == marker {
                remembered = Some(self.root.editor_offset(&caret).unwrap_or_default());
                continue;
            }
            // A close with no matching bracket leaves the caret where it was.
            if let Outcome::At(next) = self.root.insert_char(&caret, c) {
                caret = next;
            }
        }
        self.root.refresh_precedences();
        CaretPos::new(remembered.map_or(caret, |offset| self.root.path_at_editor_offset(offset)))
    }

    /// Remove the character, operator or bracket left of the caret.
    pub fn backspace(&mut self, pos: &CaretPos) -> CaretPos {
        if !self.check_path(pos) {
            return pos.clone();
        }
        trace!(%pos, "backspace");
        let caret = match self.root.backspace(pos.path()) {
            Outcome::At(caret) => CaretPos::new(caret),
            Outcome::Close(_) | Outcome::Unwrap { .. } => pos.clone(),
        };
        self.root.refresh_precedences();
        caret
    }

    /// Remove the character, operator or bracket right of the caret.
    pub fn delete(&mut self, pos: &CaretPos) -> CaretPos {
        if !self.check_path(pos) {
            return pos.clone();
        }
        trace!(%pos, "delete");
        let caret = match self.root.delete(pos.path()) {
            Outcome::At(caret) => CaretPos::new(caret),
            Outcome::Close(_) | Outcome::Unwrap { .. } => pos.clone(),
        };
        self.root.refresh_precedences();
        caret
    }

    /// Delete everything between two carets, in either order.
    pub fn delete_selection(&mut self, a: &CaretPos, b: &CaretPos) -> CaretPos {
        if !self.check_path(a) || !self.check_path(b) {
            return a.clone();
        }
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        if start == end {
            return start.clone();
        }
        trace!(%start, %end, "delete selection");
        let caret = self.root.delete_range(start.path(), end.path());
        self.root.refresh_precedences();
        CaretPos::new(caret)
    }

    /// Type `c` over a selection.
    ///
    /// An opening bracket wraps the selection in a new bracket pair, a quote
    /// wraps its text in a new literal. Anything else replaces it.
    pub fn insert_with_selection(&mut self, a: &CaretPos, b: &CaretPos, c: char) -> CaretPos {
        if !self.check_path(a) || !self.check_path(b) {
            return a.clone();
        }
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let dialect = self.dialect();
        if dialect.is_disallowed(c) {
            return end.clone();
        }
        if self.root.is_in_literal(end.path()) && dialect.is_quote(c) {
            return self.insert(end, &c.to_string());
        }

        let wraps = !self.root.is_in_literal(end.path())
            && (dialect.closing_for(c).is_some() || dialect.is_quote(c));
        if !wraps {
            let caret = self.delete_selection(start, end);
            return self.insert(&caret, &c.to_string());
        }

        let content = self.copy_text(start, end);
        debug!(%start, %end, wrap = %c, "wrapping selection");
        let caret = self.delete_selection(start, end);
        if self.root.is_in_literal(caret.path()) {
            return self.insert(&caret, &c.to_string());
        }
        let caret = if dialect.is_quote(c) {
            self.root.insert_literal(caret.path(), c, content)
        } else {
            match self.root.insert_char(caret.path(), c) {
                Outcome::At(inside) => self.fill_bracket(&inside, &content).unwrap_or(inside),
                Outcome::Close(_) | Outcome::Unwrap { .. } => return caret,
            }
        };
        self.root.refresh_precedences();
        CaretPos::new(caret)
    }

    /// Type `content` into the bracket just opened at `inside`, returning the
    /// caret after its closing bracket. Closers in `content` stay inside.
    fn fill_bracket(&mut self, inside: &[usize], content: &str) -> Option<Vec<usize>> {
        let [outer @ .., bracket, 0, 0] = inside else {
            return None;
        };
        let mut path = outer.to_vec();
        path.push(*bracket);
        self.root.level_mut(&path)?.insert_text(vec![0, 0], content);
        path.pop();
        path.extend([bracket + 1, 0]);
        Some(path)
    }

    /// Replace the whole slot with `text`, typed in from the start.
    pub fn set_text(&mut self, text: &str) {
        self.blank();
        self.insert(&CaretPos::start(), text);
    }

    /// Replace the flat-text range `start..end` of `form` with `text`.
    ///
    /// Returns `None` when either offset does not map to a caret.
    pub fn replace(&mut self, start: usize, end: usize, form: Form, text: &str) -> Option<CaretPos> {
        let from = self.string_pos_to_caret_pos(start, form)?;
        let to = self.string_pos_to_caret_pos(end, form)?;
        let caret = self.delete_selection(&from, &to);
        Some(self.insert(&caret, text))
    }

    pub fn blank(&mut self) {
        self.root = Structured::new(self.dialect());
    }

    fn check_path(&self, pos: &CaretPos) -> bool {
        let valid = self.root.is_valid_path(pos.path());
        if !valid {
            warn!(%pos, "caret does not address this slot");
        }
        valid
    }

    // --- Queries ---

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn is_almost_blank(&self) -> bool {
        self.root.is_almost_blank()
    }

    pub fn flatten(&self, form: Form) -> String {
        self.project(form).text
    }

    pub fn editor_text(&self) -> String {
        self.flatten(Form::Editor)
    }

    /// Generated Java for the slot.
    pub fn target_code(&self) -> String {
        self.flatten(Form::Target)
    }

    /// Editor text between two carets, in either order.
    pub fn copy_text(&self, a: &CaretPos, b: &CaretPos) -> String {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.root.copy_text(Some(start.path()), Some(end.path()))
    }

    /// Offset of `pos` within the flat text of `form`.
    pub fn caret_pos_to_string_pos(&self, pos: &CaretPos, form: Form) -> Option<usize> {
        let (offset, prefix) = pos.path().split_last()?;
        self.project(form)
            .spans
            .iter()
            .find(|span| span.prefix == prefix)
            .filter(|span| span.start + offset <= span.end)
            .map(|span| span.start + offset)
    }

    /// Caret at `offset` within the flat text of `form`.
    ///
    /// In editor form, offsets inside an operator glyph or a delimiter map to
    /// nothing. In target form they snap forward to the next editable text,
    /// since generated code pads and rewrites operators.
    pub fn string_pos_to_caret_pos(&self, offset: usize, form: Form) -> Option<CaretPos> {
        let projection = self.project(form);
        let span = projection.spans.iter().find(|span| offset <= span.end)?;
        if offset < span.start && form == Form::Editor {
            return None;
        }
        let mut path = span.prefix.clone();
        path.push(offset.saturating_sub(span.start));
        Some(CaretPos::new(path))
    }

    fn project(&self, form: Form) -> Projection {
        let mut out = Projection::default();
        self.root
            .project(form, &self.range_function, &mut Vec::new(), &mut out);
        out
    }

    /// Displayable components, nested brackets included.
    pub fn render(&self) -> Vec<Component> {
        self.root.render()
    }

    /// The editor text either side of the one top-level comma, or `None`
    /// when there is no such comma or more than one.
    pub fn split_on_direct_comma(&self) -> Option<(String, String)> {
        self.try_split_on(",")
    }

    /// The editor text either side of the one top-level `glyph` operator.
    pub fn try_split_on(&self, glyph: &str) -> Option<(String, String)> {
        self.root.try_split_on(glyph)
    }

    /// Debug rendering with `$` at `caret`; see [`Structured::annotated`].
    pub fn annotated(&self, caret: Option<&CaretPos>) -> String {
        self.root.annotated(caret.map(CaretPos::path))
    }
}

impl fmt::Debug for SlotEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotEditor")
            .field("dialect", &self.dialect())
            .field("state", &self.annotated(None))
            .finish_non_exhaustive()
    }
}
