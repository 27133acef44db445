//! One nesting level of a structured slot.
//!
//! A level alternates items and operators:
//!
//! ```text
//! items:      {a}   {}   (..)   {}   {b}
//! operators:     +     _      _     *
//! ```
//!
//! `_` is the adjacency (`None`) between a compound item (a literal or a
//! bracket) and the plain fields that always flank it. The first and last
//! items are always plain fields, and `operators.len() == items.len() - 1`.

use serde::{Deserialize, Serialize};

use super::dialect::Dialect;
use super::item::{Item, SlotKind, char_len};
use super::operator::{Operator, Precedence, calculate_precedences};

/// Range helper used when generating Java for `a..b`.
pub const DEFAULT_RANGE_FUNCTION: &str = "lang.stride.Utility.makeRange";

/// Which flat text a position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    /// Exactly what the user sees, every glyph literal.
    Editor,
    /// Generated Java.
    Target,
}

/// A displayable element of the slot, as laid out by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    Field {
        text: String,
        slot: SlotKind,
    },
    Literal {
        quote: char,
        text: String,
    },
    Operator {
        glyph: String,
        precedence: Precedence,
    },
    /// Zero-width join between a field and a compound item.
    Adjacent,
    Bracket {
        opening: char,
        closing: char,
        content: Vec<Component>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structured {
    pub(super) dialect: Dialect,
    pub(super) items: Vec<Item>,
    pub(super) operators: Vec<Option<Operator>>,
}

/// Location of one leaf text within a projected string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    /// Caret path minus the final offset.
    pub prefix: Vec<usize>,
    pub start: usize,
    pub end: usize,
}

/// A flattened rendering together with where each leaf landed in it.
#[derive(Debug, Default)]
pub(crate) struct Projection {
    pub text: String,
    pub spans: Vec<Span>,
    len: usize,
}

impl Projection {
    fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.len += char_len(s);
    }

    fn push_char(&mut self, c: char) {
        self.text.push(c);
        self.len += 1;
    }

    fn push_leaf(&mut self, prefix: &[usize], text: &str) {
        let start = self.len;
        self.push_str(text);
        self.spans.push(Span {
            prefix: prefix.to_vec(),
            start,
            end: self.len,
        });
    }
}

impl Structured {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            items: vec![Item::field("")],
            operators: Vec::new(),
        }
    }

    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn operators(&self) -> &[Option<Operator>] {
        &self.operators
    }

    /// Glyph of operator `index`, empty for adjacency or out of range.
    pub(super) fn op_glyph(&self, index: usize) -> &str {
        self.operators
            .get(index)
            .and_then(Option::as_ref)
            .map_or("", Operator::glyph)
    }

    pub(super) fn field_text(&self, index: usize) -> Option<&str> {
        self.items.get(index).and_then(Item::as_field)
    }

    /// Path of the very last caret position at this level.
    pub fn end_path(&self) -> Vec<usize> {
        let last = self.items.len() - 1;
        vec![last, self.items[last].leaf_len()]
    }

    /// True for a single empty field.
    pub fn is_empty(&self) -> bool {
        self.items.len() == 1 && self.items[0].leaf_len() == 0
    }

    /// True when nothing but empty fields and (recursively blank) brackets
    /// remain, such as `()` or `[()]`.
    pub fn is_almost_blank(&self) -> bool {
        self.operators.iter().all(Option::is_none)
            && self.items.iter().all(|item| match item {
                Item::Field(text) => text.is_empty(),
                Item::Literal { .. } => false,
                Item::Bracketed { content, .. } => content.is_almost_blank(),
            })
    }

    /// True when every plain field is a numeric literal and nothing else is
    /// present.
    pub fn is_numeric_literal(&self) -> bool {
        self.items.len() == 1 && self.items[0].kind() == SlotKind::Numeric
    }

    pub fn editor_text(&self) -> String {
        self.copy_text(None, None)
    }

    /// Editor text between two paths at this level; `None` means the start
    /// or end of the level.
    pub fn copy_text(&self, from: Option<&[usize]>, to: Option<&[usize]>) -> String {
        let first = from.map_or(0, |p| p[0]);
        let last = to.map_or(self.items.len() - 1, |p| p[0]);
        if first > last || last >= self.items.len() {
            return String::new();
        }
        if first == last {
            return self.items[first].copy_text(inner(from), inner(to));
        }
        let mut out = self.items[first].copy_text(inner(from), None);
        for i in first..last {
            out.push_str(self.op_glyph(i));
            if i + 1 < last {
                out.push_str(&self.items[i + 1].editor_text());
            }
        }
        out.push_str(&self.items[last].copy_text(None, inner(to)));
        out
    }

    /// True when `path` addresses a leaf position in this level.
    pub fn is_valid_path(&self, path: &[usize]) -> bool {
        let Some((&index, rest)) = path.split_first() else {
            return false;
        };
        match (self.items.get(index), rest) {
            (Some(Item::Bracketed { content, .. }), rest) => content.is_valid_path(rest),
            (Some(item), [offset]) => *offset <= item.leaf_len(),
            _ => false,
        }
    }

    /// True when `path` ends inside a string or character literal.
    pub fn is_in_literal(&self, path: &[usize]) -> bool {
        match (self.items.get(path[0]), &path[1..]) {
            (Some(Item::Bracketed { content, .. }), rest) if rest.len() > 1 => {
                content.is_in_literal(rest)
            }
            (Some(item), _) => item.is_literal(),
            (None, _) => false,
        }
    }

    /// The nested level reached by following `prefix` through brackets.
    pub(super) fn level_mut(&mut self, prefix: &[usize]) -> Option<&mut Self> {
        let Some((&index, rest)) = prefix.split_first() else {
            return Some(self);
        };
        match self.items.get_mut(index) {
            Some(Item::Bracketed { content, .. }) => content.level_mut(rest),
            _ => None,
        }
    }

    fn editor_projection(&self) -> Projection {
        let mut out = Projection::default();
        self.project(Form::Editor, DEFAULT_RANGE_FUNCTION, &mut Vec::new(), &mut out);
        out
    }

    /// Offset of `path` within this level's editor text.
    pub(super) fn editor_offset(&self, path: &[usize]) -> Option<usize> {
        let (offset, prefix) = path.split_last()?;
        self.editor_projection()
            .spans
            .iter()
            .find(|span| span.prefix == prefix)
            .map(|span| (span.start + offset).min(span.end))
    }

    /// The first caret at or after `offset` in this level's editor text.
    pub(super) fn path_at_editor_offset(&self, offset: usize) -> Vec<usize> {
        self.editor_projection()
            .spans
            .iter()
            .find(|span| offset <= span.end)
            .map_or_else(
                || self.end_path(),
                |span| {
                    let mut path = span.prefix.clone();
                    path.push(offset.saturating_sub(span.start));
                    path
                },
            )
    }

    /// Recompute precedence classes at this level and every nested one.
    pub(super) fn refresh_precedences(&mut self) {
        let unary = (0..self.operators.len())
            .map(|i| self.is_unary(i))
            .collect::<Vec<_>>();
        calculate_precedences(&mut self.operators, &unary);
        for item in &mut self.items {
            if let Item::Bracketed { content, .. } = item {
                content.refresh_precedences();
            }
        }
    }

    /// An operator is a prefix when nothing stands before it: the field to
    /// its left is empty and is not itself the tail of a compound item.
    fn is_unary(&self, index: usize) -> bool {
        let glyph = self.op_glyph(index);
        !glyph.is_empty()
            && self.dialect.can_be_unary(glyph)
            && self.field_text(index) == Some("")
            && (index == 0 || self.operators[index - 1].is_some())
    }

    /// Project the level to flat text, recording where every leaf lands.
    pub(crate) fn project(
        &self,
        form: Form,
        range_function: &str,
        prefix: &mut Vec<usize>,
        out: &mut Projection,
    ) {
        if form == Form::Editor {
            self.project_range(form, range_function, prefix, out, 0, self.items.len());
            return;
        }

        // Commas close any ranges opened since the previous comma.
        let mut closing = 0;
        let mut last = 0;
        for i in 0..self.operators.len() {
            match self.op_glyph(i) {
                ".." => {
                    out.push_str(range_function);
                    out.push_char('(');
                    self.project_range(form, range_function, prefix, out, last, i + 1);
                    out.push_str(", ");
                    last = i + 1;
                    closing += 1;
                }
                "," => {
                    self.project_range(form, range_function, prefix, out, last, i + 1);
                    out.push_str(&")".repeat(closing));
                    out.push_str(", ");
                    closing = 0;
                    last = i + 1;
                }
                _ => {}
            }
        }
        self.project_range(form, range_function, prefix, out, last, self.items.len());
        out.push_str(&")".repeat(closing));
    }

    fn project_range(
        &self,
        form: Form,
        range_function: &str,
        prefix: &mut Vec<usize>,
        out: &mut Projection,
        start: usize,
        end: usize,
    ) {
        for i in start..end {
            prefix.push(i);
            match &self.items[i] {
                Item::Field(text) => out.push_leaf(prefix, text),
                Item::Literal { quote, text } => {
                    out.push_char(*quote);
                    out.push_leaf(prefix, text);
                    out.push_char(*quote);
                }
                Item::Bracketed {
                    opening,
                    closing,
                    content,
                } => {
                    out.push_char(*opening);
                    content.project(form, range_function, prefix, out);
                    out.push_char(*closing);
                }
            }
            prefix.pop();

            if i + 1 < end {
                if let Some(op) = &self.operators[i] {
                    match form {
                        Form::Editor => out.push_str(op.glyph()),
                        Form::Target => out.push_str(&op.target_code()),
                    }
                }
            }
        }
    }

    pub fn render(&self) -> Vec<Component> {
        let mut components = Vec::with_capacity(self.items.len() * 2);
        for (i, item) in self.items.iter().enumerate() {
            components.push(match item {
                Item::Field(text) => Component::Field {
                    text: text.clone(),
                    slot: item.kind(),
                },
                Item::Literal { quote, text } => Component::Literal {
                    quote: *quote,
                    text: text.clone(),
                },
                Item::Bracketed {
                    opening,
                    closing,
                    content,
                } => Component::Bracket {
                    opening: *opening,
                    closing: *closing,
                    content: content.render(),
                },
            });
            if let Some(op) = self.operators.get(i) {
                components.push(op.as_ref().map_or(Component::Adjacent, |op| {
                    Component::Operator {
                        glyph: op.glyph().to_string(),
                        precedence: op.precedence(),
                    }
                }));
            }
        }
        components
    }

    /// Debug rendering: `{field}`, `"literal"`, `_` for adjacency, operator
    /// glyphs as-is, and `$` at the caret.
    pub fn annotated(&self, caret: Option<&[usize]>) -> String {
        let mut out = String::new();
        for (i, item) in self.items.iter().enumerate() {
            let here = caret.filter(|c| c[0] == i).map(|c| &c[1..]);
            match item {
                Item::Field(text) => {
                    out.push('{');
                    out.push_str(&with_caret(text, here));
                    out.push('}');
                }
                Item::Literal { quote, text } => {
                    out.push(*quote);
                    out.push_str(&with_caret(text, here));
                    out.push(*quote);
                }
                Item::Bracketed {
                    opening,
                    closing,
                    content,
                } => {
                    out.push(*opening);
                    out.push_str(&content.annotated(here));
                    out.push(*closing);
                }
            }
            if let Some(op) = self.operators.get(i) {
                out.push_str(op.as_ref().map_or("_", Operator::glyph));
            }
        }
        out
    }

    /// Split around the sole occurrence of `glyph` at this level, returning
    /// the editor text on each side.
    pub fn try_split_on(&self, glyph: &str) -> Option<(String, String)> {
        let mut found = self
            .operators
            .iter()
            .enumerate()
            .filter(|(_, op)| op.as_ref().is_some_and(|op| op.glyph() == glyph))
            .map(|(i, _)| i);
        let index = found.next()?;
        if found.next().is_some() {
            return None;
        }
        let end_of_left = [index, self.items[index].leaf_len()];
        let start_of_right = [index + 1, 0];
        Some((
            self.copy_text(None, Some(&end_of_left)),
            self.copy_text(Some(&start_of_right), None),
        ))
    }
}

/// The part of an optional path below the current level.
fn inner(path: Option<&[usize]>) -> Option<&[usize]> {
    path.map(|p| &p[1..])
}

fn with_caret(text: &str, caret: Option<&[usize]>) -> String {
    match caret {
        Some([offset]) => {
            let (before, after) = super::item::split_at_char(text, *offset);
            format!("{before}${after}")
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(items: Vec<Item>, ops: &[&str]) -> Structured {
        Structured {
            dialect: Dialect::Expression,
            items,
            operators: ops
                .iter()
                .map(|g| (*g != "_").then(|| Operator::new(*g)))
                .collect(),
        }
    }

    fn bracket(content: Structured) -> Item {
        Item::Bracketed {
            opening: '(',
            closing: ')',
            content,
        }
    }

    fn project(s: &Structured, form: Form) -> Projection {
        let mut out = Projection::default();
        s.project(form, DEFAULT_RANGE_FUNCTION, &mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_new_level_is_single_empty_field() {
        let s = Structured::new(Dialect::Type);
        assert!(s.is_empty());
        assert!(s.is_almost_blank());
        assert_eq!(s.annotated(Some(&[0, 0])), "{$}");
    }

    #[test]
    fn test_annotated_marks_adjacency_and_caret() {
        let inner = level(vec![Item::field("b"), Item::field("c")], &["-"]);
        let s = level(
            vec![Item::field("a"), Item::field(""), bracket(inner), Item::field("")],
            &["+", "_", "_"],
        );
        assert_eq!(s.annotated(Some(&[3, 0])), "{a}+{}_({b}-{c})_{$}");
        assert_eq!(s.annotated(Some(&[2, 1, 1])), "{a}+{}_({b}-{c$})_{}");
        assert_eq!(s.editor_text(), "a+(b-c)");
    }

    #[test]
    fn test_copy_text_between_paths() {
        let inner = level(vec![Item::field("b"), Item::field("c")], &["-"]);
        let s = level(
            vec![Item::field("xa"), bracket(inner), Item::field("d")],
            &["_", "_"],
        );
        assert_eq!(s.copy_text(Some(&[0, 1]), Some(&[1, 0, 1])), "a(b");
        assert_eq!(s.copy_text(Some(&[1, 1, 0]), None), "c)d");
        assert_eq!(s.copy_text(Some(&[1, 0, 0]), Some(&[1, 1, 1])), "b-c");
    }

    #[test]
    fn test_projection_spans_cover_each_leaf() {
        let s = level(
            vec![
                Item::field(""),
                Item::Literal {
                    quote: '"',
                    text: "hi".to_string(),
                },
                Item::field("x"),
            ],
            &["_", "_"],
        );
        let out = project(&s, Form::Editor);
        assert_eq!(out.text, "\"hi\"x");
        let spans = out
            .spans
            .iter()
            .map(|s| (s.prefix.clone(), s.start, s.end))
            .collect::<Vec<_>>();
        assert_eq!(spans, vec![(vec![0], 0, 0), (vec![1], 1, 3), (vec![2], 4, 5)]);
    }

    #[test]
    fn test_target_projection_pads_binary_operators() {
        let s = level(
            vec![Item::field("a"), Item::field("b"), Item::field("c")],
            &["<:", "."],
        );
        assert_eq!(project(&s, Form::Target).text, "a instanceof b.c");
    }

    #[test]
    fn test_target_projection_nests_ranges_until_comma() {
        let s = level(
            vec![
                Item::field("1"),
                Item::field("2"),
                Item::field("3"),
                Item::field("4"),
            ],
            &[",", "..", ".."],
        );
        assert_eq!(
            project(&s, Form::Target).text,
            "1, lang.stride.Utility.makeRange(2, lang.stride.Utility.makeRange(3, 4))"
        );
    }

    #[test]
    fn test_try_split_on_requires_single_operator() {
        let s = level(vec![Item::field("a"), Item::field("b")], &[","]);
        assert_eq!(
            s.try_split_on(","),
            Some(("a".to_string(), "b".to_string()))
        );
        let two = level(
            vec![Item::field("a"), Item::field("b"), Item::field("c")],
            &[",", ","],
        );
        assert_eq!(two.try_split_on(","), None);
        assert_eq!(two.try_split_on("+"), None);
    }

    #[test]
    fn test_valid_paths() {
        let inner = level(vec![Item::field("b")], &[]);
        let s = level(
            vec![Item::field("a"), bracket(inner), Item::field("")],
            &["_", "_"],
        );
        assert!(s.is_valid_path(&[0, 1]));
        assert!(s.is_valid_path(&[1, 0, 1]));
        assert!(!s.is_valid_path(&[0, 2]));
        assert!(!s.is_valid_path(&[1, 0]));
        assert!(!s.is_valid_path(&[3, 0]));
        assert!(!s.is_valid_path(&[]));
    }

    #[test]
    fn test_render_includes_precedence_and_adjacency() {
        let mut s = level(
            vec![Item::field("1"), Item::field("2"), Item::field("3")],
            &["+", "*"],
        );
        s.refresh_precedences();
        let rendered = s.render();
        assert_eq!(
            rendered[1],
            Component::Operator {
                glyph: "+".to_string(),
                precedence: Precedence::Medium
            }
        );
        assert_eq!(
            rendered[0],
            Component::Field {
                text: "1".to_string(),
                slot: SlotKind::Numeric
            }
        );
    }
}
