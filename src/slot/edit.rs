//! Keystroke-level edits on one level of a structured slot.
//!
//! Every operation takes a caret path relative to the level it runs on and
//! either returns the new caret, or asks the enclosing level to act:
//! - a closing bracket typed at the end of a field leaves the nearest
//!   enclosing bracket with that closer
//! - backspace at the very start (or delete at the very end) of a nested
//!   level removes the owning bracket and keeps its content
//!
//! Plain insertions and removals are followed by [`Structured::check_field_change`],
//! which keeps numeric literals such as `1.5e-3` in one field and splits
//! `.`, `+` and `-` out everywhere else.

use tracing::trace;

use super::caret::nest;
use super::dialect::Token;
use super::item::{Item, byte_offset, char_len, split_at_char};
use super::literal;
use super::operator::Operator;
use super::structured::Structured;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Outcome {
    /// Caret after the edit, relative to the level that produced it.
    At(Vec<usize>),
    /// A closing bracket to be matched by an enclosing level.
    Close(char),
    /// Remove the bracket owning this level, keeping its content; the caret
    /// goes after the content when `at_end` is set, before it otherwise.
    Unwrap { at_end: bool },
}

impl Structured {
    pub(super) fn insert_char(&mut self, pos: &[usize], c: char) -> Outcome {
        let index = pos[0];
        if self.items[index].is_field() {
            return self.insert_in_field(index, pos[1], c);
        }
        match &mut self.items[index] {
            Item::Bracketed {
                closing, content, ..
            } => {
                let closing = *closing;
                match content.insert_char(&pos[1..], c) {
                    Outcome::At(sub) => Outcome::At(nest(index, sub)),
                    Outcome::Close(ch) if ch == closing => Outcome::At(vec![index + 1, 0]),
                    other => other,
                }
            }
            Item::Literal { quote, text } => {
                let offset = pos[1];
                if c == *quote && !is_escaped(text, offset) {
                    // Only the end of a literal can be closed.
                    if offset == char_len(text) {
                        return Outcome::At(vec![index + 1, 0]);
                    }
                    return Outcome::At(pos.to_vec());
                }
                text.insert(byte_offset(text, offset), c);
                Outcome::At(vec![index, offset + 1])
            }
            Item::Field(_) => Outcome::At(pos.to_vec()),
        }
    }

    fn insert_in_field(&mut self, index: usize, offset: usize, c: char) -> Outcome {
        let dialect = self.dialect;
        let text = self.field_text(index).unwrap_or_default().to_string();
        let len = char_len(&text);
        let (before, after) = split_at_char(&text, offset);
        let token = dialect.classify(c);
        let stay = Outcome::At(vec![index, offset]);

        match token {
            Token::Disallowed => return stay,
            Token::Space if !(dialect.has_new_keyword() && before == "new") => return stay,
            _ => {}
        }

        if offset == 0 && index > 0 {
            if let Some(op) = &mut self.operators[index - 1] {
                let extended = format!("{}{c}", op.glyph());
                if dialect.is_operator(&extended) {
                    op.set_glyph(extended);
                    return stay;
                }
            }
        }
        if offset == len {
            if let Some(Some(op)) = self.operators.get_mut(index) {
                let extended = format!("{c}{}", op.glyph());
                if dialect.is_operator(&extended) {
                    op.set_glyph(extended);
                    return stay;
                }
            }
        }

        match token {
            Token::Comma
                if offset == len
                    && self.op_glyph(index) == ","
                    && self.field_text(index + 1) == Some("") =>
            {
                Outcome::At(vec![index + 1, 0])
            }
            Token::Comma | Token::Operator => {
                self.split_with_operator(index, before, after, c.to_string());
                Outcome::At(vec![index + 1, 0])
            }
            Token::Open(closing) => {
                let overtype = offset == len
                    && matches!(
                        self.items.get(index + 1),
                        Some(Item::Bracketed { opening, .. }) if *opening == c
                    );
                if !overtype {
                    let bracket = Item::Bracketed {
                        opening: c,
                        closing,
                        content: Self::new(dialect),
                    };
                    self.split_with_compound(index, before, after, bracket);
                }
                Outcome::At(vec![index + 1, 0, 0])
            }
            Token::Close if offset == len => Outcome::Close(c),
            Token::Close => stay,
            Token::Quote => {
                let literal = Item::Literal {
                    quote: c,
                    text: String::new(),
                };
                self.split_with_compound(index, before, after, literal);
                Outcome::At(vec![index + 1, 0])
            }
            Token::Space => {
                // `new` followed by a space becomes the keyword operator.
                self.split_with_operator(index, "", after, "new ".to_string());
                Outcome::At(vec![index + 1, 0])
            }
            Token::Word | Token::NumericSensitive | Token::Disallowed => {
                if let Some(field) = self.items[index].leaf_text_mut() {
                    field.insert(byte_offset(field, offset), c);
                }
                Outcome::At(self.check_field_change(index, vec![index, offset + 1]))
            }
        }
    }

    /// Replace field `index` by `before`, glyph, `after`.
    fn split_with_operator(&mut self, index: usize, before: &str, after: &str, glyph: String) {
        let after = Item::field(after);
        self.items[index] = Item::field(before);
        self.operators.insert(index, Some(Operator::new(glyph)));
        self.items.insert(index + 1, after);
    }

    /// Replace field `index` by `before`, `compound`, `after`.
    fn split_with_compound(&mut self, index: usize, before: &str, after: &str, compound: Item) {
        let after = Item::field(after);
        self.items[index] = Item::field(before);
        self.operators.insert(index, None);
        self.items.insert(index + 1, compound);
        self.operators.insert(index + 1, None);
        self.items.insert(index + 2, after);
    }

    /// Type `text` one character at a time, starting at `pos`. Closing
    /// brackets that nothing at this level matches are dropped.
    pub(super) fn insert_text(&mut self, mut pos: Vec<usize>, text: &str) -> Vec<usize> {
        for c in text.chars() {
            if let Outcome::At(next) = self.insert_char(&pos, c) {
                pos = next;
            }
        }
        pos
    }

    /// Create a literal holding `text` at `pos`, returning the caret just
    /// after its closing quote.
    pub(super) fn insert_literal(&mut self, pos: &[usize], quote: char, text: String) -> Vec<usize> {
        let index = pos[0];
        match &mut self.items[index] {
            Item::Bracketed { content, .. } => nest(index, content.insert_literal(&pos[1..], quote, text)),
            Item::Literal { .. } => pos.to_vec(),
            Item::Field(field) => {
                let field = field.clone();
                let (before, after) = split_at_char(&field, pos[1]);
                self.split_with_compound(index, before, after, Item::Literal { quote, text });
                vec![index + 2, 0]
            }
        }
    }

    pub(super) fn backspace(&mut self, pos: &[usize]) -> Outcome {
        let index = pos[0];
        if let Item::Bracketed { content, .. } = &mut self.items[index] {
            return match content.backspace(&pos[1..]) {
                Outcome::At(sub) => Outcome::At(nest(index, sub)),
                Outcome::Unwrap { at_end } => Outcome::At(self.unwrap_compound(index, at_end)),
                close @ Outcome::Close(_) => close,
            };
        }

        let offset = pos[1];
        if offset > 0 {
            if let Some(text) = self.items[index].leaf_text_mut() {
                let at = byte_offset(text, offset - 1);
                text.remove(at);
            }
            return Outcome::At(self.check_field_change(index, vec![index, offset - 1]));
        }
        if index == 0 {
            return Outcome::Unwrap { at_end: false };
        }

        match self.operators[index - 1].as_ref().map(|op| op.glyph().to_string()) {
            None if self.items[index].is_literal() => {
                Outcome::At(self.unwrap_compound(index, false))
            }
            None => Outcome::At(self.unwrap_compound(index - 1, true)),
            Some(glyph) if glyph.len() > 1 && glyph != "new " => {
                let mut shortened = glyph;
                shortened.pop();
                if let Some(op) = &mut self.operators[index - 1] {
                    op.set_glyph(shortened);
                }
                Outcome::At(self.check_field_change(index - 1, vec![index, 0]))
            }
            Some(glyph) => {
                let remaining = if glyph == "new " { "new" } else { "" };
                Outcome::At(self.remove_operator(index - 1, remaining, true))
            }
        }
    }

    pub(super) fn delete(&mut self, pos: &[usize]) -> Outcome {
        let index = pos[0];
        if let Item::Bracketed { content, .. } = &mut self.items[index] {
            return match content.delete(&pos[1..]) {
                Outcome::At(sub) => Outcome::At(nest(index, sub)),
                Outcome::Unwrap { at_end } => Outcome::At(self.unwrap_compound(index, at_end)),
                close @ Outcome::Close(_) => close,
            };
        }

        let offset = pos[1];
        if offset < self.items[index].leaf_len() {
            if let Some(text) = self.items[index].leaf_text_mut() {
                let at = byte_offset(text, offset);
                text.remove(at);
            }
            return Outcome::At(self.check_field_change(index, vec![index, offset]));
        }
        if index + 1 == self.items.len() {
            return Outcome::Unwrap { at_end: true };
        }

        match self.operators[index].as_ref().map(|op| op.glyph().to_string()) {
            None if self.items[index].is_literal() => Outcome::At(self.unwrap_compound(index, true)),
            None => Outcome::At(self.unwrap_compound(index + 1, false)),
            Some(glyph) if glyph.len() > 1 && self.dialect.is_operator(&glyph[1..]) => {
                if let Some(op) = &mut self.operators[index] {
                    op.set_glyph(glyph[1..].to_string());
                }
                Outcome::At(self.check_field_change(index, vec![index, offset]))
            }
            Some(glyph) => {
                let remaining = if glyph == "new " { "ew" } else { "" };
                Outcome::At(self.remove_operator(index, remaining, false))
            }
        }
    }

    /// Remove operator `op_index` and join the fields on either side,
    /// keeping `remaining` of the operator's text between them.
    fn remove_operator(&mut self, op_index: usize, remaining: &str, caret_after: bool) -> Vec<usize> {
        let left = self.field_text(op_index).unwrap_or_default().to_string();
        let right = self.field_text(op_index + 1).unwrap_or_default().to_string();
        self.operators.remove(op_index);
        self.items.remove(op_index + 1);
        let caret = if caret_after {
            char_len(&left) + char_len(remaining)
        } else {
            char_len(&left)
        };
        self.items[op_index] = Item::field(format!("{left}{remaining}{right}"));
        self.check_field_change(op_index, vec![op_index, caret])
    }

    /// Remove the compound item at `index` along with the field after it,
    /// re-typing its content and that field's text into the field before.
    pub(super) fn unwrap_compound(&mut self, index: usize, at_end: bool) -> Vec<usize> {
        if index == 0 || index + 1 >= self.items.len() || self.items[index].is_field() {
            return vec![index, 0];
        }
        trace!(index, at_end, "flattening compound item");
        let before_len = self.items[index - 1].leaf_len();
        let content = self.items[index].inner_text();
        let following = self.items[index + 1].inner_text();
        self.items.drain(index..=index + 1);
        self.operators.drain(index - 1..=index);

        let (start, mid) = self.retype(vec![index - 1, before_len], &content, &following);
        if at_end { mid } else { start }
    }

    /// Type `first` then `second` at `pos`, returning the carets where typing
    /// began and where `first` ended. A literal left open by `first` is closed
    /// before `second` goes in. Both carets are carried as editor-text
    /// offsets, since typing can merge or split the fields they pointed into.
    fn retype(&mut self, pos: Vec<usize>, first: &str, second: &str) -> (Vec<usize>, Vec<usize>) {
        let start = self.editor_offset(&pos).unwrap_or_default();
        let mid = self.insert_text(pos, first);
        let mid = self.step_out_of_literal(mid);
        let middle = self.editor_offset(&mid).unwrap_or(start);
        self.insert_text(mid, second);
        (self.path_at_editor_offset(start), self.path_at_editor_offset(middle))
    }

    /// Move a caret that ends inside a literal to just after it.
    fn step_out_of_literal(&self, pos: Vec<usize>) -> Vec<usize> {
        let index = pos[0];
        match self.items.get(index) {
            Some(Item::Bracketed { content, .. }) => {
                nest(index, content.step_out_of_literal(pos[1..].to_vec()))
            }
            Some(Item::Literal { .. }) => vec![index + 1, 0],
            _ => pos,
        }
    }

    /// Delete everything between two ordered paths, returning the caret at
    /// the splice point.
    pub(super) fn delete_range(&mut self, start: &[usize], end: &[usize]) -> Vec<usize> {
        if start[0] == end[0] {
            let index = start[0];
            match &mut self.items[index] {
                Item::Bracketed { content, .. } => {
                    return nest(index, content.delete_range(&start[1..], &end[1..]));
                }
                Item::Literal { text, .. } => {
                    let from = byte_offset(text, start[1]);
                    let to = byte_offset(text, end[1]).max(from);
                    text.replace_range(from..to, "");
                    return vec![index, start[1]];
                }
                Item::Field(_) => {}
            }
        }

        // A partially selected compound widens the splice to the field
        // beside it and keeps its unselected text.
        let start_in_field = self.items[start[0]].is_field();
        let end_in_field = self.items[end[0]].is_field();
        let lo = if start_in_field { start[0] } else { start[0] - 1 };
        let hi = if end_in_field { end[0] } else { end[0] + 1 };

        let left = if start_in_field {
            self.items[lo].inner_prefix(&start[1..])
        } else {
            self.items[lo].inner_text() + &self.items[start[0]].inner_prefix(&start[1..])
        };
        let right = if end_in_field {
            self.items[hi].inner_suffix(&end[1..])
        } else {
            self.items[end[0]].inner_suffix(&end[1..]) + &self.items[hi].inner_text()
        };

        self.items.drain(lo + 1..=hi);
        self.operators.drain(lo..hi);

        if start_in_field && end_in_field {
            let caret = char_len(&left);
            self.items[lo] = Item::field(left + &right);
            return self.check_field_change(lo, vec![lo, caret]);
        }
        self.items[lo] = Item::field("");
        self.retype(vec![lo, 0], &left, &right).1
    }

    /// Re-lex field `index` after its text changed, splitting out or merging
    /// back `.`, `+` and `-` so that only numeric literals keep them inline.
    /// `pos` is adjusted to follow the text it pointed at.
    pub(super) fn check_field_change(&mut self, index: usize, pos: Vec<usize>) -> Vec<usize> {
        let Some(text) = self.field_text(index).map(str::to_owned) else {
            return pos;
        };
        let dialect = self.dialect;
        let prev_op = index
            .checked_sub(1)
            .map(|i| self.op_glyph(i).to_owned())
            .unwrap_or_default();
        let prev_field = index
            .checked_sub(1)
            .and_then(|i| self.field_text(i))
            .map(str::to_owned);
        let after_compound = index > 0 && self.operators[index - 1].is_none();
        let compound_before_prev =
            index > 1 && prev_field.is_some() && self.operators[index - 2].is_none();

        for (dot, _) in text.match_indices('.') {
            let before = &text[..dot];
            let after = &text[dot + 1..];
            let range = dialect.is_operator("..") && after.starts_with('.');
            if dialect.supports_floats() && literal::precedes_dot(before) && !range {
                continue;
            }
            let (glyph, rest) = if range { ("..", &after[1..]) } else { (".", after) };
            let before_len = char_len(before);
            self.split_with_operator(index, before, rest, glyph.to_string());
            let pos = shift_after_split(pos, index, before_len, glyph.len());
            let pos = self.check_field_change(index, pos);
            return self.check_field_change(index + 1, pos);
        }

        let mut pos = pos;
        if dialect.supports_floats() && literal::precedes_dot(&text) && self.op_glyph(index) == "." {
            pos = self.merge_with_next(index, pos);
        }

        let text = self.field_text(index).unwrap_or_default().to_owned();
        for (i, sign) in text.char_indices().filter(|(_, c)| matches!(c, '+' | '-')) {
            let before = &text[..i];
            let after = &text[i + 1..];
            let leading_sign = before.is_empty() && !after_compound && literal::starts_with_digit(after);
            if leading_sign || literal::precedes_sign(before) {
                continue;
            }
            let before_len = char_len(before);
            self.split_with_operator(index, before, after, sign.to_string());
            return shift_after_split(pos, index, before_len, 1);
        }

        if literal::precedes_sign(&text) && matches!(self.op_glyph(index), "+" | "-") {
            pos = self.merge_with_next(index, pos);
        }

        let text = self.field_text(index).unwrap_or_default().to_owned();
        if matches!(prev_op.as_str(), "+" | "-")
            && literal::starts_with_digit(&text)
            && prev_field.as_deref() == Some("")
            && !compound_before_prev
        {
            // A sign operator with nothing before it folds into the number.
            self.operators.remove(index - 1);
            self.items.remove(index - 1);
            self.items[index - 1] = Item::field(format!("{prev_op}{text}"));
            let at = pos[0];
            pos = match at {
                p if p == index => vec![index - 1, pos[1] + 1],
                p if p > index => {
                    let mut pos = pos;
                    pos[0] -= 1;
                    pos
                }
                p if p == index - 1 => vec![index - 1, 0],
                _ => pos,
            };
        }
        pos
    }

    /// Join field `index`, its following operator and the next field.
    fn merge_with_next(&mut self, index: usize, pos: Vec<usize>) -> Vec<usize> {
        let (Some(left), Some(right)) = (self.field_text(index), self.field_text(index + 1)) else {
            return pos;
        };
        let glyph = self.op_glyph(index).to_owned();
        let joined = format!("{left}{glyph}{right}");
        let shift = char_len(left) + char_len(&glyph);
        self.operators.remove(index);
        self.items.remove(index + 1);
        self.items[index] = Item::field(joined);
        let at = pos[0];
        match at {
            p if p == index + 1 => vec![index, shift + pos[1]],
            p if p > index + 1 => {
                let mut pos = pos;
                pos[0] -= 1;
                pos
            }
            _ => pos,
        }
    }
}

/// Follow a caret across a split of field `index` after `before_len`
/// characters into field, `glyph_len`-character operator, field.
fn shift_after_split(mut pos: Vec<usize>, index: usize, before_len: usize, glyph_len: usize) -> Vec<usize> {
    if pos[0] > index {
        pos[0] += 1;
    } else if pos[0] == index && pos.len() == 2 && pos[1] > before_len {
        pos = vec![index + 1, pos[1].saturating_sub(before_len + glyph_len)];
    }
    pos
}

/// True when the character at `offset` would follow an odd run of
/// backslashes.
fn is_escaped(text: &str, offset: usize) -> bool {
    let prefix = &text[..byte_offset(text, offset)];
    prefix.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}
