use super::literal;
use super::structured::Structured;

/// One element of a level: a plain editable field, or a compound item that
/// is always flanked by plain fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A plain operand slot.
    Field(String),
    /// A string or character literal; `text` excludes the quotes.
    Literal { quote: char, text: String },
    /// A bracket pair owning a nested level.
    Bracketed {
        opening: char,
        closing: char,
        content: Structured,
    },
}

/// What a slot holds, as far as the host is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Plain,
    Numeric,
    StringLiteral,
    CharLiteral,
    Bracketed,
}

impl Item {
    pub fn field(text: impl Into<String>) -> Self {
        Self::Field(text.into())
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(text) => Some(text),
            _ => None,
        }
    }

    pub const fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }

    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Field(text) if literal::is_numeric_literal(text) => SlotKind::Numeric,
            Self::Field(_) => SlotKind::Plain,
            Self::Literal { quote: '\'', .. } => SlotKind::CharLiteral,
            Self::Literal { .. } => SlotKind::StringLiteral,
            Self::Bracketed { .. } => SlotKind::Bracketed,
        }
    }

    /// Length in characters of a leaf's editable text; 0 for brackets.
    pub fn leaf_len(&self) -> usize {
        match self {
            Self::Field(text) | Self::Literal { text, .. } => char_len(text),
            Self::Bracketed { .. } => 0,
        }
    }

    /// Mutable access to a leaf's editable text.
    pub(crate) fn leaf_text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Field(text) | Self::Literal { text, .. } => Some(text),
            Self::Bracketed { .. } => None,
        }
    }

    /// Text between the delimiters, in editor form.
    pub fn inner_text(&self) -> String {
        match self {
            Self::Field(text) | Self::Literal { text, .. } => text.clone(),
            Self::Bracketed { content, .. } => content.editor_text(),
        }
    }

    /// Inner text from the start of the item up to `to`, delimiters excluded.
    pub(crate) fn inner_prefix(&self, to: &[usize]) -> String {
        match self {
            Self::Field(text) | Self::Literal { text, .. } => {
                char_slice(text, 0, to.first().copied().unwrap_or(0)).to_string()
            }
            Self::Bracketed { content, .. } => content.copy_text(None, Some(to)),
        }
    }

    /// Inner text from `from` to the end of the item, delimiters excluded.
    pub(crate) fn inner_suffix(&self, from: &[usize]) -> String {
        match self {
            Self::Field(text) | Self::Literal { text, .. } => {
                char_slice(text, from.first().copied().unwrap_or(0), char_len(text)).to_string()
            }
            Self::Bracketed { content, .. } => content.copy_text(Some(from), None),
        }
    }

    /// The item in editor form, delimiters included.
    pub fn editor_text(&self) -> String {
        match self {
            Self::Field(text) => text.clone(),
            Self::Literal { quote, text } => format!("{quote}{text}{quote}"),
            Self::Bracketed {
                opening,
                closing,
                content,
            } => format!("{opening}{}{closing}", content.editor_text()),
        }
    }

    /// Editor text from `from` to `to`, where either bound may be `None`
    /// meaning "outside the item". Delimiters are included only on the side
    /// where the bound lies outside.
    pub(crate) fn copy_text(&self, from: Option<&[usize]>, to: Option<&[usize]>) -> String {
        match self {
            Self::Field(text) => {
                let start = from.and_then(<[usize]>::first).copied().unwrap_or(0);
                let end = to
                    .and_then(<[usize]>::first)
                    .copied()
                    .unwrap_or_else(|| char_len(text));
                char_slice(text, start, end).to_string()
            }
            Self::Literal { quote, text } => {
                let start = from.and_then(<[usize]>::first).copied().unwrap_or(0);
                let end = to
                    .and_then(<[usize]>::first)
                    .copied()
                    .unwrap_or_else(|| char_len(text));
                let mut out = String::new();
                if from.is_none() {
                    out.push(*quote);
                }
                out.push_str(char_slice(text, start, end));
                if to.is_none() {
                    out.push(*quote);
                }
                out
            }
            Self::Bracketed {
                opening,
                closing,
                content,
            } => {
                let mut out = String::new();
                if from.is_none() {
                    out.push(*opening);
                }
                out.push_str(&content.copy_text(from, to));
                if to.is_none() {
                    out.push(*closing);
                }
                out
            }
        }
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `chars`-th character, clamped to the end.
pub fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end).max(start);
    &text[start..end]
}

/// Split at a character offset.
pub fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    text.split_at(byte_offset(text, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_helpers_count_characters_not_bytes() {
        let text = "aé€b";
        assert_eq!(char_len(text), 4);
        assert_eq!(byte_offset(text, 2), 3);
        assert_eq!(byte_offset(text, 10), text.len());
        assert_eq!(char_slice(text, 1, 3), "é€");
        assert_eq!(split_at_char(text, 3), ("aé€", "b"));
    }

    #[test]
    fn test_literal_copy_text_keeps_quotes_only_outside_bounds() {
        let item = Item::Literal {
            quote: '"',
            text: "hello".to_string(),
        };
        assert_eq!(item.editor_text(), "\"hello\"");
        assert_eq!(item.copy_text(Some(&[1]), Some(&[3])), "el");
        assert_eq!(item.copy_text(None, Some(&[2])), "\"he");
        assert_eq!(item.copy_text(Some(&[2]), None), "llo\"");
    }

    #[test]
    fn test_kind_detects_numbers_and_literals() {
        assert_eq!(Item::field("12").kind(), SlotKind::Numeric);
        assert_eq!(Item::field("x").kind(), SlotKind::Plain);
        let c = Item::Literal {
            quote: '\'',
            text: "c".to_string(),
        };
        assert_eq!(c.kind(), SlotKind::CharLiteral);
    }
}
