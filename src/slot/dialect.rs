//! Grammar dialects and the per-character token classifier.
//!
//! The edit engine is shared by both dialects; everything grammar-specific is
//! answered here:
//! - which glyphs are operators, and which characters may start one
//! - which brackets exist and how they pair
//! - whether string literals, float literals and the `new ` keyword exist
//! - which characters are simply dropped

use serde::{Deserialize, Serialize};

/// The grammar a slot edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Java-like expressions: arithmetic, strings, calls, ranges.
    #[default]
    Expression,
    /// Type references: dotted names, generics and array brackets.
    Type,
}

const EXPRESSION_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "&", "|", "^", "~",
    "!", "<<", ">>", ">>>", "->", "::", "<:", ",", ".", "..", "new ",
];

const TYPE_OPERATORS: &[&str] = &[".", ","];

/// What a single typed character means at a plain field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Part of an operand: letters, digits, `_`, `$`.
    Word,
    /// Starts or extends an operator; splits the field.
    Operator,
    /// `.`, `+` or `-`: inserted as text, then resolved by the numeric
    /// literal rules, which either keep it in a number or split it out.
    NumericSensitive,
    /// Comma separator.
    Comma,
    /// An opening bracket with its closing partner.
    Open(char),
    Close,
    /// Opens a string or character literal.
    Quote,
    Space,
    /// Dropped without changing anything.
    Disallowed,
}

impl Dialect {
    /// Every complete operator glyph of the dialect.
    pub const fn operators(self) -> &'static [&'static str] {
        match self {
            Self::Expression => EXPRESSION_OPERATORS,
            Self::Type => TYPE_OPERATORS,
        }
    }

    pub fn is_operator(self, glyph: &str) -> bool {
        self.operators().contains(&glyph)
    }

    /// True when `c` may begin an operator glyph. Some such characters are
    /// not operators on their own (`=`, `:`) and only become one once the
    /// next character is typed.
    pub const fn begins_operator(self, c: char) -> bool {
        match self {
            Self::Expression => matches!(
                c,
                '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '^' | '~' | ','
                    | '.' | ':'
            ),
            Self::Type => matches!(c, '.' | ','),
        }
    }

    pub fn can_be_unary(self, glyph: &str) -> bool {
        match self {
            Self::Expression => matches!(glyph, "+" | "-" | "~" | "!" | "new "),
            Self::Type => false,
        }
    }

    /// The closing partner of an opening bracket.
    pub const fn closing_for(self, opening: char) -> Option<char> {
        match (self, opening) {
            (Self::Expression, '(') => Some(')'),
            (Self::Expression | Self::Type, '[') => Some(']'),
            (Self::Type, '<') => Some('>'),
            _ => None,
        }
    }

    pub const fn is_closing(self, c: char) -> bool {
        match self {
            Self::Expression => matches!(c, ')' | ']'),
            Self::Type => matches!(c, '>' | ']'),
        }
    }

    pub const fn supports_literals(self) -> bool {
        matches!(self, Self::Expression)
    }

    pub const fn supports_floats(self) -> bool {
        matches!(self, Self::Expression)
    }

    /// True when the keyword operator `new ` can be formed.
    pub const fn has_new_keyword(self) -> bool {
        matches!(self, Self::Expression)
    }

    pub const fn is_quote(self, c: char) -> bool {
        self.supports_literals() && matches!(c, '"' | '\'')
    }

    /// Classify a character typed at a plain field.
    pub fn classify(self, c: char) -> Token {
        if let Some(closing) = self.closing_for(c) {
            return Token::Open(closing);
        }
        if self.is_closing(c) {
            return Token::Close;
        }
        if self.is_quote(c) {
            return Token::Quote;
        }
        if c == ',' {
            return Token::Comma;
        }
        if matches!(c, '.' | '+' | '-') && self.begins_operator(c) {
            return Token::NumericSensitive;
        }
        if self.begins_operator(c) {
            return Token::Operator;
        }
        if c.is_whitespace() {
            return match self {
                Self::Expression => Token::Space,
                Self::Type => Token::Disallowed,
            };
        }
        if c.is_alphanumeric() || c == '_' || c == '$' || (c == '?' && self == Self::Type) {
            return Token::Word;
        }
        Token::Disallowed
    }

    /// True when typing `c` can never change a slot of this dialect, so
    /// wrapping a selection with it is a no-op.
    pub fn is_disallowed(self, c: char) -> bool {
        self.classify(c) == Token::Disallowed
    }
}
