//! Operators between slots and their precedence classes.

use serde::{Deserialize, Serialize};

/// How tightly an operator binds relative to its neighbours at one level.
///
/// Classes are relative, not absolute: in `a+b` the `+` is `High` because it
/// is the only operator, while in `a+b*c` it drops to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    Dot,
    High,
    Medium,
    Low,
    Comma,
    New,
}

impl Precedence {
    const fn from_level(level: usize) -> Self {
        match level {
            0 => Self::High,
            1 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// An operator glyph sitting between two plain fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    glyph: String,
    precedence: Precedence,
}

impl Operator {
    pub fn new(glyph: impl Into<String>) -> Self {
        let glyph = glyph.into();
        let precedence = fixed_precedence(&glyph).unwrap_or(Precedence::High);
        Self { glyph, precedence }
    }

    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    pub const fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub(crate) fn set_glyph(&mut self, glyph: String) {
        self.glyph = glyph;
    }

    pub(crate) const fn set_precedence(&mut self, precedence: Precedence) {
        self.precedence = precedence;
    }

    /// The operator as it appears in generated Java, padding included.
    ///
    /// Commas and ranges are handled by the projection itself, since they
    /// restructure the surrounding text.
    pub fn target_code(&self) -> String {
        match self.glyph.as_str() {
            "." => ".".to_string(),
            "<:" => " instanceof ".to_string(),
            "new " => "new ".to_string(),
            "," => ", ".to_string(),
            glyph => format!(" {glyph} "),
        }
    }
}

fn fixed_precedence(glyph: &str) -> Option<Precedence> {
    match glyph {
        "." => Some(Precedence::Dot),
        "," => Some(Precedence::Comma),
        "new " => Some(Precedence::New),
        _ => None,
    }
}

/// Binding strength of a binary operator; higher binds tighter.
fn binary_rank(glyph: &str) -> i32 {
    match glyph {
        "->" => 1,
        ".." => 2,
        "||" => 3,
        "&&" => 4,
        "|" => 5,
        "^" => 6,
        "&" => 7,
        "==" | "!=" => 8,
        "<" | ">" | "<=" | ">=" | "<:" => 9,
        "<<" | ">>" | ">>>" => 10,
        "+" | "-" => 11,
        "*" | "/" | "%" => 12,
        "::" => 14,
        _ => 0,
    }
}

const UNARY_RANK: i32 = 13;
const NO_RANK: i32 = -1;

/// Assign precedence classes to one level's operators.
///
/// `unary[i]` says whether operator `i` is applied as a prefix operator; unary
/// operators bind tighter than any binary one. `None` entries are the
/// adjacency around compound items and take no part.
pub fn calculate_precedences(operators: &mut [Option<Operator>], unary: &[bool]) {
    let ranks = operators
        .iter()
        .zip(unary.iter().copied().chain(std::iter::repeat(false)))
        .map(|(op, is_unary)| match op {
            Some(op) if fixed_precedence(op.glyph()).is_some() => NO_RANK,
            Some(_) if is_unary => UNARY_RANK,
            Some(op) => binary_rank(op.glyph()),
            None => NO_RANK,
        })
        .collect::<Vec<_>>();
    let mut levels = vec![0; operators.len()];
    assign_levels(&ranks, &mut levels, 0, ranks.len());

    for (i, op) in operators.iter_mut().enumerate() {
        if let Some(op) = op {
            let precedence = fixed_precedence(op.glyph())
                .unwrap_or_else(|| Precedence::from_level(levels[i]));
            op.set_precedence(precedence);
        }
    }
}

/// Levels the ranked operators in `start..end` and returns the level and rank
/// of the loosest one, or `None` when the range holds no ranked operator.
///
/// The loosest operator sits one level above its deepest side, unless that
/// side's own loosest operator has the same rank, in which case they form a
/// flat chain (`1&&2&&3`) and share a level.
fn assign_levels(
    ranks: &[i32],
    levels: &mut [usize],
    start: usize,
    end: usize,
) -> Option<(usize, i32)> {
    let mut lowest: Option<usize> = None;
    for i in start..end {
        if ranks[i] != NO_RANK && lowest.is_none_or(|l| ranks[i] < ranks[l]) {
            lowest = Some(i);
        }
    }
    let lowest = lowest?;
    let rank = ranks[lowest];

    let left = assign_levels(ranks, levels, start, lowest);
    let right = assign_levels(ranks, levels, lowest + 1, end);
    let deepest = left.into_iter().chain(right).map(|(level, _)| level).max();
    let chained = left.is_some_and(|(_, r)| r == rank) || right.is_some_and(|(_, r)| r == rank);

    let level = match deepest {
        None => 0,
        Some(deepest) if chained => deepest,
        Some(deepest) => deepest + 1,
    };
    levels[lowest] = level;
    Some((level, rank))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(glyphs: &[&str], unary: &[bool]) -> Vec<Option<Precedence>> {
        let mut ops = glyphs
            .iter()
            .map(|g| (*g != "_").then(|| Operator::new(*g)))
            .collect::<Vec<_>>();
        calculate_precedences(&mut ops, unary);
        ops.iter().map(|op| op.as_ref().map(Operator::precedence)).collect()
    }

    use Precedence::{Dot, High, Low, Medium};

    #[test]
    fn test_single_operator_is_high() {
        assert_eq!(classes(&["+"], &[false]), vec![Some(High)]);
    }

    #[test]
    fn test_tighter_operator_nests_deeper() {
        assert_eq!(classes(&["+", "*"], &[false, false]), vec![Some(Medium), Some(High)]);
        assert_eq!(
            classes(&["*", "+", "*"], &[false; 3]),
            vec![Some(High), Some(Medium), Some(High)]
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        assert_eq!(classes(&["+", "+"], &[false, true]), vec![Some(Medium), Some(High)]);
        assert_eq!(classes(&["*", "-"], &[false, true]), vec![Some(Medium), Some(High)]);
        assert_eq!(classes(&["-", "+"], &[true, false]), vec![Some(High), Some(Medium)]);
    }

    #[test]
    fn test_three_tiers() {
        assert_eq!(
            classes(&["<", "&&", "<=", "&&", "=="], &[false; 5]),
            vec![Some(High), Some(Medium), Some(High), Some(Medium), Some(High)]
        );
        assert_eq!(
            classes(&["<", "&&", "<=", "&&", "==", "+"], &[false; 6]),
            vec![Some(High), Some(Low), Some(High), Some(Low), Some(Medium), Some(High)]
        );
    }

    #[test]
    fn test_adjacency_and_dots_are_skipped() {
        assert_eq!(
            classes(&["_", "_", "+", "*"], &[false; 4]),
            vec![None, None, Some(Medium), Some(High)]
        );
        assert_eq!(classes(&[".", "."], &[false; 2]), vec![Some(Dot), Some(Dot)]);
        assert_eq!(
            classes(&["+", ".", "*", ".", "-"], &[false; 5]),
            vec![Some(Medium), Some(Dot), Some(High), Some(Dot), Some(Medium)]
        );
    }

    #[test]
    fn test_target_code_padding() {
        assert_eq!(Operator::new("+").target_code(), " + ");
        assert_eq!(Operator::new(".").target_code(), ".");
        assert_eq!(Operator::new("<:").target_code(), " instanceof ");
        assert_eq!(Operator::new("new ").target_code(), "new ");
    }
}
