//! Numeric literal recognition.
//!
//! Numeric literals reuse `.`, `+` and `-`, which are otherwise operator
//! characters. These predicates decide whether such a character continues the
//! number being typed or splits the slot:
//! - `1` followed by `.` is the start of `1.5`
//! - `1.5e` followed by `-` is an exponent sign
//! - `0x1.8p` followed by `+` is a hex exponent sign

use std::sync::LazyLock;

use regex::Regex;

const DIGITS: &str = "[0-9](?:[0-9_]*[0-9])?";
const HEX_DIGITS: &str = "[0-9A-Fa-f](?:[0-9A-Fa-f_]*[0-9A-Fa-f])?";

static PRECEDES_DOT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"\A\s*[+-]?(?:{DIGITS}|0[xX]{HEX_DIGITS})\z")).ok()
});

static PRECEDES_SIGN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\A\s*[+-]?(?:0[xX]{HEX_DIGITS}(?:\.(?:{HEX_DIGITS})?)?[pP]|{DIGITS}(?:\.(?:{DIGITS})?)?[eE])\z"
    ))
    .ok()
});

static NUMERIC_LITERAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let exponent = format!("[eE][+-]?{DIGITS}");
    Regex::new(&format!(
        r"\A[+-]?(?:0[xX]{HEX_DIGITS}[lL]?|0[bB][01](?:[01_]*[01])?[lL]?|{DIGITS}[lL]?|(?:{DIGITS}\.(?:{DIGITS})?|\.{DIGITS})(?:{exponent})?[fFdD]?|{DIGITS}(?:{exponent})[fFdD]?|{DIGITS}[fFdD])\z"
    ))
    .ok()
});

fn is_match(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// True when `text` is a number that a following `.` would continue.
pub fn precedes_dot(text: &str) -> bool {
    is_match(&PRECEDES_DOT, text)
}

/// True when `text` ends in an exponent marker, so a following `+`/`-` is
/// the exponent's sign.
pub fn precedes_sign(text: &str) -> bool {
    is_match(&PRECEDES_SIGN, text)
}

pub fn starts_with_digit(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit())
}

/// True when `text` is a complete numeric literal (`42`, `0x1F`, `1.5e-3f`).
pub fn is_numeric_literal(text: &str) -> bool {
    is_match(&NUMERIC_LITERAL, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedes_dot_accepts_integers() {
        assert!(precedes_dot("1"));
        assert!(precedes_dot("+10"));
        assert!(precedes_dot("-1_000"));
        assert!(precedes_dot("0x1F"));
    }

    #[test]
    fn test_precedes_dot_rejects_non_numbers() {
        assert!(!precedes_dot(""));
        assert!(!precedes_dot("+"));
        assert!(!precedes_dot("a1"));
        assert!(!precedes_dot("1_"));
        assert!(!precedes_dot("1.0"));
    }

    #[test]
    fn test_precedes_sign_requires_exponent_marker() {
        assert!(precedes_sign("1e"));
        assert!(precedes_sign("+1.0e"));
        assert!(precedes_sign("1.E"));
        assert!(precedes_sign("0x1.8p"));
        assert!(!precedes_sign("1"));
        assert!(!precedes_sign("1.0"));
        assert!(!precedes_sign("e"));
        assert!(!precedes_sign("x1e"));
        assert!(!precedes_sign("+1.0p"));
    }

    #[test]
    fn test_starts_with_digit() {
        assert!(starts_with_digit("1abc"));
        assert!(!starts_with_digit(""));
        assert!(!starts_with_digit("a1"));
    }

    #[test]
    fn test_numeric_literal_forms() {
        for text in ["0", "42", "42L", "0x1F", "0b1010", "1.5", "1.", ".5", "1e10", "1.5e-3f", "-7"] {
            assert!(is_numeric_literal(text), "{text} should be numeric");
        }
        for text in ["", "a", "1a", "1..2", "e5", "0x", "1e"] {
            assert!(!is_numeric_literal(text), "{text} should not be numeric");
        }
    }
}
