//! East Asian width classification and column counts.

use crate::unicode::codepoint::Codepoint;
use crate::unicode::props::EastAsianWidth;
use unicode_width::UnicodeWidthChar;

/// How ambiguous-width characters are counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// Ambiguous width = 1 (non East Asian context).
    #[default]
    Narrow,
    /// Ambiguous width = 2 (East Asian context).
    EastAsian,
}

impl WidthMethod {
    #[must_use]
    pub fn for_context(eastasian_context: bool) -> Self {
        if eastasian_context {
            Self::EastAsian
        } else {
            Self::Narrow
        }
    }
}

/// Default East Asian width of a codepoint.
///
/// Derived from the `unicode-width` tables: zero-width characters are `Z`,
/// characters that are wide only in CJK context are `A`.
#[must_use]
pub fn default_eaw(cp: Codepoint) -> EastAsianWidth {
    let Some(c) = char::from_u32(cp) else {
        return EastAsianWidth::N;
    };
    // Fast path: ASCII printable characters are always narrow
    if (' '..='~').contains(&c) {
        return EastAsianWidth::Na;
    }
    if c.is_control() {
        return EastAsianWidth::N;
    }
    match cp {
        0x3000 | 0xFF01..=0xFF60 | 0xFFE0..=0xFFE6 => return EastAsianWidth::F,
        0x20A9 | 0xFF61..=0xFFBE | 0xFFC2..=0xFFDC | 0xFFE8..=0xFFEE => {
            return EastAsianWidth::H;
        }
        0xA2 | 0xA3 | 0xA5 | 0xA6 | 0xAC | 0xAF | 0x27E6..=0x27ED | 0x2985 | 0x2986 => {
            return EastAsianWidth::Na;
        }
        _ => {}
    }
    match (UnicodeWidthChar::width(c), UnicodeWidthChar::width_cjk(c)) {
        (Some(0), _) => EastAsianWidth::Z,
        (Some(2), _) => EastAsianWidth::W,
        (Some(1), Some(2)) => EastAsianWidth::A,
        _ => EastAsianWidth::N,
    }
}

/// Number of columns a character of class `eaw` occupies.
#[must_use]
pub fn eaw_columns(eaw: EastAsianWidth, method: WidthMethod) -> usize {
    match eaw {
        EastAsianWidth::W | EastAsianWidth::F => 2,
        EastAsianWidth::Z => 0,
        EastAsianWidth::A => match method {
            WidthMethod::Narrow => 1,
            WidthMethod::EastAsian => 2,
        },
        EastAsianWidth::Na | EastAsianWidth::N | EastAsianWidth::H => 1,
    }
}

/// Check if a character is wide (takes 2 columns regardless of context).
#[must_use]
pub fn is_wide(cp: Codepoint) -> bool {
    matches!(default_eaw(cp), EastAsianWidth::W | EastAsianWidth::F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_narrow() {
        assert_eq!(default_eaw(u32::from('a')), EastAsianWidth::Na);
        assert_eq!(eaw_columns(EastAsianWidth::Na, WidthMethod::Narrow), 1);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(default_eaw(u32::from('漢')), EastAsianWidth::W);
        assert!(is_wide(u32::from('字')));
        assert_eq!(default_eaw(0xFF21), EastAsianWidth::F);
        assert_eq!(default_eaw(0xFF76), EastAsianWidth::H);
    }

    #[test]
    fn test_zero_width() {
        // Combining characters are zero width
        assert_eq!(default_eaw(0x0301), EastAsianWidth::Z);
        assert_eq!(eaw_columns(EastAsianWidth::Z, WidthMethod::EastAsian), 0);
    }

    #[test]
    fn test_ambiguous_depends_on_context() {
        // Circled digit one (U+2460)
        let eaw = default_eaw(0x2460);
        assert_eq!(eaw, EastAsianWidth::A);
        assert_eq!(eaw_columns(eaw, WidthMethod::Narrow), 1);
        assert_eq!(eaw_columns(eaw, WidthMethod::for_context(true)), 2);
    }
}
