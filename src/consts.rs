//! Convenience codepoint sets for tailoring.
//!
//! Each set is a list of inclusive ranges; composite sets list their parts.
//! [`tailoring`] turns sets into entries accepted by
//! [`LineBreak::update_lbc`](crate::LineBreak::update_lbc) and
//! [`LineBreak::update_eaw`](crate::LineBreak::update_eaw).
//!
//! ```
//! use textseg::consts::{tailoring, KANA_NONSTARTERS};
//! use textseg::{LineBreak, LineBreakClass};
//!
//! let lb = LineBreak::new();
//! lb.update_lbc(tailoring(KANA_NONSTARTERS, LineBreakClass::NS))?;
//! # Ok::<(), textseg::Error>(())
//! ```

use crate::linebreak::TailorKey;
use crate::unicode::Codepoint;
use std::ops::RangeInclusive;

/// Static set of codepoint ranges.
pub type CodepointSet = &'static [RangeInclusive<Codepoint>];

pub const AMBIGUOUS_CYRILLIC: CodepointSet = &[0x0401..=0x0401, 0x0410..=0x044F, 0x0451..=0x0451];

pub const AMBIGUOUS_GREEK: CodepointSet = &[0x0391..=0x03A9, 0x03B1..=0x03C1, 0x03C3..=0x03C9];

pub const AMBIGUOUS_LATIN: CodepointSet = &[
    0x00C6..=0x00C6,
    0x00D0..=0x00D0,
    0x00D8..=0x00D8,
    0x00DE..=0x00E1,
    0x00E6..=0x00E6,
    0x00E8..=0x00EA,
    0x00EC..=0x00ED,
    0x00F0..=0x00F0,
    0x00F2..=0x00F3,
    0x00F8..=0x00FA,
    0x00FC..=0x00FC,
    0x00FE..=0x00FE,
    0x0101..=0x0101,
    0x0111..=0x0111,
    0x0113..=0x0113,
    0x011B..=0x011B,
    0x0126..=0x0127,
    0x012B..=0x012B,
    0x0131..=0x0133,
    0x0138..=0x0138,
    0x013F..=0x0142,
    0x0144..=0x0144,
    0x0148..=0x014B,
    0x014D..=0x014D,
    0x0152..=0x0153,
    0x0166..=0x0167,
    0x016B..=0x016B,
    0x01CE..=0x01CE,
    0x01D0..=0x01D0,
    0x01D2..=0x01D2,
    0x01D4..=0x01D4,
    0x01D6..=0x01D6,
    0x01D8..=0x01D8,
    0x01DA..=0x01DA,
    0x01DC..=0x01DC,
    0x0251..=0x0251,
    0x0261..=0x0261,
];

pub const BACKWARD_GUILLEMETS: CodepointSet = &[0x00AB..=0x00AB, 0x2039..=0x2039];

pub const BACKWARD_QUOTES: CodepointSet = &[0x2018..=0x2018, 0x201C..=0x201C];

pub const FORWARD_GUILLEMETS: CodepointSet = &[0x00BB..=0x00BB, 0x203A..=0x203A];

pub const FORWARD_QUOTES: CodepointSet = &[0x2019..=0x2019, 0x201D..=0x201D];

pub const IDEOGRAPHIC_ITERATION_MARKS: CodepointSet = &[
    0x3005..=0x3005,
    0x303B..=0x303B,
    0x309D..=0x309E,
    0x30FD..=0x30FE,
];

pub const KANA_PROLONGED_SOUND_MARKS: CodepointSet = &[0x30FC..=0x30FC, 0xFF70..=0xFF70];

pub const KANA_SMALL_LETTERS: CodepointSet = &[
    0x3041..=0x3041,
    0x3043..=0x3043,
    0x3045..=0x3045,
    0x3047..=0x3047,
    0x3049..=0x3049,
    0x3063..=0x3063,
    0x3083..=0x3083,
    0x3085..=0x3085,
    0x3087..=0x3087,
    0x308E..=0x308E,
    0x3095..=0x3096,
    0x30A1..=0x30A1,
    0x30A3..=0x30A3,
    0x30A5..=0x30A5,
    0x30A7..=0x30A7,
    0x30A9..=0x30A9,
    0x30C3..=0x30C3,
    0x30E3..=0x30E3,
    0x30E5..=0x30E5,
    0x30E7..=0x30E7,
    0x30EE..=0x30EE,
    0x30F5..=0x30F6,
    0x31F0..=0x31FF,
    0xFF67..=0xFF6F,
];

pub const MASU_MARK: CodepointSet = &[0x303C..=0x303C];

/// Currency and other signs that are narrow in most fonts.
pub const QUESTIONABLE_NARROW_SIGNS: CodepointSet = &[
    0x00A2..=0x00A3,
    0x00A5..=0x00A6,
    0x00AC..=0x00AC,
    0x00AF..=0x00AF,
];

/// Cyrillic, Greek and Latin letters of ambiguous width.
pub const AMBIGUOUS_ALPHABETICS: &[CodepointSet] =
    &[AMBIGUOUS_CYRILLIC, AMBIGUOUS_GREEK, AMBIGUOUS_LATIN];

/// Kana and marks conventionally kept off the start of a line.
pub const KANA_NONSTARTERS: &[CodepointSet] = &[
    IDEOGRAPHIC_ITERATION_MARKS,
    KANA_PROLONGED_SOUND_MARKS,
    KANA_SMALL_LETTERS,
    MASU_MARK,
];

/// Tailoring entries mapping every codepoint of `sets` to `value`.
pub fn tailoring<T: Copy>(
    sets: &[CodepointSet],
    value: T,
) -> impl Iterator<Item = (TailorKey, T)> {
    sets.iter()
        .flat_map(|set| set.iter())
        .map(move |range| (TailorKey::from(range.clone()), value))
}

/// True when `cp` belongs to one of `sets`.
#[must_use]
pub fn contains(sets: &[CodepointSet], cp: Codepoint) -> bool {
    sets.iter().flat_map(|set| set.iter()).any(|range| range.contains(&cp))
}
