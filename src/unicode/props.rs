//! Line breaking and East Asian width property values.
//!
//! Class codes follow the binding order so hosts can pass small integers in
//! tailoring maps: `LineBreakClass::BK` is 0, `LineBreakClass::XX` is 38 and
//! the classes introduced by later Unicode versions follow after it.

use crate::error::{Error, Result};
use crate::unicode::codepoint::Codepoint;
use unicode_linebreak::{BreakClass, break_property};

/// Unicode version of the default line breaking property data.
pub const UNICODE_VERSION: (u8, u8, u8) = (15, 0, 0);

/// Line breaking class as defined by UAX #14.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LineBreakClass {
    BK = 0,
    CR,
    LF,
    NL,
    SP,
    OP,
    CL,
    CP,
    QU,
    GL,
    NS,
    EX,
    SY,
    IS,
    PR,
    PO,
    NU,
    AL,
    HL,
    ID,
    IN,
    HY,
    BA,
    BB,
    B2,
    CB,
    ZW,
    CM,
    WJ,
    H2,
    H3,
    JL,
    JV,
    JT,
    SG,
    AI,
    CJ,
    SA,
    XX,
    RI,
    EB,
    EM,
    ZWJ,
}

impl LineBreakClass {
    /// Every class in code order.
    pub const ALL: [Self; 43] = [
        Self::BK,
        Self::CR,
        Self::LF,
        Self::NL,
        Self::SP,
        Self::OP,
        Self::CL,
        Self::CP,
        Self::QU,
        Self::GL,
        Self::NS,
        Self::EX,
        Self::SY,
        Self::IS,
        Self::PR,
        Self::PO,
        Self::NU,
        Self::AL,
        Self::HL,
        Self::ID,
        Self::IN,
        Self::HY,
        Self::BA,
        Self::BB,
        Self::B2,
        Self::CB,
        Self::ZW,
        Self::CM,
        Self::WJ,
        Self::H2,
        Self::H3,
        Self::JL,
        Self::JV,
        Self::JT,
        Self::SG,
        Self::AI,
        Self::CJ,
        Self::SA,
        Self::XX,
        Self::RI,
        Self::EB,
        Self::EM,
        Self::ZWJ,
    ];

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Validate a host-supplied class code.
    pub fn try_from_code(code: i64) -> Result<Self> {
        u8::try_from(code)
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| Error::value(format!("unknown line breaking class code {code}")))
    }

    /// Two or three letter property value alias.
    #[must_use]
    pub fn name(self) -> &'static str {
        const NAMES: [&str; 43] = [
            "BK", "CR", "LF", "NL", "SP", "OP", "CL", "CP", "QU", "GL", "NS", "EX", "SY", "IS",
            "PR", "PO", "NU", "AL", "HL", "ID", "IN", "HY", "BA", "BB", "B2", "CB", "ZW", "CM",
            "WJ", "H2", "H3", "JL", "JV", "JT", "SG", "AI", "CJ", "SA", "XX", "RI", "EB", "EM",
            "ZWJ",
        ];
        NAMES[self as usize]
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.name().eq_ignore_ascii_case(name))
    }

    /// Classes that force a break after them.
    #[must_use]
    pub fn is_mandatory_break(self) -> bool {
        matches!(self, Self::BK | Self::CR | Self::LF | Self::NL)
    }

    /// Hangul syllables and conjoining jamo.
    #[must_use]
    pub fn is_hangul(self) -> bool {
        matches!(self, Self::H2 | Self::H3 | Self::JL | Self::JV | Self::JT)
    }
}

/// East Asian width property as defined by UAX #11, plus `Z` for nonspacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EastAsianWidth {
    Na = 0,
    N,
    A,
    W,
    H,
    F,
    Z,
}

impl EastAsianWidth {
    pub const ALL: [Self; 7] = [Self::Na, Self::N, Self::A, Self::W, Self::H, Self::F, Self::Z];

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn try_from_code(code: i64) -> Result<Self> {
        u8::try_from(code)
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| Error::value(format!("unknown East_Asian_Width code {code}")))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Na => "Na",
            Self::N => "N",
            Self::A => "A",
            Self::W => "W",
            Self::H => "H",
            Self::F => "F",
            Self::Z => "Z",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|eaw| eaw.name().eq_ignore_ascii_case(name))
    }
}

/// Default line breaking class of a codepoint.
#[must_use]
pub fn default_lbc(cp: Codepoint) -> LineBreakClass {
    use LineBreakClass as C;

    if (0xD800..=0xDFFF).contains(&cp) {
        return C::SG;
    }
    if cp > 0x10_FFFF {
        return C::XX;
    }
    #[allow(unreachable_patterns)]
    match break_property(cp) {
        BreakClass::Mandatory => C::BK,
        BreakClass::CarriageReturn => C::CR,
        BreakClass::LineFeed => C::LF,
        BreakClass::CombiningMark => C::CM,
        BreakClass::NextLine => C::NL,
        BreakClass::Surrogate => C::SG,
        BreakClass::WordJoiner => C::WJ,
        BreakClass::ZeroWidthSpace => C::ZW,
        BreakClass::NonBreakingGlue => C::GL,
        BreakClass::Space => C::SP,
        BreakClass::ZeroWidthJoiner => C::ZWJ,
        BreakClass::BeforeAndAfter => C::B2,
        BreakClass::After => C::BA,
        BreakClass::Before => C::BB,
        BreakClass::Hyphen => C::HY,
        BreakClass::Contingent => C::CB,
        BreakClass::ClosePunctuation => C::CL,
        BreakClass::CloseParenthesis => C::CP,
        BreakClass::Exclamation => C::EX,
        BreakClass::Inseparable => C::IN,
        BreakClass::NonStarter => C::NS,
        BreakClass::OpenPunctuation => C::OP,
        BreakClass::Quotation => C::QU,
        BreakClass::InfixSeparator => C::IS,
        BreakClass::Numeric => C::NU,
        BreakClass::Postfix => C::PO,
        BreakClass::Prefix => C::PR,
        BreakClass::Symbol => C::SY,
        BreakClass::Ambiguous => C::AI,
        BreakClass::Alphabetic => C::AL,
        BreakClass::ConditionalJapaneseStarter => C::CJ,
        BreakClass::EmojiBase => C::EB,
        BreakClass::EmojiModifier => C::EM,
        BreakClass::HangulLvSyllable => C::H2,
        BreakClass::HangulLvtSyllable => C::H3,
        BreakClass::HebrewLetter => C::HL,
        BreakClass::Ideographic => C::ID,
        BreakClass::HangulLJamo => C::JL,
        BreakClass::HangulVJamo => C::JV,
        BreakClass::HangulTJamo => C::JT,
        BreakClass::RegionalIndicator => C::RI,
        BreakClass::ComplexContext => C::SA,
        BreakClass::Unknown => C::XX,
        _ => C::XX,
    }
}
