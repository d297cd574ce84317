//! Conversion between host text encodings and flat codepoint buffers.
//!
//! Everything inside the engine indexes text by Unicode scalar position. Hosts
//! hand text over either as UTF-8 (`&str`) or as UTF-16 code units, where
//! characters at or above U+10000 occupy a surrogate pair. The functions here
//! translate between the two worlds, and [`OffsetMap`] translates indices.
//!
//! Unpaired surrogates survive a UTF-16 round trip untouched; they only
//! degrade to U+FFFD when rendered as a Rust `String`.

use crate::error::Result;
use std::fmt;

/// A single Unicode scalar value (or a lone surrogate passed through).
pub type Codepoint = u32;

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;
const SUPPLEMENTARY_START: u32 = 0x1_0000;
const MAX_CODEPOINT: u32 = 0x10_FFFF;

/// Native code-unit form of host text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HostForm {
    /// Variable width, 1-4 bytes per codepoint.
    #[default]
    Utf8,
    /// Surrogate-pair form, 1-2 units per codepoint.
    Utf16,
    /// Fixed width, one unit per codepoint.
    Utf32,
}

impl HostForm {
    /// Number of code units `cp` occupies in this form.
    #[must_use]
    pub fn unit_len(self, cp: Codepoint) -> usize {
        match self {
            Self::Utf8 => char::from_u32(cp).map_or(3, char::len_utf8),
            Self::Utf16 => {
                if (SUPPLEMENTARY_START..=MAX_CODEPOINT).contains(&cp) {
                    2
                } else {
                    1
                }
            }
            Self::Utf32 => 1,
        }
    }
}

/// Owned, contiguous run of codepoints. May be empty.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodepointBuf {
    cps: Vec<Codepoint>,
}

impl CodepointBuf {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { cps: Vec::new() }
    }

    /// Wrap an existing vector of codepoints.
    #[must_use]
    pub fn from_vec(cps: Vec<Codepoint>) -> Self {
        Self { cps }
    }

    /// Convert UTF-8 text. Each `char` is copied directly.
    pub fn from_str(text: &str) -> Result<Self> {
        let mut cps = Vec::new();
        cps.try_reserve_exact(text.len())?;
        cps.extend(text.chars().map(u32::from));
        Ok(Self { cps })
    }

    /// Convert UTF-16 code units, merging well-formed surrogate pairs.
    pub fn from_utf16(units: &[u16]) -> Result<Self> {
        let mut cps = Vec::new();
        cps.try_reserve_exact(units.len())?;
        let mut i = 0;
        while i < units.len() {
            let unit = u32::from(units[i]);
            if HIGH_SURROGATES.contains(&unit) {
                if let Some(&next) = units.get(i + 1) {
                    let next = u32::from(next);
                    if LOW_SURROGATES.contains(&next) {
                        cps.push((((unit & 0x3FF) << 10) | (next & 0x3FF)) + SUPPLEMENTARY_START);
                        i += 2;
                        continue;
                    }
                }
            }
            cps.push(unit);
            i += 1;
        }
        Ok(Self { cps })
    }

    /// Copy fixed-width UTF-32 units.
    pub fn from_utf32(units: &[u32]) -> Result<Self> {
        let mut cps = Vec::new();
        cps.try_reserve_exact(units.len())?;
        cps.extend_from_slice(units);
        Ok(Self { cps })
    }

    /// Encode as UTF-16, splitting supplementary codepoints into surrogate pairs.
    ///
    /// Values above U+10FFFF are not representable and become U+FFFD.
    pub fn to_utf16(&self) -> Result<Vec<u16>> {
        let extra = self
            .cps
            .iter()
            .filter(|&&cp| cp >= SUPPLEMENTARY_START && cp <= MAX_CODEPOINT)
            .count();
        let mut out = Vec::new();
        out.try_reserve_exact(self.cps.len() + extra)?;
        for &cp in &self.cps {
            if cp > MAX_CODEPOINT {
                out.push(0xFFFD);
            } else if cp >= SUPPLEMENTARY_START {
                let v = cp - SUPPLEMENTARY_START;
                out.push((0xD800 + (v >> 10)) as u16);
                out.push((0xDC00 + (v & 0x3FF)) as u16);
            } else {
                out.push(cp as u16);
            }
        }
        Ok(out)
    }

    /// Render as a `String`. Lone surrogates and out-of-range values become U+FFFD.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        self.cps.iter().map(|&cp| lossy_char(cp)).collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Codepoint] {
        &self.cps
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Codepoint> {
        self.cps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cps.is_empty()
    }
}

impl fmt::Debug for CodepointBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodepointBuf({:?})", self.to_string_lossy())
    }
}

impl From<Vec<Codepoint>> for CodepointBuf {
    fn from(cps: Vec<Codepoint>) -> Self {
        Self::from_vec(cps)
    }
}

/// Map a codepoint to a `char`, substituting U+FFFD for non-scalars.
#[must_use]
pub fn lossy_char(cp: Codepoint) -> char {
    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Convert UTF-8 host text to codepoints.
pub fn to_codepoints(text: &str) -> Result<CodepointBuf> {
    CodepointBuf::from_str(text)
}

/// Convert UTF-16 host text to codepoints.
pub fn to_codepoints_utf16(units: &[u16]) -> Result<CodepointBuf> {
    CodepointBuf::from_utf16(units)
}

/// Convert codepoints back to a `String`. An empty buffer yields `""`.
#[must_use]
pub fn from_codepoints(buf: &CodepointBuf) -> String {
    buf.to_string_lossy()
}

/// Convert codepoints back to UTF-16 code units.
pub fn from_codepoints_utf16(buf: &CodepointBuf) -> Result<Vec<u16>> {
    buf.to_utf16()
}

/// Prefix table translating codepoint indices into host code-unit indices.
///
/// `units[i]` is the code-unit offset where codepoint `i` starts; the final
/// entry is the total unit length.
#[derive(Clone, Debug)]
pub struct OffsetMap {
    units: Vec<usize>,
    form: HostForm,
}

impl OffsetMap {
    /// Build the map for `cps` as encoded in `form`.
    pub fn new(cps: &[Codepoint], form: HostForm) -> Result<Self> {
        let mut units = Vec::new();
        units.try_reserve_exact(cps.len() + 1)?;
        let mut offset = 0;
        units.push(0);
        for &cp in cps {
            offset += form.unit_len(cp);
            units.push(offset);
        }
        Ok(Self { units, form })
    }

    #[must_use]
    pub fn form(&self) -> HostForm {
        self.form
    }

    /// Code-unit offset of codepoint index `idx` (clamped to the end).
    #[must_use]
    pub fn to_units(&self, idx: usize) -> usize {
        let last = self.units.len() - 1;
        self.units[idx.min(last)]
    }

    /// Codepoint index starting at code-unit offset `unit`.
    ///
    /// Returns `None` when `unit` falls inside a multi-unit codepoint.
    #[must_use]
    pub fn to_codepoint(&self, unit: usize) -> Option<usize> {
        self.units.binary_search(&unit).ok()
    }

    /// Total length in code units.
    #[must_use]
    pub fn unit_len(&self) -> usize {
        self.units[self.units.len() - 1]
    }
}
