//! Tailoring maps: host overrides of default character properties.

use crate::error::{Error, Result};
use crate::unicode::Codepoint;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

const MAX_CODEPOINT: u32 = 0x10_FFFF;

/// Key of a tailoring entry: one codepoint, every codepoint of a sequence,
/// or an inclusive range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TailorKey {
    Codepoint(Codepoint),
    Sequence(Vec<Codepoint>),
    Range(RangeInclusive<Codepoint>),
}

impl TailorKey {
    /// Expand into validated inclusive ranges.
    fn ranges(&self) -> Result<Vec<RangeInclusive<Codepoint>>> {
        let check = |cp: Codepoint| {
            if cp > MAX_CODEPOINT {
                Err(Error::value(format!(
                    "key of map must be a Unicode codepoint, not {cp:#X}"
                )))
            } else {
                Ok(cp)
            }
        };
        match self {
            Self::Codepoint(cp) => Ok(vec![check(*cp)?..=*cp]),
            Self::Sequence(cps) => {
                if cps.is_empty() {
                    return Err(Error::value("key of map must not be an empty sequence"));
                }
                cps.iter().map(|&cp| check(cp).map(|cp| cp..=cp)).collect()
            }
            Self::Range(range) => {
                let (start, end) = (check(*range.start())?, check(*range.end())?);
                if start > end {
                    return Err(Error::value(format!(
                        "inverted codepoint range {start:#X}..={end:#X}"
                    )));
                }
                Ok(vec![start..=end])
            }
        }
    }
}

impl From<Codepoint> for TailorKey {
    fn from(cp: Codepoint) -> Self {
        Self::Codepoint(cp)
    }
}

impl From<char> for TailorKey {
    fn from(c: char) -> Self {
        Self::Codepoint(u32::from(c))
    }
}

impl From<&str> for TailorKey {
    fn from(s: &str) -> Self {
        Self::Sequence(s.chars().map(u32::from).collect())
    }
}

impl From<&[Codepoint]> for TailorKey {
    fn from(cps: &[Codepoint]) -> Self {
        Self::Sequence(cps.to_vec())
    }
}

impl From<RangeInclusive<Codepoint>> for TailorKey {
    fn from(range: RangeInclusive<Codepoint>) -> Self {
        Self::Range(range)
    }
}

impl From<RangeInclusive<char>> for TailorKey {
    fn from(range: RangeInclusive<char>) -> Self {
        Self::Range(u32::from(*range.start())..=u32::from(*range.end()))
    }
}

/// Ordered list of codepoint-range overrides. Later entries win.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TailoringMap<T> {
    entries: Vec<(RangeInclusive<Codepoint>, T)>,
}

impl<T> Default for TailoringMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Copy> TailoringMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override. Fails without modifying the map on a malformed key.
    pub fn insert(&mut self, key: &TailorKey, value: T) -> Result<()> {
        let ranges = key.ranges()?;
        self.entries.extend(ranges.into_iter().map(|r| (r, value)));
        Ok(())
    }

    /// Add several overrides atomically: either all are applied or none.
    pub fn extend_checked<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (TailorKey, T)>,
    {
        let mut staged = Vec::new();
        for (key, value) in items {
            staged.extend(key.ranges()?.into_iter().map(|r| (r, value)));
        }
        self.entries.extend(staged);
        Ok(())
    }

    /// Override for `cp`, if any.
    #[must_use]
    pub fn get(&self, cp: Codepoint) -> Option<T> {
        self.entries
            .iter()
            .rev()
            .find(|(range, _)| range.contains(&cp))
            .map(|(_, value)| *value)
    }

    /// Range entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (RangeInclusive<Codepoint>, T)> + '_ {
        self.entries.iter().map(|(range, value)| (range.clone(), *value))
    }

    /// Effective override per codepoint.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<Codepoint, T> {
        let mut map = BTreeMap::new();
        for (range, value) in &self.entries {
            for cp in range.clone() {
                map.insert(cp, *value);
            }
        }
        map
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
