//! Preprocessing pipeline: carve out pattern matches before breaking.
//!
//! Each entry scans the parts of the text no earlier entry has claimed.
//! Matches are widened to whole clusters, transformed, and shielded from
//! later entries.

use crate::error::{Error, HookKind, Result};
use crate::gcstr::{ClusterFlags, GCStr};
use crate::linebreak::bridge::{Bridge, MergeRule};
use crate::linebreak::hooks::PrepEntry;
use crate::unicode::{Codepoint, HostForm, OffsetMap, lossy_char};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::trace;

const URI_PATTERN: &str = r"(?i)\b(?:url:)?(?:[a-z][-0-9a-z+.]+://|news:|mailto:)[\x21-\x7E]+";

fn uri_regex() -> Result<&'static Regex> {
    static URI: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    URI.get_or_init(|| Regex::new(URI_PATTERN))
        .as_ref()
        .map_err(|e| Error::internal(format!("URI pattern: {e}")))
}

/// Windowed regex search over a codepoint text.
///
/// The regex engine works on UTF-8, so codepoint positions are translated
/// through an [`OffsetMap`] in both directions.
pub struct RegexLocator {
    haystack: String,
    map: OffsetMap,
}

impl RegexLocator {
    pub fn new(text: &[Codepoint]) -> Result<Self> {
        let mut haystack = String::new();
        haystack.try_reserve(text.len())?;
        haystack.extend(text.iter().map(|&cp| lossy_char(cp)));
        let map = OffsetMap::new(text, HostForm::Utf8)?;
        Ok(Self { haystack, map })
    }

    /// First non-empty match of `regex` inside the codepoint `window`.
    ///
    /// Text outside the window is visible to anchors and word boundaries
    /// only. Returns the match as a codepoint range, `None` for no match.
    #[must_use]
    pub fn locate(&self, regex: &Regex, window: Range<usize>) -> Option<Range<usize>> {
        let end = self.map.to_units(window.end);
        let mut pos = self.map.to_units(window.start);
        let bounded = &self.haystack[..end];
        while pos <= end {
            let m = regex.find_at(bounded, pos)?;
            if m.is_empty() {
                pos = m.end() + bounded[m.end()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            let start = self.map.to_codepoint(m.start())?;
            let stop = self.map.to_codepoint(m.end())?;
            return Some(start..stop);
        }
        None
    }
}

enum Piece {
    /// Clusters not claimed yet.
    Raw(Range<usize>),
    /// Clusters produced by an entry.
    Done(GCStr),
}

/// Run the prep pipeline over `text`.
pub(crate) fn apply(bridge: &Bridge<'_>, text: GCStr) -> Result<GCStr> {
    let entries = bridge.options().prep();
    if entries.is_empty() || text.is_empty() {
        return Ok(text);
    }

    let locator = RegexLocator::new(text.as_codepoints())?;
    let mut owner = Vec::with_capacity(text.chars());
    for (i, c) in text.clusters().iter().enumerate() {
        owner.extend(std::iter::repeat_n(i, c.chars()));
    }

    let mut pieces = vec![Piece::Raw(0..text.len())];
    for entry in entries {
        let mut next = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                Piece::Raw(range) if !range.is_empty() => {
                    run_entry(bridge, entry, &text, &locator, &owner, range, &mut next)?;
                }
                other => next.push(other),
            }
        }
        pieces = next;
    }

    let mut out = GCStr::default();
    for piece in pieces {
        match piece {
            Piece::Raw(range) => out.append(&text.substr(range)),
            Piece::Done(gcstr) => out.append(&gcstr),
        }
    }
    Ok(out)
}

fn run_entry(
    bridge: &Bridge<'_>,
    entry: &PrepEntry,
    text: &GCStr,
    locator: &RegexLocator,
    owner: &[usize],
    range: Range<usize>,
    out: &mut Vec<Piece>,
) -> Result<()> {
    let regex = match entry {
        PrepEntry::Uri { .. } => uri_regex()?,
        PrepEntry::Pattern { regex, .. } => regex,
    };

    let cp_start = |i: usize| text.clusters()[i].range().start;
    let cp_end = |i: usize| text.clusters()[i].range().end;

    let mut cursor = range.start;
    while cursor < range.end {
        let window = cp_start(cursor)..cp_end(range.end - 1);
        let Some(found) = locator.locate(regex, window) else {
            break;
        };
        // Widen to whole clusters.
        let first = owner[found.start];
        let last = owner[found.end - 1] + 1;
        trace!(first, last, "prep match");

        if first > cursor {
            out.push(Piece::Raw(cursor..first));
        }
        let matched = text.substr(first..last);
        out.push(Piece::Done(transform(bridge, entry, matched)?));
        cursor = last;
    }
    if cursor < range.end {
        out.push(Piece::Raw(cursor..range.end));
    }
    Ok(())
}

fn transform(bridge: &Bridge<'_>, entry: &PrepEntry, matched: GCStr) -> Result<GCStr> {
    match entry {
        PrepEntry::Uri { breaking } => Ok(uri_flags(matched, *breaking)),
        PrepEntry::Pattern {
            transform: None, ..
        } => Ok(matched),
        PrepEntry::Pattern {
            transform: Some(f), ..
        } => {
            let substring = matched.to_string();
            let ret = bridge.call(HookKind::Prep, |lb| f(lb, &substring))?;
            Ok(bridge.merge(ret, MergeRule::Prep).unwrap_or(matched))
        }
    }
}

/// Pin break decisions inside a URI.
///
/// Breaking follows CMOS 6.17 and 17.11: after a colon or a double slash,
/// before a single slash, tilde, period, comma, hyphen, underscore, question
/// mark, number sign or percent sign, and on either side of `=` and `&`.
fn uri_flags(mut uri: GCStr, breaking: bool) -> GCStr {
    let first_cp = |g: &GCStr, i: usize| -> Option<char> {
        g.cluster_codepoints(i)
            .and_then(|cps| cps.first())
            .map(|&cp| lossy_char(cp))
    };

    for i in 1..uri.len() {
        let allowed = breaking && {
            let prev = first_cp(&uri, i - 1);
            let cur = first_cp(&uri, i);
            let next = first_cp(&uri, i + 1);
            let prev2 = i.checked_sub(2).and_then(|k| first_cp(&uri, k));
            match (prev, cur) {
                (Some(':'), Some(c)) => c != '/',
                (Some('/'), Some(c)) if prev2 == Some('/') => c != '/',
                (_, Some('/')) => prev != Some('/') && next != Some('/'),
                (_, Some('~' | '.' | ',' | '-' | '_' | '?' | '#' | '%' | '=' | '&')) => true,
                (Some('=' | '&'), _) => true,
                _ => false,
            }
        };
        let flag = if allowed {
            ClusterFlags::ALLOW_BEFORE
        } else {
            ClusterFlags::PROHIBIT_BEFORE
        };
        uri.pin_flag(i, flag);
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linebreak::LineBreak;
    use crate::linebreak::hooks::HookReturn;

    fn cps(s: &str) -> Vec<Codepoint> {
        s.chars().map(u32::from).collect()
    }

    fn allowed(g: &GCStr) -> Vec<usize> {
        (0..g.len())
            .filter(|&i| g.flag(i).is_some_and(|f| f.contains(ClusterFlags::ALLOW_BEFORE)))
            .collect()
    }

    #[test]
    fn test_locate_in_window() {
        let locator = RegexLocator::new(&cps("ab XYZ cd XYZ")).unwrap();
        let re = Regex::new("XYZ").unwrap();
        assert_eq!(locator.locate(&re, 0..13), Some(3..6));
        assert_eq!(locator.locate(&re, 6..13), Some(10..13));
        assert_eq!(locator.locate(&re, 6..12), None);
    }

    #[test]
    fn test_locate_astral_text() {
        // Multi-byte codepoints ahead of the match shift byte offsets.
        let locator = RegexLocator::new(&cps("😀漢 abc")).unwrap();
        let re = Regex::new("b+").unwrap();
        assert_eq!(locator.locate(&re, 0..6), Some(4..5));
        assert_eq!(locator.locate(&re, 5..6), None);
    }

    #[test]
    fn test_locate_skips_empty_matches() {
        let locator = RegexLocator::new(&cps("aab")).unwrap();
        let re = Regex::new("b*").unwrap();
        assert_eq!(locator.locate(&re, 0..3), Some(2..3));
    }

    #[test]
    fn test_uri_flags() {
        let uri = GCStr::from_text("http://a.b/c", None);
        let flagged = uri_flags(uri, true);
        // "http:" | "//a" | ".b" | "/c"
        assert_eq!(allowed(&flagged), vec![7, 8, 10]);
        let flagged = uri_flags(GCStr::from_text("http://a.b/c", None), false);
        assert!(allowed(&flagged).is_empty());
        assert_eq!(flagged.flag(3), Some(ClusterFlags::PROHIBIT_BEFORE));
    }

    #[test]
    fn test_pattern_pipeline() {
        let lb = LineBreak::new();
        lb.set_prep(vec![
            PrepEntry::with_fn("XYZ", |_, _| Ok(HookReturn::from(vec!["X", "Y", "Z"]))).unwrap(),
        ]);
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let out = apply(&bridge, GCStr::from_text("aXYZb", None)).unwrap();
        assert_eq!(out, "aXYZb");
        assert_eq!(allowed(&out), vec![2, 3]);
        assert_eq!(out.flag(1), Some(ClusterFlags::empty()));
    }

    #[test]
    fn test_earlier_entries_shield_matches() {
        let lb = LineBreak::new();
        lb.set_prep(vec![
            PrepEntry::pattern("ab", None).unwrap(),
            PrepEntry::with_fn("b", |_, _| Ok(HookReturn::One("B".into()))).unwrap(),
        ]);
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let out = apply(&bridge, GCStr::from_text("ab b", None)).unwrap();
        assert_eq!(out, "ab B");
    }

    #[test]
    fn test_transform_failure() {
        let lb = LineBreak::new();
        lb.set_prep(vec![PrepEntry::with_fn("x", |_, _| Err("bad".into())).unwrap()]);
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let err = apply(&bridge, GCStr::from_text("x", None)).unwrap_err();
        assert!(err.is_hook_failure());
    }
}
