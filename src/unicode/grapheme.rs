//! Grapheme cluster boundaries over codepoint runs.

use crate::unicode::codepoint::{Codepoint, lossy_char};
use std::ops::Range;
use unicode_normalization::char::canonical_combining_class;
use unicode_segmentation::UnicodeSegmentation;

/// Canonical combining class of virama signs.
const CCC_VIRAMA: u8 = 9;

/// Partition `cps` into extended grapheme clusters.
///
/// The returned ranges are in codepoint indices, cover `cps` exhaustively
/// and never overlap. With `virama_as_joiner` a virama sign and the letter
/// after it stay in one cluster; without it they are always separated.
#[must_use]
pub fn cluster_bounds(cps: &[Codepoint], virama_as_joiner: bool) -> Vec<Range<usize>> {
    if cps.is_empty() {
        return Vec::new();
    }

    // One char per codepoint, so char counts are codepoint indices.
    let text: String = cps.iter().map(|&cp| lossy_char(cp)).collect();
    let mut bounds = Vec::new();
    let mut start = 0;
    for grapheme in text.graphemes(true) {
        let len = grapheme.chars().count();
        bounds.push(start..start + len);
        start += len;
    }

    if virama_as_joiner {
        join_after_virama(cps, bounds)
    } else {
        split_after_virama(cps, bounds)
    }
}

fn is_virama(cp: Codepoint) -> bool {
    char::from_u32(cp).is_some_and(|c| canonical_combining_class(c) == CCC_VIRAMA)
}

fn is_letter(cp: Codepoint) -> bool {
    char::from_u32(cp).is_some_and(|c| c.is_alphabetic() && canonical_combining_class(c) == 0)
}

fn join_after_virama(cps: &[Codepoint], bounds: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut out: Vec<Range<usize>> = Vec::with_capacity(bounds.len());
    for range in bounds {
        if let Some(last) = out.last_mut() {
            if is_virama(cps[last.end - 1]) && is_letter(cps[range.start]) {
                last.end = range.end;
                continue;
            }
        }
        out.push(range);
    }
    out
}

fn split_after_virama(cps: &[Codepoint], bounds: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut out = Vec::with_capacity(bounds.len());
    for range in bounds {
        let mut start = range.start;
        for i in range.start + 1..range.end {
            if is_virama(cps[i - 1]) && is_letter(cps[i]) {
                out.push(start..i);
                start = i;
            }
        }
        out.push(start..range.end);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cps(s: &str) -> Vec<Codepoint> {
        s.chars().map(u32::from).collect()
    }

    #[test]
    fn test_clusters_ascii() {
        assert_eq!(cluster_bounds(&cps("abc"), false), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_clusters_combining() {
        // e + combining acute accent
        assert_eq!(cluster_bounds(&cps("e\u{0301}x"), false), vec![0..2, 2..3]);
    }

    #[test]
    fn test_clusters_emoji() {
        // Family emoji (ZWJ sequence)
        let family = cps("👨‍👩‍👧");
        assert_eq!(cluster_bounds(&family, false), vec![0..family.len()]);
    }

    #[test]
    fn test_crlf_is_one_cluster() {
        assert_eq!(cluster_bounds(&cps("a\r\n"), false), vec![0..1, 1..3]);
    }

    #[test]
    fn test_virama_joining() {
        // DEVANAGARI KA + VIRAMA + SSA
        let ksa = cps("\u{0915}\u{094D}\u{0937}");
        assert_eq!(cluster_bounds(&ksa, false), vec![0..2, 2..3]);
        assert_eq!(cluster_bounds(&ksa, true), vec![0..3]);
    }

    #[test]
    fn test_empty() {
        assert!(cluster_bounds(&[], true).is_empty());
    }

    #[test]
    fn test_lone_surrogate_is_own_cluster() {
        assert_eq!(cluster_bounds(&[0x61, 0xD800, 0x62], false), vec![0..1, 1..2, 2..3]);
    }
}
