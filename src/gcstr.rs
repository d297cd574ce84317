//! Grapheme cluster strings.
//!
//! A [`GCStr`] owns a codepoint run partitioned into grapheme clusters. Each
//! cluster carries its line breaking class, the class of its trailing
//! extender, the East Asian width of its last codepoint, its column count
//! and a flag byte that earlier stages use to pin break decisions.
//!
//! Lengths and indices are counted in clusters, never in codepoints.
//!
//! # Examples
//!
//! ```
//! use textseg::GCStr;
//!
//! let s = GCStr::from_text("ne\u{301}e", None);
//! assert_eq!(s.len(), 3);
//! assert_eq!(s.chars(), 4);
//! assert_eq!(s.slice(1, 2).to_string(), "e\u{301}");
//! ```

use crate::error::{Error, Result};
use crate::linebreak::options::{BreakFlags, Options};
use crate::linebreak::{LineBreak, Shared};
use crate::unicode::{
    Codepoint, CodepointBuf, EastAsianWidth, LineBreakClass, cluster_bounds, default_eaw,
    default_lbc, eaw_columns, lossy_char,
};
use bitflags::bitflags;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;
use std::ops::{Add, Range};
use std::rc::Weak;

const ZWJ: Codepoint = 0x200D;

bitflags! {
    /// Break decisions pinned on the boundary before a cluster.
    ///
    /// The remaining bits are free for host use and are preserved.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct ClusterFlags: u8 {
        /// Never break before this cluster.
        const PROHIBIT_BEFORE = 0x01;
        /// Always allow a break before this cluster.
        const ALLOW_BEFORE    = 0x02;

        const _ = !0;
    }
}

impl ClusterFlags {
    /// True when a break decision has been pinned.
    #[must_use]
    pub fn is_explicit(self) -> bool {
        self.intersects(Self::PROHIBIT_BEFORE | Self::ALLOW_BEFORE)
    }
}

/// Classification of one grapheme cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cluster {
    start: usize,
    len: usize,
    col: usize,
    lbc: LineBreakClass,
    lbcext: LineBreakClass,
    eaw: EastAsianWidth,
    flag: ClusterFlags,
}

impl Cluster {
    /// Codepoint range inside the owning string.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Number of codepoints.
    #[must_use]
    pub fn chars(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.col
    }

    #[must_use]
    pub fn lbc(&self) -> LineBreakClass {
        self.lbc
    }

    /// Class of the trailing extender, or of the base when there is none.
    #[must_use]
    pub fn lbcext(&self) -> LineBreakClass {
        self.lbcext
    }

    /// East Asian width of the last codepoint.
    #[must_use]
    pub fn eaw(&self) -> EastAsianWidth {
        self.eaw
    }

    #[must_use]
    pub fn flag(&self) -> ClusterFlags {
        self.flag
    }
}

fn lbc_of(cp: Codepoint, opts: &Options) -> LineBreakClass {
    let lbc = opts.lbc_map().get(cp).unwrap_or_else(|| default_lbc(cp));
    if lbc.is_hangul() && opts.has(BreakFlags::HANGUL_AS_AL) {
        LineBreakClass::AL
    } else {
        lbc
    }
}

fn eaw_of(cp: Codepoint, opts: &Options) -> EastAsianWidth {
    opts.eaw_map().get(cp).unwrap_or_else(|| default_eaw(cp))
}

/// Partition `text` into classified clusters.
fn classify(text: &[Codepoint], opts: &Options) -> Vec<Cluster> {
    let method = opts.width_method();
    let bounds = cluster_bounds(text, opts.has(BreakFlags::VIRAMA_AS_JOINER));
    let mut clusters = Vec::with_capacity(bounds.len());

    for range in bounds {
        let cps = &text[range.clone()];
        let mut lbc = lbc_of(cps[0], opts);
        let mut lbcext = lbc;
        if let Some(&last) = cps.get(1..).and_then(<[Codepoint]>::last) {
            let ext = lbc_of(last, opts);
            if !matches!(ext, LineBreakClass::CM | LineBreakClass::ZWJ) {
                lbcext = ext;
            }
            // Space with combining marks.
            if lbc == LineBreakClass::SP {
                lbc = if opts.has(BreakFlags::LEGACY_CM) {
                    LineBreakClass::ID
                } else {
                    LineBreakClass::AL
                };
                lbcext = lbc;
            }
        }

        let col = if lbc.is_mandatory_break() {
            0
        } else {
            let joined = cps.iter().position(|&cp| cp == ZWJ).unwrap_or(cps.len());
            cps[..joined]
                .iter()
                .map(|&cp| eaw_columns(eaw_of(cp, opts), method))
                .sum()
        };

        clusters.push(Cluster {
            start: range.start,
            len: range.len(),
            col,
            lbc,
            lbcext,
            eaw: eaw_of(cps[cps.len() - 1], opts),
            flag: ClusterFlags::empty(),
        });
    }
    clusters
}

/// String of grapheme clusters.
///
/// May be linked to the [`LineBreak`] it was classified with; the link is
/// weak and only used to classify plain strings combined with this one.
#[derive(Clone, Default)]
pub struct GCStr {
    text: Vec<Codepoint>,
    clusters: Vec<Cluster>,
    context: Option<Weak<Shared>>,
}

impl GCStr {
    /// Classify a codepoint buffer, using the tailoring of `ctx` if given.
    #[must_use]
    pub fn new(buf: &CodepointBuf, ctx: Option<&LineBreak>) -> Self {
        Self::from_codepoints(buf.as_slice().to_vec(), ctx)
    }

    #[must_use]
    pub fn from_codepoints(text: Vec<Codepoint>, ctx: Option<&LineBreak>) -> Self {
        match ctx {
            Some(lb) => {
                let opts = lb.options_ref();
                Self::classified(text, &opts, Some(lb.downgrade()))
            }
            None => Self::classified(text, &Options::default(), None),
        }
    }

    #[must_use]
    pub fn from_text(text: &str, ctx: Option<&LineBreak>) -> Self {
        Self::from_codepoints(text.chars().map(u32::from).collect(), ctx)
    }

    /// Build from UTF-16 code units, merging surrogate pairs.
    pub fn from_utf16(units: &[u16], ctx: Option<&LineBreak>) -> Result<Self> {
        let buf = CodepointBuf::from_utf16(units)?;
        Ok(Self::from_codepoints(buf.into_vec(), ctx))
    }

    pub(crate) fn classified(
        text: Vec<Codepoint>,
        opts: &Options,
        context: Option<Weak<Shared>>,
    ) -> Self {
        let clusters = classify(&text, opts);
        Self {
            text,
            clusters,
            context,
        }
    }

    pub(crate) fn context(&self) -> Option<LineBreak> {
        self.context.as_ref().and_then(LineBreak::upgrade)
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of codepoints.
    #[must_use]
    pub fn chars(&self) -> usize {
        self.text.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.clusters.iter().map(|c| c.col).sum()
    }

    /// Class of the first cluster.
    #[must_use]
    pub fn lbc(&self) -> Option<LineBreakClass> {
        self.clusters.first().map(Cluster::lbc)
    }

    /// Trailing extender class of the last cluster.
    #[must_use]
    pub fn lbcext(&self) -> Option<LineBreakClass> {
        self.clusters.last().map(Cluster::lbcext)
    }

    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    #[must_use]
    pub fn cluster(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    /// Codepoints of the cluster at `index`.
    #[must_use]
    pub fn cluster_codepoints(&self, index: usize) -> Option<&[Codepoint]> {
        self.clusters.get(index).map(|c| &self.text[c.range()])
    }

    /// The whole codepoint run.
    #[must_use]
    pub fn as_codepoints(&self) -> &[Codepoint] {
        &self.text
    }

    #[must_use]
    pub fn to_codepoints(&self) -> CodepointBuf {
        CodepointBuf::from_vec(self.text.clone())
    }

    pub fn to_utf16(&self) -> Result<Vec<u16>> {
        self.to_codepoints().to_utf16()
    }

    /// Flag byte of cluster `index`, `None` when out of range.
    #[must_use]
    pub fn flag(&self, index: usize) -> Option<ClusterFlags> {
        self.clusters.get(index).map(|c| c.flag)
    }

    /// Overwrite the flag byte of cluster `index`, returning the old one.
    pub fn set_flag(&mut self, index: usize, flag: ClusterFlags) -> Option<ClusterFlags> {
        self.clusters
            .get_mut(index)
            .map(|c| std::mem::replace(&mut c.flag, flag))
    }

    /// Set `flag` on cluster `index` unless a decision is already pinned there.
    pub(crate) fn pin_flag(&mut self, index: usize, flag: ClusterFlags) {
        if let Some(c) = self.clusters.get_mut(index) {
            if !c.flag.is_explicit() {
                c.flag |= flag;
            }
        }
    }

    /// Clusters `range`, clamped to the string.
    #[must_use]
    pub fn substr(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let mut out = Self {
            text: Vec::new(),
            clusters: Vec::with_capacity(end - start),
            context: self.context.clone(),
        };
        out.extend_clusters(self, start..end);
        out
    }

    fn extend_clusters(&mut self, other: &Self, range: Range<usize>) {
        for c in &other.clusters[range] {
            let start = self.text.len();
            self.text.extend_from_slice(&other.text[c.range()]);
            self.clusters.push(Cluster { start, ..*c });
        }
    }

    /// Append the clusters of `other`.
    pub fn append(&mut self, other: &Self) {
        if self.context.is_none() {
            self.context.clone_from(&other.context);
        }
        self.extend_clusters(other, 0..other.len());
    }

    /// Clusters of `self` followed by those of `other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.append(other);
        out
    }

    /// Clusters of `self` repeated `count` times.
    pub fn repeat(&self, count: isize) -> Result<Self> {
        let count = usize::try_from(count)
            .map_err(|_| Error::value(format!("repeat count must be non-negative, not {count}")))?;
        let mut out = Self {
            context: self.context.clone(),
            ..Self::default()
        };
        for _ in 0..count {
            out.extend_clusters(self, 0..self.len());
        }
        Ok(out)
    }

    fn resolve_index(&self, index: isize) -> Result<usize> {
        let len = self.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs()).filter(|&i| i < len)
        };
        resolved.ok_or(Error::Index { index, len })
    }

    fn clamp_bound(&self, index: isize) -> usize {
        let len = self.len();
        if index < 0 {
            len.saturating_sub(index.unsigned_abs())
        } else {
            index.unsigned_abs().min(len)
        }
    }

    /// Single-cluster string at `index`; negative indices count from the end.
    pub fn item(&self, index: isize) -> Result<Self> {
        let i = self.resolve_index(index)?;
        Ok(self.substr(i..i + 1))
    }

    /// Clusters `[start, end)`; negative bounds count from the end and an
    /// inverted range is empty.
    #[must_use]
    pub fn slice(&self, start: isize, end: isize) -> Self {
        let (start, end) = (self.clamp_bound(start), self.clamp_bound(end));
        self.substr(start..end.max(start))
    }

    /// Copy with clusters `[index, index + len)` replaced by `replacement`;
    /// `None` deletes them.
    #[must_use]
    pub fn replace(&self, index: usize, len: usize, replacement: Option<&Self>) -> Self {
        let start = index.min(self.len());
        let end = start.saturating_add(len).min(self.len());
        let mut out = self.substr(0..start);
        if let Some(r) = replacement {
            out.extend_clusters(r, 0..r.len());
        }
        out.extend_clusters(self, end..self.len());
        out
    }

    /// Replace the cluster at `index` in place.
    pub fn assign_item(&mut self, index: isize, value: Option<&Self>) -> Result<()> {
        let Some(value) = value else {
            return Err(Error::type_error("GCStr object doesn't support item deletion"));
        };
        let i = self.resolve_index(index)?;
        *self = self.replace(i, 1, Some(value));
        Ok(())
    }

    /// Replace clusters `[start, end)` in place; `None` deletes them.
    pub fn assign_slice(&mut self, start: isize, end: isize, value: Option<&Self>) {
        let (start, end) = (self.clamp_bound(start), self.clamp_bound(end));
        *self = self.replace(start, end.saturating_sub(start), value);
    }

    /// Plain text `other` classified with this string's context.
    fn coerce(&self, other: &str) -> Self {
        let ctx = self.context();
        Self::from_text(other, ctx.as_ref())
    }

    fn cluster_slices(&self) -> impl Iterator<Item = &[Codepoint]> {
        self.clusters.iter().map(|c| &self.text[c.range()])
    }
}

impl fmt::Display for GCStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text.iter().try_for_each(|&cp| f.write_char(lossy_char(cp)))
    }
}

impl fmt::Debug for GCStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GCStr")
            .field("text", &self.to_string())
            .field("len", &self.len())
            .finish()
    }
}

impl PartialEq for GCStr {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GCStr {}

impl PartialOrd for GCStr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GCStr {
    /// Lexicographic over clusters, each compared by codepoints.
    fn cmp(&self, other: &Self) -> Ordering {
        self.cluster_slices().cmp(other.cluster_slices())
    }
}

impl PartialEq<str> for GCStr {
    fn eq(&self, other: &str) -> bool {
        *self == Self::from_text(other, None)
    }
}

impl PartialEq<&str> for GCStr {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<GCStr> for &str {
    fn eq(&self, other: &GCStr) -> bool {
        other == self
    }
}

impl Add for &GCStr {
    type Output = GCStr;

    fn add(self, rhs: Self) -> GCStr {
        self.concat(rhs)
    }
}

impl Add<&str> for &GCStr {
    type Output = GCStr;

    fn add(self, rhs: &str) -> GCStr {
        self.concat(&self.coerce(rhs))
    }
}

impl Add<&GCStr> for &str {
    type Output = GCStr;

    fn add(self, rhs: &GCStr) -> GCStr {
        rhs.coerce(self).concat(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gc(s: &str) -> GCStr {
        GCStr::from_text(s, None)
    }

    #[test]
    fn test_empty() {
        let s = GCStr::new(&CodepointBuf::new(), None);
        assert!(s.is_empty());
        assert_eq!(s.chars(), 0);
        assert_eq!(s.lbc(), None);
        assert_eq!(s.lbcext(), None);
        assert_eq!(s.to_string(), "");
    }

    #[test]
    fn test_classification() {
        let s = gc("a 漢\n");
        assert_eq!(s.len(), 4);
        assert_eq!(s.lbc(), Some(LineBreakClass::AL));
        let classes: Vec<_> = s.clusters().iter().map(Cluster::lbc).collect();
        assert_eq!(
            classes,
            vec![
                LineBreakClass::AL,
                LineBreakClass::SP,
                LineBreakClass::ID,
                LineBreakClass::LF
            ]
        );
        // newline counts no columns
        assert_eq!(s.columns(), 4);
        assert_eq!(s.cluster(2).map(Cluster::eaw), Some(EastAsianWidth::W));
    }

    #[test]
    fn test_combining_cluster() {
        let s = gc("e\u{301}");
        assert_eq!(s.len(), 1);
        assert_eq!(s.chars(), 2);
        assert_eq!(s.columns(), 1);
        assert_eq!(s.lbcext(), Some(LineBreakClass::AL));
        assert_eq!(s.cluster(0).map(Cluster::eaw), Some(EastAsianWidth::Z));
    }

    #[test]
    fn test_space_with_combining_mark() {
        let s = gc(" \u{301}");
        assert_eq!(s.len(), 1);
        assert_eq!(s.lbc(), Some(LineBreakClass::AL));

        let lb = LineBreak::new();
        lb.set_flag(BreakFlags::LEGACY_CM, true);
        let s = GCStr::from_text(" \u{301}", Some(&lb));
        assert_eq!(s.lbc(), Some(LineBreakClass::ID));
    }

    #[test]
    fn test_tailored_classification() {
        let lb = LineBreak::new();
        lb.update_lbc([('x', LineBreakClass::ID)]).unwrap();
        lb.set_flag(BreakFlags::EASTASIAN_CONTEXT, true);
        let s = GCStr::from_text("x\u{2460}", Some(&lb));
        assert_eq!(s.lbc(), Some(LineBreakClass::ID));
        // ambiguous width is wide in East Asian context
        assert_eq!(s.columns(), 3);
    }

    #[test]
    fn test_hangul_as_al() {
        let lb = LineBreak::new();
        assert_eq!(GCStr::from_text("한", Some(&lb)).lbc(), Some(LineBreakClass::H3));
        lb.set_flag(BreakFlags::HANGUL_AS_AL, true);
        assert_eq!(GCStr::from_text("한", Some(&lb)).lbc(), Some(LineBreakClass::AL));
    }

    #[test]
    fn test_emoji_zwj_columns() {
        assert_eq!(gc("👨‍👩‍👧").columns(), 2);
    }

    #[test]
    fn test_concat_and_add() {
        let a = gc("ab");
        let b = gc("cd");
        let c = &a + &b;
        assert_eq!(c.len(), 4);
        assert_eq!(c, "abcd");
        assert_eq!((&a + "x").to_string(), "abx");
        assert_eq!(("x" + &a).to_string(), "xab");
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_concat_keeps_flags() {
        let mut a = gc("ab");
        a.set_flag(1, ClusterFlags::PROHIBIT_BEFORE);
        let c = gc("z").concat(&a);
        assert_eq!(c.flag(2), Some(ClusterFlags::PROHIBIT_BEFORE));
    }

    #[test]
    fn test_repeat() {
        let s = gc("ab");
        assert_eq!(s.repeat(3).unwrap().to_string(), "ababab");
        assert!(s.repeat(0).unwrap().is_empty());
        assert!(matches!(s.repeat(-1), Err(Error::Value(_))));
    }

    #[test]
    fn test_item() {
        let s = gc("abc");
        assert_eq!(s.item(0).unwrap(), "a");
        assert_eq!(s.item(-1).unwrap(), "c");
        assert!(matches!(s.item(3), Err(Error::Index { index: 3, len: 3 })));
        assert!(matches!(s.item(-4), Err(Error::Index { .. })));
    }

    #[test]
    fn test_slice_clamping() {
        let s = gc("abcdef");
        assert_eq!(s.slice(1, 3), "bc");
        assert_eq!(s.slice(-2, 100), "ef");
        assert!(s.slice(4, 2).is_empty());
        assert!(s.slice(10, 20).is_empty());
        assert_eq!(s.slice(-100, 1), "a");
    }

    #[test]
    fn test_replace() {
        let s = gc("abcdef");
        let r = gc("XY");
        let out = s.replace(1, 2, Some(&r));
        assert_eq!(out, "aXYdef");
        assert_eq!(out.slice(1, 3), r);
        assert_eq!(s.replace(0, 3, None), "def");
        assert_eq!(s.replace(10, 1, Some(&r)), "abcdefXY");
    }

    #[test]
    fn test_assign() {
        let mut s = gc("abc");
        s.assign_item(-1, Some(&gc("Z"))).unwrap();
        assert_eq!(s, "abZ");
        assert!(matches!(s.assign_item(0, None), Err(Error::Type(_))));
        assert!(matches!(s.assign_item(5, Some(&gc("x"))), Err(Error::Index { .. })));
        s.assign_slice(0, 2, None);
        assert_eq!(s, "Z");
        s.assign_slice(1, 1, Some(&gc("ed")));
        assert_eq!(s, "Zed");
    }

    #[test]
    fn test_flags() {
        let mut s = gc("ab");
        assert_eq!(s.flag(0), Some(ClusterFlags::empty()));
        assert_eq!(s.flag(2), None);
        assert_eq!(
            s.set_flag(1, ClusterFlags::ALLOW_BEFORE),
            Some(ClusterFlags::empty())
        );
        s.pin_flag(1, ClusterFlags::PROHIBIT_BEFORE);
        assert_eq!(s.flag(1), Some(ClusterFlags::ALLOW_BEFORE));
        assert_eq!(s.set_flag(9, ClusterFlags::ALLOW_BEFORE), None);
        // host bits survive
        s.set_flag(0, ClusterFlags::from_bits_retain(0x80));
        assert_eq!(s.flag(0).map(|f| f.bits()), Some(0x80));
    }

    #[test]
    fn test_ordering() {
        assert!(gc("ab") < gc("abc"));
        assert!(gc("abc") < gc("abd"));
        assert!(gc("b") > gc("abc"));
        assert_eq!(gc("e\u{301}").cmp(&gc("e\u{301}")), Ordering::Equal);
        assert!(gc("e") < gc("e\u{301}"));
    }

    #[test]
    fn test_utf16_view() {
        let s = GCStr::from_utf16(&[0x61, 0xD83D, 0xDE00], None).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_codepoints(), &[0x61, 0x1F600]);
        assert_eq!(s.to_utf16().unwrap(), vec![0x61, 0xD83D, 0xDE00]);
    }

    #[test]
    fn test_context_link_is_weak() {
        let lb = LineBreak::new();
        let s = GCStr::from_text("abc", Some(&lb));
        assert_eq!(lb.handle_count(), 1);
        drop(lb);
        assert!(s.context().is_none());
        assert_eq!((&s + "d").len(), 4);
    }
}
