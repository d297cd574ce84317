//! Break opportunities between grapheme clusters (UAX #14, LB4 to LB31).
//!
//! Classes are resolved first (LB1 and LB10 with the engine options), then
//! each boundary is decided by the first matching pair rule. Flags pinned on
//! a cluster override every decision except mandatory breaks.

use crate::gcstr::{ClusterFlags, GCStr};
use crate::linebreak::options::{BreakFlags, Options};
use crate::unicode::{EastAsianWidth, LineBreakClass, lossy_char};
use unicode_segmentation::UnicodeSegmentation;

const ZWJ: u32 = 0x200D;

/// Decision at the boundary before a cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakAction {
    Prohibited,
    Allowed,
    Mandatory,
}

impl BreakAction {
    #[must_use]
    pub fn is_break(self) -> bool {
        !matches!(self, Self::Prohibited)
    }
}

/// Resolve classes the pair rules do not handle directly.
#[must_use]
pub fn resolve(lbc: LineBreakClass, eastasian: bool) -> LineBreakClass {
    use LineBreakClass as C;
    match lbc {
        C::AI if eastasian => C::ID,
        C::AI | C::SA | C::SG | C::XX | C::CM | C::ZWJ => C::AL,
        C::CJ => C::NS,
        other => other,
    }
}

fn is_alpha(c: LineBreakClass) -> bool {
    matches!(c, LineBreakClass::AL | LineBreakClass::HL)
}

fn is_ideo(c: LineBreakClass) -> bool {
    matches!(c, LineBreakClass::ID | LineBreakClass::EB | LineBreakClass::EM)
}

fn is_jamo(c: LineBreakClass) -> bool {
    matches!(
        c,
        LineBreakClass::JL
            | LineBreakClass::JV
            | LineBreakClass::JT
            | LineBreakClass::H2
            | LineBreakClass::H3
    )
}

/// Pair rules for `before` × `after`, where `base` is the class ahead of
/// any space run ending at `before`.
#[allow(clippy::too_many_lines)]
fn pair(
    before: LineBreakClass,
    base: LineBreakClass,
    after: LineBreakClass,
    after_eaw: EastAsianWidth,
) -> BreakAction {
    use BreakAction::{Allowed, Mandatory, Prohibited};
    use LineBreakClass as C;

    // LB4, LB5
    if before.is_mandatory_break() {
        return if before == C::CR && after == C::LF {
            Prohibited
        } else {
            Mandatory
        };
    }
    // LB6, LB7
    if after.is_mandatory_break() || matches!(after, C::SP | C::ZW) {
        return Prohibited;
    }
    // LB8
    if base == C::ZW {
        return Allowed;
    }
    // LB11, LB12, LB12a
    if after == C::WJ || before == C::WJ || before == C::GL {
        return Prohibited;
    }
    if after == C::GL && !matches!(before, C::SP | C::BA | C::HY) {
        return Prohibited;
    }
    // LB13
    if matches!(after, C::CL | C::CP | C::EX | C::IS | C::SY) {
        return Prohibited;
    }
    // LB14 to LB17
    if base == C::OP
        || (base == C::QU && after == C::OP)
        || (matches!(base, C::CL | C::CP) && after == C::NS)
        || (base == C::B2 && after == C::B2)
    {
        return Prohibited;
    }
    // LB18
    if before == C::SP {
        return Allowed;
    }
    // LB19, LB20
    if after == C::QU || before == C::QU {
        return Prohibited;
    }
    if after == C::CB || before == C::CB {
        return Allowed;
    }
    // LB21, LB21b, LB22
    if matches!(after, C::BA | C::HY | C::NS) || before == C::BB {
        return Prohibited;
    }
    if before == C::SY && after == C::HL {
        return Prohibited;
    }
    if after == C::IN {
        return Prohibited;
    }
    // LB23, LB23a, LB24
    if (is_alpha(before) && after == C::NU) || (before == C::NU && is_alpha(after)) {
        return Prohibited;
    }
    if (before == C::PR && is_ideo(after)) || (is_ideo(before) && after == C::PO) {
        return Prohibited;
    }
    if (matches!(before, C::PR | C::PO) && is_alpha(after))
        || (is_alpha(before) && matches!(after, C::PR | C::PO))
    {
        return Prohibited;
    }
    // LB25
    if matches!(
        (before, after),
        (C::CL | C::CP | C::NU, C::PO | C::PR)
            | (C::PO | C::PR, C::OP | C::NU)
            | (C::HY | C::IS | C::NU | C::SY, C::NU)
    ) {
        return Prohibited;
    }
    // LB26, LB27
    if matches!(
        (before, after),
        (C::JL, C::JL | C::JV | C::H2 | C::H3)
            | (C::JV | C::H2, C::JV | C::JT)
            | (C::JT | C::H3, C::JT)
    ) {
        return Prohibited;
    }
    if (is_jamo(before) && after == C::PO) || (before == C::PR && is_jamo(after)) {
        return Prohibited;
    }
    // LB28, LB29
    if is_alpha(after) && (is_alpha(before) || before == C::IS) {
        return Prohibited;
    }
    // LB30
    let narrow_op = after == C::OP
        && !matches!(
            after_eaw,
            EastAsianWidth::F | EastAsianWidth::W | EastAsianWidth::H
        );
    if (matches!(before, C::AL | C::HL | C::NU) && narrow_op)
        || (before == C::CP && matches!(after, C::AL | C::HL | C::NU))
    {
        return Prohibited;
    }
    // LB30b
    if before == C::EB && after == C::EM {
        return Prohibited;
    }
    // LB31
    Allowed
}

/// Break actions for every cluster boundary of `text`.
///
/// `actions[i]` decides the boundary before cluster `i`; the entry for
/// cluster 0 is always [`BreakAction::Prohibited`].
#[must_use]
pub fn break_actions(text: &GCStr, opts: &Options) -> Vec<BreakAction> {
    use LineBreakClass as C;

    let eastasian = opts.has(BreakFlags::EASTASIAN_CONTEXT);
    let break_indent = opts.has(BreakFlags::BREAK_INDENT);
    let complex = complex_breaks(text, opts);
    let mut actions = Vec::with_capacity(text.len());

    let mut before = C::BK;
    let mut base = C::BK;
    // Inside the leading space run of a line.
    let mut indent = true;
    let mut ri_run = 0usize;
    let mut hl_hyphen = false;
    let mut after_zwj = false;

    for (i, cluster) in text.clusters().iter().enumerate() {
        let after = resolve(cluster.lbc(), eastasian);

        let mut action = if i == 0 {
            BreakAction::Prohibited
        } else if indent && before == C::SP && after != C::SP && !after.is_mandatory_break() {
            if break_indent {
                BreakAction::Allowed
            } else {
                BreakAction::Prohibited
            }
        } else {
            let mut action = pair(before, base, after, cluster.eaw());
            if action == BreakAction::Allowed {
                // LB8a, LB21a, LB30a
                if after_zwj
                    || (hl_hyphen && before != C::SP)
                    || (before == C::RI && after == C::RI && ri_run % 2 == 1)
                {
                    action = BreakAction::Prohibited;
                }
            }
            if complex[i] && action == BreakAction::Prohibited {
                action = BreakAction::Allowed;
            }
            action
        };

        if i > 0 && action != BreakAction::Mandatory {
            let flag = cluster.flag();
            if flag.contains(ClusterFlags::ALLOW_BEFORE) {
                action = BreakAction::Allowed;
            } else if flag.contains(ClusterFlags::PROHIBIT_BEFORE) {
                action = BreakAction::Prohibited;
            }
        }
        actions.push(action);

        let ext = resolve(cluster.lbcext(), eastasian);
        hl_hyphen = before == C::HL && matches!(after, C::HY | C::BA) && ext == after;
        if after.is_mandatory_break() {
            indent = true;
        } else if after != C::SP {
            indent = false;
        }
        if after == C::RI {
            ri_run += cluster.chars();
        } else {
            ri_run = 0;
        }
        if after != C::SP {
            base = ext;
        }
        before = ext;
        after_zwj = text
            .cluster_codepoints(i)
            .and_then(<[u32]>::last)
            .is_some_and(|&cp| cp == ZWJ);
    }
    actions
}

/// Boundaries inside complex-context runs that word segmentation allows.
fn complex_breaks(text: &GCStr, opts: &Options) -> Vec<bool> {
    let mut out = vec![false; text.len()];
    if !opts.has(BreakFlags::COMPLEX_BREAKING) {
        return out;
    }

    let clusters = text.clusters();
    let mut i = 0;
    while i < clusters.len() {
        if clusters[i].lbc() != LineBreakClass::SA {
            i += 1;
            continue;
        }
        let start = i;
        while i < clusters.len() && clusters[i].lbc() == LineBreakClass::SA {
            i += 1;
        }

        // Char offsets of cluster starts within the run.
        let mut starts = Vec::with_capacity(i - start);
        let mut run = String::new();
        let mut chars = 0;
        for k in start..i {
            starts.push(chars);
            for &cp in text.cluster_codepoints(k).unwrap_or_default() {
                run.push(lossy_char(cp));
                chars += 1;
            }
        }
        let mut offset = 0;
        for word in run.split_word_bounds() {
            offset += word.chars().count();
            if let Ok(k) = starts.binary_search(&offset) {
                out[start + k] = true;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linebreak::LineBreak;

    fn breaks(text: &str, opts: &Options) -> Vec<usize> {
        let s = GCStr::from_text(text, None);
        break_actions(&s, opts)
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_break())
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_break_after_spaces() {
        assert_eq!(breaks("ab cd  ef", &Options::default()), vec![3, 7]);
    }

    #[test]
    fn test_mandatory_after_newline() {
        let s = GCStr::from_text("a\nb", None);
        let actions = break_actions(&s, &Options::default());
        assert_eq!(actions[2], BreakAction::Mandatory);
        assert_eq!(actions[1], BreakAction::Prohibited);
    }

    #[test]
    fn test_no_break_before_closing_punctuation() {
        assert_eq!(breaks("(ab) cd!", &Options::default()), vec![5]);
    }

    #[test]
    fn test_ideographs_break_anywhere() {
        assert_eq!(breaks("漢字。", &Options::default()), vec![1]);
    }

    #[test]
    fn test_numbers_and_prefixes() {
        assert!(breaks("$100.00", &Options::default()).is_empty());
    }

    #[test]
    fn test_hyphen() {
        assert_eq!(breaks("well-known", &Options::default()), vec![5]);
    }

    #[test]
    fn test_break_indent() {
        let opts = Options::default();
        assert!(breaks("  ab", &opts).is_empty());
        let opts = opts.with_flag(BreakFlags::BREAK_INDENT, true);
        assert_eq!(breaks("  ab", &opts), vec![2]);
        assert_eq!(breaks("x\n  ab", &opts), vec![2, 4]);
    }

    #[test]
    fn test_regional_indicator_pairs() {
        // Two flags: break only between the pairs.
        let flags = "\u{1F1EF}\u{1F1F5}\u{1F1FA}\u{1F1F8}";
        let s = GCStr::from_text(flags, None);
        assert_eq!(s.len(), 2);
        assert_eq!(breaks(flags, &Options::default()), vec![1]);
    }

    #[test]
    fn test_flags_override_rules() {
        let mut s = GCStr::from_text("abc d", None);
        s.set_flag(1, ClusterFlags::ALLOW_BEFORE);
        s.set_flag(4, ClusterFlags::PROHIBIT_BEFORE);
        let actions = break_actions(&s, &Options::default());
        assert_eq!(actions[1], BreakAction::Allowed);
        assert_eq!(actions[4], BreakAction::Prohibited);
    }

    #[test]
    fn test_flags_never_cancel_mandatory() {
        let mut s = GCStr::from_text("a\nb", None);
        s.set_flag(2, ClusterFlags::PROHIBIT_BEFORE);
        assert_eq!(break_actions(&s, &Options::default())[2], BreakAction::Mandatory);
    }

    #[test]
    fn test_ambiguous_resolution() {
        assert_eq!(resolve(LineBreakClass::AI, false), LineBreakClass::AL);
        assert_eq!(resolve(LineBreakClass::AI, true), LineBreakClass::ID);
        assert_eq!(resolve(LineBreakClass::CJ, false), LineBreakClass::NS);
        assert_eq!(resolve(LineBreakClass::SA, true), LineBreakClass::AL);
    }

    #[test]
    fn test_context_free_of_handle() {
        let lb = LineBreak::new();
        let s = GCStr::from_text("a b", Some(&lb));
        assert_eq!(break_actions(&s, &lb.options()).len(), 3);
    }
}
