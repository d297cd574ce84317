//! Invocation of host callbacks from inside a wrap.
//!
//! Every call holds an extra handle on the context for its duration, so a
//! hook dropping the last host handle cannot tear the context down under
//! the running wrap. Failures are recorded in the context's pending slot
//! (first error wins) before they propagate.

use crate::error::{Error, HookKind, HookResult, Result};
use crate::gcstr::{ClusterFlags, GCStr};
use crate::linebreak::LineBreak;
use crate::linebreak::hooks::{Fragment, HookReturn, SizingMode};
use crate::linebreak::options::Options;
use tracing::{debug, trace};

/// How a multi-fragment callback result is flagged when merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MergeRule {
    /// Fragment starts after the first allow a break; every other
    /// cluster prohibits one.
    Prep,
    /// Every fragment start allows a break.
    Urgent,
}

/// Context handle plus the option snapshot of the running wrap.
pub(crate) struct Bridge<'a> {
    ctx: &'a LineBreak,
    opts: &'a Options,
}

impl<'a> Bridge<'a> {
    pub(crate) fn new(ctx: &'a LineBreak, opts: &'a Options) -> Self {
        Self { ctx, opts }
    }

    pub(crate) fn options(&self) -> &'a Options {
        self.opts
    }

    /// Run a host callback with the context pinned.
    pub(crate) fn call<T>(
        &self,
        hook: HookKind,
        f: impl FnOnce(&LineBreak) -> HookResult<T>,
    ) -> Result<T> {
        let pinned = self.ctx.clone();
        trace!(
            hook = hook.name(),
            handles = pinned.handle_count(),
            "entering hook"
        );
        let result = f(&pinned);
        drop(pinned);
        trace!(hook = hook.name(), ok = result.is_ok(), "left hook");

        result.map_err(|source| {
            let err = Error::hook(hook, source);
            debug!(error = %err, "hook failed");
            self.ctx.record(&err);
            err
        })
    }

    /// Classify codepoints with the running options.
    pub(crate) fn classify(&self, text: Vec<u32>) -> GCStr {
        GCStr::classified(text, self.opts, Some(self.ctx.downgrade()))
    }

    pub(crate) fn gcstr(&self, text: &str) -> GCStr {
        self.classify(text.chars().map(u32::from).collect())
    }

    pub(crate) fn fragment(&self, fragment: Fragment) -> GCStr {
        match fragment {
            Fragment::Text(text) => self.gcstr(&text),
            Fragment::Gc(gcstr) => gcstr,
        }
    }

    /// Flatten a callback result. `Unchanged` yields `None`.
    pub(crate) fn merge(&self, ret: HookReturn, rule: MergeRule) -> Option<GCStr> {
        let parts: Vec<GCStr> = match ret {
            HookReturn::Unchanged => return None,
            HookReturn::One(fragment) => {
                let mut gcstr = self.fragment(fragment);
                if rule == MergeRule::Prep {
                    for i in 1..gcstr.len() {
                        gcstr.pin_flag(i, ClusterFlags::PROHIBIT_BEFORE);
                    }
                }
                return Some(gcstr);
            }
            HookReturn::Many(items) => items
                .into_iter()
                .flatten()
                .map(|fragment| self.fragment(fragment))
                .filter(|gcstr| !gcstr.is_empty())
                .collect(),
        };

        let mut merged = GCStr::default();
        for (k, mut part) in parts.into_iter().enumerate() {
            if rule == MergeRule::Urgent || k > 0 {
                part.pin_flag(0, ClusterFlags::ALLOW_BEFORE);
            }
            if rule == MergeRule::Prep {
                for i in 1..part.len() {
                    part.pin_flag(i, ClusterFlags::PROHIBIT_BEFORE);
                }
            }
            merged.append(&part);
        }
        Some(merged)
    }

    /// Width of `pre` + `spc` + `text` given `len` for `pre`.
    pub(crate) fn sizing(&self, len: f64, pre: &GCStr, spc: &GCStr, text: &GCStr) -> Result<f64> {
        let cols = |g: &GCStr| g.columns() as f64;
        let count = |g: &GCStr| g.len() as f64;
        match self.opts.sizing() {
            SizingMode::None => Ok(len + count(spc) + count(text)),
            SizingMode::Uax11 => Ok(len + cols(spc) + cols(text)),
            SizingMode::Custom(f) => {
                let width = self.call(HookKind::Sizing, |lb| f(lb, len, pre, spc, text))?;
                if width.is_nan() || width < 0.0 {
                    trace!(width, "sizing fell back to cluster count");
                    Ok(len + count(spc) + count(text))
                } else {
                    Ok(width)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linebreak::hooks::SizingMode;
    use std::cell::Cell;
    use std::rc::Rc;

    fn flags(g: &GCStr) -> Vec<u8> {
        (0..g.len()).filter_map(|i| g.flag(i)).map(|f| f.bits()).collect()
    }

    #[test]
    fn test_prep_merge_flags() {
        let lb = LineBreak::new();
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let merged = bridge
            .merge(HookReturn::from(vec!["X", "YY", "Z"]), MergeRule::Prep)
            .unwrap();
        assert_eq!(merged, "XYYZ");
        assert_eq!(flags(&merged), vec![0, 2, 1, 2]);
    }

    #[test]
    fn test_merge_keeps_explicit_flags() {
        let lb = LineBreak::new();
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let mut first = GCStr::from_text("ab", None);
        first.set_flag(1, ClusterFlags::ALLOW_BEFORE);
        let mut second = GCStr::from_text("c", None);
        second.set_flag(0, ClusterFlags::PROHIBIT_BEFORE);
        let ret = HookReturn::Many(vec![Some(first.into()), None, Some(second.into())]);
        let merged = bridge.merge(ret, MergeRule::Prep).unwrap();
        assert_eq!(flags(&merged), vec![0, 2, 1]);
    }

    #[test]
    fn test_urgent_merge_flags() {
        let lb = LineBreak::new();
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let merged = bridge
            .merge(HookReturn::from(vec!["ab", "", "cd"]), MergeRule::Urgent)
            .unwrap();
        assert_eq!(flags(&merged), vec![2, 0, 2, 0]);
        assert!(bridge.merge(HookReturn::Unchanged, MergeRule::Urgent).is_none());
    }

    #[test]
    fn test_single_prep_result_is_unbreakable() {
        let lb = LineBreak::new();
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let merged = bridge
            .merge(HookReturn::One("abc".into()), MergeRule::Prep)
            .unwrap();
        assert_eq!(flags(&merged), vec![0, 1, 1]);
    }

    #[test]
    fn test_negative_sizing_falls_back() {
        let lb = LineBreak::new();
        lb.set_sizing(SizingMode::custom(|_, _, _, _, _| Ok(-1.0)));
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let pre = GCStr::from_text("ab", None);
        let spc = GCStr::from_text(" ", None);
        let text = GCStr::from_text("漢字x", None);
        let width = bridge.sizing(2.0, &pre, &spc, &text).unwrap();
        assert!((width - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hook_holds_context() {
        let lb = LineBreak::new();
        let seen = Rc::new(Cell::new(0));
        let seen_in_hook = Rc::clone(&seen);
        lb.set_sizing(SizingMode::custom(move |ctx, _, _, _, _| {
            seen_in_hook.set(ctx.handle_count());
            Ok(1.0)
        }));
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let empty = GCStr::default();
        bridge.sizing(0.0, &empty, &empty, &empty).unwrap();
        assert_eq!(seen.get(), 2);
        assert_eq!(lb.handle_count(), 1);
    }

    #[test]
    fn test_failure_recorded_first_wins() {
        let lb = LineBreak::new();
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let first: Result<()> = bridge.call(HookKind::Prep, |_| Err("first".into()));
        let second: Result<()> = bridge.call(HookKind::Urgent, |_| Err("second".into()));
        assert!(first.is_err() && second.is_err());
        let pending = lb.pending_error().unwrap();
        assert!(pending.to_string().contains("first"));
    }
}
