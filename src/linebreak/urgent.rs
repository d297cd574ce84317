//! Breaking of fragments that exceed the line limits on their own.

use crate::error::{Error, HookKind, Result};
use crate::gcstr::{ClusterFlags, GCStr};
use crate::linebreak::bridge::{Bridge, MergeRule};
use crate::linebreak::hooks::UrgentMode;
use tracing::debug;

/// Greedy split of `text` into pieces measuring at most `limit`.
///
/// Each piece holds at least one cluster.
pub(crate) fn force_split(bridge: &Bridge<'_>, text: &GCStr, limit: f64) -> Result<Vec<GCStr>> {
    let empty = GCStr::default();
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = start + 1;
        while end < text.len() {
            let candidate = text.substr(start..end + 1);
            if bridge.sizing(0.0, &empty, &empty, &candidate)? > limit {
                break;
            }
            end += 1;
        }
        pieces.push(text.substr(start..end));
        start = end;
    }
    Ok(pieces)
}

/// Split `text` before every cluster flagged `ALLOW_BEFORE`.
fn split_at_allowed(text: &GCStr) -> Vec<GCStr> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for i in 1..text.len() {
        if text
            .flag(i)
            .is_some_and(|f| f.contains(ClusterFlags::ALLOW_BEFORE))
        {
            pieces.push(text.substr(start..i));
            start = i;
        }
    }
    pieces.push(text.substr(start..text.len()));
    pieces
}

/// Apply the urgent mode to a fragment of measured `width`.
///
/// `None` leaves the fragment as it is.
pub(crate) fn urgent_break(
    bridge: &Bridge<'_>,
    text: &GCStr,
    width: f64,
) -> Result<Option<Vec<GCStr>>> {
    let limit = bridge.options().width();
    match bridge.options().urgent() {
        UrgentMode::None => Ok(None),
        UrgentMode::Raise => {
            debug!(width, limit, "excessive fragment");
            Err(Error::Overflow { width, limit })
        }
        UrgentMode::Force => force_split(bridge, text, limit).map(Some),
        UrgentMode::Custom(f) => {
            let copy = text.clone();
            let ret = bridge.call(HookKind::Urgent, |lb| f(lb, copy))?;
            Ok(bridge
                .merge(ret, MergeRule::Urgent)
                .map(|merged| split_at_allowed(&merged)))
        }
    }
}
