//! Line formatting: builtin modes and the custom hook.

use crate::error::{HookKind, Result};
use crate::gcstr::GCStr;
use crate::linebreak::bridge::Bridge;
use crate::linebreak::hooks::{FormatMode, State};
use crate::unicode::LineBreakClass;

/// Drop trailing spaces and breaks.
fn strip_trailing(part: &GCStr) -> GCStr {
    let keep = part
        .clusters()
        .iter()
        .rposition(|c| {
            let lbc = c.lbc();
            !(lbc == LineBreakClass::SP || lbc.is_mandatory_break())
        })
        .map_or(0, |i| i + 1);
    part.substr(0..keep)
}

/// Drop the spaces in front of the trailing breaks, keeping the breaks.
fn strip_spaces_before_break(part: &GCStr) -> GCStr {
    let clusters = part.clusters();
    let brk = clusters
        .iter()
        .rposition(|c| !c.lbc().is_mandatory_break())
        .map_or(0, |i| i + 1);
    let keep = clusters[..brk]
        .iter()
        .rposition(|c| c.lbc() != LineBreakClass::SP)
        .map_or(0, |i| i + 1);
    part.substr(0..keep).concat(&part.substr(brk..part.len()))
}

/// Format one part of a line: the body with its start state or the
/// trailing spaces and break with its end state.
pub(crate) fn format_part(bridge: &Bridge<'_>, state: State, part: GCStr) -> Result<GCStr> {
    let newline = || bridge.classify(bridge.options().newline().to_vec());

    let out = match bridge.options().format() {
        FormatMode::None => part,
        FormatMode::Simple => match state {
            State::Eol => part.concat(&newline()),
            _ => part,
        },
        FormatMode::Newline => match state {
            State::Eol | State::Eop | State::Eot => strip_trailing(&part).concat(&newline()),
            _ => part,
        },
        FormatMode::Trim => match state {
            State::Eol => strip_trailing(&part).concat(&newline()),
            State::Eop | State::Eot => strip_spaces_before_break(&part),
            _ => part,
        },
        FormatMode::Custom(f) => {
            let copy = part.clone();
            match bridge.call(HookKind::Format, |lb| f(lb, state, copy))? {
                Some(fragment) => bridge.fragment(fragment),
                None => part,
            }
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linebreak::LineBreak;
    use crate::linebreak::hooks::Fragment;

    fn run(lb: &LineBreak, state: State, text: &str) -> String {
        let opts = lb.options();
        let bridge = Bridge::new(lb, &opts);
        format_part(&bridge, state, GCStr::from_text(text, None))
            .unwrap()
            .to_string()
    }

    fn with_format(mode: &str) -> LineBreak {
        let lb = LineBreak::new();
        lb.set_option("format", mode.into()).unwrap();
        lb.set_newline("\n");
        lb
    }

    #[test]
    fn test_none_keeps_parts() {
        let lb = LineBreak::new();
        assert_eq!(run(&lb, State::Eol, "  "), "  ");
    }

    #[test]
    fn test_simple() {
        let lb = with_format("SIMPLE");
        assert_eq!(run(&lb, State::Eol, " "), " \n");
        assert_eq!(run(&lb, State::Eop, "\r\n"), "\r\n");
        assert_eq!(run(&lb, State::Sol, "ab"), "ab");
    }

    #[test]
    fn test_newline() {
        let lb = with_format("NEWLINE");
        assert_eq!(run(&lb, State::Eop, " \r\n"), "\n");
        assert_eq!(run(&lb, State::Eot, "  "), "\n");
        assert_eq!(run(&lb, State::Eol, " "), "\n");
    }

    #[test]
    fn test_trim() {
        let lb = with_format("TRIM");
        assert_eq!(run(&lb, State::Eol, "   "), "\n");
        assert_eq!(run(&lb, State::Eop, "  \n"), "\n");
        assert_eq!(run(&lb, State::Eot, "  "), "");
        assert_eq!(run(&lb, State::Eop, " \r\n"), "\r\n");
        assert_eq!(run(&lb, State::Eot, "\n"), "\n");
        assert_eq!(run(&lb, State::Sol, "a b"), "a b");
    }

    #[test]
    fn test_custom() {
        let lb = LineBreak::new();
        lb.set_format(FormatMode::custom(|_, state, part| {
            Ok(match state {
                State::Sot => Some(Fragment::from(format!("> {part}"))),
                State::Eot => Some(Fragment::from("")),
                _ => None,
            })
        }));
        assert_eq!(run(&lb, State::Sot, "ab"), "> ab");
        assert_eq!(run(&lb, State::Sol, "ab"), "ab");
        assert_eq!(run(&lb, State::Eot, "\n"), "");
    }

    #[test]
    fn test_custom_failure() {
        let lb = LineBreak::new();
        lb.set_format(FormatMode::custom(|_, _, _| Err("no".into())));
        let opts = lb.options();
        let bridge = Bridge::new(&lb, &opts);
        let err = format_part(&bridge, State::Sot, GCStr::default()).unwrap_err();
        assert!(err.is_hook_failure());
    }
}
