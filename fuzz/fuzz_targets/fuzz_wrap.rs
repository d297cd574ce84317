//! Fuzz target for the wrap pipeline.
//!
//! Arbitrary text and limits must never panic, and unformatted output must
//! reproduce the input exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textseg::{BreakFlags, LineBreak, SizingMode, UrgentMode};

#[derive(Arbitrary, Debug)]
struct Input {
    text: String,
    width: u8,
    charmax: u8,
    minwidth: u8,
    columns: bool,
    force: bool,
    flags: u8,
}

fuzz_target!(|input: Input| {
    let lb = LineBreak::new();
    let _ = lb.set_width(f64::from(input.width));
    let _ = lb.set_minwidth(f64::from(input.minwidth));
    lb.set_charmax(usize::from(input.charmax));
    if input.columns {
        lb.set_sizing(SizingMode::Uax11);
    }
    if input.force {
        lb.set_urgent(UrgentMode::Force);
    }
    for (_, flag) in BreakFlags::NAMES {
        lb.set_flag(flag, input.flags & flag.bits() != 0);
    }

    let lines = lb.wrap(&input.text).expect("no hooks configured");
    let joined: String = lines.iter().map(ToString::to_string).collect();
    assert_eq!(joined, input.text);
});
