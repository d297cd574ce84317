//! Line filling: from classified text to formatted lines.

use crate::error::Result;
use crate::gcstr::GCStr;
use crate::linebreak::bridge::Bridge;
use crate::linebreak::format::format_part;
use crate::linebreak::hooks::State;
use crate::linebreak::rules::{BreakAction, break_actions, resolve};
use crate::linebreak::urgent::urgent_break;
use crate::linebreak::{options::BreakFlags, prep};
use crate::unicode::LineBreakClass;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Unbreakable run of clusters with its trailing spaces and break.
#[derive(Clone, Debug)]
struct Chunk {
    body: GCStr,
    spc: GCStr,
    /// A mandatory break follows.
    mandatory: bool,
    /// Already split by urgent breaking.
    urgent_done: bool,
}

impl Chunk {
    fn piece(body: GCStr) -> Self {
        Self {
            body,
            spc: GCStr::default(),
            mandatory: false,
            urgent_done: true,
        }
    }
}

/// Cut `text` at every break opportunity.
fn chunks(text: &GCStr, actions: &[BreakAction], eastasian: bool) -> VecDeque<Chunk> {
    let mut out = VecDeque::new();
    let mut start = 0;
    for end in 1..=text.len() {
        let action = actions.get(end).copied();
        if end < text.len() && !action.is_some_and(BreakAction::is_break) {
            continue;
        }
        let trailing = text.clusters()[start..end]
            .iter()
            .rev()
            .take_while(|c| {
                let lbc = resolve(c.lbc(), eastasian);
                lbc == LineBreakClass::SP || lbc.is_mandatory_break()
            })
            .count();
        let split = end - trailing;
        let mandatory = match action {
            Some(a) => a == BreakAction::Mandatory,
            None => text.clusters()[end - 1].lbc().is_mandatory_break(),
        };
        out.push_back(Chunk {
            body: text.substr(start..split),
            spc: text.substr(split..end),
            mandatory,
            urgent_done: false,
        });
        start = end;
    }
    out
}

/// Lines before formatting.
struct Filler<'b, 'a> {
    bridge: &'b Bridge<'a>,
    lines: Vec<GCStr>,
    body: GCStr,
    spc: GCStr,
    len: f64,
    state: State,
}

impl<'b, 'a> Filler<'b, 'a> {
    fn new(bridge: &'b Bridge<'a>) -> Self {
        Self {
            bridge,
            lines: Vec::new(),
            body: GCStr::default(),
            spc: GCStr::default(),
            len: 0.0,
            state: State::Sot,
        }
    }

    fn is_empty(&self) -> bool {
        self.body.is_empty() && self.spc.is_empty()
    }

    fn exceeds(&self, width: f64, chars: usize) -> bool {
        let opts = self.bridge.options();
        (opts.width() > 0.0 && width > opts.width())
            || (opts.charmax() > 0 && chars > opts.charmax())
    }

    /// Measure `frag` appended to the current line.
    fn measure(&self, frag: &Chunk) -> Result<(f64, usize)> {
        let width = self
            .bridge
            .sizing(self.len, &self.body, &self.spc, &frag.body)?;
        let chars = self.body.chars() + self.spc.chars() + frag.body.chars();
        Ok((width, chars))
    }

    fn push(&mut self, frag: Chunk, width: f64) {
        self.body.append(&self.spc);
        self.body.append(&frag.body);
        self.spc = frag.spc;
        self.len = width;
    }

    /// Format and store the current line.
    fn emit(&mut self, end: State) -> Result<()> {
        let body = std::mem::take(&mut self.body);
        let spc = std::mem::take(&mut self.spc);
        self.len = 0.0;
        let start = self.state;
        self.state = match end {
            State::Eol => State::Sol,
            _ => State::Sop,
        };

        let head = format_part(self.bridge, start, body)?;
        let tail = format_part(self.bridge, end, spc)?;
        if head.is_empty() && tail.is_empty() {
            trace!(%start, %end, "line suppressed by format");
            return Ok(());
        }
        self.lines.push(head.concat(&tail));
        Ok(())
    }

    /// Largest prefix of `frag` fitting on the current line.
    fn fitting_prefix(&self, frag: &Chunk) -> Result<usize> {
        let mut fit = 0;
        for n in 1..frag.body.len() {
            let prefix = frag.body.substr(0..n);
            let width = self.bridge.sizing(self.len, &self.body, &self.spc, &prefix)?;
            let chars = self.body.chars() + self.spc.chars() + prefix.chars();
            if self.exceeds(width, chars) {
                break;
            }
            fit = n;
        }
        Ok(fit)
    }
}

/// Split a fragment after its first `n` clusters.
fn split_front(frag: Chunk, n: usize) -> (Chunk, Chunk) {
    let head = Chunk::piece(frag.body.substr(0..n));
    let tail = Chunk {
        body: frag.body.substr(n..frag.body.len()),
        ..frag
    };
    (head, tail)
}

/// Pieces of at most `charmax` codepoints, at least one cluster each.
fn charmax_split(body: &GCStr, charmax: usize) -> Vec<GCStr> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < body.len() {
        let mut end = start;
        let mut chars = 0;
        while end < body.len() {
            let next = body.clusters()[end].chars();
            if end > start && chars + next > charmax {
                break;
            }
            chars += next;
            end += 1;
        }
        pieces.push(body.substr(start..end));
        start = end;
    }
    pieces
}

/// Re-queue `pieces` in place of `frag`; the last piece keeps its trailer.
fn requeue(queue: &mut VecDeque<Chunk>, frag: Chunk, pieces: Vec<GCStr>) {
    let count = pieces.len();
    for (k, body) in pieces.into_iter().enumerate().rev() {
        let piece = if k + 1 == count {
            Chunk {
                body,
                urgent_done: true,
                ..frag.clone()
            }
        } else {
            Chunk::piece(body)
        };
        queue.push_front(piece);
    }
}

/// Break and format `text` into lines.
pub(crate) fn wrap(bridge: &Bridge<'_>, text: GCStr) -> Result<Vec<GCStr>> {
    let opts = bridge.options();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let text = prep::apply(bridge, text)?;
    let actions = break_actions(&text, opts);
    let mut queue = chunks(&text, &actions, opts.has(BreakFlags::EASTASIAN_CONTEXT));
    debug!(chunks = queue.len(), "wrapping");

    let mut filler = Filler::new(bridge);
    while let Some(frag) = queue.pop_front() {
        let (width, chars) = filler.measure(&frag)?;

        if !filler.is_empty() && filler.exceeds(width, chars) {
            // Fill short lines up to the minimum width.
            if opts.minwidth() > 0.0 && filler.len < opts.minwidth() && frag.body.len() > 1 {
                let fit = filler.fitting_prefix(&frag)?;
                if fit > 0 {
                    let (head, tail) = split_front(frag, fit);
                    let (w, _) = filler.measure(&head)?;
                    filler.push(head, w);
                    queue.push_front(tail);
                    filler.emit(State::Eol)?;
                    continue;
                }
            }
            filler.emit(State::Eol)?;
            queue.push_front(frag);
            continue;
        }

        if filler.is_empty() {
            if !frag.urgent_done && opts.width() > 0.0 && width > opts.width() {
                debug!(width, limit = opts.width(), "urgent break");
                if let Some(pieces) = urgent_break(bridge, &frag.body, width)? {
                    requeue(&mut queue, frag, pieces);
                    continue;
                }
            }
            // The character limit is a hard cap.
            if opts.charmax() > 0 && chars > opts.charmax() && frag.body.len() > 1 {
                let pieces = charmax_split(&frag.body, opts.charmax());
                requeue(&mut queue, frag, pieces);
                continue;
            }
        }

        let mandatory = frag.mandatory;
        filler.push(frag, width);
        if mandatory {
            let end = if queue.is_empty() {
                State::Eot
            } else {
                State::Eop
            };
            filler.emit(end)?;
        }
    }
    if !filler.is_empty() {
        filler.emit(State::Eot)?;
    }
    Ok(filler.lines)
}
