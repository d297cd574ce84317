//! Line breaking engine.
//!
//! A [`LineBreak`] is a cheap, clonable handle on one engine context: its
//! [`Options`], the host [`Stash`] and the pending-error slot. Clones share
//! the context; [`LineBreak::duplicate`] makes an independent copy.
//!
//! Hooks receive the context they run under and may reconfigure it. A wrap
//! works on a snapshot of the options taken when it starts, so changes made
//! from inside a hook apply to the next wrap only.
//!
//! # Examples
//!
//! ```
//! use textseg::{LineBreak, UrgentMode};
//!
//! let lb = LineBreak::new();
//! lb.set_width(10.0)?;
//! lb.set_urgent(UrgentMode::Force);
//! let lines: Vec<String> = lb
//!     .wrap("Antidisestablishment")?
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(lines, ["Antidisest", "ablishment"]);
//! # Ok::<(), textseg::Error>(())
//! ```

mod bridge;
mod format;
pub mod hooks;
pub mod options;
mod prep;
pub mod rules;
pub mod stash;
pub mod tailor;
mod urgent;
mod wrap;

pub use hooks::{
    FormatFn, FormatMode, Fragment, HookReturn, PrepEntry, PrepFn, SizingFn, SizingMode, State,
    UrgentFn, UrgentMode,
};
pub use options::{BreakFlags, OptionValue, Options};
pub use prep::RegexLocator;
pub use rules::BreakAction;
pub use stash::{Stash, StashValue};
pub use tailor::{TailorKey, TailoringMap};

use crate::error::{Error, Result};
use crate::gcstr::GCStr;
use crate::unicode::{Codepoint, CodepointBuf, EastAsianWidth, LineBreakClass};
use bridge::Bridge;
use options::{check_charmax, check_columns};
use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// State behind every handle on one context.
#[derive(Default)]
pub(crate) struct Shared {
    options: RefCell<Options>,
    stash: RefCell<Stash>,
    pending: RefCell<Option<Error>>,
    /// Wraps currently running on this context.
    depth: Cell<usize>,
}

/// Handle on a line breaking context.
#[derive(Clone, Default)]
pub struct LineBreak {
    inner: Rc<Shared>,
}

impl From<Options> for LineBreak {
    fn from(options: Options) -> Self {
        Self {
            inner: Rc::new(Shared {
                options: RefCell::new(options),
                ..Shared::default()
            }),
        }
    }
}

impl LineBreak {
    /// Context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context configured by keyword options, applied in order.
    ///
    /// Fails on the first rejected option.
    pub fn with_options<'k, I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'k str, OptionValue)>,
    {
        let mut options = Options::default();
        for (name, value) in items {
            options.apply(name, value)?;
        }
        Ok(Self::from(options))
    }

    /// Independent context with a copy of the options and the stash.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            inner: Rc::new(Shared {
                options: RefCell::new(self.options()),
                stash: RefCell::new(self.inner.stash.borrow().clone()),
                ..Shared::default()
            }),
        }
    }

    /// Number of live handles on this context.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// True when both handles refer to the same context.
    #[must_use]
    pub fn same_context(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn options_ref(&self) -> Ref<'_, Options> {
        self.inner.options.borrow()
    }

    /// Record a failure unless one is already pending.
    pub(crate) fn record(&self, err: &Error) {
        let mut pending = self.inner.pending.borrow_mut();
        if pending.is_none() {
            *pending = Some(err.clone());
        }
    }

    /// Snapshot of the current options.
    #[must_use]
    pub fn options(&self) -> Options {
        self.inner.options.borrow().clone()
    }

    /// First failure recorded by the last wrap, if it failed.
    #[must_use]
    pub fn pending_error(&self) -> Option<Error> {
        self.inner.pending.borrow().clone()
    }

    fn update<T>(&self, f: impl FnOnce(&mut Options) -> T) -> T {
        f(&mut self.inner.options.borrow_mut())
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Set one option by name. On error the option keeps its old value.
    pub fn set_option(&self, name: &str, value: OptionValue) -> Result<()> {
        let mut staged = self.options();
        match staged.apply(name, value) {
            Ok(()) => {
                *self.inner.options.borrow_mut() = staged;
                Ok(())
            }
            Err(err) => {
                warn!(option = name, error = %err, "option rejected");
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn charmax(&self) -> usize {
        self.options_ref().charmax()
    }

    pub fn set_charmax(&self, charmax: usize) {
        self.update(|o| o.charmax = charmax);
    }

    /// Set the character cap from a signed value; negative is rejected.
    pub fn set_charmax_checked(&self, charmax: i64) -> Result<()> {
        let charmax = check_charmax(charmax)?;
        self.set_charmax(charmax);
        Ok(())
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.options_ref().width()
    }

    /// Set the maximum line width; 0 means unlimited.
    pub fn set_width(&self, width: f64) -> Result<()> {
        let width = check_columns("width", width)?;
        self.update(|o| o.colmax = width);
        Ok(())
    }

    #[must_use]
    pub fn minwidth(&self) -> f64 {
        self.options_ref().minwidth()
    }

    pub fn set_minwidth(&self, minwidth: f64) -> Result<()> {
        let minwidth = check_columns("minwidth", minwidth)?;
        self.update(|o| o.colmin = minwidth);
        Ok(())
    }

    #[must_use]
    pub fn flag(&self, flag: BreakFlags) -> bool {
        self.options_ref().has(flag)
    }

    pub fn set_flag(&self, flag: BreakFlags, on: bool) {
        self.update(|o| o.flags.set(flag, on));
    }

    /// The newline sequence as text.
    #[must_use]
    pub fn newline(&self) -> String {
        CodepointBuf::from_vec(self.options_ref().newline().to_vec()).to_string_lossy()
    }

    pub fn set_newline(&self, newline: &str) {
        self.set_newline_codepoints(newline.chars().map(u32::from).collect());
    }

    pub fn set_newline_codepoints(&self, newline: Vec<Codepoint>) {
        self.update(|o| o.newline = newline);
    }

    #[must_use]
    pub fn format(&self) -> FormatMode {
        self.options_ref().format().clone()
    }

    pub fn set_format(&self, format: FormatMode) {
        self.update(|o| o.format = format);
    }

    #[must_use]
    pub fn sizing(&self) -> SizingMode {
        self.options_ref().sizing().clone()
    }

    pub fn set_sizing(&self, sizing: SizingMode) {
        self.update(|o| o.sizing = sizing);
    }

    #[must_use]
    pub fn urgent(&self) -> UrgentMode {
        self.options_ref().urgent().clone()
    }

    pub fn set_urgent(&self, urgent: UrgentMode) {
        self.update(|o| o.urgent = urgent);
    }

    #[must_use]
    pub fn prep(&self) -> Vec<PrepEntry> {
        self.options_ref().prep().to_vec()
    }

    /// Replace the prep pipeline. An empty list clears it.
    pub fn set_prep(&self, entries: Vec<PrepEntry>) {
        self.update(|o| o.prep = entries);
    }

    pub fn add_prep(&self, entry: PrepEntry) {
        self.update(|o| o.prep.push(entry));
    }

    /// Line breaking class overrides, one entry per codepoint.
    #[must_use]
    pub fn lbc_map(&self) -> BTreeMap<Codepoint, LineBreakClass> {
        self.options_ref().lbc_map().to_map()
    }

    /// Add line breaking class overrides. Nothing is applied on error.
    pub fn update_lbc<I, K>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, LineBreakClass)>,
        K: Into<TailorKey>,
    {
        let items: Vec<_> = items.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.update(|o| o.lbc_map.extend_checked(items))
    }

    pub fn clear_lbc(&self) {
        self.update(|o| o.lbc_map.clear());
    }

    /// East Asian width overrides, one entry per codepoint.
    #[must_use]
    pub fn eaw_map(&self) -> BTreeMap<Codepoint, EastAsianWidth> {
        self.options_ref().eaw_map().to_map()
    }

    /// Add East Asian width overrides. Nothing is applied on error.
    pub fn update_eaw<I, K>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, EastAsianWidth)>,
        K: Into<TailorKey>,
    {
        let items: Vec<_> = items.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.update(|o| o.eaw_map.extend_checked(items))
    }

    pub fn clear_eaw(&self) {
        self.update(|o| o.eaw_map.clear());
    }

    // ------------------------------------------------------------------
    // Stash
    // ------------------------------------------------------------------

    #[must_use]
    pub fn stash_get(&self, key: &str) -> Option<StashValue> {
        self.inner.stash.borrow().get(key)
    }

    /// Stash value downcast to `T`.
    #[must_use]
    pub fn stash_get_as<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        self.inner.stash.borrow().get_as(key)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn stash_insert<T: Any>(&self, key: impl Into<String>, value: T) -> Option<StashValue> {
        self.inner.stash.borrow_mut().insert(key, Rc::new(value))
    }

    pub fn stash_remove(&self, key: &str) -> Option<StashValue> {
        self.inner.stash.borrow_mut().remove(key)
    }

    #[must_use]
    pub fn stash_contains(&self, key: &str) -> bool {
        self.inner.stash.borrow().contains_key(key)
    }

    #[must_use]
    pub fn stash_len(&self) -> usize {
        self.inner.stash.borrow().len()
    }

    #[must_use]
    pub fn stash_keys(&self) -> Vec<String> {
        self.inner.stash.borrow().keys().map(str::to_owned).collect()
    }

    pub fn stash_clear(&self) {
        self.inner.stash.borrow_mut().clear();
    }

    // ------------------------------------------------------------------
    // Wrapping
    // ------------------------------------------------------------------

    /// Break `text` into formatted lines.
    ///
    /// Empty input yields no lines. On failure no lines are returned and
    /// the first recorded cause is reported.
    pub fn wrap(&self, text: &str) -> Result<Vec<GCStr>> {
        self.run(CodepointBuf::from_str(text)?.into_vec())
    }

    /// [`LineBreak::wrap`] over UTF-16 code units.
    pub fn wrap_utf16(&self, units: &[u16]) -> Result<Vec<GCStr>> {
        self.run(CodepointBuf::from_utf16(units)?.into_vec())
    }

    /// [`LineBreak::wrap`] over a codepoint buffer.
    pub fn wrap_codepoints(&self, buf: &CodepointBuf) -> Result<Vec<GCStr>> {
        self.run(buf.as_slice().to_vec())
    }

    fn run(&self, text: Vec<Codepoint>) -> Result<Vec<GCStr>> {
        let depth = self.inner.depth.get();
        if depth == 0 {
            self.inner.pending.borrow_mut().take();
        }
        self.inner.depth.set(depth + 1);
        let result = self.run_snapshot(text);
        self.inner.depth.set(depth);

        match result {
            Ok(lines) => Ok(lines),
            Err(err) => {
                self.record(&err);
                let first = if depth == 0 {
                    self.pending_error().unwrap_or(err)
                } else {
                    err
                };
                debug!(error = %first, "wrap failed");
                Err(first)
            }
        }
    }

    fn run_snapshot(&self, text: Vec<Codepoint>) -> Result<Vec<GCStr>> {
        let options = self.options();
        let chars = text.len();
        let gcstr = GCStr::classified(text, &options, Some(self.downgrade()));
        debug!(chars, clusters = gcstr.len(), "wrap");
        let bridge = Bridge::new(self, &options);
        let lines = wrap::wrap(&bridge, gcstr)?;
        debug!(lines = lines.len(), "wrap finished");
        Ok(lines)
    }
}

impl fmt::Debug for LineBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBreak")
            .field("options", &*self.options_ref())
            .field("stash", &*self.inner.stash.borrow())
            .field("handles", &self.handle_count())
            .finish()
    }
}

impl PartialEq for LineBreak {
    fn eq(&self, other: &Self) -> bool {
        self.same_context(other)
    }
}
