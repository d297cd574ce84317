//! Extension point slots: builtin modes or host callbacks.
//!
//! Each slot is a closed sum type. Builtin modes parse from their
//! case-insensitive names (`"SIMPLE"`, `"UAX11"`, `"FORCE"`, ...), custom
//! slots hold a reference-counted closure; anything the callback needs
//! beyond its arguments is captured by the closure itself.

use crate::error::{Error, HookResult, Result};
use crate::gcstr::GCStr;
use crate::linebreak::LineBreak;
use regex::Regex;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Custom format callback: `(context, state, line part) -> replacement`.
///
/// `Ok(None)` keeps the part unchanged.
pub type FormatFn = Rc<dyn Fn(&LineBreak, State, GCStr) -> HookResult<Option<Fragment>>>;

/// Custom sizing callback: `(context, len, pre, spc, str) -> width`.
///
/// A negative result selects the default cluster-count sizing.
pub type SizingFn = Rc<dyn Fn(&LineBreak, f64, &GCStr, &GCStr, &GCStr) -> HookResult<f64>>;

/// Custom urgent callback: `(context, excessive fragment) -> pieces`.
pub type UrgentFn = Rc<dyn Fn(&LineBreak, GCStr) -> HookResult<HookReturn>>;

/// Prep transform callback: `(context, matched text) -> pieces`.
pub type PrepFn = Rc<dyn Fn(&LineBreak, &str) -> HookResult<HookReturn>>;

/// String-like or cluster string value crossing the hook boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    Text(String),
    Gc(GCStr),
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<GCStr> for Fragment {
    fn from(gcstr: GCStr) -> Self {
        Self::Gc(gcstr)
    }
}

/// Result shape shared by prep and urgent callbacks.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HookReturn {
    /// Keep the input as it is.
    #[default]
    Unchanged,
    /// Replace the input wholly.
    One(Fragment),
    /// Replace the input by a sequence of fragments; `None` items are skipped.
    Many(Vec<Option<Fragment>>),
}

impl From<Fragment> for HookReturn {
    fn from(fragment: Fragment) -> Self {
        Self::One(fragment)
    }
}

impl<T: Into<Fragment>> From<Vec<T>> for HookReturn {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items.into_iter().map(|item| Some(item.into())).collect())
    }
}

/// Position of a line part handed to the format hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Start of text.
    Sot,
    /// Start of paragraph.
    Sop,
    /// Start of line.
    Sol,
    /// Interior, no particular position.
    Line,
    /// End of line.
    Eol,
    /// End of paragraph.
    Eop,
    /// End of text.
    Eot,
}

impl State {
    /// Tag string passed to hosts.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Sot => "sot",
            Self::Sop => "sop",
            Self::Sol => "sol",
            Self::Line => "",
            Self::Eol => "eol",
            Self::Eop => "eop",
            Self::Eot => "eot",
        }
    }

    /// True for the states describing the start of a line.
    #[must_use]
    pub fn is_start(self) -> bool {
        matches!(self, Self::Sot | Self::Sop | Self::Sol)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Output formatting of each line.
#[derive(Clone, Default)]
pub enum FormatMode {
    /// Lines are returned as broken.
    #[default]
    None,
    /// Append the newline sequence to lines broken arbitrarily.
    Simple,
    /// Replace every break by the newline sequence and strip trailing spaces.
    Newline,
    /// Like `Simple`, also stripping spaces before breaks.
    Trim,
    Custom(FormatFn),
}

/// Measurement of candidate lines.
#[derive(Clone, Default)]
pub enum SizingMode {
    /// Count grapheme clusters.
    #[default]
    None,
    /// Sum East Asian Width columns.
    Uax11,
    Custom(SizingFn),
}

/// Handling of fragments longer than the limits allow.
#[derive(Clone, Default)]
pub enum UrgentMode {
    /// Leave them unbroken.
    #[default]
    None,
    /// Split them at cluster boundaries.
    Force,
    /// Fail the wrap with [`Error::Overflow`].
    Raise,
    Custom(UrgentFn),
}

/// One entry of the prep pipeline.
#[derive(Clone)]
pub enum PrepEntry {
    /// Builtin URI handling; `breaking` allows breaks at CMOS positions.
    Uri { breaking: bool },
    /// Matches of `regex` are replaced by the result of `transform`.
    Pattern {
        regex: Regex,
        transform: Option<PrepFn>,
    },
}

impl PrepEntry {
    /// Pattern entry compiled from a pattern string.
    pub fn pattern(pattern: &str, transform: Option<PrepFn>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::value(format!("invalid prep pattern: {e}")))?;
        Ok(Self::Pattern { regex, transform })
    }

    /// Pattern entry from a plain closure.
    pub fn with_fn<F>(pattern: &str, transform: F) -> Result<Self>
    where
        F: Fn(&LineBreak, &str) -> HookResult<HookReturn> + 'static,
    {
        Self::pattern(pattern, Some(Rc::new(transform)))
    }
}

fn unknown(kind: &str, name: &str) -> Error {
    Error::value(format!("unknown {kind} behavior {name}"))
}

impl FromStr for FormatMode {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SIMPLE" => Ok(Self::Simple),
            "NEWLINE" => Ok(Self::Newline),
            "TRIM" => Ok(Self::Trim),
            _ => Err(unknown("Format", name)),
        }
    }
}

impl FromStr for SizingMode {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UAX11" => Ok(Self::Uax11),
            _ => Err(unknown("Sizing", name)),
        }
    }
}

impl FromStr for UrgentMode {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FORCE" => Ok(Self::Force),
            "RAISE" => Ok(Self::Raise),
            _ => Err(unknown("Urgent", name)),
        }
    }
}

impl FromStr for PrepEntry {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BREAKURI" => Ok(Self::Uri { breaking: true }),
            "NONBREAKURI" => Ok(Self::Uri { breaking: false }),
            _ => Err(unknown("Prep", name)),
        }
    }
}

impl FormatMode {
    /// Builtin name, `None` for unset and custom slots.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Simple => Some("SIMPLE"),
            Self::Newline => Some("NEWLINE"),
            Self::Trim => Some("TRIM"),
            Self::None | Self::Custom(_) => None,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&LineBreak, State, GCStr) -> HookResult<Option<Fragment>> + 'static,
    {
        Self::Custom(Rc::new(f))
    }
}

impl SizingMode {
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Uax11 => Some("UAX11"),
            Self::None | Self::Custom(_) => None,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&LineBreak, f64, &GCStr, &GCStr, &GCStr) -> HookResult<f64> + 'static,
    {
        Self::Custom(Rc::new(f))
    }
}

impl UrgentMode {
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Force => Some("FORCE"),
            Self::Raise => Some("RAISE"),
            Self::None | Self::Custom(_) => None,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&LineBreak, GCStr) -> HookResult<HookReturn> + 'static,
    {
        Self::Custom(Rc::new(f))
    }
}

impl fmt::Debug for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name().unwrap_or_default()),
        }
    }
}

impl fmt::Debug for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Uax11 => f.write_str("UAX11"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for UrgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name().unwrap_or_default()),
        }
    }
}

impl fmt::Debug for PrepEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri { breaking: true } => f.write_str("BREAKURI"),
            Self::Uri { breaking: false } => f.write_str("NONBREAKURI"),
            Self::Pattern { regex, transform } => f
                .debug_struct("Pattern")
                .field("regex", &regex.as_str())
                .field("transform", &transform.as_ref().map(|_| ".."))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_case_insensitive() {
        assert_eq!("simple".parse::<FormatMode>().unwrap().name(), Some("SIMPLE"));
        assert_eq!("NewLine".parse::<FormatMode>().unwrap().name(), Some("NEWLINE"));
        assert_eq!("uax11".parse::<SizingMode>().unwrap().name(), Some("UAX11"));
        assert_eq!("Force".parse::<UrgentMode>().unwrap().name(), Some("FORCE"));
        assert!(matches!(
            "nonbreakuri".parse::<PrepEntry>().unwrap(),
            PrepEntry::Uri { breaking: false }
        ));
    }

    #[test]
    fn test_unknown_mode_is_value_error() {
        assert!(matches!("wrap".parse::<FormatMode>(), Err(Error::Value(_))));
        assert!(matches!("".parse::<SizingMode>(), Err(Error::Value(_))));
        assert!(matches!("panic".parse::<UrgentMode>(), Err(Error::Value(_))));
        assert!(matches!("uri".parse::<PrepEntry>(), Err(Error::Value(_))));
        let err = "wrap".parse::<FormatMode>().unwrap_err();
        assert!(err.to_string().contains("unknown Format behavior wrap"));
    }

    #[test]
    fn test_state_tags() {
        assert_eq!(State::Sot.tag(), "sot");
        assert_eq!(State::Line.tag(), "");
        assert_eq!(State::Eop.to_string(), "eop");
        assert!(State::Sol.is_start());
        assert!(!State::Eol.is_start());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(PrepEntry::pattern("(", None), Err(Error::Value(_))));
    }

    #[test]
    fn test_hook_return_from_vec() {
        let ret = HookReturn::from(vec!["a", "b"]);
        let HookReturn::Many(items) = ret else {
            panic!("expected Many");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Some(Fragment::from("b")));
    }
}
