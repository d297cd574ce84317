//! Engine configuration.

use crate::error::{Error, Result};
use crate::linebreak::hooks::{FormatMode, PrepEntry, SizingMode, UrgentMode};
use crate::linebreak::tailor::{TailorKey, TailoringMap};
use crate::unicode::{Codepoint, EastAsianWidth, LineBreakClass, WidthMethod};
use bitflags::bitflags;

bitflags! {
    /// Boolean breaking options.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct BreakFlags: u8 {
        /// Always allow a break after a leading run of spaces.
        const BREAK_INDENT      = 0x01;
        /// Heuristic breaking of complex scripts.
        const COMPLEX_BREAKING  = 0x02;
        /// Ambiguous width characters are wide.
        const EASTASIAN_CONTEXT = 0x04;
        /// Hangul syllables and jamo break like alphabetics.
        const HANGUL_AS_AL      = 0x08;
        /// A space followed by combining marks is an isolated combining unit.
        const LEGACY_CM         = 0x10;
        /// No break between a virama and the following letter.
        const VIRAMA_AS_JOINER  = 0x20;
    }
}

impl BreakFlags {
    /// Keyword name of every single flag.
    pub const NAMES: [(&'static str, Self); 6] = [
        ("break_indent", Self::BREAK_INDENT),
        ("complex_breaking", Self::COMPLEX_BREAKING),
        ("eastasian_context", Self::EASTASIAN_CONTEXT),
        ("hangul_as_al", Self::HANGUL_AS_AL),
        ("legacy_cm", Self::LEGACY_CM),
        ("virama_as_joiner", Self::VIRAMA_AS_JOINER),
    ];

    /// Flag named by an option keyword such as `"legacy_cm"`.
    #[must_use]
    pub fn from_keyword(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, flag)| *flag)
    }
}

/// Full configuration of a breaking engine.
///
/// Numeric limits of 0 mean unlimited.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub(crate) charmax: usize,
    pub(crate) colmax: f64,
    pub(crate) colmin: f64,
    pub(crate) flags: BreakFlags,
    pub(crate) newline: Vec<Codepoint>,
    pub(crate) lbc_map: TailoringMap<LineBreakClass>,
    pub(crate) eaw_map: TailoringMap<EastAsianWidth>,
    pub(crate) format: FormatMode,
    pub(crate) sizing: SizingMode,
    pub(crate) urgent: UrgentMode,
    pub(crate) prep: Vec<PrepEntry>,
}

/// Dynamically typed option value for keyword configuration.
#[derive(Clone, Debug)]
pub enum OptionValue {
    /// Absent value: clears hook slots, tailoring and the newline sequence.
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Codepoints(Vec<Codepoint>),
    Format(FormatMode),
    Sizing(SizingMode),
    Urgent(UrgentMode),
    Prep(Vec<PrepEntry>),
    /// Tailoring entries as small integer class codes.
    Map(Vec<(TailorKey, i64)>),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<FormatMode> for OptionValue {
    fn from(v: FormatMode) -> Self {
        Self::Format(v)
    }
}

impl From<SizingMode> for OptionValue {
    fn from(v: SizingMode) -> Self {
        Self::Sizing(v)
    }
}

impl From<UrgentMode> for OptionValue {
    fn from(v: UrgentMode) -> Self {
        Self::Urgent(v)
    }
}

impl From<PrepEntry> for OptionValue {
    fn from(v: PrepEntry) -> Self {
        Self::Prep(vec![v])
    }
}

impl From<Vec<PrepEntry>> for OptionValue {
    fn from(v: Vec<PrepEntry>) -> Self {
        Self::Prep(v)
    }
}

impl OptionValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "str",
            Self::Codepoints(_) => "codepoints",
            Self::Format(_) => "format mode",
            Self::Sizing(_) => "sizing mode",
            Self::Urgent(_) => "urgent mode",
            Self::Prep(_) => "prep list",
            Self::Map(_) => "map",
        }
    }
}

fn wrong_type(name: &str, expected: &str, got: &OptionValue) -> Error {
    Error::type_error(format!("{name} must be {expected}, not {}", got.kind()))
}

/// Validate a column limit.
pub(crate) fn check_columns(name: &str, value: f64) -> Result<f64> {
    if value.is_nan() || value < 0.0 {
        return Err(Error::value(format!(
            "{name} must be non-negative real number, not {value}"
        )));
    }
    Ok(value)
}

/// Validate a character limit.
pub(crate) fn check_charmax(value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::value(format!("charmax must be non-negative integer, not {value}")))
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn charmax(&self) -> usize {
        self.charmax
    }

    /// Maximum columns per line (`width`).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.colmax
    }

    /// Minimum columns of arbitrarily broken lines (`minwidth`).
    #[must_use]
    pub fn minwidth(&self) -> f64 {
        self.colmin
    }

    #[must_use]
    pub fn flags(&self) -> BreakFlags {
        self.flags
    }

    #[must_use]
    pub fn has(&self, flag: BreakFlags) -> bool {
        self.flags.contains(flag)
    }

    #[must_use]
    pub fn newline(&self) -> &[Codepoint] {
        &self.newline
    }

    #[must_use]
    pub fn width_method(&self) -> WidthMethod {
        WidthMethod::for_context(self.has(BreakFlags::EASTASIAN_CONTEXT))
    }

    #[must_use]
    pub fn lbc_map(&self) -> &TailoringMap<LineBreakClass> {
        &self.lbc_map
    }

    #[must_use]
    pub fn eaw_map(&self) -> &TailoringMap<EastAsianWidth> {
        &self.eaw_map
    }

    #[must_use]
    pub fn format(&self) -> &FormatMode {
        &self.format
    }

    #[must_use]
    pub fn sizing(&self) -> &SizingMode {
        &self.sizing
    }

    #[must_use]
    pub fn urgent(&self) -> &UrgentMode {
        &self.urgent
    }

    #[must_use]
    pub fn prep(&self) -> &[PrepEntry] {
        &self.prep
    }

    /// Set the character limit.
    #[must_use]
    pub fn with_charmax(mut self, charmax: usize) -> Self {
        self.charmax = charmax;
        self
    }

    /// Set the column limit; negative or NaN values are ignored.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        if let Ok(width) = check_columns("width", width) {
            self.colmax = width;
        }
        self
    }

    /// Set the minimum width; negative or NaN values are ignored.
    #[must_use]
    pub fn with_minwidth(mut self, minwidth: f64) -> Self {
        if let Ok(minwidth) = check_columns("minwidth", minwidth) {
            self.colmin = minwidth;
        }
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: BreakFlags, on: bool) -> Self {
        self.flags.set(flag, on);
        self
    }

    #[must_use]
    pub fn with_newline(mut self, newline: &str) -> Self {
        self.newline = newline.chars().map(u32::from).collect();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatMode) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_sizing(mut self, sizing: SizingMode) -> Self {
        self.sizing = sizing;
        self
    }

    #[must_use]
    pub fn with_urgent(mut self, urgent: UrgentMode) -> Self {
        self.urgent = urgent;
        self
    }

    #[must_use]
    pub fn with_prep(mut self, entry: PrepEntry) -> Self {
        self.prep.push(entry);
        self
    }

    /// Apply one keyword option. On error the options are unchanged.
    pub fn apply(&mut self, name: &str, value: OptionValue) -> Result<()> {
        if let Some(flag) = BreakFlags::from_keyword(name) {
            let OptionValue::Bool(on) = value else {
                return Err(wrong_type(name, "bool", &value));
            };
            self.flags.set(flag, on);
            return Ok(());
        }

        match name {
            "charmax" => {
                self.charmax = match value {
                    OptionValue::Int(v) => check_charmax(v)?,
                    other => return Err(wrong_type(name, "int", &other)),
                };
            }
            "width" | "minwidth" => {
                let v = match value {
                    #[allow(clippy::cast_precision_loss)]
                    OptionValue::Int(v) => check_columns(name, v as f64)?,
                    OptionValue::Float(v) => check_columns(name, v)?,
                    other => return Err(wrong_type(name, "real number", &other)),
                };
                if name == "width" {
                    self.colmax = v;
                } else {
                    self.colmin = v;
                }
            }
            "newline" => {
                self.newline = match value {
                    OptionValue::None => Vec::new(),
                    OptionValue::Text(s) => s.chars().map(u32::from).collect(),
                    OptionValue::Codepoints(cps) => cps,
                    other => return Err(wrong_type(name, "str", &other)),
                };
            }
            "format" => {
                self.format = match value {
                    OptionValue::None => FormatMode::None,
                    OptionValue::Text(s) => s.parse()?,
                    OptionValue::Format(mode) => mode,
                    other => return Err(wrong_type(name, "str or callable", &other)),
                };
            }
            "sizing" => {
                self.sizing = match value {
                    OptionValue::None => SizingMode::None,
                    OptionValue::Text(s) => s.parse()?,
                    OptionValue::Sizing(mode) => mode,
                    other => return Err(wrong_type(name, "str or callable", &other)),
                };
            }
            "urgent" => {
                self.urgent = match value {
                    OptionValue::None => UrgentMode::None,
                    OptionValue::Text(s) => s.parse()?,
                    OptionValue::Urgent(mode) => mode,
                    other => return Err(wrong_type(name, "str or callable", &other)),
                };
            }
            "prep" => {
                self.prep = match value {
                    OptionValue::None => Vec::new(),
                    OptionValue::Text(s) => vec![s.parse()?],
                    OptionValue::Prep(entries) => entries,
                    other => return Err(wrong_type(name, "list", &other)),
                };
            }
            "lbc" => match value {
                OptionValue::None => self.lbc_map.clear(),
                OptionValue::Map(entries) => {
                    let entries = entries
                        .into_iter()
                        .map(|(key, code)| Ok((key, LineBreakClass::try_from_code(code)?)))
                        .collect::<Result<Vec<_>>>()?;
                    self.lbc_map.extend_checked(entries)?;
                }
                other => return Err(wrong_type(name, "map", &other)),
            },
            "eaw" => match value {
                OptionValue::None => self.eaw_map.clear(),
                OptionValue::Map(entries) => {
                    let entries = entries
                        .into_iter()
                        .map(|(key, code)| Ok((key, EastAsianWidth::try_from_code(code)?)))
                        .collect::<Result<Vec<_>>>()?;
                    self.eaw_map.extend_checked(entries)?;
                }
                other => return Err(wrong_type(name, "map", &other)),
            },
            _ => return Err(Error::value(format!("invalid argument {name}"))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.charmax(), 0);
        assert!(opts.width().abs() < f64::EPSILON);
        assert!(opts.flags().is_empty());
        assert!(opts.newline().is_empty());
        assert!(matches!(opts.format(), FormatMode::None));
        assert!(matches!(opts.sizing(), SizingMode::None));
        assert!(matches!(opts.urgent(), UrgentMode::None));
        assert!(opts.prep().is_empty());
    }

    #[test]
    fn test_builders() {
        let opts = Options::new()
            .with_width(72.0)
            .with_width(-1.0)
            .with_charmax(998)
            .with_flag(BreakFlags::EASTASIAN_CONTEXT, true)
            .with_newline("\r\n")
            .with_urgent(UrgentMode::Force);
        assert!((opts.width() - 72.0).abs() < f64::EPSILON);
        assert_eq!(opts.charmax(), 998);
        assert_eq!(opts.width_method(), WidthMethod::EastAsian);
        assert_eq!(opts.newline(), &[0x0D, 0x0A]);
        assert_eq!(opts.urgent().name(), Some("FORCE"));
    }

    #[test]
    fn test_apply_keyword_options() {
        let mut opts = Options::new();
        opts.apply("width", OptionValue::Int(40)).unwrap();
        opts.apply("minwidth", 2.5.into()).unwrap();
        opts.apply("legacy_cm", true.into()).unwrap();
        opts.apply("format", "trim".into()).unwrap();
        opts.apply("prep", "BREAKURI".into()).unwrap();
        assert!((opts.width() - 40.0).abs() < f64::EPSILON);
        assert!((opts.minwidth() - 2.5).abs() < f64::EPSILON);
        assert!(opts.has(BreakFlags::LEGACY_CM));
        assert_eq!(opts.format().name(), Some("TRIM"));
        assert_eq!(opts.prep().len(), 1);

        opts.apply("format", OptionValue::None).unwrap();
        assert!(matches!(opts.format(), FormatMode::None));
    }

    #[test]
    fn test_apply_errors() {
        let mut opts = Options::new().with_charmax(5);
        assert!(matches!(
            opts.apply("charmax", OptionValue::Int(-1)),
            Err(Error::Value(_))
        ));
        assert_eq!(opts.charmax(), 5);
        assert!(matches!(
            opts.apply("width", "wide".into()),
            Err(Error::Type(_))
        ));
        assert!(matches!(
            opts.apply("hangul_as_al", OptionValue::Int(1)),
            Err(Error::Type(_))
        ));
        assert!(matches!(
            opts.apply("urgent", "sometimes".into()),
            Err(Error::Value(_))
        ));
        let err = opts.apply("colour", true.into()).unwrap_err();
        assert!(err.to_string().contains("invalid argument"));
    }

    #[test]
    fn test_flag_keywords() {
        assert_eq!(
            BreakFlags::from_keyword("virama_as_joiner"),
            Some(BreakFlags::VIRAMA_AS_JOINER)
        );
        assert_eq!(BreakFlags::from_keyword("VIRAMA_AS_JOINER"), None);
        assert_eq!(BreakFlags::from_keyword("charmax"), None);

        let mut opts = Options::new();
        opts.apply("break_indent", true.into()).unwrap();
        opts.apply("complex_breaking", true.into()).unwrap();
        opts.apply("complex_breaking", false.into()).unwrap();
        assert_eq!(opts.flags(), BreakFlags::BREAK_INDENT);
    }

    #[test]
    fn test_tailoring_via_keywords() {
        let mut opts = Options::new();
        let id = i64::from(LineBreakClass::ID.code());
        opts.apply("lbc", OptionValue::Map(vec![(TailorKey::from('x'), id)]))
            .unwrap();
        assert_eq!(opts.lbc_map().get(u32::from('x')), Some(LineBreakClass::ID));

        let bad = OptionValue::Map(vec![(TailorKey::from('y'), id), (TailorKey::from('z'), 99)]);
        assert!(opts.apply("lbc", bad).is_err());
        assert_eq!(opts.lbc_map().get(u32::from('y')), None);

        opts.apply("lbc", OptionValue::None).unwrap();
        assert!(opts.lbc_map().is_empty());
    }
}
