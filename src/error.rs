//! Error types for textseg.

use std::collections::TryReserveError;
use std::fmt;
use std::rc::Rc;

/// Result type alias for textseg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error a host callback may return.
pub type HookError = Box<dyn std::error::Error + 'static>;

/// Result type returned by host-supplied hook callbacks.
pub type HookResult<T> = std::result::Result<T, HookError>;

/// Which extension point a failing callback was installed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    Prep,
    Format,
    Sizing,
    Urgent,
}

impl HookKind {
    /// Lowercase name used in messages and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Prep => "prep",
            Self::Format => "format",
            Self::Sizing => "sizing",
            Self::Urgent => "urgent",
        }
    }
}

/// Error type for textseg operations.
///
/// Cloning is cheap: a hook failure shares its source.
#[derive(Clone, Debug)]
pub enum Error {
    /// Buffer allocation failed while converting between encodings.
    Conversion(TryReserveError),
    /// Bad option value, unknown mode name or malformed tailoring entry.
    Value(String),
    /// Wrong shape of argument (e.g. deleting an item, non-callable hook).
    Type(String),
    /// Cluster index out of range.
    Index { index: isize, len: usize },
    /// Urgent mode `RAISE` met an excessive fragment.
    Overflow { width: f64, limit: f64 },
    /// A host callback failed.
    ExternalHook {
        hook: HookKind,
        source: Rc<dyn std::error::Error + 'static>,
    },
    /// Unrecognized internal tag; indicates a defect.
    Internal(String),
}

impl Error {
    pub(crate) fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub(crate) fn hook(hook: HookKind, source: HookError) -> Self {
        Self::ExternalHook {
            hook,
            source: Rc::from(source),
        }
    }

    /// True for [`Error::Overflow`].
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }

    /// True for [`Error::ExternalHook`].
    #[must_use]
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, Self::ExternalHook { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversion(e) => write!(f, "conversion buffer allocation failed: {e}"),
            Self::Value(s) => write!(f, "invalid value: {s}"),
            Self::Type(s) => write!(f, "invalid type: {s}"),
            Self::Index { index, len } => {
                write!(f, "GCStr index {index} out of range for length {len}")
            }
            Self::Overflow { width, limit } => {
                write!(f, "excessive line was found: {width} columns exceeds {limit}")
            }
            Self::ExternalHook { hook, source } => {
                write!(f, "{} hook failed: {source}", hook.name())
            }
            Self::Internal(s) => write!(f, "internal error: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conversion(e) => Some(e),
            Self::ExternalHook { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(e: TryReserveError) -> Self {
        Self::Conversion(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::value("attribute must be non-negative integer, not -1");
        assert!(err.to_string().contains("invalid value"));

        let err = Error::Index { index: -4, len: 3 };
        assert!(err.to_string().contains("-4"));

        let err = Error::Overflow {
            width: 15.0,
            limit: 10.0,
        };
        assert!(err.to_string().contains("excessive line"));
        assert!(err.is_overflow());
    }

    #[test]
    fn test_hook_error_source() {
        let source: HookError = "boom".into();
        let err = Error::hook(HookKind::Urgent, source);
        assert!(err.is_hook_failure());
        assert!(err.clone().to_string().ends_with("boom"));
        assert!(err.to_string().starts_with("urgent hook failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_try_reserve_conversion() {
        let mut v: Vec<u32> = Vec::new();
        let err: Error = v.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(err, Error::Conversion(_)));
    }
}
