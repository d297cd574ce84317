//! `textseg` - Unicode text segmentation and line breaking
//!
//! Grapheme cluster strings with per-cluster line breaking and width
//! properties, and a UAX #14 line breaking engine whose formatting, sizing,
//! urgent breaking and preprocessing stages can be replaced by host
//! callbacks.
//!
//! ```
//! use textseg::{FormatMode, LineBreak};
//!
//! let lb = LineBreak::new();
//! lb.set_width(12.0)?;
//! lb.set_format(FormatMode::Newline);
//! lb.set_newline("\n");
//! let out: String = lb
//!     .wrap("Lorem ipsum dolor sit amet")?
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(out, "Lorem ipsum\ndolor sit\namet\n");
//! # Ok::<(), textseg::Error>(())
//! ```

// Crate-level lint configuration
#![forbid(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Cluster counts fit comfortably
#![allow(clippy::cast_precision_loss)] // Widths are measured as f64
#![allow(clippy::module_name_repetitions)] // Allow linebreak::LineBreak etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Hooks take owned fragments
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::type_complexity)] // Hook signatures are spelled out
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine

pub mod consts;
pub mod error;
pub mod gcstr;
pub mod linebreak;
pub mod unicode;

// Re-export core types at crate root
pub use error::{Error, HookError, HookKind, HookResult, Result};
pub use gcstr::{Cluster, ClusterFlags, GCStr};

// Re-export engine types
pub use linebreak::{
    BreakFlags, FormatMode, Fragment, HookReturn, LineBreak, OptionValue, Options, PrepEntry,
    SizingMode, State, TailorKey, UrgentMode,
};

// Re-export Unicode types
pub use unicode::{
    Codepoint, CodepointBuf, EastAsianWidth, LineBreakClass, UNICODE_VERSION, from_codepoints,
    from_codepoints_utf16, to_codepoints, to_codepoints_utf16,
};
