//! Unicode utilities: encoding conversion, grapheme boundaries and property values.

pub mod codepoint;
mod grapheme;
mod props;
mod width;

pub use codepoint::{
    Codepoint, CodepointBuf, HostForm, OffsetMap, from_codepoints, from_codepoints_utf16,
    lossy_char, to_codepoints, to_codepoints_utf16,
};
pub use grapheme::cluster_bounds;
pub use props::{EastAsianWidth, LineBreakClass, UNICODE_VERSION, default_lbc};
pub use width::{WidthMethod, default_eaw, eaw_columns, is_wide};
