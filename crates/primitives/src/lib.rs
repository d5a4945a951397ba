//! Core types for addressing math markup: byte spans, span labels, and the
//! colour side channel used to recover labels from rendered glyphs.

/// Label/colour codec.
pub mod color;
/// Span identity labels.
pub mod label;
/// Byte spans and span kinds.
pub mod span;

pub use color::{ColorDecodeError, LabelOverflow, Rgb, color_to_label, label_to_color};
pub use label::Label;
pub use span::{ByteIdx, Span, SpanKind};
