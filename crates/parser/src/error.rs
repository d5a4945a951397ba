//! Errors raised while breaking up a source string.

use mtex_primitives::LabelOverflow;
use thiserror::Error;

/// Fatal parse failures. No renderer is ever invoked for a source that fails to parse.
#[derive(Debug, Error)]
pub enum ParseError {
	/// A `{` was never closed, or a `}` closed nothing.
	#[error("failed to parse tex (unmatched braces): {source_text:?}")]
	UnmatchedBrace { source_text: String },

	/// A `_` or `^` token is followed by nothing it can attach to.
	#[error("failed to parse tex (unclear subscript/superscript at byte {position}): {source_text:?}")]
	AmbiguousScript { source_text: String, position: usize },

	/// Two spans share bytes without one containing the other.
	#[error("overlapping substring pairs: {}", format_pairs(.pairs))]
	OverlappingSpans { pairs: Vec<(String, String)> },

	/// More labelled spans than the colour encoding can address.
	#[error(transparent)]
	LabelOverflow(#[from] LabelOverflow),

	/// The script pattern failed to execute.
	#[error("script pattern failed: {0}")]
	Pattern(#[from] Box<fancy_regex::Error>),
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

fn format_pairs(pairs: &[(String, String)]) -> String {
	pairs
		.iter()
		.map(|(a, b)| format!("{a:?}, {b:?}"))
		.collect::<Vec<_>>()
		.join("; ")
}
