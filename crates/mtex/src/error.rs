//! Error types for rendering and querying expressions.

use mtex_parser::ParseError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::render::BoxError;

/// Caller-facing lookup failures. None of these invalidate the expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
	/// No combination of registered spans tiles the requested range exactly.
	#[error("failed to get span of tex: {tex:?}")]
	NoSpanCoverage { tex: String },

	/// The literal is absent, or has fewer occurrences than requested.
	#[error("occurrence {index} of {tex:?} not found ({count} present)")]
	SubstringNotFound {
		tex: String,
		index: usize,
		count: usize,
	},

	/// The byte range lies outside the source or splits a character.
	#[error("invalid range {start}..{end} for source of {len} bytes")]
	InvalidRange { start: usize, end: usize, len: usize },

	/// The part covers no group.
	#[error("failed to find part in tex")]
	EmptyPart,
}

/// Renderer failures, scoped to the expression being rendered.
#[derive(Debug, Error)]
pub enum RenderError {
	/// The renderer rejected the document.
	#[error("renderer failed: {0}")]
	Compile(#[source] BoxError),

	/// The plain render produced a different glyph count than the labelled one.
	#[error("plain render produced {plain} glyphs, labelled render produced {labelled}")]
	GlyphCountMismatch { labelled: usize, plain: usize },
}

/// Any failure while building or querying an expression.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Parse(#[from] ParseError),

	#[error(transparent)]
	Query(#[from] QueryError),

	#[error(transparent)]
	Render(#[from] RenderError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, Error>;
