//! The external renderer seam.

use mtex_primitives::{ColorDecodeError, Label, Rgb};

/// Boxed error returned by renderer implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One opaque rendered element.
///
/// Glyphs carry no structure of their own; the fill colour is the only
/// channel through which a glyph can be traced back to the source.
pub trait Glyph: Clone {
	/// Effective fill colour as a hex string, if the renderer set one.
	fn fill_color(&self) -> Option<&str>;

	/// Repaints the glyph.
	fn set_color(&mut self, color: Rgb);

	/// Decodes the label carried by this glyph's fill colour.
	fn label(&self) -> Result<Label, ColorDecodeError> {
		match self.fill_color() {
			Some(hex) => mtex_primitives::color_to_label(hex),
			None => Err(ColorDecodeError::Unlabeled),
		}
	}
}

/// Turns a complete TeX document into an ordered glyph sequence.
///
/// Calls are blocking and all-or-nothing. Failures are never retried.
pub trait Renderer {
	type Glyph: Glyph;

	fn compile(&mut self, document: &str) -> Result<Vec<Self::Glyph>, BoxError>;
}
