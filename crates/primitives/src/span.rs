use std::fmt;
use std::ops::Range;

/// A position in the source markup, measured in bytes.
pub type ByteIdx = usize;

/// A half-open byte range `[start, end)` into an immutable source string.
///
/// Spans are compared by their bounds only; two spans with the same bounds are
/// the same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
	/// First byte covered by the span.
	pub start: ByteIdx,
	/// One past the last byte covered by the span.
	pub end: ByteIdx,
}

impl Span {
	/// Creates a span from `start` to `end`.
	#[inline]
	pub fn new(start: ByteIdx, end: ByteIdx) -> Self {
		debug_assert!(start <= end, "span start {start} is past end {end}");
		Self { start, end }
	}

	/// Returns the length of the span in bytes.
	#[inline]
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	/// Returns true if the span covers no bytes.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `other` lies entirely inside this span.
	///
	/// Every span contains itself.
	#[inline]
	pub fn contains(&self, other: Span) -> bool {
		self.start <= other.start && other.end <= self.end
	}

	/// Returns true if the spans share bytes without either containing the other.
	pub fn crosses(&self, other: Span) -> bool {
		let (a, b) = if self <= &other { (*self, other) } else { (other, *self) };
		a.start < b.start && b.start < a.end && a.end < b.end
	}

	/// Returns the text covered by this span.
	///
	/// # Panics
	///
	/// Panics if the span is out of bounds or not on char boundaries of `text`.
	#[inline]
	pub fn slice<'a>(&self, text: &'a str) -> &'a str {
		&text[self.as_range()]
	}

	/// Returns the span as a standard range.
	#[inline]
	pub fn as_range(&self) -> Range<ByteIdx> {
		self.start..self.end
	}
}

impl From<Range<ByteIdx>> for Span {
	fn from(range: Range<ByteIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl fmt::Display for Span {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {})", self.start, self.end)
	}
}

/// Structural role of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
	/// An independently colourable unit with its own label.
	Normal,
	/// A `_` token together with the content it attaches to.
	Subscript,
	/// A `^` token together with the content it attaches to.
	Superscript,
}

impl SpanKind {
	/// Returns true for subscript and superscript wrappers.
	#[inline]
	pub fn is_script(self) -> bool {
		!matches!(self, Self::Normal)
	}
}
