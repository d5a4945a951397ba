use std::fmt;

/// Identity of a normal span.
///
/// Labels are handed out in discovery order starting from [`Label::ROOT`],
/// which always belongs to the whole source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
	/// Label of the whole-string span.
	pub const ROOT: Label = Label(0);

	/// Wraps a raw label value.
	#[inline]
	pub const fn new(raw: u32) -> Self {
		Self(raw)
	}

	/// Returns the raw label value.
	#[inline]
	pub const fn get(self) -> u32 {
		self.0
	}

	/// Returns the label that follows this one.
	#[inline]
	pub const fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}
