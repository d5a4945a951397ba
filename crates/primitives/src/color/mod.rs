//! Bijection between span labels and 24-bit colours.
//!
//! Label `n` is encoded as the colour whose packed RGB value is `n + 1`, so no
//! label ever encodes to pure black. Renderers cannot tell black apart from
//! "no colour set", which makes black the natural "unlabelled" value.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Label;

/// Largest label that still fits the 24-bit encoding.
pub const MAX_LABEL: u32 = 0xFF_FFFE;

/// An 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

/// A label too large for the 24-bit colour encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("label {0} does not fit in a 24-bit colour")]
pub struct LabelOverflow(pub Label);

/// Why a colour string did not yield a label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorDecodeError {
	/// The string is not a 3- or 6-digit hex colour.
	#[error("malformed hex colour: {0:?}")]
	Malformed(String),
	/// The colour is pure black, which carries no label.
	#[error("colour carries no label")]
	Unlabeled,
}

impl Rgb {
	pub const BLACK: Rgb = Rgb::new(0, 0, 0);
	pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
	/// Colour of [`Label::ROOT`].
	pub const ROOT: Rgb = Rgb::new(0, 0, 1);

	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Encodes `label` as a colour.
	pub fn from_label(label: Label) -> Result<Self, LabelOverflow> {
		if label.get() > MAX_LABEL {
			return Err(LabelOverflow(label));
		}
		Ok(Self::from_packed(label.get() + 1))
	}

	/// Decodes the label carried by this colour.
	pub fn to_label(self) -> Result<Label, ColorDecodeError> {
		self.packed()
			.checked_sub(1)
			.map(Label::new)
			.ok_or(ColorDecodeError::Unlabeled)
	}

	/// Parses `#rgb`, `#rrggbb`, or either form without the leading `#`.
	pub fn from_hex(hex: &str) -> Result<Self, ColorDecodeError> {
		let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
		let malformed = || ColorDecodeError::Malformed(hex.to_owned());
		if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return Err(malformed());
		}
		let expanded: String = match digits.len() {
			3 => digits.chars().flat_map(|c| [c, c]).collect(),
			6 => digits.to_owned(),
			_ => return Err(malformed()),
		};
		u32::from_str_radix(&expanded, 16)
			.map(Self::from_packed)
			.map_err(|_| malformed())
	}

	/// Formats the colour as `#rrggbb`.
	pub fn to_hex(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}

	fn from_packed(value: u32) -> Self {
		let (rg, b) = (value / 256, value % 256);
		let (r, g) = (rg / 256, rg % 256);
		Self::new(r as u8, g as u8, b as u8)
	}

	fn packed(self) -> u32 {
		(u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
	}
}

impl FromStr for Rgb {
	type Err = ColorDecodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_hex(s)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// Encodes `label` as a colour.
#[inline]
pub fn label_to_color(label: Label) -> Result<Rgb, LabelOverflow> {
	Rgb::from_label(label)
}

/// Decodes the label carried by a hex colour string.
#[inline]
pub fn color_to_label(hex: &str) -> Result<Label, ColorDecodeError> {
	Rgb::from_hex(hex)?.to_label()
}
