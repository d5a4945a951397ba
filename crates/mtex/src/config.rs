//! Document template configuration.
//!
//! The renderer always receives a complete TeX document. [`TexConfig`]
//! decides how an expression is embedded in it, and can be loaded from TOML:
//!
//! ```toml
//! environment = "align*"
//! alignment = "\\centering"
//! placeholder = "YourTextHere"
//! plain_render = false
//! font_size = 48.0
//! ```

use mtex_parser::annotate::color_directive;
use mtex_primitives::Rgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Font size to scene units.
pub const SCALE_FACTOR_PER_FONT_POINT: f32 = 0.001;

const DEFAULT_TEMPLATE: &str = r"\documentclass[preview]{standalone}
\usepackage[english]{babel}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{xcolor}
\begin{document}
YourTextHere
\end{document}
";

/// Errors that can occur when reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML could not be parsed into a [`TexConfig`].
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// The configuration could not be serialized.
	#[error("TOML serialize error: {0}")]
	Serialize(#[from] toml::ser::Error),
}

/// How expressions are embedded in the rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TexConfig {
	/// Math environment wrapped around the expression, if any.
	pub environment: Option<String>,
	/// Alignment command placed before the environment, if any.
	pub alignment: Option<String>,
	/// Full document with [`Self::placeholder`] marking where the expression goes.
	pub template: String,
	/// Marker in [`Self::template`] replaced by the wrapped expression.
	pub placeholder: String,
	/// Also render the unannotated source and transfer labels onto its glyphs.
	pub plain_render: bool,
	/// Font size in points.
	pub font_size: f32,
}

impl Default for TexConfig {
	fn default() -> Self {
		Self {
			environment: Some("align*".to_owned()),
			alignment: Some(r"\centering".to_owned()),
			template: DEFAULT_TEMPLATE.to_owned(),
			placeholder: "YourTextHere".to_owned(),
			plain_render: false,
			font_size: 48.0,
		}
	}
}

impl TexConfig {
	/// Text-mode preset: no math environment.
	pub fn text() -> Self {
		Self {
			environment: None,
			..Self::default()
		}
	}

	/// Parses a configuration from TOML, filling unspecified fields with defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Serializes the configuration to TOML.
	pub fn to_toml_string(&self) -> Result<String, ConfigError> {
		Ok(toml::to_string(self)?)
	}

	/// Embeds `expression` in the document template.
	pub fn document_body(&self, expression: &str) -> String {
		self.embed(expression, None)
	}

	/// Embeds an annotated expression, switching to label 0's colour ahead of
	/// the environment. Every glyph typeset from the expression then carries a
	/// label, and only glyphs the typesetter adds on its own stay uncoloured.
	pub fn labelled_document_body(&self, annotated: &str) -> String {
		self.embed(annotated, Some(&color_directive(Rgb::ROOT)))
	}

	fn embed(&self, expression: &str, base_color: Option<&str>) -> String {
		let mut body = expression.to_owned();
		if let Some(env) = &self.environment {
			body = format!("\\begin{{{env}}}\n{body}\n\\end{{{env}}}");
		}
		if let Some(alignment) = &self.alignment {
			body = format!("{alignment}\n{body}");
		}
		if let Some(color) = base_color {
			body = format!("{color}\n{body}");
		}
		self.template.replace(&self.placeholder, &body)
	}

	/// Scale applied to rendered output for the configured font size.
	#[inline]
	pub fn scale_factor(&self) -> f32 {
		SCALE_FACTOR_PER_FONT_POINT * self.font_size
	}
}
