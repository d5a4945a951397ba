use mtex_primitives::{Label, Span};
use tracing::trace;

use crate::annotate::annotate;
use crate::brace::match_braces;
use crate::containment::index_containment;
use crate::error::Result;
use crate::isolate::{isolate_double_braces, isolate_substrings};
use crate::overlap::validate_laminar;
use crate::registry::SpanRegistry;
use crate::script::isolate_scripts;

/// A fully broken-up source string.
///
/// Immutable once parsed: the registry is laminar and its containment index
/// is complete.
#[derive(Debug, Clone)]
pub struct SpanTree {
	source: String,
	registry: SpanRegistry,
	specified_substrings: Vec<String>,
}

impl SpanTree {
	/// Breaks up `source`, additionally isolating every occurrence of each of
	/// `substrings`.
	pub fn parse<S: AsRef<str>>(source: &str, substrings: &[S]) -> Result<Self> {
		let braces = match_braces(source)?;
		let mut registry = SpanRegistry::new(source.len());
		let mut specified = isolate_double_braces(&braces, &mut registry);
		isolate_scripts(source, &braces, &mut registry)?;
		specified.extend(isolate_substrings(source, substrings, &mut registry));
		validate_laminar(source, &registry)?;
		index_containment(&mut registry);

		let mut specified_substrings: Vec<String> = Vec::with_capacity(specified.len());
		for span in specified {
			let text = span.slice(source);
			if !specified_substrings.iter().any(|s| s == text) {
				specified_substrings.push(text.to_owned());
			}
		}
		trace!(
			spans = registry.len(),
			labels = registry.label_count(),
			"span tree parsed"
		);
		Ok(Self {
			source: source.to_owned(),
			registry,
			specified_substrings,
		})
	}

	/// Returns the parsed source string.
	#[inline]
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Returns the span registry.
	#[inline]
	pub fn registry(&self) -> &SpanRegistry {
		&self.registry
	}

	/// Returns the isolated `{{...}}` groups and requested literals, deduplicated.
	#[inline]
	pub fn specified_substrings(&self) -> &[String] {
		&self.specified_substrings
	}

	/// Returns the text of every registered span, deduplicated, in registration order.
	pub fn all_isolated_substrings(&self) -> Vec<String> {
		let mut out: Vec<String> = Vec::new();
		for span in self.registry.spans() {
			let text = span.slice(&self.source);
			if !out.iter().any(|s| s == text) {
				out.push(text.to_owned());
			}
		}
		out
	}

	/// Returns the labels covered by `span`, if it is registered.
	pub fn containing_labels(&self, span: &Span) -> Option<&[Label]> {
		self.registry
			.get(span)
			.map(|info| info.containing_labels.as_slice())
	}

	/// Builds the colour-annotated expression for this tree.
	pub fn annotated_expression(&self) -> Result<String> {
		Ok(annotate(&self.source, &self.registry)?)
	}
}

#[cfg(test)]
mod tests;
