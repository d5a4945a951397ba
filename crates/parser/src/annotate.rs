//! Rewrites the source with a colour directive around every labelled span.

use std::cmp::Reverse;

use mtex_primitives::{Label, LabelOverflow, Rgb, Span};

use crate::registry::SpanRegistry;

/// Closing marker matching [`open_marker`].
pub const CLOSE_MARKER: &str = "}}";

/// Opening marker for a span labelled with `color`.
///
/// The extra brace level keeps the typesetter from changing glyph metrics or
/// kerning relative to the unannotated source.
pub fn open_marker(color: Rgb) -> String {
	format!("{{{{{}", color_directive(color))
}

/// Bare `\color[RGB]{r,g,b}` switch to `color`.
pub fn color_directive(color: Rgb) -> String {
	format!("\\color[RGB]{{{},{},{}}}", color.r, color.g, color.b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
	Close,
	Open,
}

#[derive(Debug, Clone, Copy)]
struct Boundary {
	pos: usize,
	edge: Edge,
	/// The opposite end of the span, used to nest boundaries sharing `pos`.
	other: usize,
	label: Label,
}

/// Builds the annotated expression sent to the renderer.
///
/// The whole-string span gets no marker. At a shared position, closes come
/// before opens, opens go outermost first, and closes innermost first, so the
/// markers always nest like the spans they stand for.
pub fn annotate(source: &str, registry: &SpanRegistry) -> Result<String, LabelOverflow> {
	let whole = Span::new(0, source.len());
	let mut boundaries: Vec<Boundary> = registry
		.normal_spans()
		.filter(|(span, _)| *span != whole)
		.flat_map(|(span, label)| {
			[
				Boundary {
					pos: span.start,
					edge: Edge::Open,
					other: span.end,
					label,
				},
				Boundary {
					pos: span.end,
					edge: Edge::Close,
					other: span.start,
					label,
				},
			]
		})
		.collect();
	boundaries.sort_by_key(|b| (b.pos, b.edge == Edge::Open, Reverse(b.other)));

	let mut out = String::with_capacity(source.len() + boundaries.len() * 16);
	let mut cursor = 0;
	for boundary in boundaries {
		out.push_str(&source[cursor..boundary.pos]);
		match boundary.edge {
			Edge::Open => out.push_str(&open_marker(Rgb::from_label(boundary.label)?)),
			Edge::Close => out.push_str(CLOSE_MARKER),
		}
		cursor = boundary.pos;
	}
	out.push_str(&source[cursor..]);
	Ok(out)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn whole_string_is_left_bare() {
		let registry = SpanRegistry::new(3);
		assert_eq!(annotate("a+b", &registry).unwrap(), "a+b");
	}

	#[test]
	fn markers_nest_at_shared_positions() {
		let source = "abc";
		let mut registry = SpanRegistry::new(source.len());
		registry.insert_normal(Span::new(0, 2));
		registry.insert_normal(Span::new(0, 1));
		registry.insert_normal(Span::new(1, 2));
		assert_eq!(
			annotate(source, &registry).unwrap(),
			concat!(
				r"{{\color[RGB]{0,0,2}",
				r"{{\color[RGB]{0,0,3}a}}",
				r"{{\color[RGB]{0,0,4}b}}",
				"}}c"
			)
		);
	}
}
