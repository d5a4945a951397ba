//! Containment index: which labels each span covers.

use mtex_primitives::{Label, Span};

use crate::registry::SpanRegistry;

/// Records, on every span, the labels of all normal spans inside it.
///
/// A normal span lists its own label too, so resolving a span through its
/// `containing_labels` always reaches the glyphs coloured with its label.
/// Quadratic in the span count.
pub fn index_containment(registry: &mut SpanRegistry) {
	let normals: Vec<(Span, Label)> = registry.normal_spans().collect();
	for (outer, info) in registry.iter_mut() {
		info.containing_labels.clear();
		info.containing_labels.extend(
			normals
				.iter()
				.filter(|(inner, _)| outer.contains(*inner))
				.map(|(_, label)| *label),
		);
	}
}
