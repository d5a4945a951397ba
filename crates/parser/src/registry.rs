//! The central span table every discovery pass writes into.

use indexmap::IndexMap;
use mtex_primitives::{Label, Span, SpanKind};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

/// Metadata attached to a registered span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanInfo {
	/// Structural role of the span.
	pub kind: SpanKind,
	/// Own label for normal spans, borrowed content label for scripts.
	pub label: Label,
	/// Labels of every normal span lying inside this span, itself included.
	///
	/// Filled in by [`crate::containment::index_containment`], ascending.
	pub containing_labels: SmallVec<[Label; 4]>,
}

/// Insertion-ordered map from span to [`SpanInfo`].
///
/// Re-registering an existing span is a no-op, so the first discovery of a
/// range decides its kind and label.
#[derive(Debug, Clone)]
pub struct SpanRegistry {
	spans: IndexMap<Span, SpanInfo, FxBuildHasher>,
	next_label: Label,
}

impl SpanRegistry {
	/// Creates a registry seeded with the whole-string span as [`Label::ROOT`].
	pub fn new(source_len: usize) -> Self {
		let mut registry = Self {
			spans: IndexMap::default(),
			next_label: Label::ROOT,
		};
		registry.insert_normal(Span::new(0, source_len));
		registry
	}

	/// Registers a normal span, labelling it if it is new.
	///
	/// Returns the label now stored for `span`, which for a previously
	/// registered script wrapper is the borrowed content label.
	pub fn insert_normal(&mut self, span: Span) -> Label {
		if let Some(info) = self.spans.get(&span) {
			return info.label;
		}
		let label = self.next_label;
		self.next_label = label.next();
		self.spans.insert(
			span,
			SpanInfo {
				kind: SpanKind::Normal,
				label,
				containing_labels: SmallVec::new(),
			},
		);
		label
	}

	/// Registers a script wrapper borrowing `label` from its content.
	pub fn insert_script(&mut self, span: Span, kind: SpanKind, label: Label) {
		debug_assert!(kind.is_script());
		self.spans.entry(span).or_insert_with(|| SpanInfo {
			kind,
			label,
			containing_labels: SmallVec::new(),
		});
	}

	/// Returns the metadata for `span`, if registered.
	#[inline]
	pub fn get(&self, span: &Span) -> Option<&SpanInfo> {
		self.spans.get(span)
	}

	/// Returns true if `span` is registered.
	#[inline]
	pub fn contains(&self, span: &Span) -> bool {
		self.spans.contains_key(span)
	}

	/// Iterates spans in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (&Span, &SpanInfo)> {
		self.spans.iter()
	}

	pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&Span, &mut SpanInfo)> {
		self.spans.iter_mut()
	}

	/// Iterates registered spans in registration order.
	pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
		self.spans.keys().copied()
	}

	/// Iterates normal spans with their labels, in label order.
	pub fn normal_spans(&self) -> impl Iterator<Item = (Span, Label)> + '_ {
		self.spans
			.iter()
			.filter(|(_, info)| info.kind == SpanKind::Normal)
			.map(|(span, info)| (*span, info.label))
	}

	/// Iterates subscript and superscript wrappers.
	pub fn script_spans(&self) -> impl Iterator<Item = (Span, &SpanInfo)> + '_ {
		self.spans
			.iter()
			.filter(|(_, info)| info.kind.is_script())
			.map(|(span, info)| (*span, info))
	}

	/// Returns the normal span carrying `label`.
	pub fn span_of_label(&self, label: Label) -> Option<Span> {
		self.normal_spans()
			.find_map(|(span, l)| (l == label).then_some(span))
	}

	/// Returns the number of labels handed out so far.
	#[inline]
	pub fn label_count(&self) -> u32 {
		self.next_label.get()
	}

	/// Returns true if `label` belongs to a registered normal span.
	#[inline]
	pub fn has_label(&self, label: Label) -> bool {
		label < self.next_label
	}

	/// Returns the number of registered spans.
	#[inline]
	pub fn len(&self) -> usize {
		self.spans.len()
	}

	/// Returns true if only the whole-string span is registered.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.spans.len() <= 1
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn root_is_seeded_first() {
		let registry = SpanRegistry::new(5);
		let (span, info) = registry.iter().next().unwrap();
		assert_eq!(*span, Span::new(0, 5));
		assert_eq!(info.label, Label::ROOT);
		assert_eq!(info.kind, SpanKind::Normal);
		assert!(registry.is_empty());
	}

	#[test]
	fn labels_are_assigned_in_discovery_order() {
		let mut registry = SpanRegistry::new(10);
		assert_eq!(registry.insert_normal(Span::new(4, 6)), Label::new(1));
		assert_eq!(registry.insert_normal(Span::new(1, 2)), Label::new(2));
		assert_eq!(registry.label_count(), 3);
	}

	#[test]
	fn reinserting_a_span_is_a_noop() {
		let mut registry = SpanRegistry::new(10);
		let first = registry.insert_normal(Span::new(4, 6));
		assert_eq!(registry.insert_normal(Span::new(4, 6)), first);
		registry.insert_script(Span::new(4, 6), SpanKind::Subscript, Label::ROOT);
		assert_eq!(registry.get(&Span::new(4, 6)).unwrap().kind, SpanKind::Normal);
		assert_eq!(registry.len(), 2);
		assert_eq!(registry.label_count(), 2);
	}

	#[test]
	fn scripts_borrow_labels() {
		let mut registry = SpanRegistry::new(3);
		let content = registry.insert_normal(Span::new(2, 3));
		registry.insert_script(Span::new(1, 3), SpanKind::Superscript, content);
		assert_eq!(registry.get(&Span::new(1, 3)).unwrap().label, content);
		assert_eq!(registry.label_count(), 2);
		assert_eq!(registry.span_of_label(content), Some(Span::new(2, 3)));
		assert_eq!(registry.script_spans().count(), 1);
	}
}
