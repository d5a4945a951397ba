use std::collections::{BTreeMap, BTreeSet};

use mtex_primitives::{Label, Rgb, Span, SpanKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::SpanTree;
use crate::error::ParseError;

const NO_SUBSTRINGS: &[&str] = &[];

/// Removes colour markers from an annotated expression, checking that they
/// nest with the source's own braces.
fn strip_annotations(annotated: &str) -> String {
	const OPEN: &str = "{{\\color[RGB]{";
	#[derive(Debug, PartialEq)]
	enum Frame {
		Marker,
		Brace,
	}
	let mut stack = Vec::new();
	let mut out = String::new();
	let mut rest = annotated;
	while let Some(c) = rest.chars().next() {
		if let Some(after) = rest.strip_prefix(OPEN) {
			let close = after.find('}').expect("colour triple is closed");
			stack.push(Frame::Marker);
			rest = &after[close + 1..];
			continue;
		}
		match c {
			'{' => {
				stack.push(Frame::Brace);
				out.push(c);
			}
			'}' if stack.last() == Some(&Frame::Marker) => {
				stack.pop();
				rest = rest.strip_prefix("}}").expect("marker closes with two braces");
				continue;
			}
			'}' => {
				assert_eq!(stack.pop(), Some(Frame::Brace), "unbalanced source brace");
				out.push(c);
			}
			_ => out.push(c),
		}
		rest = &rest[c.len_utf8()..];
	}
	assert!(stack.is_empty(), "unclosed marker");
	out
}

/// For each colour marker, the labels of every marker opened inside it,
/// its own included. Read from marker nesting alone, never from span bounds.
fn nested_labels(annotated: &str) -> BTreeMap<Label, BTreeSet<Label>> {
	const OPEN: &str = "{{\\color[RGB]{";
	let mut nested: BTreeMap<Label, BTreeSet<Label>> = BTreeMap::new();
	let mut stack: Vec<Option<Label>> = Vec::new();
	let mut rest = annotated;
	while let Some(c) = rest.chars().next() {
		if let Some(after) = rest.strip_prefix(OPEN) {
			let close = after.find('}').expect("colour triple is closed");
			let channels: Vec<u8> = after[..close]
				.split(',')
				.map(|channel| channel.parse().expect("channel is a byte"))
				.collect();
			let label = Rgb::new(channels[0], channels[1], channels[2])
				.to_label()
				.expect("marker colour decodes");
			stack.push(Some(label));
			for open in stack.iter().flatten() {
				nested.entry(*open).or_default().insert(label);
			}
			rest = &after[close + 1..];
			continue;
		}
		match c {
			'{' => stack.push(None),
			'}' if matches!(stack.last(), Some(Some(_))) => {
				stack.pop();
				rest = rest.strip_prefix("}}").expect("marker closes with two braces");
				continue;
			}
			'}' => {
				stack.pop();
			}
			_ => {}
		}
		rest = &rest[c.len_utf8()..];
	}
	nested
}

#[test]
fn marker_nesting_gives_containment() {
	let tree = SpanTree::parse("{{a}}+x^{2}", &["a"]).unwrap();
	let nested = nested_labels(&tree.annotated_expression().unwrap());
	let [double, script, inner] = [1, 2, 3].map(Label::new);
	assert_eq!(nested[&double], BTreeSet::from([double, inner]));
	assert_eq!(nested[&script], BTreeSet::from([script]));
	for (span, info) in tree.registry().iter().filter(|(_, i)| i.label != Label::ROOT) {
		let listed: BTreeSet<Label> = info.containing_labels.iter().copied().collect();
		assert_eq!(listed, nested[&info.label], "containment of {span}");
	}
}

#[test]
fn parse_registers_all_structure() {
	let tree = SpanTree::parse(r"{{a}}+x^{2}", &["+"]).unwrap();
	let spans: Vec<(Span, SpanKind, Label)> = tree
		.registry()
		.iter()
		.map(|(span, info)| (*span, info.kind, info.label))
		.collect();
	assert_eq!(
		spans,
		vec![
			(Span::new(0, 11), SpanKind::Normal, Label::new(0)),
			(Span::new(0, 5), SpanKind::Normal, Label::new(1)),
			(Span::new(8, 11), SpanKind::Normal, Label::new(2)),
			(Span::new(7, 11), SpanKind::Superscript, Label::new(2)),
			(Span::new(5, 6), SpanKind::Normal, Label::new(3)),
		]
	);
	assert_eq!(tree.specified_substrings(), &["{{a}}", "+"]);
}

#[test]
fn repeated_isolation_is_listed_once() {
	let tree = SpanTree::parse("a+b+a", &["a", "a", "+"]).unwrap();
	assert_eq!(tree.specified_substrings(), &["a", "+"]);
	assert_eq!(tree.all_isolated_substrings(), vec!["a+b+a", "a", "+"]);
}

#[test]
fn exact_isolation_is_containment_indexed() {
	let tree = SpanTree::parse("{a+b}", &["a+b"]).unwrap();
	assert_eq!(
		tree.containing_labels(&Span::new(1, 4)),
		Some([Label::new(1)].as_slice())
	);
	assert_eq!(
		tree.containing_labels(&Span::new(0, 5)),
		Some([Label::ROOT, Label::new(1)].as_slice())
	);
}

#[test]
fn crossing_isolations_fail_with_every_pair() {
	let err = SpanTree::parse("abcd", &["abc", "bcd"]).unwrap_err();
	let ParseError::OverlappingSpans { pairs } = err else {
		panic!("expected overlap, got {err:?}");
	};
	assert_eq!(pairs, vec![("abc".to_owned(), "bcd".to_owned())]);
}

#[test]
fn unmatched_brace_fails_before_scripts() {
	assert!(matches!(
		SpanTree::parse("x^{2", NO_SUBSTRINGS),
		Err(ParseError::UnmatchedBrace { .. })
	));
}

#[test]
fn annotation_wraps_scripts_and_groups() {
	let tree = SpanTree::parse("x_a^b", NO_SUBSTRINGS).unwrap();
	assert_eq!(
		tree.annotated_expression().unwrap(),
		r"x_{{\color[RGB]{0,0,2}a}}^{{\color[RGB]{0,0,3}b}}"
	);
}

fn arb_source() -> impl Strategy<Value = String> {
	let token = prop_oneof![
		Just("a"),
		Just("b"),
		Just("c"),
		Just("+"),
		Just("x^2"),
		Just("y_{ab}"),
		Just("{c}"),
		Just("{{d}}"),
		Just(r"\alpha_n"),
		Just(" "),
	];
	prop::collection::vec(token, 1..8).prop_map(|tokens| tokens.concat())
}

fn arb_substrings() -> impl Strategy<Value = Vec<&'static str>> {
	prop::collection::vec(prop_oneof![Just("a"), Just("b"), Just("+"), Just("c"), Just("d")], 0..4)
}

proptest! {
	/// Successful parses never contain partially overlapping spans.
	#[test]
	fn prop_parsed_spans_are_laminar(source in arb_source(), subs in arb_substrings()) {
		if let Ok(tree) = SpanTree::parse(&source, &subs) {
			let spans: Vec<Span> = tree.registry().spans().collect();
			for a in &spans {
				for b in &spans {
					prop_assert!(!a.crosses(*b), "{a} crosses {b} in {source:?}");
				}
			}
		}
	}

	/// Normal labels are exactly `0..N` in registration order.
	#[test]
	fn prop_labels_are_contiguous(source in arb_source(), subs in arb_substrings()) {
		if let Ok(tree) = SpanTree::parse(&source, &subs) {
			let labels: Vec<u32> = tree.registry().normal_spans().map(|(_, l)| l.get()).collect();
			let expected: Vec<u32> = (0..tree.registry().label_count()).collect();
			prop_assert_eq!(labels, expected);
		}
	}

	/// Each span's containing labels are the labels whose colour markers nest
	/// inside its own, or every label for the whole source.
	#[test]
	fn prop_containment_matches_marker_nesting(source in arb_source(), subs in arb_substrings()) {
		if let Ok(tree) = SpanTree::parse(&source, &subs) {
			let registry = tree.registry();
			let nested = nested_labels(&tree.annotated_expression().unwrap());
			let all: BTreeSet<Label> = registry.normal_spans().map(|(_, l)| l).collect();
			for (span, info) in registry.iter() {
				let listed: BTreeSet<Label> = info.containing_labels.iter().copied().collect();
				prop_assert_eq!(listed.len(), info.containing_labels.len(), "duplicates under {}", span);
				let expected = if info.label == Label::ROOT {
					all.clone()
				} else {
					nested.get(&info.label).cloned().unwrap_or_default()
				};
				prop_assert_eq!(listed, expected, "containment of {} in {:?}", span, source);
			}
		}
	}

	/// Removing the colour markers gives back the source exactly.
	#[test]
	fn prop_annotation_roundtrip(source in arb_source(), subs in arb_substrings()) {
		if let Ok(tree) = SpanTree::parse(&source, &subs) {
			let annotated = tree.annotated_expression().unwrap();
			prop_assert_eq!(strip_annotations(&annotated), source);
		}
	}
}
