//! Span discovery for LaTeX-like math markup.
//!
//! [`SpanTree::parse`] breaks a source string into a laminar family of byte
//! spans (brace groups, scripts, and caller-requested substrings), labels each
//! independently colourable span, and can rewrite the source so that every
//! labelled span is wrapped in a colour directive encoding its label.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. [`brace::match_braces`] pairs structural braces.
//! 2. [`isolate::isolate_double_braces`] registers `{{...}}` groups.
//! 3. [`script::isolate_scripts`] registers `_`/`^` wrappers and their content.
//! 4. [`isolate::isolate_substrings`] registers requested literals.
//! 5. [`overlap::validate_laminar`] rejects partially overlapping spans.
//! 6. [`containment::index_containment`] records which labels each span covers.

pub mod annotate;
pub mod brace;
pub mod containment;
pub mod error;
pub mod isolate;
pub mod overlap;
pub mod registry;
pub mod script;
mod tree;

pub use annotate::annotate;
pub use error::{ParseError, Result};
pub use registry::{SpanInfo, SpanRegistry};
pub use tree::SpanTree;
