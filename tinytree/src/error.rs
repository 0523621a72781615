//! The error types that end up at the root of a failed read.
//!
//! All functions of this crate return [`anyhow::Result`], with context describing where the failure happened
//! (for example the line that was being read). The root cause is one of the types here, so you can use
//! [`anyhow::Error::downcast_ref`] to tell a broken file apart from asking for a namespace that doesn't exist.

use thiserror::Error;

/// The input is not a well-formed mappings file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
	#[error("empty input, expected a header line")]
	EmptyInput,
	#[error("unsupported format with header {0:?}")]
	UnsupportedFormat(String),
	#[error("invalid {which} version {value:?}")]
	InvalidVersion { which: &'static str, value: String },
	#[error("found empty namespace name in {0:?}, every namespace name must be non-empty")]
	EmptyNamespace(Vec<String>),
	#[error("duplicate namespace {0:?}")]
	DuplicateNamespace(String),
	#[error("invalid indent in header, expected at most 1, got {0}")]
	HeaderIndent(usize),
	#[error("broken indent, expected at most {max}, got {actual}")]
	BrokenIndent { max: usize, actual: usize },
	#[error("unknown identifier {0:?}")]
	UnknownToken(String),
	#[error("wrong number of fields ({actual}) for a {kind}, expected {expected}")]
	FieldCount { kind: &'static str, expected: String, actual: usize },
	#[error("a {kind} isn't allowed at indent {indent} inside of {parent}")]
	IllegalNesting { kind: &'static str, indent: usize, parent: String },
	#[error("no name for the first namespace of a {0}")]
	MissingFirstName(&'static str),
	#[error("invalid {what} {value:?}, expected an integer")]
	InvalidInteger { what: &'static str, value: String },
	#[error("incomplete escape sequence at the end of {0:?}")]
	IncompleteEscape(String),
	#[error("invalid escape sequence \\{escape} in {string:?}")]
	InvalidEscape { escape: char, string: String },
	#[error("nothing to attach the comment to")]
	NothingToComment,
	#[error("commenting on a comment")]
	CommentOnComment,
	#[error("only one comment is allowed, got {old:?} and {new:?}")]
	DuplicateComment { old: String, new: String },
	#[error("a {0} needs an enclosing {1}")]
	NoEnclosing(&'static str, &'static str),
	#[error("cannot close {count} levels, only {open} are open")]
	PopUnderflow { count: usize, open: usize },
}

/// A namespace name was asked for that the mappings don't declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot find namespace with name {name:?}, only got {namespaces:?}")]
pub struct LookupError {
	pub name: String,
	pub namespaces: Vec<String>,
}
