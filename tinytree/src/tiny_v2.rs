//! Functions to read mappings in the "Tiny v2" format.
//!
//! # Reading
//! You can read a `.tiny` file using the [`read_file`] method, by passing a path.
//! If you already have a [`Read`]er, you can use the [`read`] method, or [`read_with`] for
//! giving [`LoadOptions`].
//!
//! It's recommended to check that the namespaces are indeed the ones expected.
//! See [`Namespaces::check_that`][crate::metadata::Namespaces::check_that] for more info.
//!
//! # Visiting
//! The reading is done by [`visit`]ing the file with a [`TinyVisitor`] building the tree. You can pass your own
//! visitor to it to get every element of the file as it's read, without building a tree.
//!
//! Every line is checked before it's given to the visitor: its indent, the number of fields, and whether the
//! element may appear where it does. The first violation ends the reading with an error naming the line.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::iter::Peekable;
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use crate::error::FormatError;
use crate::escape::{unescape, unescape_opt};
use crate::lines::{lines, TinyLine};
use crate::metadata::{read_header, Metadata, Namespace};
use crate::tree::builder::TreeBuilder;
use crate::tree::mappings::Mappings;
use crate::tree::names::{resolve, Names};
use crate::LoadOptions;

/// The deepest nesting is a comment on a parameter or local variable, at indent 3.
const MAX_DEPTH: usize = 4;

/// The kind of element a line declares.
///
/// The kind is determined by the first field after the indentation, with `c` meaning a class at the top level,
/// and a comment everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TinyState {
	/// `c names...`
	Class,
	/// `f desc names...`
	Field,
	/// `m desc names...`
	Method,
	/// `p index names...`
	Parameter,
	/// `v index start_offset table_index names...`
	LocalVariable,
	/// `c comment`
	Comment,
}

impl TinyState {
	fn get(indent: usize, token: &str) -> Result<TinyState> {
		Ok(match token {
			"c" if indent == 0 => TinyState::Class,
			"c" => TinyState::Comment,
			"f" => TinyState::Field,
			"m" => TinyState::Method,
			"p" => TinyState::Parameter,
			"v" => TinyState::LocalVariable,
			_ => bail!(FormatError::UnknownToken(token.to_owned())),
		})
	}

	fn name(self) -> &'static str {
		match self {
			TinyState::Class => "class",
			TinyState::Field => "field",
			TinyState::Method => "method",
			TinyState::Parameter => "parameter",
			TinyState::LocalVariable => "local variable",
			TinyState::Comment => "comment",
		}
	}

	/// The number of fields before the names, including the token.
	fn fixed_fields(self) -> usize {
		match self {
			TinyState::Class => 1,
			TinyState::Field | TinyState::Method | TinyState::Parameter => 2,
			TinyState::LocalVariable => 4,
			TinyState::Comment => 2,
		}
	}

	fn namespaced(self) -> bool {
		self != TinyState::Comment
	}

	/// Names for trailing namespaces may be left out, but at least the first namespace must be there.
	fn check_field_count(self, actual: usize, namespace_count: usize) -> Result<()> {
		let fixed = self.fixed_fields();

		if self.namespaced() {
			let max = fixed + namespace_count.max(1);
			if actual <= fixed || actual > max {
				bail!(FormatError::FieldCount { kind: self.name(), expected: format!("{} to {max}", fixed + 1), actual });
			}
		} else if actual != fixed {
			bail!(FormatError::FieldCount { kind: self.name(), expected: fixed.to_string(), actual });
		}
		Ok(())
	}

	fn check_stack(self, stack: &[Option<TinyState>; MAX_DEPTH], indent: usize) -> Result<()> {
		let parent = indent.checked_sub(1).and_then(|i| stack.get(i).copied().flatten());

		let allowed = indent < MAX_DEPTH && match self {
			TinyState::Class => indent == 0,
			TinyState::Field | TinyState::Method => indent == 1 && parent == Some(TinyState::Class),
			TinyState::Parameter | TinyState::LocalVariable => indent == 2 && parent == Some(TinyState::Method),
			TinyState::Comment => parent.is_some_and(|parent| parent != TinyState::Comment),
		};

		if !allowed {
			bail!(FormatError::IllegalNesting {
				kind: self.name(),
				indent,
				parent: parent.map_or("nothing", TinyState::name).to_owned(),
			});
		}
		Ok(())
	}

	fn names<'a>(self, fields: &'a [String], escaped: bool) -> Result<NameGetter<'a>> {
		let names = NameGetter::new(&fields[self.fixed_fields()..], escaped);
		let first_required = matches!(self, TinyState::Class | TinyState::Field | TinyState::Method);
		if first_required && names.names.first().map_or(true, |x| x.is_empty()) {
			bail!(FormatError::MissingFirstName(self.name()));
		}
		Ok(names)
	}

	fn visit<V>(self, visitor: &mut V, fields: &[String], escaped: bool) -> Result<()>
	where
		V: TinyVisitor + ?Sized,
	{
		match self {
			TinyState::Class => visitor.push_class(self.names(fields, escaped)?),
			TinyState::Field => {
				let desc = unescape_opt(&fields[1], escaped)?;
				visitor.push_field(self.names(fields, escaped)?, &desc)
			},
			TinyState::Method => {
				let desc = unescape_opt(&fields[1], escaped)?;
				visitor.push_method(self.names(fields, escaped)?, &desc)
			},
			TinyState::Parameter => {
				let index = parse_index("parameter index", &fields[1])?;
				visitor.push_parameter(self.names(fields, escaped)?, index)
			},
			TinyState::LocalVariable => {
				let index = parse_index("local variable index", &fields[1])?;
				let start_offset = parse_index("local variable start offset", &fields[2])?;
				let table_index = parse_table_index(&fields[3])?;
				visitor.push_local_variable(self.names(fields, escaped)?, index, start_offset, table_index)
			},
			TinyState::Comment => visitor.push_comment(&unescape(&fields[1])?),
		}
	}
}

fn parse_index(what: &'static str, value: &str) -> Result<usize> {
	value.parse()
		.map_err(|_| anyhow!(FormatError::InvalidInteger { what, value: value.to_owned() }))
}

/// `-1` stands for no index.
fn parse_table_index(value: &str) -> Result<Option<usize>> {
	const WHAT: &str = "local variable table index";

	match value.parse::<i64>() {
		Ok(-1) => Ok(None),
		Ok(index) => usize::try_from(index)
			.map(Some)
			.map_err(|_| anyhow!(FormatError::InvalidInteger { what: WHAT, value: value.to_owned() })),
		Err(_) => bail!(FormatError::InvalidInteger { what: WHAT, value: value.to_owned() }),
	}
}

/// Gives access to the names of the line currently visited.
///
/// Names are unescaped if the file has the `escaped-names` property. The names of namespaces left out at the
/// end of the line are not made up: [`NameGetter::raw_names`] only has the ones actually written.
#[derive(Debug, Clone, Copy)]
pub struct NameGetter<'a> {
	names: &'a [String],
	escaped: bool,
}

impl<'a> NameGetter<'a> {
	pub(crate) fn new(names: &'a [String], escaped: bool) -> NameGetter<'a> {
		NameGetter { names, escaped }
	}

	/// The number of names written.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// The name in the given namespace, falling back to earlier namespaces for empty names.
	pub fn get(&self, namespace: Namespace) -> Result<Cow<'a, str>> {
		unescape_opt(resolve(self.names, namespace.id()), self.escaped)
	}

	/// The name as written for the given namespace, possibly empty.
	pub fn get_raw(&self, namespace: Namespace) -> Result<Cow<'a, str>> {
		let name = self.names.get(namespace.id()).map_or("", |x| x.as_str());
		unescape_opt(name, self.escaped)
	}

	/// All names as written.
	pub fn raw_names(&self) -> Result<Vec<String>> {
		self.names.iter()
			.map(|name| unescape_opt(name, self.escaped).map(Cow::into_owned))
			.collect()
	}

	/// All names, with empty names filled in from the namespace before.
	pub fn all_names(&self) -> Result<Vec<String>> {
		let names = self.to_names()?;
		Ok(names.all_names().into_iter().map(String::from).collect())
	}

	pub fn to_names(&self) -> Result<Names> {
		self.raw_names().map(Names::from)
	}
}

/// A visitor for the elements of a tiny v2 file, see [`visit`].
///
/// Every `push_*` opens a new element, and [`TinyVisitor::pop`] closes elements again. Comments are pushed too,
/// and closed by a `pop` like any other element.
///
/// All methods do nothing by default.
pub trait TinyVisitor {
	/// Called once with the header, before any element.
	fn start(&mut self, metadata: &Metadata) -> Result<()> {
		let _ = metadata;
		Ok(())
	}

	fn push_class(&mut self, names: NameGetter<'_>) -> Result<()> {
		let _ = names;
		Ok(())
	}

	/// `desc` is the descriptor in the first namespace.
	fn push_field(&mut self, names: NameGetter<'_>, desc: &str) -> Result<()> {
		let _ = (names, desc);
		Ok(())
	}

	/// `desc` is the descriptor in the first namespace.
	fn push_method(&mut self, names: NameGetter<'_>, desc: &str) -> Result<()> {
		let _ = (names, desc);
		Ok(())
	}

	fn push_parameter(&mut self, names: NameGetter<'_>, index: usize) -> Result<()> {
		let _ = (names, index);
		Ok(())
	}

	fn push_local_variable(
		&mut self,
		names: NameGetter<'_>,
		index: usize,
		start_offset: usize,
		table_index: Option<usize>,
	) -> Result<()> {
		let _ = (names, index, start_offset, table_index);
		Ok(())
	}

	/// The comment is always unescaped.
	fn push_comment(&mut self, comment: &str) -> Result<()> {
		let _ = comment;
		Ok(())
	}

	/// Closes the last `count` elements pushed.
	fn pop(&mut self, count: usize) -> Result<()> {
		let _ = count;
		Ok(())
	}
}

/// Reads a `.tiny` file (tiny v2), by opening the file given by the path.
///
/// ```
/// use std::path::Path;
///
/// let path = Path::new("tests/input/basic.tiny");
/// let mappings = tinytree::tiny_v2::read_file(path).unwrap();
///
/// mappings.metadata().namespaces.check_that(&["official", "intermediary", "named"]).unwrap();
/// assert_eq!(mappings.classes().len(), 2);
/// ```
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tiny v2 file", path.as_ref()))
}

/// Reads the tiny v2 format, from the given reader, building the full tree.
///
/// ```
/// use tinytree::tree::Mapped;
///
/// let string = "tiny\t2\t0\tofficial\tnamed\n\
///     c\ta\tcom/example/Foo\n\
///     \tf\tI\tb\tsize\n\
///     \tm\t(La;)V\tc\tcopyFrom\n";
///
/// let mappings = tinytree::tiny_v2::read(string.as_bytes()).unwrap();
///
/// let named = mappings.get_namespace("named").unwrap();
/// let class = mappings.get_class("a").unwrap();
/// assert_eq!(class.get_name(named), "com/example/Foo");
/// assert_eq!(mappings.get_desc(&class.methods[0], named), "(Lcom/example/Foo;)V");
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	read_with(reader, LoadOptions::default())
}

/// Reads the tiny v2 format, from the given reader, with the given options.
pub fn read_with(reader: impl Read, options: LoadOptions) -> Result<Mappings> {
	let mut lines = lines(BufReader::new(reader));
	read_lines(&mut lines, options)
}

pub(crate) fn read_lines<I>(lines: &mut Peekable<I>, options: LoadOptions) -> Result<Mappings>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	let mut builder = TreeBuilder::new(options);
	visit_lines(lines, &mut builder)?;
	builder.finish()
}

/// Reads only the header of the tiny v2 format.
///
/// ```
/// let string = "tiny\t2\t0\tofficial\tnamed\n\tescaped-names\nc\ta\tb\n";
///
/// let metadata = tinytree::tiny_v2::read_metadata(string.as_bytes()).unwrap();
/// assert_eq!(metadata.namespaces.len(), 2);
/// assert!(metadata.escaped_names());
/// ```
pub fn read_metadata(reader: impl Read) -> Result<Metadata> {
	let mut lines = lines(BufReader::new(reader));
	read_header(&mut lines).context("error in the header")
}

/// Reads the tiny v2 format, giving every element read to the visitor.
pub fn visit<V>(reader: impl Read, visitor: &mut V) -> Result<()>
where
	V: TinyVisitor + ?Sized,
{
	let mut lines = lines(BufReader::new(reader));
	visit_lines(&mut lines, visitor)
}

fn visit_lines<I, V>(lines: &mut Peekable<I>, visitor: &mut V) -> Result<()>
where
	I: Iterator<Item=Result<TinyLine>>,
	V: TinyVisitor + ?Sized,
{
	let metadata = read_header(lines)
		.and_then(|metadata| {
			visitor.start(&metadata)?;
			Ok(metadata)
		})
		.context("error in the header")?;

	let namespace_count = metadata.namespaces.len();
	let escaped = metadata.escaped_names();

	let mut last_indent: Option<usize> = None;
	let mut stack: [Option<TinyState>; MAX_DEPTH] = [None; MAX_DEPTH];
	let mut line_count = 0usize;

	for line in lines {
		let line = line?;
		let line_number = line.get_line_number();

		visit_line(&line, &mut last_indent, &mut stack, namespace_count, escaped, visitor)
			.with_context(|| anyhow!("error on line {line_number}: {:?}", line.raw()))?;

		line_count += 1;
	}

	if let Some(last_indent) = last_indent {
		visitor.pop(last_indent + 1)
			.context("error when closing the elements at the end of the input")?;
	}

	debug!("visited {line_count} lines in namespaces {:?}", metadata.namespaces);

	Ok(())
}

fn visit_line<V>(
	line: &TinyLine,
	last_indent: &mut Option<usize>,
	stack: &mut [Option<TinyState>; MAX_DEPTH],
	namespace_count: usize,
	escaped: bool,
	visitor: &mut V,
) -> Result<()>
where
	V: TinyVisitor + ?Sized,
{
	let indent = line.get_idents();
	let max = last_indent.map_or(0, |last| last + 1);
	if indent > max {
		bail!(FormatError::BrokenIndent { max, actual: indent });
	}

	if let Some(last) = *last_indent {
		if indent <= last {
			visitor.pop(last - indent + 1)?;
		}
	}
	*last_indent = Some(indent);

	let state = TinyState::get(indent, line.first_field())?;
	state.check_field_count(line.fields.len(), namespace_count)?;
	state.check_stack(stack, indent)?;

	stack[indent] = Some(state);

	state.visit(visitor, &line.fields, escaped)
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::error::FormatError;
	use super::{parse_table_index, TinyState, MAX_DEPTH};

	#[test]
	fn tokens() {
		assert_eq!(TinyState::get(0, "c").ok(), Some(TinyState::Class));
		assert_eq!(TinyState::get(1, "c").ok(), Some(TinyState::Comment));
		assert_eq!(TinyState::get(3, "c").ok(), Some(TinyState::Comment));
		assert_eq!(TinyState::get(0, "m").ok(), Some(TinyState::Method));
		assert_eq!(TinyState::get(2, "v").ok(), Some(TinyState::LocalVariable));

		let err = TinyState::get(1, "x").unwrap_err();
		assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::UnknownToken("x".to_owned())));
	}

	#[test]
	fn field_counts() {
		// three namespaces
		assert!(TinyState::Class.check_field_count(2, 3).is_ok());
		assert!(TinyState::Class.check_field_count(4, 3).is_ok());
		assert!(TinyState::Class.check_field_count(1, 3).is_err());
		assert!(TinyState::Class.check_field_count(5, 3).is_err());

		assert!(TinyState::Field.check_field_count(3, 3).is_ok());
		assert!(TinyState::Field.check_field_count(6, 3).is_err());

		assert!(TinyState::LocalVariable.check_field_count(5, 3).is_ok());
		assert!(TinyState::LocalVariable.check_field_count(7, 3).is_ok());
		assert!(TinyState::LocalVariable.check_field_count(4, 3).is_err());

		assert!(TinyState::Comment.check_field_count(2, 3).is_ok());
		assert!(TinyState::Comment.check_field_count(3, 3).is_err());
	}

	#[test]
	fn nesting() {
		let mut stack = [None; MAX_DEPTH];
		assert!(TinyState::Class.check_stack(&stack, 0).is_ok());
		assert!(TinyState::Field.check_stack(&stack, 0).is_err());
		assert!(TinyState::Comment.check_stack(&stack, 0).is_err());

		stack[0] = Some(TinyState::Class);
		assert!(TinyState::Method.check_stack(&stack, 1).is_ok());
		assert!(TinyState::Comment.check_stack(&stack, 1).is_ok());
		assert!(TinyState::Parameter.check_stack(&stack, 1).is_err());

		stack[1] = Some(TinyState::Field);
		assert!(TinyState::Parameter.check_stack(&stack, 2).is_err());
		assert!(TinyState::Comment.check_stack(&stack, 2).is_ok());

		stack[1] = Some(TinyState::Method);
		stack[2] = Some(TinyState::Parameter);
		assert!(TinyState::Comment.check_stack(&stack, 3).is_ok());

		stack[3] = Some(TinyState::Comment);
		let err = TinyState::Comment.check_stack(&stack, 4).unwrap_err();
		assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::IllegalNesting {
			kind: "comment",
			indent: 4,
			parent: "comment".to_owned(),
		}));
	}

	#[test]
	fn table_index() {
		assert_eq!(parse_table_index("-1").ok(), Some(None));
		assert_eq!(parse_table_index("0").ok(), Some(Some(0)));
		assert_eq!(parse_table_index("12").ok(), Some(Some(12)));
		assert!(parse_table_index("-2").is_err());
		assert!(parse_table_index("x").is_err());
	}
}
