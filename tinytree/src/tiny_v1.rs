//! Reading of the legacy "Tiny v1" format.
//!
//! The format has a header `v1\t<namespaces>...`, followed by flat lines of the form
//! `CLASS\t<names>...`, `FIELD\t<owner>\t<desc>\t<names>...` and `METHOD\t<owner>\t<desc>\t<names>...`,
//! where the owner and the descriptor are in the first namespace.
//!
//! Reading is lenient: lines with less than two fields and lines of unknown kinds are skipped, and fields or
//! methods of classes that were never declared get a class with just the name in the first namespace.

use std::io::{BufReader, Read};
use std::iter::Peekable;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use log::{debug, trace};
use crate::error::FormatError;
use crate::lines::{lines, TinyLine};
use crate::metadata::{Metadata, Namespaces};
use crate::tree::mappings::{ClassMapping, FieldMapping, MethodMapping, Mappings};
use crate::tree::names::Names;

const HEADER_MARKER: &str = "v1";

/// Reads the tiny v1 format, from the given reader.
///
/// ```
/// use tinytree::tree::Mapped;
///
/// let string = "v1\tofficial\tnamed\n\
///     CLASS\ta\tcom/example/Foo\n\
///     FIELD\ta\tLa;\tb\tself\n";
///
/// let mappings = tinytree::tiny_v1::read(string.as_bytes()).unwrap();
///
/// let named = mappings.get_namespace("named").unwrap();
/// let field = &mappings.classes()["a"].fields[0];
/// assert_eq!(field.get_name(named), "self");
/// assert_eq!(mappings.get_desc(field, named), "Lcom/example/Foo;");
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut lines = lines(BufReader::new(reader));
	read_lines(&mut lines)
}

pub(crate) fn read_lines<I>(lines: &mut Peekable<I>) -> Result<Mappings>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	let header = match lines.next() {
		Some(header) => header?,
		None => bail!(FormatError::EmptyInput),
	};
	let header_fields = split_fields(header.raw());
	if header_fields.len() < 2 || header_fields[0] != HEADER_MARKER {
		bail!(FormatError::UnsupportedFormat(header.raw().to_owned()));
	}

	let namespaces = Namespaces::try_from(header_fields[1..].iter().map(|x| x.to_string()).collect::<Vec<_>>())
		.context("error in the header")?;
	let namespace_count = namespaces.len();

	let metadata = Metadata {
		major_version: 1,
		minor_version: 0,
		namespaces,
		properties: IndexMap::new(),
	};
	let mut mappings = Mappings::new(metadata);

	// members are added after all classes, so that they can come before their class
	let mut fields = Vec::new();
	let mut methods = Vec::new();

	for line in lines {
		let line = line?;
		let line_number = line.get_line_number();

		let fields_of_line = split_fields(line.raw());

		if fields_of_line.len() < 2 {
			trace!("skipping short line {line_number}: {:?}", line.raw());
			continue;
		}

		let result = match fields_of_line[0] {
			"CLASS" => read_names("class", &fields_of_line[1..], namespace_count)
				.map(|names| add_class(&mut mappings, names)),
			"FIELD" => read_member("field", &fields_of_line[1..], namespace_count)
				.map(|member| fields.push(member)),
			"METHOD" => read_member("method", &fields_of_line[1..], namespace_count)
				.map(|member| methods.push(member)),
			kind => {
				trace!("skipping line {line_number} of unknown kind {kind:?}");
				Ok(())
			},
		};

		result.with_context(|| anyhow!("error on line {line_number}: {:?}", line.raw()))?;
	}

	for Member { owner, desc, names } in fields {
		owner_class(&mut mappings, owner).fields.push(FieldMapping::new(desc, names));
	}
	for Member { owner, desc, names } in methods {
		owner_class(&mut mappings, owner).methods.push(MethodMapping::new(desc, names));
	}

	debug!("read {} classes from tiny v1 file", mappings.classes.len());

	Ok(mappings)
}

/// Splits a line at the tabs, leaving out empty fields at the end.
///
/// There's no indentation in this format, leading tabs are part of the first field.
fn split_fields(line: &str) -> Vec<&str> {
	let mut fields: Vec<&str> = line.split('\t').collect();
	while fields.len() > 1 && fields.last() == Some(&"") {
		fields.pop();
	}
	fields
}

struct Member {
	owner: String,
	desc: String,
	names: Names,
}

fn read_names(kind: &'static str, names: &[&str], namespace_count: usize) -> Result<Names> {
	if names.len() > namespace_count {
		bail!(FormatError::FieldCount {
			kind,
			expected: format!("at most {namespace_count} names"),
			actual: names.len(),
		});
	}
	if names.first().map_or(true, |x| x.is_empty()) {
		bail!(FormatError::MissingFirstName(kind));
	}
	Ok(Names::from(names.iter().map(|x| x.to_string()).collect::<Vec<_>>()))
}

/// Reads `<owner>\t<desc>\t<names>...`.
fn read_member(kind: &'static str, fields: &[&str], namespace_count: usize) -> Result<Member> {
	let [owner, desc, names @ ..] = fields else {
		bail!(FormatError::FieldCount { kind, expected: "at least 3".to_owned(), actual: fields.len() + 1 });
	};

	Ok(Member {
		owner: owner.to_string(),
		desc: desc.to_string(),
		names: read_names(kind, names, namespace_count)?,
	})
}

/// Adds a class, replacing the names of one declared before with the same name.
fn add_class(mappings: &mut Mappings, names: Names) {
	let name = names.first_name().to_owned();
	if let Some(old) = mappings.classes.insert(name, ClassMapping::new(names)) {
		debug!("class {:?} is declared again", old.names.first_name());
	}
}

fn owner_class(mappings: &mut Mappings, owner: String) -> &mut ClassMapping {
	mappings.classes.entry(owner)
		.or_insert_with_key(|owner| ClassMapping::new(Names::from(vec![owner.clone()])))
}
