//! The header of a mappings file: the version, the namespaces and the properties.

use std::fmt::{Debug, Formatter};
use std::iter::Peekable;
use anyhow::{anyhow, bail, Context, Error, Result};
use indexmap::{IndexMap, IndexSet};
use log::{trace, warn};
use crate::error::{FormatError, LookupError};
use crate::lines::TinyLine;

const HEADER_MARKER: &str = "tiny";
pub(crate) const ESCAPED_NAMES_PROPERTY: &str = "escaped-names";

/// Describes a given namespace of a mapping tree.
///
/// Obtained from [`Namespaces::get_namespace`] (or the same method on [`Metadata`] and
/// [`Mappings`][crate::tree::mappings::Mappings]), so that it's always in range for the mappings it came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(pub(crate) usize);

impl Namespace {
	/// The first namespace. Every mappings file has it, and it's the one descriptors are written in.
	pub const FIRST: Namespace = Namespace(0);

	/// The position of this namespace in the header.
	pub fn id(self) -> usize {
		self.0
	}
}

/// The names of the namespaces, in the order of the header.
#[derive(Clone, PartialEq, Default)]
pub struct Namespaces {
	names: IndexSet<String>,
}

impl Namespaces {
	pub fn names(&self) -> impl Iterator<Item=&str> {
		self.names.iter().map(|x| x.as_str())
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Looks up a namespace by its name.
	///
	/// Fails with a [`LookupError`] if there's no such namespace.
	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		match self.names.get_index_of(name) {
			Some(id) => Ok(Namespace(id)),
			None => bail!(LookupError {
				name: name.to_owned(),
				namespaces: self.names.iter().cloned().collect(),
			}),
		}
	}

	/// Gets the namespace at the given position, if there's one.
	pub fn get_namespace_by_id(&self, id: usize) -> Result<Namespace> {
		if id >= self.names.len() {
			bail!("cannot create namespace with id larger or equal to number of namespaces: {id} >= {}", self.names.len());
		}
		Ok(Namespace(id))
	}

	/// The name of the given namespace.
	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		self.names.get_index(namespace.0).map(|x| x.as_str())
	}

	/// Returns an error if the names of `self` aren't the names given in the argument.
	/// This can be used to check that after reading mappings, you have the correct namespaces in them.
	pub fn check_that(&self, names: &[&str]) -> Result<()> {
		if !self.names.iter().eq(names.iter()) {
			bail!("expected namespaces {names:?}, got {self:?}");
		}
		Ok(())
	}
}

impl Debug for Namespaces {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(&self.names)
			.finish()
	}
}

impl TryFrom<Vec<String>> for Namespaces {
	type Error = Error;

	fn try_from(value: Vec<String>) -> Result<Self> {
		if value.iter().any(|i| i.is_empty()) {
			bail!(FormatError::EmptyNamespace(value));
		}

		let mut names = IndexSet::with_capacity(value.len());
		for name in value {
			if names.contains(&name) {
				bail!(FormatError::DuplicateNamespace(name));
			}
			names.insert(name);
		}

		Ok(Namespaces { names })
	}
}

/// Metadata of a mappings file. Read from the header, and immutable after that.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
	/// Supposed to be non-negative, but a negative value may appear.
	pub major_version: i32,
	pub minor_version: i32,
	pub namespaces: Namespaces,
	/// The properties in the order they appear in. A key without a value maps to `None`.
	pub properties: IndexMap<String, Option<String>>,
}

impl Metadata {
	/// The position of the namespace with the given name. See [`Namespaces::get_namespace`].
	pub fn index(&self, namespace: &str) -> Result<usize> {
		self.namespaces.get_namespace(namespace).map(Namespace::id)
	}

	pub fn get_namespace(&self, namespace: &str) -> Result<Namespace> {
		self.namespaces.get_namespace(namespace)
	}

	/// Whether the names (and descriptors) use the escape scheme, as declared with the `escaped-names` property.
	pub fn escaped_names(&self) -> bool {
		self.properties.contains_key(ESCAPED_NAMES_PROPERTY)
	}
}

fn parse_version(which: &'static str, value: &str) -> Result<i32> {
	value.parse()
		.map_err(|_| anyhow!(FormatError::InvalidVersion { which, value: value.to_owned() }))
}

/// Reads the header line and the property lines following it.
///
/// The first line that is not part of the header is left in `lines`.
pub(crate) fn read_header<I>(lines: &mut Peekable<I>) -> Result<Metadata>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	let header = match lines.next() {
		Some(header) => header?,
		None => bail!(FormatError::EmptyInput),
	};

	let fields = &header.fields;
	if header.get_idents() != 0 || fields.len() < 4 || fields[0] != HEADER_MARKER {
		bail!(FormatError::UnsupportedFormat(header.raw().to_owned()));
	}

	let major_version = parse_version("major", &fields[1])?;
	let minor_version = parse_version("minor", &fields[2])?;
	if major_version != 2 {
		warn!("reading tiny file with major version {major_version}, only version 2 is known");
	}

	let namespaces = Namespaces::try_from(fields[3..].to_vec())?;

	let mut properties = IndexMap::new();
	while let Some(line) = lines.next_if(|line| line.as_ref().is_ok_and(|line| line.get_idents() != 0)) {
		let line = line?;
		let line_number = line.get_line_number();

		read_property(&line, &mut properties)
			.with_context(|| anyhow!("error in the header on line {line_number}: {:?}", line.raw()))?;
	}

	Ok(Metadata { major_version, minor_version, namespaces, properties })
}

fn read_property(line: &TinyLine, properties: &mut IndexMap<String, Option<String>>) -> Result<()> {
	if line.get_idents() != 1 {
		bail!(FormatError::HeaderIndent(line.get_idents()));
	}

	let key = line.first_field().to_owned();
	let value = line.fields.get(1).cloned();

	trace!("read header property {key:?} with value {value:?}");
	properties.insert(key, value);

	Ok(())
}
