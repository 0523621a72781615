use std::fmt::{Debug, Formatter};
use crate::metadata::Namespace;

/// Resolves the name in namespace `index`: the raw entry if it's non-empty, otherwise the closest
/// non-empty entry of an earlier namespace.
///
/// An `index` past the end is clamped to the last entry. If no entry up to and including the first one is
/// non-empty, the result is empty.
pub(crate) fn resolve<S: AsRef<str>>(names: &[S], index: usize) -> &str {
	let end = index.min(names.len().saturating_sub(1));

	names.get(..=end)
		.into_iter()
		.flatten()
		.rev()
		.map(|x| x.as_ref())
		.find(|x| !x.is_empty())
		.unwrap_or("")
}

/// A struct storing the names of one element, one for each namespace.
///
/// An empty entry means that the name is the same as the one of the namespace before. Namespaces at the end may
/// not be written at all, then they also take the name of the last written one.
///
/// Invariants:
/// the length is at most the number of namespaces of the mappings this belongs to
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Names {
	names: Vec<String>,
}

impl Names {
	/// The name in the given namespace, falling back to the names of earlier namespaces if there's none.
	pub fn get(&self, namespace: Namespace) -> &str {
		resolve(&self.names, namespace.0)
	}

	/// The name as written for the given namespace. May be empty if the name is inherited.
	pub fn get_raw(&self, namespace: Namespace) -> &str {
		self.names.get(namespace.0).map_or("", |x| x.as_str())
	}

	/// The name in the first namespace.
	pub fn first_name(&self) -> &str {
		self.get_raw(Namespace::FIRST)
	}

	/// All names as written, without filling in the inherited ones.
	pub fn raw_names(&self) -> &[String] {
		&self.names
	}

	/// All names as written, with empty entries filled in from the namespace before.
	pub fn all_names(&self) -> Vec<&str> {
		let mut all: Vec<&str> = Vec::with_capacity(self.names.len());
		for name in &self.names {
			let name = match all.last() {
				Some(&last) if name.is_empty() => last,
				_ => name.as_str(),
			};
			all.push(name);
		}
		all
	}
}

impl Debug for Names {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(&self.names)
			.finish()
	}
}

impl From<Vec<String>> for Names {
	fn from(names: Vec<String>) -> Self {
		Names { names }
	}
}

impl<const N: usize> From<[&str; N]> for Names {
	fn from(value: [&str; N]) -> Self {
		Names { names: value.map(String::from).to_vec() }
	}
}
