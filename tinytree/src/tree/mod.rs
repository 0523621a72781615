//! The mapping tree, and the visitor building it.

use crate::metadata::Namespace;
use crate::tree::names::Names;

pub mod names;
pub mod mappings;
pub mod builder;

/// An element that has names in the namespaces, and that can have a comment.
pub trait Mapped {
	fn get_names(&self) -> &Names;

	/// The comment (javadoc) on the element, if there is one.
	fn get_comment(&self) -> Option<&str>;

	/// The name in the given namespace, see [`Names::get`].
	fn get_name(&self, namespace: Namespace) -> &str {
		self.get_names().get(namespace)
	}

	/// The name as written in the given namespace, see [`Names::get_raw`].
	fn get_raw_name(&self, namespace: Namespace) -> &str {
		self.get_names().get_raw(namespace)
	}
}

/// An element with a descriptor, so fields and methods.
///
/// Use [`Mappings::get_desc`][mappings::Mappings::get_desc] to get the descriptor in other namespaces.
pub trait HasDescriptor: Mapped {
	/// The descriptor in the first namespace.
	fn get_raw_desc(&self) -> &str;
}
