//! Remappers for remapping class names, descriptors, fields and methods.
//!
//! For remapping just classes and descriptors, you're interested in [`ClassRemapper`].
//! If you also want to remap field names and method names, use the [`MemberRemapper`].
//!
//! The [`DescriptorMapper`] (from [`Mappings::descriptor_mapper`]) maps from the first namespace, which is
//! what descriptors in the tree are written in. The [`SimpleRemapper`] (from [`Mappings::remapper`]) maps
//! between any two namespaces, and is cached inside the [`Mappings`].
//!
//! # What is a "remapper"?
//! A remapper answers the question for you "what is the name of X in namespace Y?"
//!
//! Remapping never fails: names without a mapping stay as they are, and a malformed descriptor is given back
//! unchanged.

use std::borrow::Cow;
use std::sync::Arc;
use anyhow::Result;
use indexmap::{Equivalent, IndexMap};
use crate::metadata::Namespace;
use crate::tree::mappings::{ClassMapping, Mappings};
use crate::tree::Mapped;

pub mod cache;

/// A remapper supporting remapping of class names and descriptors.
pub trait ClassRemapper {
	/// Maps a class name to a new one, if the mapping exists.
	///
	/// If the mapping doesn't exist, returns `None`.
	fn map_class_fail(&self, class: &str) -> Option<&str>;

	/// Maps a class name to a new one, if the mapping doesn't exist, return the old one.
	///
	/// Do not implement this yourself.
	fn map_class<'a>(&'a self, class: &'a str) -> &'a str {
		self.map_class_fail(class).unwrap_or(class)
	}

	/// Maps any class name, including array class names like `[Ljava/lang/Object;`.
	///
	/// Do not implement this yourself.
	fn map_class_any<'a>(&'a self, class: &'a str) -> Cow<'a, str> {
		if class.starts_with('[') {
			// array class names are field descriptors
			self.map_desc(class)
		} else {
			Cow::Borrowed(self.map_class(class))
		}
	}

	/// Maps a field or method descriptor, by mapping every `L...;` class name in it.
	///
	/// Do not implement this yourself.
	fn map_desc<'d>(&self, desc: &'d str) -> Cow<'d, str> {
		map_desc(self, desc)
	}
}

/// Maps all class names in a descriptor.
///
/// Everything except the class names between `L` and `;` is copied over. If there's an `L` without a
/// following `;`, the descriptor isn't valid and is returned as is.
pub fn map_desc<'d, R>(remapper: &R, desc: &'d str) -> Cow<'d, str>
where
	R: ClassRemapper + ?Sized,
{
	let Some(mut start) = desc.find('L') else {
		return Cow::Borrowed(desc);
	};

	let mut s = String::with_capacity(desc.len() + desc.len() / 5);
	let mut copied = 0;

	loop {
		let Some(end) = desc[start + 1..].find(';').map(|x| start + 1 + x) else {
			return Cow::Borrowed(desc);
		};

		// everything up to and including the `L`
		s.push_str(&desc[copied..=start]);
		s.push_str(remapper.map_class(&desc[start + 1..end]));
		s.push(';');
		copied = end + 1;

		match desc[copied..].find('L') {
			Some(next) => start = copied + next,
			None => break,
		}
	}

	s.push_str(&desc[copied..]);

	Cow::Owned(s)
}

/// Maps class names from the first namespace to another one, by looking them up in the classes of a tree.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorMapper<'a> {
	classes: &'a IndexMap<String, ClassMapping>,
	namespace: Namespace,
}

impl<'a> DescriptorMapper<'a> {
	pub fn new(classes: &'a IndexMap<String, ClassMapping>, namespace: Namespace) -> DescriptorMapper<'a> {
		DescriptorMapper { classes, namespace }
	}
}

impl ClassRemapper for DescriptorMapper<'_> {
	fn map_class_fail(&self, class: &str) -> Option<&str> {
		self.classes.get(class)
			.map(|class| class.get_name(self.namespace))
	}
}

/// A remapper supporting remapping fields and methods, as well as class names and descriptors.
///
/// If you only want to remap class names and descriptors, consider using [`ClassRemapper`] instead.
pub trait MemberRemapper: ClassRemapper {
	/// Maps a field name to a new one, if the mapping exists.
	///
	/// The owner, name and descriptor are all in the namespace mapped from.
	fn map_field_fail(&self, owner: &str, name: &str, desc: &str) -> Option<&str>;

	/// Maps a method name to a new one, if the mapping exists.
	///
	/// The owner, name and descriptor are all in the namespace mapped from.
	fn map_method_fail(&self, owner: &str, name: &str, desc: &str) -> Option<&str>;

	/// Maps a field name to a new one, if the mapping doesn't exist, return the old one.
	///
	/// Do not implement this yourself.
	fn map_field_name<'a>(&'a self, owner: &str, name: &'a str, desc: &str) -> &'a str {
		self.map_field_fail(owner, name, desc).unwrap_or(name)
	}

	/// Maps a method name to a new one, if the mapping doesn't exist, return the old one.
	///
	/// Do not implement this yourself.
	fn map_method_name<'a>(&'a self, owner: &str, name: &'a str, desc: &str) -> &'a str {
		self.map_method_fail(owner, name, desc).unwrap_or(name)
	}

	/// Maps a reference to a field, taking care of the owner and the descriptor as well.
	///
	/// Do not implement this yourself.
	fn map_field_ref(&self, field: &MemberRef) -> MemberRef {
		MemberRef {
			owner: self.map_class(&field.owner).to_owned(),
			name: self.map_field_name(&field.owner, &field.name, &field.desc).to_owned(),
			desc: self.map_desc(&field.desc).into_owned(),
		}
	}

	/// Maps a reference to a method, taking care of the owner and the descriptor as well.
	///
	/// Do not implement this yourself.
	fn map_method_ref(&self, method: &MemberRef) -> MemberRef {
		MemberRef {
			owner: self.map_class(&method.owner).to_owned(),
			name: self.map_method_name(&method.owner, &method.name, &method.desc).to_owned(),
			desc: self.map_desc(&method.desc).into_owned(),
		}
	}
}

/// A reference to a field or method: the class owning it, its name and its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberRef {
	pub owner: String,
	pub name: String,
	pub desc: String,
}

impl MemberRef {
	pub fn new(owner: impl Into<String>, name: impl Into<String>, desc: impl Into<String>) -> MemberRef {
		MemberRef { owner: owner.into(), name: name.into(), desc: desc.into() }
	}
}

/// Borrowed form of [`MemberRef`] for looking up without allocating.
///
/// Hashes the same as a [`MemberRef`] with the same contents.
#[derive(Debug, Hash)]
struct MemberRefReq<'a> {
	owner: &'a str,
	name: &'a str,
	desc: &'a str,
}

impl Equivalent<MemberRef> for MemberRefReq<'_> {
	fn equivalent(&self, key: &MemberRef) -> bool {
		self.owner == key.owner && self.name == key.name && self.desc == key.desc
	}
}

/// A remapper between two namespaces of a tree, with all the lookup tables built up front.
#[derive(Debug, Clone)]
pub struct SimpleRemapper {
	from: Namespace,
	to: Namespace,
	classes: IndexMap<String, String>,
	fields: IndexMap<MemberRef, String>,
	methods: IndexMap<MemberRef, String>,
}

impl SimpleRemapper {
	pub fn new(mappings: &Mappings, from: Namespace, to: Namespace) -> SimpleRemapper {
		let mut classes = IndexMap::with_capacity(mappings.classes.len());
		let mut fields = IndexMap::new();
		let mut methods = IndexMap::new();

		for class in mappings.classes.values() {
			let owner = class.get_name(from);
			classes.insert(owner.to_owned(), class.get_name(to).to_owned());

			for field in &class.fields {
				let key = MemberRef::new(owner, field.get_name(from), mappings.get_desc(field, from));
				fields.insert(key, field.get_name(to).to_owned());
			}

			for method in &class.methods {
				let key = MemberRef::new(owner, method.get_name(from), mappings.get_desc(method, from));
				methods.insert(key, method.get_name(to).to_owned());
			}
		}

		SimpleRemapper { from, to, classes, fields, methods }
	}

	pub fn from(&self) -> Namespace {
		self.from
	}

	pub fn to(&self) -> Namespace {
		self.to
	}
}

impl ClassRemapper for SimpleRemapper {
	fn map_class_fail(&self, class: &str) -> Option<&str> {
		self.classes.get(class).map(|x| x.as_str())
	}
}

impl MemberRemapper for SimpleRemapper {
	fn map_field_fail(&self, owner: &str, name: &str, desc: &str) -> Option<&str> {
		self.fields.get(&MemberRefReq { owner, name, desc }).map(|x| x.as_str())
	}

	fn map_method_fail(&self, owner: &str, name: &str, desc: &str) -> Option<&str> {
		self.methods.get(&MemberRefReq { owner, name, desc }).map(|x| x.as_str())
	}
}

impl Mappings {
	/// Gets a remapper from the namespace `from` to the namespace `to`, both given by name.
	///
	/// Remappers are created on first use and then kept in the mappings, see [`cache::RemapperCache`].
	pub fn remapper(&self, from: &str, to: &str) -> Result<Arc<SimpleRemapper>> {
		let from = self.get_namespace(from)?;
		let to = self.get_namespace(to)?;
		Ok(self.remapper_between(from, to))
	}

	/// Gets a remapper between the given namespaces. See [`Mappings::remapper`].
	pub fn remapper_between(&self, from: Namespace, to: Namespace) -> Arc<SimpleRemapper> {
		self.remappers.get_or_create(self, from, to)
	}
}
