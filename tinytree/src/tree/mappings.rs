use std::borrow::Cow;
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use crate::metadata::{Metadata, Namespace};
use crate::remapper::cache::RemapperCache;
use crate::remapper::{ClassRemapper, DescriptorMapper};
use crate::tree::names::Names;
use crate::tree::{HasDescriptor, Mapped};

/// A mapping tree: the metadata and all classes, with their members.
///
/// The classes are kept in the order they were read in, keyed by their name in the first namespace.
///
/// Once read, a tree can't be changed anymore, so the cached remappers always agree with the classes.
#[derive(Debug, Default)]
pub struct Mappings {
	pub(crate) metadata: Metadata,
	pub(crate) classes: IndexMap<String, ClassMapping>,
	pub(crate) remappers: RemapperCache,
}

impl Clone for Mappings {
	fn clone(&self) -> Self {
		Mappings {
			metadata: self.metadata.clone(),
			classes: self.classes.clone(),
			remappers: RemapperCache::default(),
		}
	}
}

impl Mappings {
	pub fn new(metadata: Metadata) -> Mappings {
		Mappings {
			metadata,
			classes: IndexMap::new(),
			remappers: RemapperCache::default(),
		}
	}

	/// Mappings without any namespaces or classes.
	pub fn empty() -> Mappings {
		Mappings::default()
	}

	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	/// All classes, keyed by their name in the first namespace.
	pub fn classes(&self) -> &IndexMap<String, ClassMapping> {
		&self.classes
	}

	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		self.metadata.get_namespace(name)
	}

	/// Gets a class by its name in the first namespace.
	pub fn get_class(&self, name: &str) -> Option<&ClassMapping> {
		self.classes.get(name)
	}

	/// The remapper for class names and descriptors, from the first namespace to the given one.
	pub fn descriptor_mapper(&self, namespace: Namespace) -> DescriptorMapper<'_> {
		DescriptorMapper::new(&self.classes, namespace)
	}

	/// The descriptor of a field or method in the given namespace.
	///
	/// Descriptors are stored in the first namespace, for any other namespace the class names in it are remapped.
	pub fn get_desc<'a>(&'a self, member: &'a impl HasDescriptor, namespace: Namespace) -> Cow<'a, str> {
		if namespace == Namespace::FIRST {
			Cow::Borrowed(member.get_raw_desc())
		} else {
			self.descriptor_mapper(namespace).map_desc(member.get_raw_desc())
		}
	}

	/// Like [`Mappings::get_desc`], but looks up the namespace by its name.
	pub fn get_desc_in<'a>(&'a self, member: &'a impl HasDescriptor, namespace: &str) -> Result<Cow<'a, str>> {
		let namespace = self.get_namespace(namespace)?;
		Ok(self.get_desc(member, namespace))
	}

	/// The name of an element in the namespace with the given name.
	pub fn get_name<'a>(&self, mapped: &'a impl Mapped, namespace: &str) -> Result<&'a str> {
		let namespace = self.get_namespace(namespace)
			.with_context(|| anyhow!("cannot get name of {:?}", mapped.get_names()))?;
		Ok(mapped.get_name(namespace))
	}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassMapping {
	pub names: Names,
	pub fields: Vec<FieldMapping>,
	pub methods: Vec<MethodMapping>,
	pub comment: Option<String>,
}

impl ClassMapping {
	pub fn new(names: Names) -> ClassMapping {
		ClassMapping { names, ..ClassMapping::default() }
	}

	pub fn get_field(&self, name: &str, desc: &str) -> Option<&FieldMapping> {
		self.fields.iter()
			.find(|field| field.names.first_name() == name && field.desc == desc)
	}

	pub fn get_method(&self, name: &str, desc: &str) -> Option<&MethodMapping> {
		self.methods.iter()
			.find(|method| method.names.first_name() == name && method.desc == desc)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
	/// The descriptor, in the first namespace.
	pub desc: String,
	pub names: Names,
	pub comment: Option<String>,
}

impl FieldMapping {
	pub fn new(desc: String, names: Names) -> FieldMapping {
		FieldMapping { desc, names, comment: None }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodMapping {
	/// The descriptor, in the first namespace.
	pub desc: String,
	pub names: Names,
	pub parameters: Vec<ParameterMapping>,
	pub local_variables: Vec<LocalVariableMapping>,
	pub comment: Option<String>,
}

impl MethodMapping {
	pub fn new(desc: String, names: Names) -> MethodMapping {
		MethodMapping {
			desc,
			names,
			parameters: Vec::new(),
			local_variables: Vec::new(),
			comment: None,
		}
	}

	/// Gets a parameter by its local variable index.
	pub fn get_parameter(&self, index: usize) -> Option<&ParameterMapping> {
		self.parameters.iter().find(|parameter| parameter.index == index)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
	/// The local variable index of the parameter.
	pub index: usize,
	pub names: Names,
	pub comment: Option<String>,
}

impl ParameterMapping {
	pub fn new(index: usize, names: Names) -> ParameterMapping {
		ParameterMapping { index, names, comment: None }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableMapping {
	pub index: usize,
	pub start_offset: usize,
	/// The index into the local variable table, `None` if the file gave `-1`.
	pub table_index: Option<usize>,
	pub names: Names,
	pub comment: Option<String>,
}

impl LocalVariableMapping {
	pub fn new(index: usize, start_offset: usize, table_index: Option<usize>, names: Names) -> LocalVariableMapping {
		LocalVariableMapping { index, start_offset, table_index, names, comment: None }
	}
}

macro_rules! impl_mapped {
	($($t:ty),*) => {
		$(
			impl Mapped for $t {
				fn get_names(&self) -> &Names {
					&self.names
				}

				fn get_comment(&self) -> Option<&str> {
					self.comment.as_deref()
				}
			}
		)*
	};
}

impl_mapped!(ClassMapping, FieldMapping, MethodMapping, ParameterMapping, LocalVariableMapping);

impl HasDescriptor for FieldMapping {
	fn get_raw_desc(&self) -> &str {
		&self.desc
	}
}

impl HasDescriptor for MethodMapping {
	fn get_raw_desc(&self) -> &str {
		&self.desc
	}
}
