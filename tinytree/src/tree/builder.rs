use anyhow::{anyhow, bail, Context, Result};
use indexmap::map::Entry;
use log::debug;
use crate::error::FormatError;
use crate::metadata::Metadata;
use crate::tiny_v2::{NameGetter, TinyVisitor};
use crate::tree::mappings::{ClassMapping, FieldMapping, LocalVariableMapping, MethodMapping, Mappings, ParameterMapping};
use crate::LoadOptions;

/// Where an opened element lives in the tree, by the indices of it and its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRef {
	Class(usize),
	Field(usize, usize),
	Method(usize, usize),
	Parameter(usize, usize, usize),
	LocalVariable(usize, usize, usize),
	/// Stands in for elements that aren't kept when loading slim.
	Dummy,
}

/// An element that is pushed but not yet popped.
#[derive(Debug)]
struct OpenNode {
	node: NodeRef,
	/// Also tracked for elements that aren't kept, so that slim loading rejects the same files.
	comment: Option<String>,
}

impl OpenNode {
	fn new(node: NodeRef) -> OpenNode {
		OpenNode { node, comment: None }
	}
}

/// The state between the calls of the visitor.
#[derive(Debug, Default)]
struct BuildContext {
	class: Option<usize>,
	method: Option<usize>,
	stack: Vec<OpenNode>,
	/// A comment is open. It's on no element, so the next pop has one level less to close.
	pushed_comment: bool,
}

/// A [`TinyVisitor`] building [`Mappings`].
///
/// ```
/// use tinytree::tree::builder::TreeBuilder;
/// use tinytree::LoadOptions;
///
/// let string = "tiny\t2\t0\ta\tb\nc\tx\tY\n\tc\tThe class.\n";
///
/// let mut builder = TreeBuilder::new(LoadOptions::default());
/// tinytree::tiny_v2::visit(string.as_bytes(), &mut builder).unwrap();
/// let mappings = builder.finish().unwrap();
///
/// assert_eq!(mappings.classes()["x"].comment.as_deref(), Some("The class."));
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
	options: LoadOptions,
	mappings: Option<Mappings>,
	context: BuildContext,
}

impl TreeBuilder {
	pub fn new(options: LoadOptions) -> TreeBuilder {
		TreeBuilder {
			options,
			mappings: None,
			context: BuildContext::default(),
		}
	}

	/// Gives back the built mappings.
	///
	/// Fails if the visitor was never started.
	pub fn finish(self) -> Result<Mappings> {
		let mappings = self.mappings.context("cannot finish building mappings that were never started")?;

		let fields: usize = mappings.classes.values().map(|class| class.fields.len()).sum();
		let methods: usize = mappings.classes.values().map(|class| class.methods.len()).sum();
		debug!(
			"built mappings with {} classes, {fields} fields and {methods} methods{}",
			mappings.classes.len(),
			if self.options.slim { " (slim)" } else { "" },
		);

		Ok(mappings)
	}

	fn mappings_mut(&mut self) -> Result<&mut Mappings> {
		self.mappings.as_mut().context("got an element before the header")
	}

	fn current_class(&mut self, kind: &'static str) -> Result<(usize, &mut ClassMapping)> {
		let index = self.context.class.ok_or(FormatError::NoEnclosing(kind, "class"))?;
		let (_, class) = self.mappings_mut()?
			.classes
			.get_index_mut(index)
			.with_context(|| anyhow!("no class with index {index}"))?;
		Ok((index, class))
	}

	fn current_method(&mut self, kind: &'static str) -> Result<(usize, usize, &mut MethodMapping)> {
		let method = self.context.method.ok_or(FormatError::NoEnclosing(kind, "method"))?;
		let (class, mapping) = self.current_class(kind)?;
		let mapping = mapping.methods.get_mut(method)
			.with_context(|| anyhow!("no method with index {method} in class {class}"))?;
		Ok((class, method, mapping))
	}

	fn comment_slot(&mut self, node: NodeRef) -> Result<Option<&mut Option<String>>> {
		let classes = &mut self.mappings_mut()?.classes;

		let class = match node {
			NodeRef::Dummy => return Ok(None),
			NodeRef::Class(class)
			| NodeRef::Field(class, _)
			| NodeRef::Method(class, _)
			| NodeRef::Parameter(class, _, _)
			| NodeRef::LocalVariable(class, _, _) => class,
		};
		let (_, class) = classes.get_index_mut(class)
			.with_context(|| anyhow!("no class with index {class}"))?;

		let slot = match node {
			NodeRef::Class(_) => Some(&mut class.comment),
			NodeRef::Field(_, field) => class.fields.get_mut(field).map(|x| &mut x.comment),
			NodeRef::Method(_, method) => class.methods.get_mut(method).map(|x| &mut x.comment),
			NodeRef::Parameter(_, method, parameter) => class.methods.get_mut(method)
				.and_then(|x| x.parameters.get_mut(parameter))
				.map(|x| &mut x.comment),
			NodeRef::LocalVariable(_, method, variable) => class.methods.get_mut(method)
				.and_then(|x| x.local_variables.get_mut(variable))
				.map(|x| &mut x.comment),
			NodeRef::Dummy => None,
		};

		slot.with_context(|| anyhow!("no element for {node:?}")).map(Some)
	}
}

impl TinyVisitor for TreeBuilder {
	fn start(&mut self, metadata: &Metadata) -> Result<()> {
		if self.mappings.is_some() {
			bail!("cannot start building mappings twice");
		}
		self.mappings = Some(Mappings::new(metadata.clone()));
		Ok(())
	}

	fn push_class(&mut self, names: NameGetter<'_>) -> Result<()> {
		let names = names.to_names()?;
		let name = names.first_name().to_owned();

		// a class declared again gets the new names, and keeps its members and comment
		let (index, comment) = match self.mappings_mut()?.classes.entry(name) {
			Entry::Occupied(entry) => {
				debug!("class {:?} is declared again", entry.key());
				let index = entry.index();
				let class = entry.into_mut();
				class.names = names;
				(index, class.comment.clone())
			},
			Entry::Vacant(entry) => {
				let index = entry.index();
				entry.insert(ClassMapping::new(names));
				(index, None)
			},
		};

		self.context.class = Some(index);
		self.context.method = None;
		self.context.stack.push(OpenNode { node: NodeRef::Class(index), comment });
		Ok(())
	}

	fn push_field(&mut self, names: NameGetter<'_>, desc: &str) -> Result<()> {
		let names = names.to_names()?;
		let (class, mapping) = self.current_class("field")?;

		mapping.fields.push(FieldMapping::new(desc.to_owned(), names));
		let field = mapping.fields.len() - 1;

		self.context.stack.push(OpenNode::new(NodeRef::Field(class, field)));
		Ok(())
	}

	fn push_method(&mut self, names: NameGetter<'_>, desc: &str) -> Result<()> {
		let names = names.to_names()?;
		let (class, mapping) = self.current_class("method")?;

		mapping.methods.push(MethodMapping::new(desc.to_owned(), names));
		let method = mapping.methods.len() - 1;

		self.context.method = Some(method);
		self.context.stack.push(OpenNode::new(NodeRef::Method(class, method)));
		Ok(())
	}

	fn push_parameter(&mut self, names: NameGetter<'_>, index: usize) -> Result<()> {
		let slim = self.options.slim;
		let (class, method, mapping) = self.current_method("parameter")?;

		let node = if slim {
			NodeRef::Dummy
		} else {
			mapping.parameters.push(ParameterMapping::new(index, names.to_names()?));
			NodeRef::Parameter(class, method, mapping.parameters.len() - 1)
		};

		self.context.stack.push(OpenNode::new(node));
		Ok(())
	}

	fn push_local_variable(
		&mut self,
		names: NameGetter<'_>,
		index: usize,
		start_offset: usize,
		table_index: Option<usize>,
	) -> Result<()> {
		let slim = self.options.slim;
		let (class, method, mapping) = self.current_method("local variable")?;

		let node = if slim {
			NodeRef::Dummy
		} else {
			let variable = LocalVariableMapping::new(index, start_offset, table_index, names.to_names()?);
			mapping.local_variables.push(variable);
			NodeRef::LocalVariable(class, method, mapping.local_variables.len() - 1)
		};

		self.context.stack.push(OpenNode::new(node));
		Ok(())
	}

	fn push_comment(&mut self, comment: &str) -> Result<()> {
		let Some(open) = self.context.stack.last() else {
			bail!(FormatError::NothingToComment);
		};
		if self.context.pushed_comment {
			bail!(FormatError::CommentOnComment);
		}
		if let Some(old) = &open.comment {
			bail!(FormatError::DuplicateComment { old: old.clone(), new: comment.to_owned() });
		}
		let node = open.node;

		if !self.options.slim {
			if let Some(slot) = self.comment_slot(node)? {
				*slot = Some(comment.to_owned());
			}
		}

		if let Some(open) = self.context.stack.last_mut() {
			open.comment = Some(comment.to_owned());
		}
		self.context.pushed_comment = true;
		Ok(())
	}

	fn pop(&mut self, count: usize) -> Result<()> {
		let mut count = count;
		if self.context.pushed_comment {
			self.context.pushed_comment = false;
			count = count.saturating_sub(1);
		}

		let open = self.context.stack.len();
		if count > open {
			bail!(FormatError::PopUnderflow { count, open });
		}

		for OpenNode { node, .. } in self.context.stack.drain(open - count..) {
			match node {
				NodeRef::Class(_) => {
					self.context.class = None;
					self.context.method = None;
				},
				NodeRef::Method(..) => self.context.method = None,
				_ => {},
			}
		}
		Ok(())
	}
}
