use anyhow::{bail, Context, Result};
use pretty_assertions::assert_eq;
use tinytree::error::FormatError;
use tinytree::metadata::{Metadata, Namespace};
use tinytree::tiny_v2::{NameGetter, TinyVisitor};

/// Writes down every call, one string per call.
#[derive(Default)]
struct Recorder {
	calls: Vec<String>,
	namespaces: usize,
}

impl Recorder {
	fn names(&self, names: NameGetter<'_>) -> Result<String> {
		Ok(names.all_names()?.join(","))
	}
}

impl TinyVisitor for Recorder {
	fn start(&mut self, metadata: &Metadata) -> Result<()> {
		self.namespaces = metadata.namespaces.len();
		self.calls.push(format!("start {:?}", metadata.namespaces.names().collect::<Vec<_>>()));
		Ok(())
	}

	fn push_class(&mut self, names: NameGetter<'_>) -> Result<()> {
		let names = self.names(names)?;
		self.calls.push(format!("class {names}"));
		Ok(())
	}

	fn push_field(&mut self, names: NameGetter<'_>, desc: &str) -> Result<()> {
		let names = self.names(names)?;
		self.calls.push(format!("field {desc} {names}"));
		Ok(())
	}

	fn push_method(&mut self, names: NameGetter<'_>, desc: &str) -> Result<()> {
		let names = self.names(names)?;
		self.calls.push(format!("method {desc} {names}"));
		Ok(())
	}

	fn push_parameter(&mut self, names: NameGetter<'_>, index: usize) -> Result<()> {
		let names = self.names(names)?;
		self.calls.push(format!("parameter {index} {names}"));
		Ok(())
	}

	fn push_local_variable(&mut self, names: NameGetter<'_>, index: usize, start_offset: usize, table_index: Option<usize>) -> Result<()> {
		let names = self.names(names)?;
		self.calls.push(format!("local {index} {start_offset} {table_index:?} {names}"));
		Ok(())
	}

	fn push_comment(&mut self, comment: &str) -> Result<()> {
		self.calls.push(format!("comment {comment}"));
		Ok(())
	}

	fn pop(&mut self, count: usize) -> Result<()> {
		self.calls.push(format!("pop {count}"));
		Ok(())
	}
}

#[test]
fn calls_in_order() -> Result<()> {
	let mut recorder = Recorder::default();
	tinytree::tiny_v2::visit(include_str!("input/basic.tiny").as_bytes(), &mut recorder)?;

	assert_eq!(recorder.namespaces, 3);
	assert_eq!(recorder.calls, vec![
		"start [\"official\", \"intermediary\", \"named\"]",
		"class a,class_1,com/example/Widget",
		"comment A widget, with a size.",
		"pop 1",
		"field I a,field_1,size",
		"comment The size in pixels.",
		"pop 2",
		"field La; b,field_2",
		"pop 1",
		"method (La;I)La; a,method_1,resize",
		"comment Resizes the widget.",
		"pop 1",
		"parameter 1 ,,other",
		"pop 1",
		"parameter 2 ,,newSize",
		"comment Must be positive.",
		"pop 2",
		"local 3 4 None ,,result",
		"pop 1",
		"local 4 8 Some(2) tmp",
		"pop 2",
		"method ()V <init>",
		"pop 2",
		"class b,class_2,com/example/Frame",
		"method (La;)Lb; a,method_2,wrap",
		"parameter 0 widget",
		"pop 3",
	]);
	Ok(())
}

#[test]
fn default_methods_accept_everything() -> Result<()> {
	struct Nothing;
	impl TinyVisitor for Nothing {}

	tinytree::tiny_v2::visit(include_str!("input/basic.tiny").as_bytes(), &mut Nothing)?;
	Ok(())
}

#[test]
fn no_callback_for_a_broken_indent() {
	let mut recorder = Recorder::default();
	let input = "tiny\t2\t0\ta\tb\nc\tx\ty\n\t\t\tc\ttoo deep\n";

	let err = tinytree::tiny_v2::visit(input.as_bytes(), &mut recorder).unwrap_err();

	assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::BrokenIndent { max: 1, actual: 3 }));
	assert_eq!(recorder.calls, vec!["start [\"a\", \"b\"]", "class x,y"]);
}

#[test]
fn visitor_errors_end_the_reading() {
	struct NoFields;
	impl TinyVisitor for NoFields {
		fn push_field(&mut self, _: NameGetter<'_>, desc: &str) -> Result<()> {
			bail!("no fields wanted, got one with descriptor {desc}")
		}
	}

	let input = "tiny\t2\t0\ta\tb\nc\tx\ty\n\tf\tI\tf\tg\n";
	let err = tinytree::tiny_v2::visit(input.as_bytes(), &mut NoFields).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("error on line 3"), "{message}");
	assert!(message.contains("no fields wanted"), "{message}");
}

#[test]
fn name_getter_views() -> Result<()> {
	#[derive(Default)]
	struct Check {
		last: Option<Namespace>,
		seen: Vec<(String, String, Vec<String>)>,
	}

	impl TinyVisitor for Check {
		fn start(&mut self, metadata: &Metadata) -> Result<()> {
			self.last = Some(metadata.get_namespace("c")?);
			Ok(())
		}

		fn push_class(&mut self, names: NameGetter<'_>) -> Result<()> {
			let last = self.last.context("not started")?;
			self.seen.push((
				names.get_raw(last)?.into_owned(),
				names.get(last)?.into_owned(),
				names.raw_names()?,
			));
			Ok(())
		}
	}

	let input = "tiny\t2\t0\ta\tb\tc\n\tescaped-names\nc\tx\tz\\t\t\nc\tq\tr\n";
	let mut check = Check::default();
	tinytree::tiny_v2::visit(input.as_bytes(), &mut check)?;

	assert_eq!(check.seen, vec![
		(String::new(), "z\t".to_owned(), vec!["x".to_owned(), "z\t".to_owned(), String::new()]),
		(String::new(), "r".to_owned(), vec!["q".to_owned(), "r".to_owned()]),
	]);
	Ok(())
}

#[test]
fn header_lines_are_not_elements() {
	let mut recorder = Recorder::default();
	let input = "tiny\t2\t0\ta\n\tkey\tvalue\n\tother\n";

	let result = tinytree::tiny_v2::visit(input.as_bytes(), &mut recorder);

	assert!(result.is_ok());
	assert_eq!(recorder.calls, vec!["start [\"a\"]"]);
}
