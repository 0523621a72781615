use std::io::BufRead;
use std::iter::Peekable;
use anyhow::{anyhow, Context, Result};

/// One line of a mappings file, split at the tabs.
///
/// The leading tabs are counted (the `idents`) and not part of the fields. For a line `\t\tp\t1\ta\tb` that's an
/// indent of `2` and the fields `["p", "1", "a", "b"]`.
#[derive(Debug, Clone)]
pub(crate) struct TinyLine {
	line_number: usize,
	idents: usize,
	raw: String,
	pub(crate) fields: Vec<String>,
}

impl TinyLine {
	pub(crate) fn new(line_number: usize, line: String) -> TinyLine {
		// tabs are a single byte, so counting bytes is fine for slicing
		let idents = line.bytes().take_while(|x| *x == b'\t').count();

		let fields = line[idents..].split('\t')
			.map(|x| x.to_owned())
			.collect();

		TinyLine {
			line_number,
			idents,
			raw: line,
			fields,
		}
	}

	pub(crate) fn get_idents(&self) -> usize {
		self.idents
	}

	pub(crate) fn get_line_number(&self) -> usize {
		self.line_number
	}

	/// The line as it was read, used for error messages.
	pub(crate) fn raw(&self) -> &str {
		&self.raw
	}

	/// The first field after the indentation, used to tell what the line declares.
	pub(crate) fn first_field(&self) -> &str {
		// `split` always gives at least one element
		self.fields.first().map_or("", |x| x.as_str())
	}
}

/// Turns a reader into an iterator of numbered lines, with one line of look-ahead.
pub(crate) fn lines(reader: impl BufRead) -> Peekable<impl Iterator<Item=Result<TinyLine>>> {
	reader.lines()
		.enumerate()
		.map(|(line_number, line)| -> Result<TinyLine> {
			let line = line.with_context(|| anyhow!("failed to read line {}", line_number + 1))?;
			Ok(TinyLine::new(line_number + 1, line))
		})
		.peekable()
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::TinyLine;

	#[test]
	fn counts_indent_and_splits() {
		let line = TinyLine::new(3, "\t\tp\t1\t\tb".to_owned());
		assert_eq!(line.get_idents(), 2);
		assert_eq!(line.get_line_number(), 3);
		assert_eq!(line.first_field(), "p");
		assert_eq!(line.fields, vec!["p", "1", "", "b"]);
		assert_eq!(line.raw(), "\t\tp\t1\t\tb");
	}

	#[test]
	fn empty_line() {
		let line = TinyLine::new(1, String::new());
		assert_eq!(line.get_idents(), 0);
		assert_eq!(line.fields, vec![""]);
		assert_eq!(line.first_field(), "");
	}
}
