//! Crate for reading "Tiny" mapping files into a tree, and for remapping names and descriptors with it.
//!
//! Mapping files give names to classes, fields, methods, parameters and local variables in several
//! namespaces, like `official`, `intermediary` and `named`. Any of these elements may also have a comment.
//!
//! Reading Tiny v2 (`.tiny`) files is done with the [`tiny_v2`] module, the legacy Tiny v1 format is read by the
//! [`tiny_v1`] module. If you don't know the format up front, use [`read_with_detection`].
//!
//! ```
//! use tinytree::tree::Mapped;
//! use tinytree::remapper::{ClassRemapper, MemberRemapper};
//!
//! let string = "tiny\t2\t0\tofficial\tnamed\n\
//!     c\ta\tcom/example/Foo\n\
//!     \tm\t(La;)La;\tb\tcopy\n\
//!     \t\tp\t1\t\tother\n\
//!     \t\tc\tThe instance to copy from.\n";
//!
//! let mappings = tinytree::read_with_detection(string.as_bytes()).unwrap();
//!
//! let named = mappings.get_namespace("named").unwrap();
//! let method = &mappings.classes()["a"].methods[0];
//! assert_eq!(method.get_name(named), "copy");
//! assert_eq!(method.parameters[0].get_comment(), Some("The instance to copy from."));
//!
//! let remapper = mappings.remapper("official", "named").unwrap();
//! assert_eq!(remapper.map_desc("(La;I)V"), "(Lcom/example/Foo;I)V");
//! assert_eq!(remapper.map_method_name("a", "b", "(La;)La;"), "copy");
//! ```
//!
//! All errors are [`anyhow::Error`]s, see the [`error`] module for telling them apart.

use std::io::{BufReader, Read};
use anyhow::{bail, Result};
use crate::error::FormatError;
use crate::tree::mappings::Mappings;

mod lines;

pub mod error;
pub mod escape;
pub mod metadata;

pub mod tiny_v1;
pub mod tiny_v2;

pub mod tree;

pub mod remapper;

/// Options for loading mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
	/// Leave out parameters, local variables and comments.
	///
	/// The file is still checked as strictly as without this.
	pub slim: bool,
}

impl LoadOptions {
	pub fn slim() -> LoadOptions {
		LoadOptions { slim: true }
	}
}

/// Reads mappings, choosing between Tiny v2 and Tiny v1 by looking at the first field of the header.
///
/// Fails with [`FormatError::UnsupportedFormat`] for any other header.
pub fn read_with_detection(reader: impl Read) -> Result<Mappings> {
	read_with_detection_with(reader, LoadOptions::default())
}

/// Like [`read_with_detection`], but with options. Tiny v1 files have neither parameters nor comments, so
/// the options have no effect on them.
pub fn read_with_detection_with(reader: impl Read, options: LoadOptions) -> Result<Mappings> {
	let mut lines = lines::lines(BufReader::new(reader));

	let marker = match lines.peek() {
		None => bail!(FormatError::EmptyInput),
		// the reader error is reported when actually reading
		Some(Err(_)) => "tiny".to_owned(),
		Some(Ok(header)) => header.first_field().to_owned(),
	};

	match marker.as_str() {
		"tiny" => tiny_v2::read_lines(&mut lines, options),
		"v1" => tiny_v1::read_lines(&mut lines),
		_ => {
			let header = lines.next().transpose()?.map(|x| x.raw().to_owned()).unwrap_or_default();
			bail!(FormatError::UnsupportedFormat(header))
		},
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::error::FormatError;
	use crate::read_with_detection;

	#[test]
	fn unknown_formats() {
		let err = read_with_detection("tsrg2 left right\n".as_bytes()).unwrap_err();
		assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::UnsupportedFormat("tsrg2 left right".to_owned())));

		let err = read_with_detection("".as_bytes()).unwrap_err();
		assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::EmptyInput));
	}

	#[test]
	fn detects_both_versions() -> anyhow::Result<()> {
		let v2 = read_with_detection("tiny\t2\t0\ta\tb\nc\tx\ty\n".as_bytes())?;
		assert_eq!(v2.metadata.major_version, 2);

		let v1 = read_with_detection("v1\ta\tb\nCLASS\tx\ty\n".as_bytes())?;
		assert_eq!(v1.metadata.major_version, 1);

		assert_eq!(v1.classes, v2.classes);
		Ok(())
	}
}
