//! The escape scheme used for comments, and for names if the `escaped-names` property is set.
//!
//! | escaped | meaning         |
//! |---------|-----------------|
//! | `\\`    | backslash       |
//! | `\n`    | newline         |
//! | `\r`    | carriage return |
//! | `\0`    | NUL             |
//! | `\t`    | tab             |

use std::borrow::Cow;
use anyhow::{bail, Result};
use crate::error::FormatError;

const TO_ESCAPE: [char; 5] = ['\\', '\n', '\r', '\0', '\t'];
const ESCAPED: [char; 5] = ['\\', 'n', 'r', '0', 't'];

/// Replaces all escape sequences in `string` with the characters they stand for.
///
/// Returns the input borrowed if there's nothing to replace.
pub fn unescape(string: &str) -> Result<Cow<'_, str>> {
	if !string.contains('\\') {
		return Ok(Cow::Borrowed(string));
	}

	let mut s = String::with_capacity(string.len());
	let mut iter = string.chars();

	while let Some(ch) = iter.next() {
		if ch != '\\' {
			s.push(ch);
			continue;
		}

		let Some(escape) = iter.next() else {
			bail!(FormatError::IncompleteEscape(string.to_owned()));
		};
		let Some(index) = ESCAPED.iter().position(|&x| x == escape) else {
			bail!(FormatError::InvalidEscape { escape, string: string.to_owned() });
		};
		s.push(TO_ESCAPE[index]);
	}

	Ok(Cow::Owned(s))
}

/// Like [`unescape`], but only if `escaped` is set. Otherwise the string is taken as is.
pub(crate) fn unescape_opt(string: &str, escaped: bool) -> Result<Cow<'_, str>> {
	if escaped {
		unescape(string)
	} else {
		Ok(Cow::Borrowed(string))
	}
}

/// The inverse of [`unescape`].
pub fn escape(string: &str) -> Cow<'_, str> {
	if !string.contains(&TO_ESCAPE[..]) {
		return Cow::Borrowed(string);
	}

	let mut s = String::with_capacity(string.len() + 8);
	for ch in string.chars() {
		match TO_ESCAPE.iter().position(|&x| x == ch) {
			Some(index) => {
				s.push('\\');
				s.push(ESCAPED[index]);
			},
			None => s.push(ch),
		}
	}

	Cow::Owned(s)
}

#[cfg(test)]
mod testing {
	use std::borrow::Cow;
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::error::FormatError;
	use super::{escape, unescape};

	#[test]
	fn unescape_all_sequences() -> Result<()> {
		assert_eq!(unescape(r"a\\b\nc\rd\0e\tf")?, "a\\b\nc\rd\0e\tf");
		assert_eq!(unescape(r"\n\n")?, "\n\n");
		Ok(())
	}

	#[test]
	fn unescape_borrows_plain_strings() -> Result<()> {
		assert!(matches!(unescape("nothing to see here")?, Cow::Borrowed("nothing to see here")));
		Ok(())
	}

	#[test]
	fn unescape_rejects_bad_sequences() {
		let err = unescape(r"abc\").unwrap_err();
		assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::IncompleteEscape(r"abc\".to_owned())));

		let err = unescape(r"a\qb").unwrap_err();
		assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::InvalidEscape { escape: 'q', string: r"a\qb".to_owned() }));
	}

	#[test]
	fn escape_is_inverse() -> Result<()> {
		let text = "Checks the size.\n\n@throws IllegalArgumentException\tif \\ is \0 or \r";
		let escaped = escape(text);
		assert!(!escaped.contains('\n'));
		assert_eq!(unescape(&escaped)?, text);
		Ok(())
	}
}
