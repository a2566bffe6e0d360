// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// Module: target::xml
// Purpose: Nested XML digest summary.

use std::fmt::Write as _;
use std::path::Path;

use super::{DigestTable, EmissionTarget, SummaryFile, SummaryState};
use crate::rgs::encoding::OutputEncoding;
use crate::rgs::error::TargetError;

pub const NAME: &str = "xml-summary";

/// Summary rendered as `<files><file name=".."><hashcode algorithm="..">`.
///
/// Unlike the CSV and Lua formats only algorithms actually recorded for
/// a file get an element; missing pairs are omitted.
#[derive(Debug)]
pub struct XmlSummaryTarget {
	state: SummaryState,
}

impl XmlSummaryTarget {
	pub fn new(output: SummaryFile) -> Self {
		Self {
			state: SummaryState::new(output),
		}
	}
}

/// Render the summary; fails on characters XML 1.0 cannot carry.
pub fn render(
	table: &DigestTable,
	encoding: OutputEncoding,
) -> Result<String, String> {
	let mut out = String::new();
	let _ = writeln!(
		out,
		"<?xml version=\"1.0\" encoding=\"{}\"?>",
		encoding.label()
	);
	out.push_str("<files>\n");
	for (file, digests) in table.files() {
		let _ = writeln!(
			out,
			"  <file name=\"{}\">",
			escape(&file.to_string_lossy())?
		);
		for (algorithm, digest) in digests {
			let _ = writeln!(
				out,
				"    <hashcode algorithm=\"{}\">{}</hashcode>",
				escape(algorithm)?,
				escape(digest)?
			);
		}
		out.push_str("  </file>\n");
	}
	out.push_str("</files>\n");
	Ok(out)
}

fn is_xml_char(ch: char) -> bool {
	matches!(
		ch,
		'\t' | '\n' | '\r'
			| '\u{20}'..='\u{D7FF}'
			| '\u{E000}'..='\u{FFFD}'
			| '\u{10000}'..='\u{10FFFF}'
	)
}

fn escape(raw: &str) -> Result<String, String> {
	let mut escaped = String::with_capacity(raw.len());
	for ch in raw.chars() {
		match ch {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&apos;"),
			other if is_xml_char(other) => escaped.push(other),
			other => {
				return Err(format!(
					"character {:?} is not allowed in XML",
					other
				))
			}
		}
	}
	Ok(escaped)
}

impl EmissionTarget for XmlSummaryTarget {
	fn name(&self) -> &str {
		NAME
	}

	fn initialize(&mut self) -> Result<(), TargetError> {
		self.state.initialize(NAME)
	}

	fn write(
		&mut self,
		digest: &str,
		file: &Path,
		algorithm: &str,
	) -> Result<(), TargetError> {
		self.state.write(NAME, digest, file, algorithm)
	}

	fn finalize(&mut self) -> Result<(), TargetError> {
		let table = self.state.take(NAME)?;
		let output = self.state.output();
		let contents = render(&table, output.encoding)
			.map_err(|err| TargetError::close(NAME, &output.path, err))?;
		output.persist(NAME, &contents)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn omits_algorithms_missing_for_a_file() {
		let mut table = DigestTable::new();
		table.insert("aa", Path::new("/p/a.txt"), "MD5");
		table.insert("bb", Path::new("/p/a.txt"), "SHA-256");
		table.insert("cc", Path::new("/p/b.txt"), "SHA-256");
		let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
			<files>\n  <file name=\"/p/a.txt\">\n    \
			<hashcode algorithm=\"MD5\">aa</hashcode>\n    \
			<hashcode algorithm=\"SHA-256\">bb</hashcode>\n  \
			</file>\n  <file name=\"/p/b.txt\">\n    \
			<hashcode algorithm=\"SHA-256\">cc</hashcode>\n  \
			</file>\n</files>\n";
		assert_eq!(render(&table, OutputEncoding::Utf8).unwrap(), expected);
	}

	#[test]
	fn declares_configured_encoding() {
		let rendered =
			render(&DigestTable::new(), OutputEncoding::Latin1).unwrap();
		assert!(rendered.starts_with(
			"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"
		));
		assert!(rendered.ends_with("<files>\n</files>\n"));
	}

	#[test]
	fn escapes_markup_in_names() {
		let mut table = DigestTable::new();
		table.insert("aa", Path::new("/p/<a&b>.txt"), "MD5");
		let rendered = render(&table, OutputEncoding::Utf8).unwrap();
		assert!(rendered.contains("name=\"/p/&lt;a&amp;b&gt;.txt\""));
	}

	#[test]
	fn control_characters_fail_finalize() {
		let tmp = tempfile::tempdir().unwrap();
		let path = tmp.path().join("sums.xml");
		let mut target = XmlSummaryTarget::new(SummaryFile::new(
			&path,
			OutputEncoding::Utf8,
		));
		target.initialize().unwrap();
		target
			.write("aa", Path::new("/p/bell\u{7}.txt"), "MD5")
			.unwrap();

		let err = target.finalize().unwrap_err();
		assert!(matches!(err, TargetError::Close { .. }));
		assert!(!path.exists());
	}

	#[test]
	fn tabs_and_non_ascii_pass_through() {
		let mut table = DigestTable::new();
		table.insert("aa", Path::new("/p/tab\there/caf\u{e9}.txt"), "MD5");
		let rendered = render(&table, OutputEncoding::Utf8).unwrap();
		assert!(rendered.contains("name=\"/p/tab\there/caf\u{e9}.txt\""));
	}
}
