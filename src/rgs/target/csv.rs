// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// Module: target::csv
// Purpose: Comma separated digest summary, one row per file.

use std::path::Path;

use ::csv::{Terminator, WriterBuilder};

use super::{DigestTable, EmissionTarget, SummaryFile, SummaryState};
use crate::rgs::error::TargetError;

pub const NAME: &str = "csv-summary";

/// Marker prefixed to the header so readers can skip it as a comment.
pub const COMMENT_MARKER: &str = "#";

/// Summary with a `#File,<ALG>...` header and one row per file.
///
/// Every algorithm seen during the run gets a column; a file without a
/// digest for that algorithm has an empty field.
#[derive(Debug)]
pub struct CsvSummaryTarget {
	state: SummaryState,
}

impl CsvSummaryTarget {
	pub fn new(output: SummaryFile) -> Self {
		Self {
			state: SummaryState::new(output),
		}
	}
}

pub fn render(table: &DigestTable) -> Result<String, ::csv::Error> {
	let algorithms: Vec<&str> = table.algorithms().collect();
	let mut buffer = Vec::new();
	{
		let mut writer = WriterBuilder::new()
			.flexible(false)
			.terminator(Terminator::Any(b'\n'))
			.from_writer(&mut buffer);

		let header = format!("{COMMENT_MARKER}File");
		let mut row = vec![header.as_str()];
		row.extend(algorithms.iter().copied());
		writer.write_record(&row)?;

		for (file, digests) in table.files() {
			let path = file.to_string_lossy();
			let mut row = vec![&*path];
			row.extend(algorithms.iter().map(|algorithm| {
				digests.get(*algorithm).map(String::as_str).unwrap_or("")
			}));
			writer.write_record(&row)?;
		}
		writer.flush()?;
	}
	Ok(String::from_utf8_lossy(&buffer).into_owned())
}

impl EmissionTarget for CsvSummaryTarget {
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
		let contents = render(&table)
			.map_err(|err| TargetError::close(NAME, &output.path, err))?;
		output.persist(NAME, &contents)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_header_and_empty_cells() {
		let mut table = DigestTable::new();
		table.insert("aa", Path::new("/p/a.txt"), "MD5");
		table.insert("bb", Path::new("/p/a.txt"), "SHA-256");
		table.insert("cc", Path::new("/p/b.txt"), "SHA-256");
		assert_eq!(
			render(&table).unwrap(),
			"#File,MD5,SHA-256\n/p/a.txt,aa,bb\n/p/b.txt,,cc\n"
		);
	}

	#[test]
	fn quotes_paths_with_separators() {
		let mut table = DigestTable::new();
		table.insert("aa", Path::new("/p/a,b.txt"), "MD5");
		assert_eq!(
			render(&table).unwrap(),
			"#File,MD5\n\"/p/a,b.txt\",aa\n"
		);
	}

	#[test]
	fn empty_table_is_header_only() {
		assert_eq!(render(&DigestTable::new()).unwrap(), "#File\n");
	}
}
