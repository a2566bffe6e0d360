// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// Module: target::lua
// Purpose: Digest summary as a sequence of Lua table assignments.

use std::path::Path;

use super::{DigestTable, EmissionTarget, SummaryFile, SummaryState};
use crate::rgs::error::TargetError;

pub const NAME: &str = "lua-table";

pub const DEFAULT_TABLE_NAME: &str = "_hubble.contentData";

/// Emits `<table>['<parent>/<file>'] = '<digest>'` for every file and
/// every algorithm seen in the run.
///
/// Pairs that were never written get `''`, so the statement count is
/// always files × algorithms. Keys only use the immediate parent
/// directory name; two files sharing (parent name, file name) produce the
/// same key and the later statement wins when the script runs.
#[derive(Debug)]
pub struct LuaTableTarget {
	state: SummaryState,
	table_name: String,
}

impl LuaTableTarget {
	pub fn new(output: SummaryFile, table_name: impl Into<String>) -> Self {
		Self {
			state: SummaryState::new(output),
			table_name: table_name.into(),
		}
	}
}

/// `true` for `name` or dotted paths such as `_hubble.contentData`.
pub fn is_valid_table_name(name: &str) -> bool {
	!name.is_empty()
		&& name.split('.').all(|part| {
			let mut chars = part.chars();
			match chars.next() {
				Some(first) if first == '_' || first.is_ascii_alphabetic() => {
					chars.all(|ch| ch == '_' || ch.is_ascii_alphanumeric())
				}
				_ => false,
			}
		})
}

/// Table key for `file`: its parent directory name and its own name.
pub fn table_key(file: &Path) -> String {
	let name = file
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	match file.parent().and_then(Path::file_name) {
		Some(parent) => format!("{}/{}", parent.to_string_lossy(), name),
		None => name,
	}
}

fn quote(raw: &str) -> String {
	format!("'{}'", raw.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn render(table: &DigestTable, table_name: &str) -> String {
	let algorithms: Vec<&str> = table.algorithms().collect();
	let mut out = String::new();
	for (file, digests) in table.files() {
		let key = quote(&table_key(file));
		for algorithm in &algorithms {
			let digest =
				digests.get(*algorithm).map(String::as_str).unwrap_or("");
			out.push_str(table_name);
			out.push('[');
			out.push_str(&key);
			out.push_str("] = ");
			out.push_str(&quote(digest));
			out.push('\n');
		}
	}
	out
}

impl EmissionTarget for LuaTableTarget {
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
		let contents = render(&table, &self.table_name);
		self.state.output().persist(NAME, &contents)
	}
}
