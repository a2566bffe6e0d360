// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// Module: target
// Purpose: Emission targets turning accumulated digests into persisted artifacts.

pub mod csv;
pub mod individual;
pub mod lua;
pub mod xml;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::rgs::encoding::OutputEncoding;
use crate::rgs::error::TargetError;

pub use self::csv::CsvSummaryTarget;
pub use individual::IndividualFilesTarget;
pub use lua::LuaTableTarget;
pub use xml::XmlSummaryTarget;

/// Lifecycle contract shared by every output format.
///
/// `initialize` is called once, then any number of `write` calls, then
/// `finalize` once. Calls out of that order fail with
/// [`TargetError::Lifecycle`].
pub trait EmissionTarget {
	fn name(&self) -> &str;

	fn initialize(&mut self) -> Result<(), TargetError>;

	fn write(
		&mut self,
		digest: &str,
		file: &Path,
		algorithm: &str,
	) -> Result<(), TargetError>;

	fn finalize(&mut self) -> Result<(), TargetError>;
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Lifecycle {
	#[default]
	Created,
	Open,
	Finalized,
}

impl Lifecycle {
	pub fn open(&mut self, target: &str) -> Result<(), TargetError> {
		match self {
			Self::Created => {
				*self = Self::Open;
				Ok(())
			}
			Self::Open => Err(TargetError::lifecycle(
				target,
				"already initialized",
			)),
			Self::Finalized => Err(TargetError::lifecycle(
				target,
				"cannot initialize a finalized target",
			)),
		}
	}

	pub fn ensure_open(&self, target: &str) -> Result<(), TargetError> {
		match self {
			Self::Open => Ok(()),
			Self::Created => Err(TargetError::lifecycle(
				target,
				"not initialized",
			)),
			Self::Finalized => Err(TargetError::lifecycle(
				target,
				"already finalized",
			)),
		}
	}

	pub fn close(&mut self, target: &str) -> Result<(), TargetError> {
		self.ensure_open(target)?;
		*self = Self::Finalized;
		Ok(())
	}
}

/// Per-target accumulator: file → (algorithm → digest), plus every
/// algorithm seen so far.
///
/// Files keep the position of their first write. Writing the same
/// (file, algorithm) pair again overwrites the previous digest.
#[derive(Clone, Debug, Default)]
pub struct DigestTable {
	files: Vec<(PathBuf, BTreeMap<String, String>)>,
	index: HashMap<PathBuf, usize>,
	algorithms: BTreeSet<String>,
}

impl DigestTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, digest: &str, file: &Path, algorithm: &str) {
		let slot = match self.index.get(file) {
			Some(&slot) => slot,
			None => {
				self.files.push((file.to_path_buf(), BTreeMap::new()));
				self.index.insert(file.to_path_buf(), self.files.len() - 1);
				self.files.len() - 1
			}
		};
		self.files[slot]
			.1
			.insert(algorithm.to_string(), digest.to_string());
		self.algorithms.insert(algorithm.to_string());
	}

	/// Files with their recorded digests, in encounter order.
	pub fn files(
		&self,
	) -> impl Iterator<Item = (&Path, &BTreeMap<String, String>)> {
		self.files
			.iter()
			.map(|(path, digests)| (path.as_path(), digests))
	}

	/// Every algorithm written for any file, sorted.
	pub fn algorithms(&self) -> impl Iterator<Item = &str> {
		self.algorithms.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

/// Destination of a summary artifact.
#[derive(Clone, Debug)]
pub struct SummaryFile {
	pub path: PathBuf,
	pub encoding: OutputEncoding,
}

impl SummaryFile {
	pub fn new(path: impl Into<PathBuf>, encoding: OutputEncoding) -> Self {
		Self {
			path: path.into(),
			encoding,
		}
	}

	/// Create the parent directory, encode and write `contents` in one
	/// shot.
	pub fn persist(
		&self,
		target: &str,
		contents: &str,
	) -> Result<(), TargetError> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent).map_err(|err| {
					TargetError::close(target, &self.path, err)
				})?;
			}
		}
		let bytes = self
			.encoding
			.encode(contents)
			.map_err(|err| TargetError::close(target, &self.path, err))?;
		std::fs::write(&self.path, bytes)
			.map_err(|err| TargetError::close(target, &self.path, err))
	}
}

/// Shared state of the summary formats: lifecycle, accumulator and
/// destination.
#[derive(Debug)]
pub(crate) struct SummaryState {
	lifecycle: Lifecycle,
	table: DigestTable,
	output: SummaryFile,
}

impl SummaryState {
	pub(crate) fn new(output: SummaryFile) -> Self {
		Self {
			lifecycle: Lifecycle::Created,
			table: DigestTable::new(),
			output,
		}
	}

	pub(crate) fn output(&self) -> &SummaryFile {
		&self.output
	}

	pub(crate) fn initialize(
		&mut self,
		target: &str,
	) -> Result<(), TargetError> {
		self.lifecycle.open(target)?;
		self.table = DigestTable::new();
		Ok(())
	}

	pub(crate) fn write(
		&mut self,
		target: &str,
		digest: &str,
		file: &Path,
		algorithm: &str,
	) -> Result<(), TargetError> {
		self.lifecycle.ensure_open(target)?;
		self.table.insert(digest, file, algorithm);
		Ok(())
	}

	/// Hand out the accumulated table exactly once.
	pub(crate) fn take(
		&mut self,
		target: &str,
	) -> Result<DigestTable, TargetError> {
		self.lifecycle.close(target)?;
		Ok(std::mem::take(&mut self.table))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_tracks_algorithms_sorted() {
		let mut table = DigestTable::new();
		table.insert("b", Path::new("/x/one"), "SHA-256");
		table.insert("a", Path::new("/x/two"), "MD5");
		let algorithms: Vec<_> = table.algorithms().collect();
		assert_eq!(algorithms, vec!["MD5", "SHA-256"]);
	}

	#[test]
	fn table_keeps_encounter_order_and_last_write_wins() {
		let mut table = DigestTable::new();
		table.insert("1", Path::new("/z"), "MD5");
		table.insert("2", Path::new("/a"), "MD5");
		table.insert("3", Path::new("/z"), "MD5");
		let files: Vec<_> = table
			.files()
			.map(|(path, digests)| (path.to_path_buf(), digests["MD5"].clone()))
			.collect();
		assert_eq!(
			files,
			vec![
				(PathBuf::from("/z"), "3".to_string()),
				(PathBuf::from("/a"), "2".to_string()),
			]
		);
		assert_eq!(table.len(), 2);
	}

	#[test]
	fn lifecycle_rejects_out_of_order_calls() {
		let mut lifecycle = Lifecycle::default();
		assert!(lifecycle.ensure_open("t").is_err());
		assert!(lifecycle.close("t").is_err());
		lifecycle.open("t").unwrap();
		assert!(lifecycle.open("t").is_err());
		lifecycle.close("t").unwrap();
		assert!(lifecycle.ensure_open("t").is_err());
		assert!(lifecycle.close("t").is_err());
		assert!(lifecycle.open("t").is_err());
	}

	#[test]
	fn summary_file_creates_parent_directory() {
		let tmp = tempfile::tempdir().unwrap();
		let path = tmp.path().join("deep/nested/out.txt");
		SummaryFile::new(&path, OutputEncoding::Utf8)
			.persist("test", "hello")
			.unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
	}
}
