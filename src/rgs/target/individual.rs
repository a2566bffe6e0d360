// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: individual.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use super::{EmissionTarget, Lifecycle};
use crate::rgs::error::TargetError;

pub const NAME: &str = "individual-files";

/// Writes each digest into its own sidecar file named after the source
/// file plus an algorithm suffix (`archive.zip.sha256`).
#[derive(Debug)]
pub struct IndividualFilesTarget {
	lifecycle: Lifecycle,
	output_directory: Option<PathBuf>,
	suffixes: BTreeMap<String, String>,
}

impl IndividualFilesTarget {
	pub fn new(
		output_directory: Option<PathBuf>,
		suffixes: BTreeMap<String, String>,
	) -> Self {
		Self {
			lifecycle: Lifecycle::Created,
			output_directory,
			suffixes,
		}
	}

	/// Suffix for `algorithm`, from the configured map or derived from the
	/// name (`SHA-256` → `.sha256`).
	pub fn suffix_for(&self, algorithm: &str) -> String {
		if let Some(suffix) = self.suffixes.get(algorithm) {
			return suffix.clone();
		}
		default_suffix(algorithm)
	}

	pub fn sidecar_path(&self, file: &Path, algorithm: &str) -> PathBuf {
		let mut name = file
			.file_name()
			.map(OsString::from)
			.unwrap_or_default();
		name.push(self.suffix_for(algorithm));
		let directory = match &self.output_directory {
			Some(dir) => dir.clone(),
			None => file
				.parent()
				.map(Path::to_path_buf)
				.unwrap_or_default(),
		};
		directory.join(name)
	}
}

pub fn default_suffix(algorithm: &str) -> String {
	format!(".{}", algorithm.to_lowercase().replace('-', ""))
}

/// Temp file in `directory` that ends up with the same mode as a plainly
/// created file once renamed (0666 minus the umask on unix).
fn staging_file(directory: &Path) -> io::Result<NamedTempFile> {
	let mut builder = Builder::new();
	builder.prefix(".rgs-");
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		builder.permissions(std::fs::Permissions::from_mode(0o666));
	}
	builder.tempfile_in(directory)
}

impl EmissionTarget for IndividualFilesTarget {
	fn name(&self) -> &str {
		NAME
	}

	fn initialize(&mut self) -> Result<(), TargetError> {
		self.lifecycle.open(NAME)
	}

	fn write(
		&mut self,
		digest: &str,
		file: &Path,
		algorithm: &str,
	) -> Result<(), TargetError> {
		self.lifecycle.ensure_open(NAME)?;
		let destination = self.sidecar_path(file, algorithm);
		let directory = match destination.parent() {
			Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
			_ => PathBuf::from("."),
		};
		std::fs::create_dir_all(&directory)
			.map_err(|err| TargetError::sidecar(&destination, err))?;

		// Stage in the destination directory so the rename stays atomic.
		let mut staged = staging_file(&directory)
			.map_err(|err| TargetError::sidecar(&destination, err))?;
		staged
			.write_all(digest.as_bytes())
			.map_err(|err| TargetError::sidecar(&destination, err))?;
		staged
			.persist(&destination)
			.map_err(|err| TargetError::sidecar(&destination, err.error))?;
		debug!(path = %destination.display(), "wrote digest file");
		Ok(())
	}

	fn finalize(&mut self) -> Result<(), TargetError> {
		self.lifecycle.close(NAME)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn derives_default_suffixes() {
		assert_eq!(default_suffix("SHA-256"), ".sha256");
		assert_eq!(default_suffix("MD5"), ".md5");
		assert_eq!(default_suffix("SHA3-512"), ".sha3512");
	}

	#[test]
	fn configured_suffix_wins() {
		let mut suffixes = BTreeMap::new();
		suffixes.insert("SHA-1".to_string(), ".sha".to_string());
		let target = IndividualFilesTarget::new(None, suffixes);
		assert_eq!(target.suffix_for("SHA-1"), ".sha");
		assert_eq!(target.suffix_for("MD5"), ".md5");
	}

	#[test]
	fn writes_beside_source_file() {
		let tmp = tempdir().unwrap();
		let source = tmp.path().join("artifact.jar");
		std::fs::write(&source, b"x").unwrap();

		let mut target = IndividualFilesTarget::new(None, BTreeMap::new());
		target.initialize().unwrap();
		target.write("abc123", &source, "MD5").unwrap();
		target.finalize().unwrap();

		let written =
			std::fs::read_to_string(tmp.path().join("artifact.jar.md5"))
				.unwrap();
		assert_eq!(written, "abc123");
	}

	#[test]
	fn relocates_into_created_output_directory() {
		let tmp = tempdir().unwrap();
		let source = tmp.path().join("src/lib.so");
		let out = tmp.path().join("out/digests");

		let mut target =
			IndividualFilesTarget::new(Some(out.clone()), BTreeMap::new());
		target.initialize().unwrap();
		target.write("feed", &source, "SHA-256").unwrap();

		assert_eq!(
			std::fs::read_to_string(out.join("lib.so.sha256")).unwrap(),
			"feed"
		);
	}

	#[test]
	fn rewriting_a_pair_overwrites_the_sidecar() {
		let tmp = tempdir().unwrap();
		let source = tmp.path().join("a.txt");
		let mut target = IndividualFilesTarget::new(None, BTreeMap::new());
		target.initialize().unwrap();
		target.write("first", &source, "MD5").unwrap();
		target.write("second", &source, "MD5").unwrap();
		assert_eq!(
			std::fs::read_to_string(tmp.path().join("a.txt.md5")).unwrap(),
			"second"
		);
	}

	#[cfg(unix)]
	#[test]
	fn sidecar_mode_matches_plain_files() {
		use std::os::unix::fs::PermissionsExt;
		let tmp = tempdir().unwrap();
		let source = tmp.path().join("a.txt");
		let plain = tmp.path().join("plain.txt");
		std::fs::write(&plain, b"p").unwrap();

		let mut target = IndividualFilesTarget::new(None, BTreeMap::new());
		target.initialize().unwrap();
		target.write("d41d8cd9", &source, "MD5").unwrap();

		let mode = |path: &Path| {
			std::fs::metadata(path).unwrap().permissions().mode() & 0o777
		};
		assert_eq!(mode(&tmp.path().join("a.txt.md5")), mode(&plain));
	}

	#[test]
	fn leaves_no_staging_files_behind() {
		let tmp = tempdir().unwrap();
		let out = tmp.path().join("out");
		let mut target =
			IndividualFilesTarget::new(Some(out.clone()), BTreeMap::new());
		target.initialize().unwrap();
		target.write("aa", Path::new("/src/a.bin"), "MD5").unwrap();
		target.write("bb", Path::new("/src/a.bin"), "SHA-1").unwrap();

		let mut names: Vec<_> = std::fs::read_dir(&out)
			.unwrap()
			.map(|entry| entry.unwrap().file_name())
			.collect();
		names.sort();
		assert_eq!(names, vec!["a.bin.md5", "a.bin.sha1"]);
	}

	#[test]
	fn write_after_finalize_is_rejected() {
		let tmp = tempdir().unwrap();
		let mut target = IndividualFilesTarget::new(None, BTreeMap::new());
		target.initialize().unwrap();
		target.finalize().unwrap();
		let err = target
			.write("x", &tmp.path().join("a"), "MD5")
			.unwrap_err();
		assert!(matches!(err, TargetError::Lifecycle { .. }));
	}
}
