// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: walker.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::InputPlan;

pub struct Walker {
	plan: InputPlan,
}

impl Walker {
	pub fn new(plan: InputPlan) -> Self {
		Self { plan }
	}

	/// Expand the planned roots into the file list handed to the
	/// orchestrator.
	///
	/// Arguments that are not directories are kept as given, even when
	/// they do not exist, so the failure shows up as a per-pair digest
	/// error instead of silently shrinking the input. Files found under a
	/// directory are sorted lexicographically per root.
	pub fn walk(&self) -> io::Result<Vec<PathBuf>> {
		let mut files = Vec::new();
		for root in &self.plan.roots {
			if root.is_dir() {
				let mut found = self.walk_directory(root)?;
				found.sort();
				debug!(root = %root.display(), files = found.len(), "expanded directory");
				files.extend(found);
			} else {
				files.push(root.clone());
			}
		}
		Ok(files)
	}

	fn walk_directory(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
		let max_depth = if self.plan.recursive { usize::MAX } else { 1 };
		let mut found = Vec::new();
		for entry in WalkDir::new(root)
			.max_depth(max_depth)
			.sort_by(|a, b| a.file_name().cmp(b.file_name()))
		{
			let entry = entry.map_err(to_io_error)?;
			if entry.file_type().is_file() {
				found.push(entry.into_path());
			}
		}
		Ok(found)
	}
}

fn to_io_error(err: walkdir::Error) -> io::Error {
	if let Some(inner) = err.io_error() {
		return io::Error::new(inner.kind(), inner.to_string());
	}
	io::Error::new(io::ErrorKind::Other, err.to_string())
}
