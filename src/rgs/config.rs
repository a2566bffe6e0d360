// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: config.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rgs::encoding::OutputEncoding;
use crate::rgs::error::ConfigurationError;
use crate::rgs::execution::ErrorStrategy;
use crate::rgs::target::lua::{self, DEFAULT_TABLE_NAME};
use crate::rgs::target::{
	CsvSummaryTarget, EmissionTarget, IndividualFilesTarget,
	LuaTableTarget, SummaryFile, XmlSummaryTarget,
};

/// Everything a run needs besides the input file list.
///
/// Field names follow the checksum plugin parameters so existing
/// configurations translate one to one.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChecksumConfig {
	pub algorithms: Vec<String>,
	pub encoding: String,
	pub fail_on_error: bool,
	pub quiet: bool,

	pub individual_files: bool,
	pub individual_files_output_directory: Option<PathBuf>,
	pub algorithm_suffixes: BTreeMap<String, String>,

	pub csv_summary: bool,
	pub csv_summary_file: PathBuf,

	pub xml_summary: bool,
	pub xml_summary_file: PathBuf,

	pub lua_table: bool,
	pub lua_table_file: PathBuf,
	pub table_object_name: String,
}

impl Default for ChecksumConfig {
	fn default() -> Self {
		Self {
			algorithms: vec!["MD5".to_string(), "SHA-1".to_string()],
			encoding: OutputEncoding::Utf8.label().to_string(),
			fail_on_error: false,
			quiet: false,
			individual_files: true,
			individual_files_output_directory: None,
			algorithm_suffixes: BTreeMap::new(),
			csv_summary: true,
			csv_summary_file: PathBuf::from("checksums.csv"),
			xml_summary: false,
			xml_summary_file: PathBuf::from("checksums.xml"),
			lua_table: false,
			lua_table_file: PathBuf::from("checksums.lua"),
			table_object_name: DEFAULT_TABLE_NAME.to_string(),
		}
	}
}

impl ChecksumConfig {
	pub fn from_toml_str(
		source: &str,
		origin: &Path,
	) -> Result<Self, ConfigurationError> {
		toml::from_str(source).map_err(|source| ConfigurationError::Parse {
			path: origin.to_path_buf(),
			source,
		})
	}

	pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
		let source = std::fs::read_to_string(path).map_err(|source| {
			ConfigurationError::Io {
				path: path.to_path_buf(),
				source,
			}
		})?;
		Self::from_toml_str(&source, path)
	}

	pub fn error_strategy(&self) -> ErrorStrategy {
		if self.fail_on_error {
			ErrorStrategy::FailFast
		} else {
			ErrorStrategy::Continue
		}
	}

	/// Check the configuration before any file is touched.
	pub fn validate(&self) -> Result<OutputEncoding, ConfigurationError> {
		if self.algorithms.is_empty() {
			return Err(ConfigurationError::NoAlgorithms);
		}
		if self.algorithms.iter().any(|alg| alg.trim().is_empty()) {
			return Err(ConfigurationError::BlankAlgorithm);
		}
		let encoding: OutputEncoding = self.encoding.parse()?;

		if !(self.individual_files
			|| self.csv_summary
			|| self.xml_summary
			|| self.lua_table)
		{
			return Err(ConfigurationError::NoTargets);
		}
		let summaries = [
			(self.csv_summary, &self.csv_summary_file, "csv-summary"),
			(self.xml_summary, &self.xml_summary_file, "xml-summary"),
			(self.lua_table, &self.lua_table_file, "lua-table"),
		];
		for (enabled, path, target) in summaries {
			if enabled && path.as_os_str().is_empty() {
				return Err(ConfigurationError::MissingSummaryPath {
					target,
				});
			}
		}
		if self.lua_table && !lua::is_valid_table_name(&self.table_object_name)
		{
			return Err(ConfigurationError::InvalidTableName(
				self.table_object_name.clone(),
			));
		}
		for (algorithm, suffix) in &self.algorithm_suffixes {
			if suffix.is_empty() || suffix.contains(['/', '\\']) {
				return Err(ConfigurationError::InvalidSuffix {
					algorithm: algorithm.clone(),
					suffix: suffix.clone(),
				});
			}
		}
		Ok(encoding)
	}

	/// Validate and build the enabled targets in their fixed order:
	/// individual files, CSV, XML, Lua. Relative summary paths resolve
	/// against `output_root`.
	pub fn build_targets(
		&self,
		output_root: &Path,
	) -> Result<Vec<Box<dyn EmissionTarget>>, ConfigurationError> {
		let encoding = self.validate()?;
		let resolve = |path: &Path| resolve_against(output_root, path);

		let mut targets: Vec<Box<dyn EmissionTarget>> = Vec::new();
		if self.individual_files {
			targets.push(Box::new(IndividualFilesTarget::new(
				self.individual_files_output_directory
					.as_deref()
					.map(resolve),
				self.algorithm_suffixes.clone(),
			)));
		}
		if self.csv_summary {
			targets.push(Box::new(CsvSummaryTarget::new(SummaryFile::new(
				resolve(self.csv_summary_file.as_path()),
				encoding,
			))));
		}
		if self.xml_summary {
			targets.push(Box::new(XmlSummaryTarget::new(SummaryFile::new(
				resolve(self.xml_summary_file.as_path()),
				encoding,
			))));
		}
		if self.lua_table {
			targets.push(Box::new(LuaTableTarget::new(
				SummaryFile::new(
					resolve(self.lua_table_file.as_path()),
					encoding,
				),
				self.table_object_name.clone(),
			)));
		}
		Ok(targets)
	}
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		root.join(path)
	}
}
