// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: error.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::io;
use std::path::PathBuf;

/// Failure computing one (file, algorithm) digest.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
	#[error("unsupported digest algorithm `{algorithm}`")]
	UnsupportedAlgorithm { algorithm: String },

	#[error("failed to read {}: {source}", path.display())]
	Read { path: PathBuf, source: io::Error },

	#[error("{} is not a regular file", path.display())]
	NotAFile { path: PathBuf },
}

impl DigestError {
	pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
		Self::Read {
			path: path.into(),
			source,
		}
	}
}

/// Failure raised by an emission target.
///
/// A target error never affects another target's lifecycle; the
/// orchestrator collects these and reports them at the end of a run.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
	#[error("{target}: {message}")]
	Lifecycle { target: String, message: String },

	#[error("{target}: cannot write {}: {message}", path.display())]
	Close {
		target: String,
		path: PathBuf,
		message: String,
	},

	#[error("cannot write digest file {}: {message}", path.display())]
	Sidecar { path: PathBuf, message: String },
}

impl TargetError {
	pub fn lifecycle(
		target: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self::Lifecycle {
			target: target.into(),
			message: message.into(),
		}
	}

	pub fn close(
		target: impl Into<String>,
		path: impl Into<PathBuf>,
		message: impl ToString,
	) -> Self {
		Self::Close {
			target: target.into(),
			path: path.into(),
			message: message.to_string(),
		}
	}

	pub fn sidecar(
		path: impl Into<PathBuf>,
		message: impl ToString,
	) -> Self {
		Self::Sidecar {
			path: path.into(),
			message: message.to_string(),
		}
	}
}

/// Malformed run configuration, detected before any digesting starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
	#[error("no digest algorithm configured")]
	NoAlgorithms,

	#[error("algorithm list contains a blank entry")]
	BlankAlgorithm,

	#[error("no output target enabled")]
	NoTargets,

	#[error("{target} is enabled but its summary file path is empty")]
	MissingSummaryPath { target: &'static str },

	#[error("unknown output encoding `{0}`")]
	UnknownEncoding(String),

	#[error("`{0}` is not a valid Lua table identifier")]
	InvalidTableName(String),

	#[error("invalid file suffix `{suffix}` for algorithm {algorithm}")]
	InvalidSuffix { algorithm: String, suffix: String },

	#[error("failed to read configuration {}: {source}", path.display())]
	Io { path: PathBuf, source: io::Error },

	#[error("failed to parse configuration {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		source: toml::de::Error,
	},
}
