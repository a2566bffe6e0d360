// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: execution.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::rgs::digest::{self, DigestComputer, DigestSource};
use crate::rgs::error::{DigestError, TargetError};
use crate::rgs::target::EmissionTarget;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ErrorStrategy {
	/// Stop at the first digest or digest-file failure and skip the
	/// summary artifacts.
	FailFast,
	/// Attempt every pair and finalize every target.
	#[default]
	Continue,
}

#[derive(Clone, Debug)]
pub struct ErrorHandlingProfile {
	pub strategy: ErrorStrategy,
	pub exit_success: i32,
	pub exit_recoverable: i32,
	pub exit_fatal: i32,
}

impl Default for ErrorHandlingProfile {
	fn default() -> Self {
		Self {
			strategy: ErrorStrategy::Continue,
			exit_success: 0,
			exit_recoverable: 2,
			exit_fatal: 1,
		}
	}
}

/// One problem recorded during a run.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionFailure {
	#[error("{algorithm} digest of {} failed: {error}", file.display())]
	Digest {
		file: PathBuf,
		algorithm: String,
		#[source]
		error: DigestError,
	},

	#[error("target {target} failed: {error}")]
	Target {
		target: String,
		#[source]
		error: TargetError,
	},
}

/// Outcome of a run.
#[derive(Debug)]
pub struct ExecutionReport {
	pub pairs_attempted: u64,
	pub pairs_digested: u64,
	pub failures: Vec<ExecutionFailure>,
	/// Set when `FailFast` stopped the run before the summaries were
	/// written.
	pub aborted: bool,
	profile: ErrorHandlingProfile,
}

impl ExecutionReport {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty() && !self.aborted
	}

	pub fn digest_failures(&self) -> impl Iterator<Item = &ExecutionFailure> {
		self.failures
			.iter()
			.filter(|failure| matches!(failure, ExecutionFailure::Digest { .. }))
	}

	pub fn target_failures(&self) -> impl Iterator<Item = &ExecutionFailure> {
		self.failures
			.iter()
			.filter(|failure| matches!(failure, ExecutionFailure::Target { .. }))
	}

	pub fn exit_code(&self) -> i32 {
		if self.aborted {
			self.profile.exit_fatal
		} else if !self.failures.is_empty() {
			self.profile.exit_recoverable
		} else {
			self.profile.exit_success
		}
	}
}

/// Drives digests over files × algorithms and fans the results out to
/// every target.
pub struct Execution {
	files: Vec<PathBuf>,
	algorithms: Vec<String>,
	targets: Vec<Box<dyn EmissionTarget>>,
	source: Box<dyn DigestSource>,
	profile: ErrorHandlingProfile,
	quiet: bool,
}

impl Execution {
	pub fn new(
		files: Vec<PathBuf>,
		algorithms: Vec<String>,
		targets: Vec<Box<dyn EmissionTarget>>,
	) -> Self {
		Self {
			files,
			algorithms,
			targets,
			source: Box::new(DigestComputer::new()),
			profile: ErrorHandlingProfile::default(),
			quiet: false,
		}
	}

	pub fn with_strategy(mut self, strategy: ErrorStrategy) -> Self {
		self.profile.strategy = strategy;
		self
	}

	/// Replace the default [`DigestComputer`].
	pub fn with_source(mut self, source: impl DigestSource + 'static) -> Self {
		self.source = Box::new(source);
		self
	}

	pub fn quiet(mut self, quiet: bool) -> Self {
		self.quiet = quiet;
		self
	}

	pub fn run(self) -> ExecutionReport {
		let Self {
			files,
			algorithms,
			targets,
			source,
			profile,
			quiet,
		} = self;
		let fail_fast = profile.strategy == ErrorStrategy::FailFast;
		let mut report = ExecutionReport {
			pairs_attempted: 0,
			pairs_digested: 0,
			failures: Vec::new(),
			aborted: false,
			profile,
		};

		let mut active: Vec<Box<dyn EmissionTarget>> = Vec::new();
		for mut target in targets {
			match target.initialize() {
				Ok(()) => active.push(target),
				Err(error) => {
					warn!(output = target.name(), %error, "target disabled");
					report.failures.push(ExecutionFailure::Target {
						target: target.name().to_string(),
						error,
					});
				}
			}
		}

		'files: for file in &files {
			for algorithm in &algorithms {
				report.pairs_attempted += 1;
				let label = digest::canonical_name(algorithm)
					.unwrap_or(algorithm.as_str());
				let digest = match source.compute(file, algorithm) {
					Ok(digest) => digest,
					Err(error) => {
						warn!(
							file = %file.display(),
							algorithm = label,
							%error,
							"digest failed"
						);
						report.failures.push(ExecutionFailure::Digest {
							file: file.clone(),
							algorithm: label.to_string(),
							error,
						});
						if fail_fast {
							report.aborted = true;
							break 'files;
						}
						continue;
					}
				};
				report.pairs_digested += 1;
				debug!(
					file = %file.display(),
					algorithm = label,
					%digest,
					"computed digest"
				);

				if fan_out(&mut active, &digest, file, label, &mut report)
					&& fail_fast
				{
					report.aborted = true;
					break 'files;
				}
			}
		}

		if report.aborted {
			warn!(
				failures = report.failures.len(),
				"aborting on first failure, summary files not written"
			);
			return report;
		}

		for target in active.iter_mut() {
			if let Err(error) = target.finalize() {
				warn!(output = target.name(), %error, "finalize failed");
				report.failures.push(ExecutionFailure::Target {
					target: target.name().to_string(),
					error,
				});
			}
		}

		if !quiet {
			info!(
				files = files.len(),
				digests = report.pairs_digested,
				failures = report.failures.len(),
				"checksum run finished"
			);
		}
		report
	}
}

/// Forward one digest to every target; returns `true` if any rejected it.
fn fan_out(
	targets: &mut [Box<dyn EmissionTarget>],
	digest: &str,
	file: &Path,
	algorithm: &str,
	report: &mut ExecutionReport,
) -> bool {
	let mut failed = false;
	for target in targets.iter_mut() {
		if let Err(error) = target.write(digest, file, algorithm) {
			warn!(output = target.name(), %error, "write failed");
			report.failures.push(ExecutionFailure::Target {
				target: target.name().to_string(),
				error,
			});
			failed = true;
		}
	}
	failed
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::rc::Rc;

	type Events = Rc<RefCell<Vec<String>>>;

	struct Recording {
		name: String,
		events: Events,
		fail_finalize: bool,
	}

	impl EmissionTarget for Recording {
		fn name(&self) -> &str {
			&self.name
		}

		fn initialize(&mut self) -> Result<(), TargetError> {
			self.events.borrow_mut().push(format!("{}:init", self.name));
			Ok(())
		}

		fn write(
			&mut self,
			_digest: &str,
			file: &Path,
			algorithm: &str,
		) -> Result<(), TargetError> {
			let name = file.file_name().unwrap().to_string_lossy();
			self.events
				.borrow_mut()
				.push(format!("{}:{}:{}", self.name, name, algorithm));
			Ok(())
		}

		fn finalize(&mut self) -> Result<(), TargetError> {
			self.events.borrow_mut().push(format!("{}:finalize", self.name));
			if self.fail_finalize {
				return Err(TargetError::lifecycle(&self.name, "boom"));
			}
			Ok(())
		}
	}

	fn recording(name: &str, events: &Events, fail: bool) -> Box<dyn EmissionTarget> {
		Box::new(Recording {
			name: name.to_string(),
			events: Rc::clone(events),
			fail_finalize: fail,
		})
	}

	#[test]
	fn finalize_failure_does_not_skip_other_targets() {
		let tmp = tempfile::tempdir().unwrap();
		let file = tmp.path().join("a.txt");
		std::fs::write(&file, b"a").unwrap();
		let events: Events = Rc::default();

		let report = Execution::new(
			vec![file],
			vec!["MD5".to_string()],
			vec![recording("one", &events, true), recording("two", &events, false)],
		)
		.run();

		let events = events.borrow();
		assert!(events.contains(&"one:finalize".to_string()));
		assert!(events.contains(&"two:finalize".to_string()));
		assert_eq!(report.target_failures().count(), 1);
		assert_eq!(report.exit_code(), 2);
	}

	#[test]
	fn fail_fast_stops_and_skips_finalize() {
		let tmp = tempfile::tempdir().unwrap();
		let good = tmp.path().join("good.txt");
		std::fs::write(&good, b"g").unwrap();
		let events: Events = Rc::default();

		let report = Execution::new(
			vec![tmp.path().join("missing.txt"), good],
			vec!["MD5".to_string()],
			vec![recording("one", &events, false)],
		)
		.with_strategy(ErrorStrategy::FailFast)
		.run();

		assert!(report.aborted);
		assert_eq!(report.pairs_attempted, 1);
		assert_eq!(report.exit_code(), 1);
		assert_eq!(*events.borrow(), vec!["one:init".to_string()]);
	}

	#[test]
	fn reports_canonical_algorithm_names() {
		let tmp = tempfile::tempdir().unwrap();
		let file = tmp.path().join("x.bin");
		std::fs::write(&file, b"x").unwrap();
		let events: Events = Rc::default();

		let report = Execution::new(
			vec![file],
			vec!["sha256".to_string()],
			vec![recording("one", &events, false)],
		)
		.run();

		assert!(report.is_success());
		assert_eq!(report.exit_code(), 0);
		assert!(events.borrow().contains(&"one:x.bin:SHA-256".to_string()));
	}

	struct Fixed;

	impl DigestSource for Fixed {
		fn compute(
			&self,
			file: &Path,
			algorithm: &str,
		) -> Result<String, DigestError> {
			if algorithm == "MD5" && file.ends_with("bad") {
				return Err(DigestError::NotAFile {
					path: file.to_path_buf(),
				});
			}
			Ok(format!("{algorithm}-digest"))
		}
	}

	#[test]
	fn one_failed_pair_leaves_the_others_flowing() {
		let events: Events = Rc::default();

		let report = Execution::new(
			vec![PathBuf::from("/in/bad"), PathBuf::from("/in/good")],
			vec!["MD5".to_string(), "SHA-1".to_string()],
			vec![recording("one", &events, false)],
		)
		.with_source(Fixed)
		.run();

		assert_eq!(report.pairs_attempted, 4);
		assert_eq!(report.pairs_digested, 3);
		assert_eq!(report.digest_failures().count(), 1);
		assert_eq!(report.exit_code(), 2);
		let events = events.borrow();
		assert!(!events.contains(&"one:bad:MD5".to_string()));
		assert!(events.contains(&"one:bad:SHA-1".to_string()));
		assert!(events.contains(&"one:finalize".to_string()));
	}
}
