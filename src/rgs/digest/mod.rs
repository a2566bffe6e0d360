// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// Module: digest
// Purpose: Streaming file digests over the RustCrypto hashers.

pub mod registry;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::rgs::error::DigestError;

pub use registry::{canonical_name, supported_algorithms, SUPPORTED_ALGORITHMS};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Anything that can turn a (file, algorithm) pair into a hex digest.
pub trait DigestSource {
	fn compute(
		&self,
		file: &Path,
		algorithm: &str,
	) -> Result<String, DigestError>;
}

/// Computes lowercase hex digests of files.
///
/// Stateless between calls: every `compute` builds its own hasher and
/// streams the file through a fixed-size buffer, so memory use does not
/// depend on the file size.
#[derive(Clone, Debug)]
pub struct DigestComputer {
	buffer_size: usize,
}

impl DigestComputer {
	pub fn new() -> Self {
		Self {
			buffer_size: DEFAULT_BUFFER_SIZE,
		}
	}

	pub fn with_buffer_size(buffer_size: usize) -> Self {
		Self {
			buffer_size: buffer_size.max(1),
		}
	}

	pub fn compute(
		&self,
		file: &Path,
		algorithm: &str,
	) -> Result<String, DigestError> {
		let mut hasher = registry::new_hasher(algorithm).ok_or_else(
			|| DigestError::UnsupportedAlgorithm {
				algorithm: algorithm.to_string(),
			},
		)?;

		let metadata = std::fs::metadata(file)
			.map_err(|err| DigestError::read(file, err))?;
		if !metadata.is_file() {
			return Err(DigestError::NotAFile {
				path: file.to_path_buf(),
			});
		}

		let handle =
			File::open(file).map_err(|err| DigestError::read(file, err))?;
		let mut reader =
			BufReader::with_capacity(self.buffer_size, handle);
		let mut buffer = vec![0; self.buffer_size];
		loop {
			let count = reader
				.read(&mut buffer)
				.map_err(|err| DigestError::read(file, err))?;
			if count == 0 {
				break;
			}
			hasher.update(&buffer[..count]);
		}
		Ok(hex::encode(hasher.finalize_reset()))
	}
}

impl DigestSource for DigestComputer {
	fn compute(
		&self,
		file: &Path,
		algorithm: &str,
	) -> Result<String, DigestError> {
		DigestComputer::compute(self, file, algorithm)
	}
}

impl Default for DigestComputer {
	fn default() -> Self {
		Self::new()
	}
}
