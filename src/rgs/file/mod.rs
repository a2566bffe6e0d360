// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: mod.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

pub mod walker;

use std::path::PathBuf;

pub use walker::Walker;

/// Paths named on the command line and how to expand directories among
/// them.
#[derive(Clone, Debug)]
pub struct InputPlan {
	pub roots: Vec<PathBuf>,
	pub recursive: bool,
}

impl InputPlan {
	pub fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
		Self { roots, recursive }
	}
}
