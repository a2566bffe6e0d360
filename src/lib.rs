// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: lib.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

pub mod rgs {
	pub mod app;
	pub mod config;
	pub mod digest;
	pub mod encoding;
	pub mod error;
	pub mod execution;
	pub mod file;
	pub mod target;
}
