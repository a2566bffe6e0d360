// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: main.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use rustgensum::rgs::app;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let code = app::run()?;
	if code != 0 {
		std::process::exit(code);
	}
	Ok(())
}
