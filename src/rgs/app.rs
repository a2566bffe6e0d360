// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: app.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{crate_name, Arg, ArgAction, ArgMatches};
use strum::IntoEnumIterator;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::rgs::config::ChecksumConfig;
use crate::rgs::digest::supported_algorithms;
use crate::rgs::encoding::OutputEncoding;
use crate::rgs::error::ConfigurationError;
use crate::rgs::execution::{Execution, ExecutionReport};
use crate::rgs::file::{InputPlan, Walker};

const HELP_TEMPLATE: &str = "{before-help}{name} {version}
Written by {author-with-newline}{about-with-newline}
Primary command families:
  rgs files <PATHS>   Digest files into sidecars and summaries (e.g. rgs files -a sha256 --lua dist/)
  rgs algorithms      List supported digest algorithms
{usage-heading} {usage}

{all-args}{after-help}
";

pub fn build_cli() -> clap::Command {
	clap::Command::new(crate_name!())
		.color(clap::ColorChoice::Never)
		.help_template(HELP_TEMPLATE)
		.bin_name("rgs")
		.version(clap::crate_version!())
		.author(clap::crate_authors!())
		.about("Checksum files into sidecar, CSV, XML and Lua outputs")
		.subcommand_required(true)
		.arg_required_else_help(true)
		.subcommand(
			clap::Command::new("files")
				.about("Digest files and write every enabled output")
				.arg(
					Arg::new("paths")
						.help("Files or directories to digest")
						.num_args(0..)
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("algorithm")
						.short('a')
						.long("algorithm")
						.help("Digest algorithm, repeatable (e.g., sha256)")
						.action(ArgAction::Append),
				)
				.arg(
					Arg::new("encoding")
						.long("encoding")
						.help("Encoding of summary files (UTF-8, ISO-8859-1, ...)"),
				)
				.arg(
					Arg::new("config")
						.long("config")
						.help("TOML configuration file; flags override it")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("output-dir")
						.long("output-dir")
						.help("Base directory for relative output paths")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("recursive")
						.short('r')
						.long("recursive")
						.help("Descend into subdirectories")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("no-individual-files")
						.long("no-individual-files")
						.help("Do not write per-file digest files")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("individual-dir")
						.long("individual-dir")
						.help("Write per-file digest files here instead of beside the source")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("no-csv")
						.long("no-csv")
						.help("Do not write the CSV summary")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("csv-file")
						.long("csv-file")
						.help("CSV summary path")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("xml")
						.long("xml")
						.help("Write the XML summary")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("xml-file")
						.long("xml-file")
						.help("XML summary path (implies --xml)")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("lua")
						.long("lua")
						.help("Write the Lua table summary")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("lua-file")
						.long("lua-file")
						.help("Lua summary path (implies --lua)")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("lua-table-name")
						.long("lua-table-name")
						.help("Table the Lua summary assigns into"),
				)
				.arg(
					Arg::new("fail-on-error")
						.long("fail-on-error")
						.help("Stop at the first failure and skip summaries")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("quiet")
						.short('q')
						.long("quiet")
						.help("Only log warnings and errors")
						.action(ArgAction::SetTrue)
						.conflicts_with("verbose"),
				)
				.arg(
					Arg::new("verbose")
						.short('v')
						.long("verbose")
						.help("Log every computed digest")
						.action(ArgAction::SetTrue),
				),
		)
		.subcommand(
			clap::Command::new("algorithms")
				.about("List supported digest algorithms and encodings"),
		)
}

/// Assemble the run configuration: defaults, then the TOML file named by
/// `--config`, then individual flags.
pub fn config_from_matches(
	matches: &ArgMatches,
) -> Result<ChecksumConfig, ConfigurationError> {
	let mut config = match matches.get_one::<PathBuf>("config") {
		Some(path) => ChecksumConfig::load(path)?,
		None => ChecksumConfig::default(),
	};

	if let Some(algorithms) = matches.get_many::<String>("algorithm") {
		config.algorithms = algorithms.cloned().collect();
	}
	if let Some(encoding) = matches.get_one::<String>("encoding") {
		config.encoding = encoding.clone();
	}
	if matches.get_flag("no-individual-files") {
		config.individual_files = false;
	}
	if let Some(dir) = matches.get_one::<PathBuf>("individual-dir") {
		config.individual_files_output_directory = Some(dir.clone());
	}
	if matches.get_flag("no-csv") {
		config.csv_summary = false;
	}
	if let Some(path) = matches.get_one::<PathBuf>("csv-file") {
		config.csv_summary_file = path.clone();
	}
	if matches.get_flag("xml") {
		config.xml_summary = true;
	}
	if let Some(path) = matches.get_one::<PathBuf>("xml-file") {
		config.xml_summary = true;
		config.xml_summary_file = path.clone();
	}
	if matches.get_flag("lua") {
		config.lua_table = true;
	}
	if let Some(path) = matches.get_one::<PathBuf>("lua-file") {
		config.lua_table = true;
		config.lua_table_file = path.clone();
	}
	if let Some(name) = matches.get_one::<String>("lua-table-name") {
		config.table_object_name = name.clone();
	}
	if matches.get_flag("fail-on-error") {
		config.fail_on_error = true;
	}
	if matches.get_flag("quiet") {
		config.quiet = true;
	}
	Ok(config)
}

/// Validate `config`, expand `plan` and run every enabled target.
///
/// Configuration problems are returned before any file is read.
pub fn execute(
	config: &ChecksumConfig,
	plan: InputPlan,
	output_root: &Path,
) -> Result<ExecutionReport, Box<dyn Error>> {
	let targets = config.build_targets(output_root)?;
	let files = Walker::new(plan).walk()?;
	if !config.quiet {
		info!(
			files = files.len(),
			algorithms = config.algorithms.len(),
			targets = targets.len(),
			"starting checksum run"
		);
	}
	Ok(Execution::new(files, config.algorithms.clone(), targets)
		.with_strategy(config.error_strategy())
		.quiet(config.quiet)
		.run())
}

fn setup_logging(verbose: bool, quiet: bool) {
	let level = if verbose {
		"debug"
	} else if quiet {
		"warn"
	} else {
		"info"
	};
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(level));
	// A subscriber may already be installed when embedded.
	let _ = tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(filter)
		.try_init();
}

fn handle_files_command(matches: &ArgMatches) -> Result<i32, Box<dyn Error>> {
	let config = config_from_matches(matches)?;
	setup_logging(matches.get_flag("verbose"), config.quiet);

	let roots: Vec<PathBuf> = matches
		.get_many::<PathBuf>("paths")
		.map(|paths| paths.cloned().collect())
		.unwrap_or_default();
	let output_root = matches
		.get_one::<PathBuf>("output-dir")
		.cloned()
		.unwrap_or_else(|| PathBuf::from("."));
	let plan = InputPlan::new(roots, matches.get_flag("recursive"));

	let report = execute(&config, plan, &output_root)?;
	for failure in &report.failures {
		error!("{}", failure);
	}
	Ok(report.exit_code())
}

fn list_algorithms() {
	println!("Digest algorithms:");
	for name in supported_algorithms() {
		println!("  {}", name);
	}
	println!("Summary encodings:");
	for encoding in OutputEncoding::iter() {
		println!("  {}", encoding);
	}
}

/// Run the command line and return the process exit code.
pub fn run() -> Result<i32, Box<dyn Error>> {
	let matches = build_cli().get_matches();
	match matches.subcommand() {
		Some(("files", sub)) => handle_files_command(sub),
		Some(("algorithms", _)) => {
			list_algorithms();
			Ok(0)
		}
		_ => unreachable!(),
	}
}
