// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: encoding.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use std::fmt;
use std::str::FromStr;

use strum::EnumIter;

use crate::rgs::error::ConfigurationError;

/// Character encoding used when persisting summary artifacts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, EnumIter)]
pub enum OutputEncoding {
	#[default]
	Utf8,
	UsAscii,
	Latin1,
	Utf16Be,
	Utf16Le,
}

impl OutputEncoding {
	/// Name written into documents that declare their encoding.
	pub fn label(self) -> &'static str {
		match self {
			Self::Utf8 => "UTF-8",
			Self::UsAscii => "US-ASCII",
			Self::Latin1 => "ISO-8859-1",
			Self::Utf16Be => "UTF-16BE",
			Self::Utf16Le => "UTF-16LE",
		}
	}

	/// Encode `text`, failing on the first character the encoding
	/// cannot represent.
	pub fn encode(self, text: &str) -> Result<Vec<u8>, String> {
		match self {
			Self::Utf8 => Ok(text.as_bytes().to_vec()),
			Self::UsAscii => single_byte(text, 0x7f, self),
			Self::Latin1 => single_byte(text, 0xff, self),
			Self::Utf16Be => Ok(text
				.encode_utf16()
				.flat_map(u16::to_be_bytes)
				.collect()),
			Self::Utf16Le => Ok(text
				.encode_utf16()
				.flat_map(u16::to_le_bytes)
				.collect()),
		}
	}
}

fn single_byte(
	text: &str,
	max: u32,
	encoding: OutputEncoding,
) -> Result<Vec<u8>, String> {
	text.chars()
		.map(|ch| {
			let code = ch as u32;
			if code <= max {
				Ok(code as u8)
			} else {
				Err(format!(
					"character {:?} cannot be encoded as {}",
					ch,
					encoding.label()
				))
			}
		})
		.collect()
}

impl FromStr for OutputEncoding {
	type Err = ConfigurationError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let normalized = value.trim().to_ascii_uppercase().replace('_', "-");
		match normalized.as_str() {
			"UTF-8" | "UTF8" => Ok(Self::Utf8),
			"US-ASCII" | "ASCII" => Ok(Self::UsAscii),
			"ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => {
				Ok(Self::Latin1)
			}
			"UTF-16BE" | "UTF16BE" => Ok(Self::Utf16Be),
			"UTF-16LE" | "UTF16LE" => Ok(Self::Utf16Le),
			_ => Err(ConfigurationError::UnknownEncoding(
				value.to_string(),
			)),
		}
	}
}

impl fmt::Display for OutputEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.label())
	}
}
