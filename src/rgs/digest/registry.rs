// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgensum
// File: registry.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use digest::{Digest, DynDigest};

macro_rules! algorithm_registry {
	($($name:literal => $hasher:expr),+ $(,)?) => {
		/// Canonical names of every algorithm the registry can build.
		pub const SUPPORTED_ALGORITHMS: &[&str] = &[$($name),+];

		fn build(canonical: &str) -> Option<Box<dyn DynDigest>> {
			match canonical {
				$(
					$name => Some(Box::new($hasher)),
				)+
				_ => None,
			}
		}
	};
}

algorithm_registry!(
	"BLAKE2B-512" => blake2::Blake2b512::new(),
	"BLAKE2S-256" => blake2::Blake2s256::new(),
	"BLAKE3" => blake3::Hasher::new(),
	"GOST94" => gost94::Gost94CryptoPro::new(),
	"GROESTL-256" => groestl::Groestl256::new(),
	"MD2" => md2::Md2::new(),
	"MD4" => md4::Md4::new(),
	"MD5" => md5::Md5::new(),
	"RIPEMD-160" => ripemd::Ripemd160::new(),
	"RIPEMD-320" => ripemd::Ripemd320::new(),
	"SHA-1" => sha1::Sha1::new(),
	"SHA-224" => sha2::Sha224::new(),
	"SHA-256" => sha2::Sha256::new(),
	"SHA-384" => sha2::Sha384::new(),
	"SHA-512" => sha2::Sha512::new(),
	"SHA3-224" => sha3::Sha3_224::new(),
	"SHA3-256" => sha3::Sha3_256::new(),
	"SHA3-384" => sha3::Sha3_384::new(),
	"SHA3-512" => sha3::Sha3_512::new(),
	"SHABAL-256" => shabal::Shabal256::new(),
	"SHABAL-512" => shabal::Shabal512::new(),
	"SM3" => sm3::Sm3::new(),
	"STREEBOG-256" => streebog::Streebog256::new(),
	"STREEBOG-512" => streebog::Streebog512::new(),
	"TIGER" => tiger::Tiger::new(),
	"WHIRLPOOL" => whirlpool::Whirlpool::new(),
);

/// Resolve a user supplied token (`sha256`, `SHA3_256`, `Sha-1`) to the
/// canonical algorithm name.
pub fn canonical_name(token: &str) -> Option<&'static str> {
	let wanted = token.trim().to_uppercase().replace('_', "-");
	if wanted.is_empty() {
		return None;
	}
	if let Some(name) = SUPPORTED_ALGORITHMS
		.iter()
		.copied()
		.find(|name| *name == wanted)
	{
		return Some(name);
	}
	let compact = wanted.replace('-', "");
	SUPPORTED_ALGORITHMS
		.iter()
		.copied()
		.find(|name| name.replace('-', "") == compact)
}

/// Build a fresh hasher for `token`, or `None` when unsupported.
pub fn new_hasher(token: &str) -> Option<Box<dyn DynDigest>> {
	canonical_name(token).and_then(build)
}

pub fn supported_algorithms() -> impl Iterator<Item = &'static str> {
	SUPPORTED_ALGORITHMS.iter().copied()
}
