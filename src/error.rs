// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Error taxonomy shared by every component of the core engine.
//!
//! Request-path misses (a key not found, a peer that failed to answer) are
//! deliberately *not* represented here — those are `Option::None` at the call
//! site, because they are expected protocol outcomes, not process failures.
//! This enum only covers conditions that should abort a bootstrap or mark a
//! stored database as corrupt.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	Io(std::io::Error),
	/// The postings stream did not land exactly on the partition end, or an
	/// entry's length field could not be trusted.
	Corruption(String),
	/// `index::HashIndex::build` could not place an entry after probing every
	/// bucket. Should not occur given `NUM_BUCKETS`'s margin over the maximum
	/// entries per partition.
	IndexFull,
	/// A CLI argument or digest-protocol request failed validation.
	Config(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Io(e) => write!(f, "io error: {}", e),
			Error::Corruption(msg) => write!(f, "corrupt database: {}", msg),
			Error::IndexFull => write!(f, "hash index full"),
			Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(e: std::io::Error) -> Error {
		Error::Io(e)
	}
}
