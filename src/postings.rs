// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Binary postings format: a key's entry is a null-terminated key, zero
//! padding up to the next 4-byte boundary, a 4-byte little-endian signed
//! count, and that many 4-byte little-endian postings.
//!
//! Entries are identified by byte offset into a borrowed region rather than
//! by pointer, and every value is read by slicing 4 bytes and converting with
//! `from_le_bytes` rather than by casting an unaligned pointer — the region
//! backing a worker's partition is a plain heap `Vec<u8>` copied over TCP, not
//! a word-aligned mmap, so offset arithmetic must never assume alignment.

use crate::error::{Error, Result};
use std::convert::TryInto;
use std::fmt::Write as _;

/// Rounds `n` up to the next multiple of `mult`, which must be a power of two.
pub fn round_up(n: usize, mult: usize) -> usize {
	(n + (mult - 1)) & !(mult - 1)
}

/// A single decoded entry borrowed from a postings region.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
	pub key: &'a [u8],
	values: &'a [u8],
	pub len: usize,
}

impl<'a> Entry<'a> {
	/// Returns the entry's postings, decoded on demand from the backing bytes.
	pub fn values(&self) -> impl Iterator<Item = u32> + 'a {
		let values = self.values;
		(0..self.len).map(move |i| {
			let start = i * 4;
			u32::from_le_bytes(values[start..start + 4].try_into().unwrap())
		})
	}

	pub fn values_vec(&self) -> Vec<u32> {
		self.values().collect()
	}

	/// Writes `"<key>,<v0>,<v1>,...,<vL-1>\n"` into `out`. Every value is
	/// comma-prefixed, including the first.
	pub fn write_to_string(&self, out: &mut String) {
		out.push_str(std::str::from_utf8(self.key).unwrap_or(""));
		for v in self.values() {
			let _ = write!(out, ",{}", v);
		}
		out.push('\n');
	}

	pub fn to_entry_string(&self) -> String {
		let mut s = String::new();
		self.write_to_string(&mut s);
		s
	}
}

/// Returns the offset of the first entry in `region` — always 0.
pub fn first_entry(region: &[u8]) -> usize {
	let _ = region;
	0
}

fn key_len_at(region: &[u8], offset: usize) -> usize {
	region[offset..]
		.iter()
		.position(|&b| b == 0)
		.expect("postings entry missing null terminator")
}

/// Decodes the entry starting at `offset`. Panics-free: callers are expected
/// to have validated the region with `validate` first (performed once, at
/// `index::HashIndex::build` time).
pub fn entry_at(region: &[u8], offset: usize) -> Entry<'_> {
	let key_len = key_len_at(region, offset);
	let key = &region[offset..offset + key_len];
	let len_offset = offset + round_up(key_len + 1, 4);
	let len = i32::from_le_bytes(region[len_offset..len_offset + 4].try_into().unwrap());
	let values_offset = len_offset + 4;
	let len = len.max(0) as usize;
	let values = &region[values_offset..values_offset + len * 4];
	Entry { key, values, len }
}

/// Returns the offset of the entry following the one at `offset`.
pub fn next_entry(region: &[u8], offset: usize) -> usize {
	let entry = entry_at(region, offset);
	let key_len = entry.key.len();
	offset + round_up(key_len + 1, 4) + 4 + 4 * entry.len
}

/// Walks every entry in `region`, confirming the stream lands exactly on
/// `region.len()`. Returns the offsets of every entry found.
pub fn validate(region: &[u8]) -> Result<Vec<usize>> {
	let mut offsets = Vec::new();
	let mut offset = first_entry(region);
	while offset < region.len() {
		if offset + 1 > region.len() {
			return Err(Error::Corruption("truncated entry".into()));
		}
		offsets.push(offset);
		let next = next_entry(region, offset);
		if next <= offset {
			return Err(Error::Corruption("entry did not advance".into()));
		}
		offset = next;
	}
	if offset != region.len() {
		return Err(Error::Corruption(format!(
			"postings stream ended at {} but region is {} bytes",
			offset,
			region.len()
		)));
	}
	Ok(offsets)
}

/// Iterates entries in `region`, yielding `(offset, Entry)` pairs in order.
pub struct Entries<'a> {
	region: &'a [u8],
	offset: usize,
}

impl<'a> Iterator for Entries<'a> {
	type Item = (usize, Entry<'a>);

	fn next(&mut self) -> Option<Self::Item> {
		if self.offset >= self.region.len() {
			return None;
		}
		let offset = self.offset;
		let entry = entry_at(self.region, offset);
		self.offset = next_entry(self.region, offset);
		Some((offset, entry))
	}
}

pub fn entries(region: &[u8]) -> Entries<'_> {
	Entries { region, offset: first_entry(region) }
}

/// Encodes `key` and `values` into the binary postings format, appending to
/// `out`. Used by tests (and would be used by an offline database builder) to
/// construct fixtures without hand-packing bytes.
pub fn encode_entry(out: &mut Vec<u8>, key: &[u8], values: &[u32]) {
	out.extend_from_slice(key);
	out.push(0);
	let padded = round_up(key.len() + 1, 4);
	out.resize(out.len() + (padded - (key.len() + 1)), 0);
	out.extend_from_slice(&(values.len() as i32).to_le_bytes());
	for v in values {
		out.extend_from_slice(&v.to_le_bytes());
	}
}
