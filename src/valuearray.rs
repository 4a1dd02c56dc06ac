// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Parsing and set algebra over the string form of a postings list:
//! `"<key>,<v0>,<v1>,...,<vL-1>"`, optionally newline-terminated.
//!
//! Null propagation ("either side absent") is handled by the dispatcher
//! before `intersect` is ever called — this module only ever sees two
//! concrete, already-resolved arrays. See DESIGN.md for why that split was
//! chosen over threading `Option` through the algebra itself.

use std::fmt::Write as _;

/// Parses `"<key>,<v0>,<v1>,...,<vL-1>[\n]"`, returning the parsed values.
/// Returns `None` if the string contains no comma at all.
pub fn parse(entry_string: &str) -> Option<Vec<u32>> {
	let comma = entry_string.find(',')?;
	let rest = entry_string[comma + 1..].trim_end_matches(['\n', '\r']);
	if rest.is_empty() {
		return Some(Vec::new());
	}
	rest.split(',').map(|part| part.parse::<u32>().ok()).collect()
}

/// Computes the ascending, duplicate-free intersection of two ascending
/// arrays (each of which may itself contain duplicates). Implemented as a
/// linear two-pointer merge — an allowed refinement of the reference
/// quadratic scan, since both produce the identical set for any ascending,
/// duplicate-bearing inputs.
pub fn intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
	let mut out = Vec::new();
	let (mut i, mut j) = (0usize, 0usize);
	while i < a.len() && j < b.len() {
		if i > 0 && a[i] == a[i - 1] {
			i += 1;
			continue;
		}
		if j > 0 && b[j] == b[j - 1] {
			j += 1;
			continue;
		}
		match a[i].cmp(&b[j]) {
			std::cmp::Ordering::Less => i += 1,
			std::cmp::Ordering::Greater => j += 1,
			std::cmp::Ordering::Equal => {
				out.push(a[i]);
				i += 1;
				j += 1;
			}
		}
	}
	out
}

/// Writes `",v0,v1,...\n"`; every value is comma-prefixed.
pub fn to_string(values: &[u32]) -> String {
	let mut out = String::new();
	for v in values {
		let _ = write!(out, ",{}", v);
	}
	out.push('\n');
	out
}
