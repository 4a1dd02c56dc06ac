// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Wire-format constants and reply-line formatting shared by the dispatcher,
//! peer forwarder, and bootstrap client.

use crate::valuearray;

/// Maximum accepted length of a request line, LF-terminated.
pub const MAX_REQUEST_LINE: usize = 128;
/// Maximum accepted length of a reply line, LF-terminated.
pub const MAX_REPLY_LINE: usize = 2048;

/// The literal suffix the spec requires for a single-term miss.
pub const NOT_FOUND_SUFFIX: &str = " not found\n";

/// `"<key> not found\n"`.
pub fn single_not_found(key: &str) -> String {
	format!("{}{}", key, NOT_FOUND_SUFFIX)
}

/// `"<k1>,<k2> not found\n"` — the combined-miss reply when neither term
/// resolved. The original C source's `generate_two_not_found` was never
/// implemented in the retrieved sources; this format reuses the single-term
/// literal suffix convention the spec pins down explicitly.
pub fn combined_not_found(k1: &str, k2: &str) -> String {
	format!("{},{}{}", k1, k2, NOT_FOUND_SUFFIX)
}

/// `"<k1>,<k2>,<i0>,<i1>,...\n"`, or exactly `"<k1>,<k2>\n"` for an empty
/// intersection.
pub fn two_term_found(k1: &str, k2: &str, intersection: &[u32]) -> String {
	format!("{},{}{}", k1, k2, valuearray::to_string(intersection))
}

/// Strips a trailing `\n` and/or `\r` from a request/reply line, in place.
pub fn trim_line_ending(line: &str) -> &str {
	line.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn single_not_found_uses_the_literal_suffix() {
		assert_eq!(single_not_found("zebra"), "zebra not found\n");
	}

	#[test]
	fn combined_not_found_names_both_keys() {
		assert_eq!(combined_not_found("foo", "bar"), "foo,bar not found\n");
	}

	#[test]
	fn two_term_found_empty_intersection() {
		assert_eq!(two_term_found("a", "b", &[]), "a,b\n");
	}

	#[test]
	fn two_term_found_nonempty_intersection() {
		assert_eq!(two_term_found("0aa", "zzz", &[2, 3]), "0aa,zzz,2,3\n");
	}

	#[test]
	fn trim_line_ending_strips_crlf() {
		assert_eq!(trim_line_ending("apple\r\n"), "apple");
		assert_eq!(trim_line_ending("apple\n"), "apple");
		assert_eq!(trim_line_ending("apple"), "apple");
	}
}
