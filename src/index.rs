// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Open-addressed hash index mapping a key to the byte offset of its entry in
//! a postings region. Built once, read-only thereafter.
//!
//! Double hashing: primary probe `h = k mod M`, step `o = 1 + (k mod (M-1))`,
//! where `k` is a polynomial hash accumulated with wrapping 32-bit arithmetic
//! to match the original's implicit unsigned-int overflow.

use crate::error::{Error, Result};
use crate::postings;

pub const NUM_BUCKETS: usize = 8191;

#[derive(Clone, Copy)]
enum Slot {
	Empty,
	Occupied(usize),
}

pub struct HashIndex {
	buckets: Vec<Slot>,
}

fn hash(key: &[u8]) -> u32 {
	let mut k: u32 = 0;
	for &c in key {
		k = k.wrapping_mul(33).wrapping_add(c as u32);
	}
	k
}

fn probe_sequence(key: &[u8]) -> (usize, usize) {
	let k = hash(key) as usize;
	let h = k % NUM_BUCKETS;
	let o = 1 + (k % (NUM_BUCKETS - 1));
	(h, o)
}

impl HashIndex {
	/// Scans every entry in `region` and inserts it. Fatal (`Error::IndexFull`)
	/// if `NUM_BUCKETS` probes fail to find a free slot for some entry — this
	/// should never happen given the margin `NUM_BUCKETS` holds over the
	/// maximum realistic entry count of a single partition.
	pub fn build(region: &[u8]) -> Result<HashIndex> {
		postings::validate(region)?;
		let mut index = HashIndex { buckets: vec![Slot::Empty; NUM_BUCKETS] };
		for (offset, entry) in postings::entries(region) {
			index.insert(entry.key, offset)?;
		}
		Ok(index)
	}

	fn insert(&mut self, key: &[u8], offset: usize) -> Result<()> {
		let (mut h, o) = probe_sequence(key);
		for _ in 0..NUM_BUCKETS {
			if let Slot::Empty = self.buckets[h] {
				self.buckets[h] = Slot::Occupied(offset);
				return Ok(());
			}
			h = (h + o) % NUM_BUCKETS;
		}
		Err(Error::IndexFull)
	}

	/// Returns the offset of the entry whose key equals `key`, probing up to
	/// `NUM_BUCKETS` slots before concluding it is absent.
	pub fn find(&self, region: &[u8], key: &[u8]) -> Option<usize> {
		let (mut h, o) = probe_sequence(key);
		for _ in 0..NUM_BUCKETS {
			match self.buckets[h] {
				Slot::Empty => return None,
				Slot::Occupied(offset) => {
					let entry = postings::entry_at(region, offset);
					if entry.key == key {
						return Some(offset);
					}
				}
			}
			h = (h + o) % NUM_BUCKETS;
		}
		None
	}
}
