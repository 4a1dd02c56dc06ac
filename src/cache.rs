// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Fixed-capacity result cache with clock (second-chance) replacement,
//! guarded by a readers-writer lock.
//!
//! The `used` bit of a hit slot is set on every successful `lookup`, but that
//! set is a single atomic store rather than a write-lock acquisition — the
//! bits live in their own `Vec<AtomicBool>`, parallel to (but outside) the
//! `RwLock` guarding the slot vector, so concurrent readers never escalate to
//! a writer just to mark recency.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const CAPACITY: usize = 512;

struct Slot {
	key: String,
	value: String,
}

struct Inner {
	slots: Vec<Slot>,
}

pub struct Cache {
	inner: RwLock<Inner>,
	used: Vec<AtomicBool>,
	hand: AtomicUsize,
}

impl Default for Cache {
	fn default() -> Self {
		Self::new()
	}
}

impl Cache {
	pub fn new() -> Cache {
		Cache {
			inner: RwLock::new(Inner { slots: Vec::with_capacity(CAPACITY) }),
			used: (0..CAPACITY).map(|_| AtomicBool::new(false)).collect(),
			hand: AtomicUsize::new(0),
		}
	}

	/// Reader: returns a copy of the cached value for `key`, if present, and
	/// marks the hit slot's `used` bit.
	pub fn lookup(&self, key: &str) -> Option<String> {
		let inner = self.inner.read();
		for (i, slot) in inner.slots.iter().enumerate() {
			if slot.key == key {
				self.used[i].store(true, Ordering::Release);
				return Some(slot.value.clone());
			}
		}
		None
	}

	/// Writer: stores `key -> value`, overwriting in place if `key` is
	/// already cached (never creating a duplicate slot), otherwise appending
	/// or evicting a clock victim once at `CAPACITY`.
	pub fn insert(&self, key: &str, value: &str) {
		let mut inner = self.inner.write();
		if let Some(i) = inner.slots.iter().position(|s| s.key == key) {
			inner.slots[i].value = value.to_string();
			self.used[i].store(true, Ordering::Release);
			return;
		}
		let index = if inner.slots.len() < CAPACITY {
			inner.slots.push(Slot { key: key.to_string(), value: value.to_string() });
			inner.slots.len() - 1
		} else {
			let victim = self.find_victim();
			inner.slots[victim] = Slot { key: key.to_string(), value: value.to_string() };
			victim
		};
		self.used[index].store(true, Ordering::Release);
	}

	/// Clock sweep: clear every `used` bit the hand passes over until it
	/// finds one already clear, which becomes the victim. The hand always
	/// advances past the slot it returns.
	fn find_victim(&self) -> usize {
		loop {
			let hand = self.hand.load(Ordering::Relaxed);
			let was_used = self.used[hand].swap(false, Ordering::AcqRel);
			self.hand.store((hand + 1) % CAPACITY, Ordering::Relaxed);
			if !was_used {
				return hand;
			}
		}
	}

	pub fn len(&self) -> usize {
		self.inner.read().slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn hand(&self) -> usize {
		self.hand.load(Ordering::Relaxed)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn lookup_miss_on_empty_cache() {
		let cache = Cache::new();
		assert_eq!(cache.lookup("missing"), None);
	}

	#[test]
	fn insert_then_lookup_round_trips() {
		let cache = Cache::new();
		cache.insert("zzz", "zzz,2,3,9\n");
		assert_eq!(cache.lookup("zzz"), Some("zzz,2,3,9\n".to_string()));
		// repeated lookup without intervening eviction returns the same value
		assert_eq!(cache.lookup("zzz"), Some("zzz,2,3,9\n".to_string()));
	}

	#[test]
	fn insert_overwrites_existing_key_in_place() {
		let cache = Cache::new();
		cache.insert("k", "v1\n");
		cache.insert("k", "v2\n");
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.lookup("k"), Some("v2\n".to_string()));
	}

	#[test]
	fn fills_to_capacity_then_evicts_on_overflow() {
		let cache = Cache::new();
		for i in 0..CAPACITY {
			cache.insert(&format!("k{}", i), "v\n");
		}
		assert_eq!(cache.len(), CAPACITY);

		// one more distinct key: size stays at CAPACITY, a victim is evicted.
		cache.insert("overflow", "v\n");
		assert_eq!(cache.len(), CAPACITY);

		// all keys present post-eviction must still be distinct.
		let inner = cache.inner.read();
		let mut keys: Vec<&str> = inner.slots.iter().map(|s| s.key.as_str()).collect();
		let before = keys.len();
		keys.sort_unstable();
		keys.dedup();
		assert_eq!(keys.len(), before, "cache must never hold duplicate keys");
	}

	#[test]
	fn hand_stays_within_bounds_across_many_evictions() {
		let cache = Cache::new();
		for i in 0..CAPACITY * 3 {
			cache.insert(&format!("k{}", i), "v\n");
			assert!(cache.hand() < CAPACITY);
		}
	}

	#[test]
	fn victim_is_a_slot_whose_used_bit_was_clear() {
		let cache = Cache::new();
		// every insert sets used=1, including the append path, so after this
		// fill all CAPACITY bits are 1 and `hand` has wrapped back to 0.
		for i in 0..CAPACITY {
			cache.insert(&format!("k{}", i), "v\n");
		}
		assert_eq!(cache.hand(), 0);
		// lookups here only re-set already-set bits; they do not clear any,
		// so they cannot steer the sweep away from slot 0.
		for i in 1..CAPACITY {
			cache.lookup(&format!("k{}", i));
		}
		cache.insert("fresh", "v\n");
		// the sweep clears every bit once (a full lap starting at hand=0),
		// wraps back around, and finds slot 0's just-cleared bit first.
		assert_eq!(cache.lookup("k0"), None, "slot 0 should have been evicted");
		assert_eq!(cache.lookup("fresh"), Some("v\n".to_string()));
		for i in 1..CAPACITY {
			assert_eq!(cache.lookup(&format!("k{}", i)), Some("v\n".to_string()));
		}
	}
}
