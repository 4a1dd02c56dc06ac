// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! `Context`: the single struct aggregating everything a worker's request
//! handlers need, built once at startup and shared read-only (plus the
//! internally-synchronized cache) across every handler thread via `Arc`.
//!
//! This replaces the original's process-wide globals (partition, routing
//! table, cache, semaphores) — singleton discipline there was an artifact of
//! the original's process model, not a requirement of this design.

use crate::cache::Cache;
use crate::error::Result;
use crate::index::HashIndex;
use crate::postings;
use crate::routing;
use std::net::SocketAddr;

pub struct Context {
	pub node_id: usize,
	pub total_nodes: usize,
	partition: Vec<u8>,
	index: HashIndex,
	/// Listen address of every worker, indexed by node id (including self,
	/// which is never dialed).
	pub peers: Vec<SocketAddr>,
	pub cache: Cache,
}

impl Context {
	pub fn new(
		node_id: usize,
		total_nodes: usize,
		partition: Vec<u8>,
		peers: Vec<SocketAddr>,
	) -> Result<Context> {
		let index = HashIndex::build(&partition)?;
		log::debug!(target: "partdex", "node {}: Init|DigestBytesRead -> IndexBuilt", node_id);
		Ok(Context { node_id, total_nodes, partition, index, peers, cache: Cache::new() })
	}

	/// Looks up `key` in this worker's own partition, rendering the matching
	/// entry's string form if present.
	pub fn find_local(&self, key: &[u8]) -> Option<String> {
		let offset = self.index.find(&self.partition, key)?;
		Some(postings::entry_at(&self.partition, offset).to_entry_string())
	}

	pub fn owner(&self, key: &[u8]) -> usize {
		routing::owner(key, self.total_nodes)
	}

	pub fn peer_addr(&self, node_id: usize) -> SocketAddr {
		self.peers[node_id]
	}
}
