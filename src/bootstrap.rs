// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Partition bootstrap client: the one-shot digest-phase handshake a worker
//! performs against the supervisor before it starts serving.
//!
//! Tracks the state machine named in the spec purely for diagnostics —
//! `Init -> DigestReqSent -> DigestBytesRead -> IndexBuilt -> Serving` — each
//! transition logged at `debug`. `Serving` is never represented here; it
//! begins the moment the worker's accept loop starts, outside this module.

use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	Init,
	DigestReqSent,
	DigestBytesRead,
	IndexBuilt,
}

fn advance(node_id: usize, from: State, to: State) {
	log::debug!(target: "partdex", "node {}: {:?} -> {:?}", node_id, from, to);
}

/// Connects to the supervisor at `supervisor_addr`, requests the partition
/// for `node_id`, and returns the raw partition bytes. Building the hash
/// index over the returned bytes (the `IndexBuilt` transition) is the
/// caller's responsibility — see `context::Context::new`.
pub fn fetch_partition(node_id: usize, supervisor_addr: SocketAddr) -> Result<Vec<u8>> {
	let mut state = State::Init;

	let mut stream = TcpStream::connect(supervisor_addr)?;
	stream.write_all(format!("{}\n", node_id).as_bytes())?;
	advance(node_id, state, State::DigestReqSent);
	state = State::DigestReqSent;

	let mut reader = BufReader::new(stream);
	let mut size_line = String::new();
	reader.read_line(&mut size_line)?;
	let size_line = size_line.trim_end_matches(['\n', '\r']);
	let size: usize = size_line
		.parse()
		.map_err(|_| Error::Corruption(format!("malformed digest size line: {:?}", size_line)))?;

	let mut partition = vec![0u8; size];
	reader.read_exact(&mut partition)?;
	advance(node_id, state, State::DigestBytesRead);
	state = State::DigestBytesRead;
	let _ = state;

	if partition == b"Invalid Request.\n" {
		return Err(Error::Config(format!("supervisor rejected node id {}", node_id)));
	}

	Ok(partition)
}
