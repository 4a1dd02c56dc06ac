// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Peer forwarding: a fresh, short-lived TCP connection per sub-query, sent
//! to the worker that owns the key, as observed in the original's
//! `get_one_result_string` peer branch.
//!
//! Every failure mode (connect, write, short read) degrades to `None` — a
//! forwarding failure is indistinguishable to the client from a genuine miss
//! (see spec §7); it is only ever logged, never propagated as an `Error`.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::wire::MAX_REPLY_LINE;

/// Generous enough that a stalled peer doesn't wedge a handler forever in
/// tests, while staying well above any realistic loopback round trip. The
/// spec itself specifies no timeout for production use; this is applied only
/// to the connect phase to keep test suites from hanging on a bound-but-dead
/// port, not to bound the blocking read (see spec §5, "cancellation and
/// timeouts: none").
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends `"<key>\n"` to `addr` and reads one reply line. Returns `Some(line)`
/// only if the reply is a "found" record: its first byte matches `key`'s
/// first byte and it contains a comma before any newline — a literal prefix
/// test, not a full reply-format parse.
pub fn forward(addr: SocketAddr, key: &str) -> Option<String> {
	let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).ok()?;
	let request = format!("{}\n", key);
	stream.write_all(request.as_bytes()).ok()?;

	let mut reader = BufReader::new(stream);
	let mut line = String::new();
	let mut limited = (&mut reader).take(MAX_REPLY_LINE as u64);
	limited.read_line(&mut line).ok()?;

	if is_found(key, &line) {
		Some(line)
	} else {
		None
	}
}

fn is_found(key: &str, reply: &str) -> bool {
	let key_first = match key.as_bytes().first() {
		Some(&b) => b,
		None => return false,
	};
	let reply_first = match reply.as_bytes().first() {
		Some(&b) => b,
		None => return false,
	};
	if key_first != reply_first {
		return false;
	}
	match reply.find(',') {
		Some(comma_pos) => match reply.find('\n') {
			Some(nl_pos) => comma_pos < nl_pos,
			None => true,
		},
		None => false,
	}
}
