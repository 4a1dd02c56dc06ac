// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Per-connection request dispatch: read LF-terminated request lines, resolve
//! one or two terms against the local partition, the cache, and finally a
//! peer forward, and write a reply line back — pipelined, until the peer
//! closes its end.
//!
//! Mirrors the original's `handle_connection` loop, with the local/cache/peer
//! resolution order from spec §4.G kept intact.

use crate::context::Context;
use crate::peer;
use crate::valuearray;
use crate::wire::{self, MAX_REQUEST_LINE};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;

/// Resolves a single key: local partition, then cache, then a peer forward
/// (whose result is cached on success before being returned).
pub fn resolve(ctx: &Context, key: &str) -> Option<String> {
	if let Some(found) = ctx.find_local(key.as_bytes()) {
		return Some(found);
	}
	if let Some(cached) = ctx.cache.lookup(key) {
		return Some(cached);
	}

	let owner = ctx.owner(key.as_bytes());
	if owner == ctx.node_id {
		return None;
	}
	let addr = ctx.peer_addr(owner);
	let forwarded = peer::forward(addr, key)?;
	ctx.cache.insert(key, &forwarded);
	Some(forwarded)
}

/// Resolves a two-term query by resolving each key's raw found-line
/// independently, then intersecting their value arrays.
fn resolve2(ctx: &Context, k1: &str, k2: &str) -> String {
	let line1 = resolve(ctx, k1);
	let line2 = resolve(ctx, k2);

	match (line1, line2) {
		(None, None) => wire::combined_not_found(k1, k2),
		(None, Some(_)) => wire::single_not_found(k1),
		(Some(_), None) => wire::single_not_found(k2),
		(Some(l1), Some(l2)) => {
			let (v1, v2) = match (valuearray::parse(&l1), valuearray::parse(&l2)) {
				(Some(v1), Some(v2)) => (v1, v2),
				_ => return wire::combined_not_found(k1, k2),
			};
			let intersection = valuearray::intersect(&v1, &v2);
			wire::two_term_found(k1, k2, &intersection)
		}
	}
}

/// Parses one trimmed request line into its one or two terms: the first two
/// space-separated tokens, mirroring the original's `strtok(key, " ")` /
/// `strtok(NULL, " ")` pair — anything past the second token is silently
/// ignored rather than rejecting the request. Returns `None` for a blank
/// line.
fn parse_request(line: &str) -> Option<(&str, Option<&str>)> {
	let mut terms = line.split(' ').filter(|s| !s.is_empty());
	let first = terms.next()?;
	let second = terms.next();
	Some((first, second))
}

/// Services one connection to completion: reads pipelined request lines
/// until EOF or a read error, replying to each before reading the next.
pub fn serve(ctx: &Context, stream: TcpStream) {
	let peer_addr = stream.peer_addr().ok();
	let mut reader = BufReader::new(match stream.try_clone() {
		Ok(s) => s,
		Err(e) => {
			log::warn!(target: "partdex", "failed to clone connection {:?}: {}", peer_addr, e);
			return;
		}
	});
	let mut writer = stream;

	loop {
		let mut line = String::new();
		let mut limited = (&mut reader).take(MAX_REQUEST_LINE as u64);
		match limited.read_line(&mut line) {
			Ok(0) => break,
			Ok(_) => {}
			Err(e) => {
				log::warn!(target: "partdex", "read error from {:?}: {}", peer_addr, e);
				break;
			}
		}

		if !line.ends_with('\n') && line.len() as u64 >= MAX_REQUEST_LINE as u64 {
			log::debug!(target: "partdex", "oversize request line from {:?}, closing", peer_addr);
			break;
		}

		let trimmed = wire::trim_line_ending(&line);
		if trimmed.is_empty() {
			break;
		}

		let reply = match parse_request(trimmed) {
			Some((key, None)) => match resolve(ctx, key) {
				Some(found) => found,
				None => wire::single_not_found(key),
			},
			Some((k1, Some(k2))) => resolve2(ctx, k1, k2),
			None => {
				log::debug!(target: "partdex", "malformed request from {:?}: {:?}", peer_addr, trimmed);
				continue;
			}
		};

		if let Err(e) = writer.write_all(reply.as_bytes()) {
			log::warn!(target: "partdex", "write error to {:?}: {}", peer_addr, e);
			break;
		}
	}
}
