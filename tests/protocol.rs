// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Black-box wire-protocol scenarios, driven over real loopback sockets
//! against in-process `Context`s — no supervisor process involved, since the
//! digest phase is exercised separately by `bootstrap`'s own unit tests.

use partdex::{dispatcher, postings, Context};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

fn spawn_node(ctx: Context) -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();
	let ctx = Arc::new(ctx);
	thread::spawn(move || {
		for stream in listener.incoming() {
			let ctx = Arc::clone(&ctx);
			thread::spawn(move || dispatcher::serve(&ctx, stream.unwrap()));
		}
	});
	addr
}

fn send_and_read_lines(addr: SocketAddr, request: &str, expected_lines: usize) -> Vec<String> {
	let mut stream = TcpStream::connect(addr).unwrap();
	stream.write_all(request.as_bytes()).unwrap();
	stream.shutdown(std::net::Shutdown::Write).unwrap();

	let reader = BufReader::new(stream);
	let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
	assert_eq!(lines.len(), expected_lines, "unexpected number of reply lines for {:?}", request);
	lines
}

#[test]
fn s1_single_term_hit() {
	let mut db = Vec::new();
	postings::encode_entry(&mut db, b"apple", &[1, 2, 3]);
	postings::encode_entry(&mut db, b"banana", &[2, 4]);
	let addr = spawn_node(Context::new(0, 1, db, vec!["127.0.0.1:1".parse().unwrap()]).unwrap());

	let lines = send_and_read_lines(addr, "apple\n", 1);
	assert_eq!(lines[0], "apple,1,2,3");
}

#[test]
fn s2_single_term_miss() {
	let mut db = Vec::new();
	postings::encode_entry(&mut db, b"apple", &[1, 2, 3]);
	postings::encode_entry(&mut db, b"banana", &[2, 4]);
	let addr = spawn_node(Context::new(0, 1, db, vec!["127.0.0.1:1".parse().unwrap()]).unwrap());

	let lines = send_and_read_lines(addr, "zebra\n", 1);
	assert_eq!(lines[0], "zebra not found");
}

#[test]
fn s3_two_term_query_forwards_to_owning_peer() {
	let mut node0_db = Vec::new();
	postings::encode_entry(&mut node0_db, b"0aa", &[1, 2, 3]);
	let mut node1_db = Vec::new();
	postings::encode_entry(&mut node1_db, b"zzz", &[2, 3, 9]);

	let listener0 = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr0 = listener0.local_addr().unwrap();
	let listener1 = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr1 = listener1.local_addr().unwrap();

	let ctx0 = Arc::new(Context::new(0, 2, node0_db, vec![addr0, addr1]).unwrap());
	let ctx1 = Arc::new(Context::new(1, 2, node1_db, vec![addr0, addr1]).unwrap());
	for (listener, ctx) in [(listener0, ctx0), (listener1, ctx1)] {
		thread::spawn(move || {
			for stream in listener.incoming() {
				let ctx = Arc::clone(&ctx);
				thread::spawn(move || dispatcher::serve(&ctx, stream.unwrap()));
			}
		});
	}

	let lines = send_and_read_lines(addr0, "0aa zzz\n", 1);
	assert_eq!(lines[0], "0aa,zzz,2,3");
}

#[test]
fn s4_cache_warm_up_avoids_second_forward() {
	let mut node1_db = Vec::new();
	postings::encode_entry(&mut node1_db, b"zzz", &[2, 3, 9]);

	let listener0 = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr0 = listener0.local_addr().unwrap();
	let listener1 = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr1 = listener1.local_addr().unwrap();

	let ctx0 = Arc::new(Context::new(0, 2, Vec::new(), vec![addr0, addr1]).unwrap());
	let ctx1 = Arc::new(Context::new(1, 2, node1_db, vec![addr0, addr1]).unwrap());
	for (listener, ctx) in [(listener0, ctx0.clone()), (listener1, ctx1)] {
		thread::spawn(move || {
			for stream in listener.incoming() {
				let ctx = Arc::clone(&ctx);
				thread::spawn(move || dispatcher::serve(&ctx, stream.unwrap()));
			}
		});
	}

	assert!(ctx0.cache.is_empty());
	let first = send_and_read_lines(addr0, "zzz\n", 1);
	assert_eq!(first[0], "zzz,2,3,9");
	assert_eq!(ctx0.cache.len(), 1);

	let second = send_and_read_lines(addr0, "zzz\n", 1);
	assert_eq!(second, first);
	// still exactly one entry: the second request hit the cache, not a
	// second peer forward that would have overwritten the slot anew.
	assert_eq!(ctx0.cache.len(), 1);
}

#[test]
fn s6_pipelined_requests_on_one_connection() {
	let mut db = Vec::new();
	postings::encode_entry(&mut db, b"apple", &[1, 2, 3]);
	let addr = spawn_node(Context::new(0, 1, db, vec!["127.0.0.1:1".parse().unwrap()]).unwrap());

	let mut stream = TcpStream::connect(addr).unwrap();
	stream.write_all(b"apple\napple\napple\n").unwrap();
	stream.shutdown(std::net::Shutdown::Write).unwrap();

	let mut reply = String::new();
	stream.read_to_string(&mut reply).unwrap();
	assert_eq!(reply, "apple,1,2,3\napple,1,2,3\napple,1,2,3\n");
}
