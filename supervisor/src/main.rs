// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Supervisor process entry point: validates the operator-facing CLI, mmaps
//! the database, allocates ports, spawns worker processes, serves the digest
//! protocol exactly once per worker, then exits without waiting on them.

use memmap2::Mmap;
use partdex::routing;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{self, Command};
use structopt::StructOpt;

#[cfg(all(not(windows), not(target_env = "musl")))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[derive(Debug, StructOpt)]
#[structopt(name = "partdex-supervisor", about = "Partitions a database and spawns worker nodes")]
struct Opt {
	/// Number of worker nodes to spawn, 1 to 8 inclusive.
	num_nodes: usize,
	/// First port to try when allocating the digest and worker listen ports.
	starting_port: u16,
	/// Path to the sorted postings database file.
	db_file: PathBuf,
}

fn worker_binary_path() -> PathBuf {
	let mut path = std::env::current_exe().expect("could not determine current executable path");
	path.pop();
	path.push(if cfg!(windows) { "partdex-worker.exe" } else { "partdex-worker" });
	path
}

/// Scans upward from `starting_port`, binding the first `count` ports that
/// succeed. Returns the still-open listener for the first (the supervisor's
/// own digest port) and the full list of allocated ports in order; the
/// remaining listeners are dropped so worker processes can bind them.
fn allocate_ports(starting_port: u16, count: usize) -> std::io::Result<(TcpListener, Vec<u16>)> {
	let mut ports = Vec::with_capacity(count);
	let mut digest_listener = None;
	let mut port = starting_port;
	loop {
		if ports.len() == count {
			break;
		}
		if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
			ports.push(port);
			if digest_listener.is_none() {
				digest_listener = Some(listener);
			}
		}
		port = port.checked_add(1).ok_or_else(|| {
			std::io::Error::new(std::io::ErrorKind::Other, "exhausted port range while allocating")
		})?;
	}
	Ok((digest_listener.expect("at least one port was allocated"), ports))
}

fn serve_digest(listener: TcpListener, mmap: &Mmap, num_nodes: usize) {
	for _ in 0..num_nodes {
		let (stream, peer_addr) = match listener.accept() {
			Ok(accepted) => accepted,
			Err(e) => {
				log::warn!(target: "partdex", "digest accept error: {}", e);
				continue;
			}
		};
		if let Err(e) = serve_one_digest_request(stream, mmap, num_nodes) {
			log::warn!(target: "partdex", "digest request from {:?} failed: {}", peer_addr, e);
		}
	}
}

fn serve_one_digest_request(
	stream: std::net::TcpStream,
	mmap: &Mmap,
	num_nodes: usize,
) -> std::io::Result<()> {
	let mut reader = BufReader::new(stream.try_clone()?);
	let mut writer = stream;

	let mut line = String::new();
	reader.read_line(&mut line)?;
	let line = line.trim_end_matches(['\n', '\r']);

	let node_id: Option<usize> = line.parse().ok().filter(|&id: &usize| id < num_nodes);
	let payload: Vec<u8> = match node_id {
		Some(node_id) => {
			let (start, end) = routing::partition_bounds(mmap, node_id, num_nodes);
			mmap[start..end].to_vec()
		}
		None => b"Invalid Request.\n".to_vec(),
	};

	writer.write_all(format!("{}\n", payload.len()).as_bytes())?;
	writer.write_all(&payload)?;
	Ok(())
}

fn main() {
	let opt = Opt::from_args();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let _ = fdlimit::raise_fd_limit();

	if !(1..=8).contains(&opt.num_nodes) {
		eprintln!("num_nodes must be between 1 and 8, got {}", opt.num_nodes);
		process::exit(1);
	}
	if opt.starting_port < 1024 || (opt.starting_port as usize) >= 65535 - opt.num_nodes {
		eprintln!("starting_port {} out of range for {} nodes", opt.starting_port, opt.num_nodes);
		process::exit(1);
	}

	let file = match File::open(&opt.db_file) {
		Ok(f) => f,
		Err(e) => {
			eprintln!("failed to open {}: {}", opt.db_file.display(), e);
			process::exit(1);
		}
	};
	let mmap = match unsafe { Mmap::map(&file) } {
		Ok(m) => m,
		Err(e) => {
			eprintln!("failed to mmap {}: {}", opt.db_file.display(), e);
			process::exit(1);
		}
	};

	let (digest_listener, ports) = match allocate_ports(opt.starting_port, opt.num_nodes + 1) {
		Ok(allocated) => allocated,
		Err(e) => {
			eprintln!("failed to allocate ports: {}", e);
			process::exit(1);
		}
	};
	let digest_addr = digest_listener.local_addr().expect("bound listener has a local address");
	let worker_ports = &ports[1..];
	let peer_ports_csv = worker_ports.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",");

	let worker_path = worker_binary_path();
	for node_id in 0..opt.num_nodes {
		let child = Command::new(&worker_path)
			.arg(node_id.to_string())
			.arg(opt.num_nodes.to_string())
			.arg(digest_addr.to_string())
			.arg(worker_ports[node_id].to_string())
			.arg(&peer_ports_csv)
			.spawn();
		match child {
			Ok(child) => {
				eprintln!("NODE {} [PID: {}] listening on port {}", node_id, child.id(), worker_ports[node_id]);
			}
			Err(e) => {
				eprintln!("failed to spawn worker {}: {}", node_id, e);
				process::exit(1);
			}
		}
	}

	serve_digest(digest_listener, &mmap, opt.num_nodes);
}
