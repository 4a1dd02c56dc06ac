// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Worker process entry point: parses its own startup arguments, runs the
//! digest-phase handshake against the supervisor, builds the hash index over
//! its partition, then serves client queries forever.

use partdex::{bootstrap, dispatcher, pool, Context};
use std::net::{SocketAddr, TcpListener};
use std::process;
use std::sync::Arc;
use structopt::StructOpt;

#[cfg(all(not(windows), not(target_env = "musl")))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[derive(Debug, StructOpt)]
#[structopt(name = "partdex-worker", about = "Serves one partition of the index")]
struct Opt {
	/// This worker's id in [0, total_nodes).
	node_id: usize,
	/// Total number of worker nodes in the deployment.
	total_nodes: usize,
	/// Address of the supervisor's digest-protocol listener.
	supervisor_addr: SocketAddr,
	/// Port this worker itself listens on.
	listen_port: u16,
	/// Comma-separated list of every worker's listen port, in node-id order.
	peer_ports: String,
}

fn parse_peers(peer_ports: &str) -> Result<Vec<SocketAddr>, String> {
	peer_ports
		.split(',')
		.map(|p| {
			let port: u16 = p.trim().parse().map_err(|_| format!("invalid peer port: {:?}", p))?;
			Ok(SocketAddr::from(([127, 0, 0, 1], port)))
		})
		.collect()
}

fn main() {
	let opt = Opt::from_args();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if !(1..=8).contains(&opt.total_nodes) || opt.node_id >= opt.total_nodes {
		log::error!(target: "partdex", "invalid node id {} for total_nodes {}", opt.node_id, opt.total_nodes);
		process::exit(1);
	}

	let peers = match parse_peers(&opt.peer_ports) {
		Ok(peers) => peers,
		Err(e) => {
			log::error!(target: "partdex", "{}", e);
			process::exit(1);
		}
	};

	log::info!(target: "partdex", "node {}: requesting partition from {}", opt.node_id, opt.supervisor_addr);
	let partition = match bootstrap::fetch_partition(opt.node_id, opt.supervisor_addr) {
		Ok(p) => p,
		Err(e) => {
			log::error!(target: "partdex", "node {}: bootstrap failed: {}", opt.node_id, e);
			process::exit(1);
		}
	};

	let ctx = match Context::new(opt.node_id, opt.total_nodes, partition, peers) {
		Ok(ctx) => Arc::new(ctx),
		Err(e) => {
			log::error!(target: "partdex", "node {}: failed to build index: {}", opt.node_id, e);
			process::exit(1);
		}
	};
	log::debug!(target: "partdex", "node {}: index built, serving", opt.node_id);

	let listener = match TcpListener::bind(("127.0.0.1", opt.listen_port)) {
		Ok(listener) => listener,
		Err(e) => {
			log::error!(target: "partdex", "node {}: failed to bind port {}: {}", opt.node_id, opt.listen_port, e);
			process::exit(1);
		}
	};
	log::info!(target: "partdex", "node {} listening on port {}", opt.node_id, opt.listen_port);

	let dispatch_ctx = Arc::clone(&ctx);
	let sender = pool::spawn(move |stream| dispatcher::serve(&dispatch_ctx, stream));

	for incoming in listener.incoming() {
		match incoming {
			Ok(stream) => {
				if sender.send(stream).is_err() {
					break;
				}
			}
			Err(e) => log::warn!(target: "partdex", "accept error: {}", e),
		}
	}
}
