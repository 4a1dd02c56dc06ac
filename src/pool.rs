// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Bounded producer-consumer handoff from the accept loop to a fixed set of
//! detached worker threads.
//!
//! The bounded buffer is `std::sync::mpsc::sync_channel` — a bounded MPSC
//! channel is exactly the primitive the spec calls for (`dispatch` blocks
//! when full, workers block when empty). Since `Receiver` is neither `Sync`
//! nor cloneable, the `NTHREADS` consumers share one `Receiver` behind
//! `Arc<parking_lot::Mutex<_>>`, the standard shape of a fixed-size thread
//! pool draining one queue.

use parking_lot::Mutex;
use std::net::TcpStream;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

pub const SBUFSIZE: usize = 16;
pub const NTHREADS: usize = 4;

/// Spawns `NTHREADS` detached worker threads, each running `handle` on every
/// `TcpStream` it dequeues, and returns the bounded sender the accept loop
/// should use to dispatch accepted connections.
///
/// Threads run for process lifetime; there is no shutdown signal, matching
/// the spec's "cancellation: none" resource model.
pub fn spawn<F>(handle: F) -> SyncSender<TcpStream>
where
	F: Fn(TcpStream) + Send + Sync + 'static,
{
	let (sender, receiver) = sync_channel::<TcpStream>(SBUFSIZE);
	let receiver: Arc<Mutex<Receiver<TcpStream>>> = Arc::new(Mutex::new(receiver));
	let handle = Arc::new(handle);
	for id in 0..NTHREADS {
		let receiver = Arc::clone(&receiver);
		let handle = Arc::clone(&handle);
		thread::Builder::new()
			.name(format!("partdex-worker-{}", id))
			.spawn(move || loop {
				let stream = receiver.lock().recv();
				match stream {
					Ok(stream) => handle(stream),
					// sender dropped: the accept loop is gone, nothing left to serve.
					Err(_) => break,
				}
			})
			.expect("failed to spawn partdex worker thread");
	}
	sender
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write;
	use std::net::TcpListener;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	#[test]
	fn dispatched_connections_are_all_handled() {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let addr = listener.local_addr().unwrap();
		let handled = Arc::new(AtomicUsize::new(0));
		let handled_clone = Arc::clone(&handled);
		let sender = spawn(move |_stream| {
			handled_clone.fetch_add(1, Ordering::SeqCst);
		});

		const N: usize = 20;
		for _ in 0..N {
			let mut client = TcpStream::connect(addr).unwrap();
			let _ = client.write_all(b"x");
			let (stream, _) = listener.accept().unwrap();
			sender.send(stream).unwrap();
		}

		let deadline = std::time::Instant::now() + Duration::from_secs(5);
		while handled.load(Ordering::SeqCst) < N && std::time::Instant::now() < deadline {
			thread::sleep(Duration::from_millis(10));
		}
		assert_eq!(handled.load(Ordering::SeqCst), N);
	}
}
