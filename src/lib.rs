// Copyright 2020-2026 The partdex Authors.
// Licensed under the MIT/Apache-2.0 licenses.

//! Core engine for a partitioned, in-memory inverted-index search service:
//! the binary postings format, the open-addressed hash index built over it,
//! key-ownership routing, result-array set algebra, the clock-replacement
//! cache, the bounded worker pool, the wire protocol, and the per-connection
//! request dispatcher.
//!
//! The `worker` and `supervisor` binary crates in this workspace compose
//! these modules into the two processes the service actually runs as.

pub mod bootstrap;
pub mod cache;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod index;
pub mod peer;
pub mod pool;
pub mod postings;
pub mod routing;
pub mod valuearray;
pub mod wire;

pub use context::Context;
pub use error::{Error, Result};
