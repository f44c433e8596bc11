//! Command splitter for a sharded Redis proxy.
//!
//! The splitter sits between a RESP-decoding front-end and a hash-routed
//! upstream connection pool. It classifies each decoded command, dispatches
//! it to one upstream (single-key commands, EVAL) or fans it out across
//! several (MGET, MSET), folds the per-shard replies back into one
//! client-visible response, and rejects malformed or unknown commands with
//! structured RESP errors.
//!
//! A [`Splitter`] belongs to exactly one worker: it is single-threaded by
//! design and expects the pool to deliver upstream callbacks on the same
//! worker that submitted them.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use resp_core::Value;
//! use splitline::{ConnPool, Handle, HostId, ResponseSink, Splitter};
//!
//! /// A pool with no upstreams: every submission is refused.
//! struct NoPool;
//!
//! impl ConnPool for NoPool {
//!     fn host_for(&self, _key: &[u8]) -> HostId {
//!         0
//!     }
//!
//!     fn submit(
//!         &self,
//!         _key: &[u8],
//!         _request: &Value,
//!         _sink: Box<dyn ResponseSink>,
//!     ) -> Option<Box<dyn Handle>> {
//!         None
//!     }
//! }
//!
//! let splitter = Splitter::new(Rc::new(NoPool), "proxy.");
//! let request = Value::command(b"GET", [b"mykey"]);
//! let in_flight = splitter.make_request(&request, |reply| {
//!     assert!(reply.is_error()); // "no upstream host"
//! });
//! assert!(in_flight.is_none());
//! ```

pub mod commands;
pub mod error;
pub mod pool;
pub mod request;
pub mod splitter;
pub mod stats;

pub use commands::SupportedCommands;
pub use error::ReplyError;
pub use pool::{ConnPool, Handle, HostId, ResponseSink};
pub use request::{ResponseCallback, SplitRequest};
pub use splitter::Splitter;
pub use stats::SplitterStats;
