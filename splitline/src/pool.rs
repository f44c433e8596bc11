//! The upstream connection-pool interface the splitter consumes.
//!
//! The pool is an external collaborator: it owns key hashing, transport, and
//! per-host request queues. The splitter only needs three things from it —
//! a stable key→host mapping for fragment grouping, key-routed submission,
//! and cancellable handles for in-flight work.
//!
//! Everything here is single-threaded: a pool instance and the splitter that
//! holds it belong to one worker, and the pool delivers sink callbacks on
//! that same worker.

use resp_core::Value;

/// Identifier of an upstream host within the pool.
///
/// Only used to group fan-out fragments; the splitter never interprets it.
pub type HostId = usize;

/// Callbacks the pool fires for a submitted request.
///
/// Exactly one of the two fires per submission, unless the request is
/// cancelled first.
pub trait ResponseSink {
    /// A decoded RESP reply arrived from the upstream.
    fn on_response(&mut self, value: Value);

    /// The upstream failed at the transport level; no reply will arrive.
    fn on_failure(&mut self);
}

/// An opaque token for one in-flight upstream request.
pub trait Handle {
    /// Drop the in-flight work. Idempotent; after `cancel` returns the pool
    /// must not invoke the sink again.
    fn cancel(&mut self);
}

/// A hash-routed upstream connection pool.
pub trait ConnPool {
    /// The host that owns `key`. Stable for the lifetime of a request: the
    /// same key always maps to the same host while a request is in flight.
    fn host_for(&self, key: &[u8]) -> HostId;

    /// Submit `request` to the host that owns `key`, to be answered through
    /// `sink`. Returns `None` when no upstream host is available right now;
    /// the pool serializes the request synchronously and does not retain it.
    fn submit(
        &self,
        key: &[u8],
        request: &Value,
        sink: Box<dyn ResponseSink>,
    ) -> Option<Box<dyn Handle>>;
}
