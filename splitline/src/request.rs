//! Per-request dispatch strategies.
//!
//! Each accepted command becomes one of four state machines: single-upstream
//! routing (simple commands and EVAL) or keyed fan-out (MGET, MSET). A
//! strategy owns the cancellation handles for its in-flight upstream
//! requests and folds per-shard replies into the single client-visible
//! response, which it delivers through the client callback exactly once.
//!
//! Strategy state lives in an `Rc<RefCell<_>>` slot on the owning worker.
//! The pool-facing sinks hold that slot plus their fragment index, and the
//! caller-owned [`SplitRequest`] wraps the same slot to expose `cancel()`.
//! Borrows are always released before a callback is invoked, so a client
//! that drops or re-enters from inside its callback cannot deadlock the
//! slot.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bytes::Bytes;
use resp_core::Value;
use tracing::debug;

use crate::error::ReplyError;
use crate::pool::{ConnPool, Handle, HostId, ResponseSink};

/// Client-facing response callback. Fires at most once per accepted request.
pub type ResponseCallback = Box<dyn FnOnce(Value)>;

/// A client request with upstream work in flight.
///
/// Returned by [`Splitter::make_request`](crate::Splitter::make_request).
/// Owning this value keeps the request alive; call [`cancel`](Self::cancel)
/// before dropping it to abandon the upstream work. After `cancel` returns
/// the response callback never fires.
#[must_use = "dropping an in-flight request without cancelling it leaks upstream work"]
pub struct SplitRequest {
    inner: Inner,
}

enum Inner {
    Single(Rc<RefCell<SingleState>>),
    MGet(Rc<RefCell<MGetState>>),
    MSet(Rc<RefCell<MSetState>>),
}

impl SplitRequest {
    /// Cancel all in-flight upstream requests and suppress the client
    /// callback. Cancelling an already-completed request is a no-op.
    pub fn cancel(&mut self) {
        match &self.inner {
            Inner::Single(state) => {
                let mut state = state.borrow_mut();
                if let Some(mut handle) = state.handle.take() {
                    handle.cancel();
                }
                state.callback = None;
            }
            Inner::MGet(state) => {
                let mut state = state.borrow_mut();
                cancel_pending(&mut state.pending);
                state.callback = None;
            }
            Inner::MSet(state) => {
                let mut state = state.borrow_mut();
                cancel_pending(&mut state.pending);
                state.callback = None;
            }
        }
    }

    fn has_live_handles(&self) -> bool {
        match &self.inner {
            Inner::Single(state) => state.borrow().handle.is_some(),
            Inner::MGet(state) => has_live_pending(&state.borrow().pending),
            Inner::MSet(state) => has_live_pending(&state.borrow().pending),
        }
    }
}

impl Drop for SplitRequest {
    fn drop(&mut self) {
        debug_assert!(
            !self.has_live_handles(),
            "split request dropped with live upstream handles"
        );
    }
}

fn cancel_pending(pending: &mut [PendingRequest]) {
    for request in pending {
        if let Some(mut handle) = request.handle.take() {
            handle.cancel();
        }
    }
}

fn has_live_pending(pending: &[PendingRequest]) -> bool {
    pending.iter().any(|request| request.handle.is_some())
}

// ── Single-upstream strategies (simple commands, EVAL) ──────────────────

struct SingleState {
    callback: Option<ResponseCallback>,
    handle: Option<Box<dyn Handle>>,
}

struct SingleSink {
    state: Rc<RefCell<SingleState>>,
}

impl ResponseSink for SingleSink {
    fn on_response(&mut self, value: Value) {
        let callback = {
            let mut state = self.state.borrow_mut();
            state.handle = None;
            state.callback.take()
        };
        if let Some(callback) = callback {
            callback(value);
        }
    }

    fn on_failure(&mut self) {
        self.on_response(ReplyError::UpstreamFailure.into_reply());
    }
}

/// Route a single-key command by its first argument.
pub(crate) fn simple(
    pool: &dyn ConnPool,
    request: &Value,
    callback: ResponseCallback,
) -> Option<SplitRequest> {
    let args = command_args(request);
    let key = bulk_at(args, 1);
    single(pool, &key, request, callback)
}

/// Route `EVAL script numkeys key [key ...] arg [arg ...]` by its first key.
pub(crate) fn eval(
    pool: &dyn ConnPool,
    request: &Value,
    callback: ResponseCallback,
) -> Option<SplitRequest> {
    let args = command_args(request);
    // The first key sits at position 3; with fewer than four elements the
    // command cannot be hashed.
    if args.len() < 4 {
        callback(ReplyError::WrongArity(command_name(args)).into_reply());
        return None;
    }
    let key = bulk_at(args, 3);
    single(pool, &key, request, callback)
}

fn single(
    pool: &dyn ConnPool,
    key: &Bytes,
    request: &Value,
    callback: ResponseCallback,
) -> Option<SplitRequest> {
    let state = Rc::new(RefCell::new(SingleState {
        callback: Some(callback),
        handle: None,
    }));
    let sink = Box::new(SingleSink {
        state: Rc::clone(&state),
    });

    match pool.submit(key, request, sink) {
        Some(handle) => {
            state.borrow_mut().handle = Some(handle);
            Some(SplitRequest {
                inner: Inner::Single(state),
            })
        }
        None => {
            let callback = state.borrow_mut().callback.take();
            if let Some(callback) = callback {
                callback(ReplyError::NoUpstreamHost.into_reply());
            }
            None
        }
    }
}

// ── Fan-out fragments ───────────────────────────────────────────────────

/// One per-host sub-request of a fan-out command.
struct PendingRequest {
    /// Positions in the client-visible reply this fragment is responsible
    /// for. Taken when the fragment resolves.
    response_indices: Vec<usize>,
    /// Live while the fragment is in flight; cleared on resolve or cancel.
    handle: Option<Box<dyn Handle>>,
}

// ── MGET: fan-out read ──────────────────────────────────────────────────

struct MGetState {
    callback: Option<ResponseCallback>,
    num_pending: usize,
    /// Pre-sized to the client's key count and filled in place.
    responses: Vec<Value>,
    error_count: u64,
    pending: Vec<PendingRequest>,
}

struct MGetSink {
    state: Rc<RefCell<MGetState>>,
    index: usize,
}

impl ResponseSink for MGetSink {
    fn on_response(&mut self, value: Value) {
        fold_mget(&self.state, self.index, value);
    }

    fn on_failure(&mut self) {
        fold_mget(
            &self.state,
            self.index,
            ReplyError::UpstreamFailure.into_reply(),
        );
    }
}

/// Split `MGET key [key ...]` into one sub-request per owning host.
pub(crate) fn mget(
    pool: &dyn ConnPool,
    request: &Value,
    callback: ResponseCallback,
) -> Option<SplitRequest> {
    let args = command_args(request);

    // Group keys by owning host, remembering each key's position in the
    // client's key list. Host traversal order is irrelevant to the client;
    // positions alone decide where replies land.
    let mut by_host: HashMap<HostId, Vec<(Bytes, usize)>> = HashMap::new();
    for position in 0..args.len() - 1 {
        let key = bulk_at(args, position + 1);
        by_host
            .entry(pool.host_for(&key))
            .or_default()
            .push((key, position));
    }

    let state = Rc::new(RefCell::new(MGetState {
        callback: Some(callback),
        num_pending: by_host.len(),
        responses: vec![Value::Null; args.len() - 1],
        error_count: 0,
        pending: Vec::with_capacity(by_host.len()),
    }));

    for (index, (_host, keys)) in by_host.into_iter().enumerate() {
        let response_indices = keys.iter().map(|(_, position)| *position).collect();
        let mut elements = Vec::with_capacity(keys.len() + 1);
        elements.push(Value::bulk_string(b"MGET"));
        elements.extend(keys.iter().map(|(key, _)| Value::BulkString(key.clone())));
        let fragment = Value::Array(elements);

        // The pending record must exist before submission so the sink's
        // index is valid from the first callback.
        state.borrow_mut().pending.push(PendingRequest {
            response_indices,
            handle: None,
        });

        let sink = Box::new(MGetSink {
            state: Rc::clone(&state),
            index,
        });
        match pool.submit(&keys[0].0, &fragment, sink) {
            Some(handle) => state.borrow_mut().pending[index].handle = Some(handle),
            None => fold_mget(&state, index, ReplyError::NoUpstreamHost.into_reply()),
        }
    }

    // All fragments may have resolved synchronously (every submission
    // refused); the callback has already fired in that case.
    if state.borrow().num_pending > 0 {
        Some(SplitRequest {
            inner: Inner::MGet(state),
        })
    } else {
        None
    }
}

fn fold_mget(state: &Rc<RefCell<MGetState>>, index: usize, value: Value) {
    let finished = {
        let mut state = state.borrow_mut();
        state.pending[index].handle = None;
        let indices = std::mem::take(&mut state.pending[index].response_indices);

        match value {
            // A well-behaved upstream answers MGET with an array; any scalar
            // reply is a protocol violation for every key routed there.
            Value::Integer(_) | Value::Null | Value::SimpleString(_) => {
                for slot in indices {
                    state.responses[slot] = ReplyError::UpstreamProtocolError.into_reply();
                    state.error_count += 1;
                }
            }
            // A shard-level failure (MOVED, wrongtype, transport error)
            // must be visible to every key the fragment covered.
            value @ (Value::Error(_) | Value::BulkString(_)) => {
                for slot in indices {
                    state.responses[slot] = value.clone();
                    state.error_count += 1;
                }
            }
            Value::Array(elements) => {
                // One element per fragment key is the contract. A short
                // reply degrades to protocol errors for the unfilled slots;
                // surplus elements are dropped.
                let mut elements = elements.into_iter();
                for slot in indices {
                    state.responses[slot] = match elements.next() {
                        Some(Value::Null) => Value::Null,
                        Some(Value::BulkString(data)) => Value::BulkString(data),
                        Some(_) | None => {
                            state.error_count += 1;
                            ReplyError::UpstreamProtocolError.into_reply()
                        }
                    };
                }
            }
        }

        state.num_pending -= 1;
        state.num_pending == 0
    };

    if finished {
        let (callback, responses) = {
            let mut state = state.borrow_mut();
            (state.callback.take(), std::mem::take(&mut state.responses))
        };
        if let Some(callback) = callback {
            debug!(slots = responses.len(), "mget fan-out complete");
            callback(Value::Array(responses));
        }
    }
}

// ── MSET: fan-out write ─────────────────────────────────────────────────

struct MSetState {
    callback: Option<ResponseCallback>,
    num_pending: usize,
    error_count: u64,
    pending: Vec<PendingRequest>,
}

struct MSetSink {
    state: Rc<RefCell<MSetState>>,
    index: usize,
}

impl ResponseSink for MSetSink {
    fn on_response(&mut self, value: Value) {
        fold_mset(&self.state, self.index, value);
    }

    fn on_failure(&mut self) {
        fold_mset(
            &self.state,
            self.index,
            ReplyError::UpstreamFailure.into_reply(),
        );
    }
}

/// Split `MSET key value [key value ...]` into one sub-request per owning
/// host.
pub(crate) fn mset(
    pool: &dyn ConnPool,
    request: &Value,
    callback: ResponseCallback,
) -> Option<SplitRequest> {
    let args = command_args(request);
    if (args.len() - 1) % 2 != 0 {
        callback(ReplyError::WrongArity(command_name(args)).into_reply());
        return None;
    }

    // Group (key, value) pairs by owning host. The recorded positions are
    // the keys' zero-based indices in the client request; MSET only uses
    // them for error-count arithmetic.
    let mut by_host: HashMap<HostId, Vec<(Bytes, Bytes, usize)>> = HashMap::new();
    for key_index in (1..args.len()).step_by(2) {
        let key = bulk_at(args, key_index);
        let value = bulk_at(args, key_index + 1);
        by_host
            .entry(pool.host_for(&key))
            .or_default()
            .push((key, value, key_index - 1));
    }

    let state = Rc::new(RefCell::new(MSetState {
        callback: Some(callback),
        num_pending: by_host.len(),
        error_count: 0,
        pending: Vec::with_capacity(by_host.len()),
    }));

    for (index, (_host, pairs)) in by_host.into_iter().enumerate() {
        let response_indices = pairs.iter().map(|(_, _, position)| *position).collect();
        let mut elements = Vec::with_capacity(pairs.len() * 2 + 1);
        elements.push(Value::bulk_string(b"MSET"));
        for (key, value, _) in &pairs {
            elements.push(Value::BulkString(key.clone()));
            elements.push(Value::BulkString(value.clone()));
        }
        let fragment = Value::Array(elements);

        state.borrow_mut().pending.push(PendingRequest {
            response_indices,
            handle: None,
        });

        let sink = Box::new(MSetSink {
            state: Rc::clone(&state),
            index,
        });
        match pool.submit(&pairs[0].0, &fragment, sink) {
            Some(handle) => state.borrow_mut().pending[index].handle = Some(handle),
            None => fold_mset(&state, index, ReplyError::NoUpstreamHost.into_reply()),
        }
    }

    if state.borrow().num_pending > 0 {
        Some(SplitRequest {
            inner: Inner::MSet(state),
        })
    } else {
        None
    }
}

fn fold_mset(state: &Rc<RefCell<MSetState>>, index: usize, value: Value) {
    let finished = {
        let mut state = state.borrow_mut();
        state.pending[index].handle = None;
        let indices = std::mem::take(&mut state.pending[index].response_indices);

        let ok = matches!(&value, Value::SimpleString(reply) if reply.as_ref() == b"OK");
        if !ok {
            // Every key the fragment covered failed to land.
            state.error_count += indices.len() as u64;
        }

        state.num_pending -= 1;
        state.num_pending == 0
    };

    if finished {
        let (callback, errors) = {
            let mut state = state.borrow_mut();
            (state.callback.take(), state.error_count)
        };
        if let Some(callback) = callback {
            debug!(errors, "mset fan-out complete");
            let reply = if errors == 0 {
                Value::simple_string(b"OK")
            } else {
                ReplyError::FanoutErrors(errors).into_reply()
            };
            callback(reply);
        }
    }
}

// ── Argument access ─────────────────────────────────────────────────────
//
// The splitter only dispatches arrays of bulk strings with at least two
// elements, so extraction cannot fail for in-contract input.

fn command_args(request: &Value) -> &[Value] {
    match request.as_array() {
        Some(args) => args,
        None => unreachable!("dispatched requests are arrays"),
    }
}

fn bulk_at(args: &[Value], index: usize) -> Bytes {
    match &args[index] {
        Value::BulkString(data) => data.clone(),
        _ => unreachable!("dispatched request elements are bulk strings"),
    }
}

fn command_name(args: &[Value]) -> String {
    match &args[0] {
        Value::BulkString(name) => String::from_utf8_lossy(name).into_owned(),
        _ => unreachable!("dispatched request elements are bulk strings"),
    }
}
