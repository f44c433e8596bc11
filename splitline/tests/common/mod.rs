//! A scripted connection pool for driving the splitter in tests.
//!
//! Routing is a fixed key→host map (unrouted keys land on host 0), accepted
//! submissions are captured so tests can inspect them and deliver replies in
//! any order, and every handed-out handle records whether it was cancelled.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use resp_core::Value;
use splitline::{ConnPool, Handle, HostId, ResponseSink};

#[derive(Default)]
pub struct MockPool {
    routes: RefCell<HashMap<Vec<u8>, HostId>>,
    refused_keys: RefCell<HashSet<Vec<u8>>>,
    host_for_calls: Cell<usize>,
    submissions: RefCell<Vec<Submission>>,
}

struct Submission {
    key: Vec<u8>,
    request: Value,
    sink: Option<Box<dyn ResponseSink>>,
    cancelled: Rc<Cell<bool>>,
}

struct MockHandle {
    cancelled: Rc<Cell<bool>>,
}

impl Handle for MockHandle {
    fn cancel(&mut self) {
        self.cancelled.set(true);
    }
}

impl MockPool {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Pin `key` to `host`. Unrouted keys map to host 0.
    pub fn route(&self, key: &[u8], host: HostId) {
        self.routes.borrow_mut().insert(key.to_vec(), host);
    }

    /// Make submissions routed by `key` fail synchronously.
    pub fn refuse_key(&self, key: &[u8]) {
        self.refused_keys.borrow_mut().insert(key.to_vec());
    }

    /// Number of accepted submissions so far.
    pub fn submission_count(&self) -> usize {
        self.submissions.borrow().len()
    }

    /// How many times the splitter asked for a key's host.
    pub fn host_for_call_count(&self) -> usize {
        self.host_for_calls.get()
    }

    /// The routing key of submission `index`.
    pub fn submitted_key(&self, index: usize) -> Vec<u8> {
        self.submissions.borrow()[index].key.clone()
    }

    /// The request value of submission `index`.
    pub fn submitted_request(&self, index: usize) -> Value {
        self.submissions.borrow()[index].request.clone()
    }

    /// Index of the (unique) submission routed by `key`.
    pub fn submission_for_key(&self, key: &[u8]) -> usize {
        let submissions = self.submissions.borrow();
        let mut matches = submissions
            .iter()
            .enumerate()
            .filter(|(_, submission)| submission.key == key)
            .map(|(index, _)| index);
        let index = matches
            .next()
            .unwrap_or_else(|| panic!("no submission routed by {:?}", key));
        assert!(matches.next().is_none(), "multiple submissions for key");
        index
    }

    /// Whether submission `index`'s handle was cancelled.
    pub fn was_cancelled(&self, index: usize) -> bool {
        self.submissions.borrow()[index].cancelled.get()
    }

    /// Deliver an upstream reply for submission `index`.
    pub fn respond(&self, index: usize, value: Value) {
        let mut sink = self.take_sink(index);
        sink.on_response(value);
    }

    /// Deliver an upstream transport failure for submission `index`.
    pub fn fail(&self, index: usize) {
        let mut sink = self.take_sink(index);
        sink.on_failure();
    }

    fn take_sink(&self, index: usize) -> Box<dyn ResponseSink> {
        self.submissions.borrow_mut()[index]
            .sink
            .take()
            .expect("submission already resolved")
    }
}

impl ConnPool for MockPool {
    fn host_for(&self, key: &[u8]) -> HostId {
        self.host_for_calls.set(self.host_for_calls.get() + 1);
        self.routes.borrow().get(key).copied().unwrap_or(0)
    }

    fn submit(
        &self,
        key: &[u8],
        request: &Value,
        sink: Box<dyn ResponseSink>,
    ) -> Option<Box<dyn Handle>> {
        if self.refused_keys.borrow().contains(key) {
            return None;
        }
        let cancelled = Rc::new(Cell::new(false));
        self.submissions.borrow_mut().push(Submission {
            key: key.to_vec(),
            request: request.clone(),
            sink: Some(sink),
            cancelled: Rc::clone(&cancelled),
        });
        Some(Box::new(MockHandle { cancelled }))
    }
}
