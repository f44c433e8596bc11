//! The splitter instance: command registry and dispatch.

use std::collections::HashMap;
use std::rc::Rc;

use metriken::{Counter, DynBoxedMetric};
use resp_core::Value;
use tracing::debug;

use crate::commands::SupportedCommands;
use crate::error::ReplyError;
use crate::pool::ConnPool;
use crate::request::{self, ResponseCallback, SplitRequest};
use crate::stats::{self, SplitterStats};

/// Which state machine a registered command dispatches to.
#[derive(Debug, Clone, Copy)]
enum CommandKind {
    Simple,
    Eval,
    MGet,
    MSet,
}

struct HandlerEntry {
    kind: CommandKind,
    total: DynBoxedMetric<Counter>,
}

/// Splits client commands across a hash-routed upstream pool.
///
/// One instance per worker. The registry is built once at construction and
/// is read-only afterwards; lookups are by lowercased command name.
pub struct Splitter {
    pool: Rc<dyn ConnPool>,
    commands: HashMap<Vec<u8>, HandlerEntry>,
    stats: SplitterStats,
}

impl Splitter {
    /// Build a splitter over `pool`. `stat_prefix` scopes every counter this
    /// instance registers.
    pub fn new(pool: Rc<dyn ConnPool>, stat_prefix: &str) -> Self {
        let mut commands = HashMap::new();
        for name in SupportedCommands::simple() {
            register(&mut commands, stat_prefix, name, CommandKind::Simple);
        }
        for name in SupportedCommands::eval() {
            register(&mut commands, stat_prefix, name, CommandKind::Eval);
        }
        register(
            &mut commands,
            stat_prefix,
            SupportedCommands::mget(),
            CommandKind::MGet,
        );
        register(
            &mut commands,
            stat_prefix,
            SupportedCommands::mset(),
            CommandKind::MSet,
        );

        Self {
            pool,
            commands,
            stats: SplitterStats::new(stat_prefix),
        }
    }

    /// Dispatch one client command.
    ///
    /// `on_response` fires exactly once with the client-visible reply —
    /// synchronously for rejected or immediately-failing requests, otherwise
    /// when the last upstream fragment resolves. Returns the in-flight
    /// request, or `None` when the command completed synchronously.
    pub fn make_request(
        &self,
        request: &Value,
        on_response: impl FnOnce(Value) + 'static,
    ) -> Option<SplitRequest> {
        let callback: ResponseCallback = Box::new(on_response);

        let args = match request.as_array() {
            Some(args) if args.len() >= 2 => args,
            _ => return self.reject_invalid(callback),
        };
        if !args.iter().all(|arg| matches!(arg, Value::BulkString(_))) {
            return self.reject_invalid(callback);
        }
        let name = match &args[0] {
            Value::BulkString(name) => name,
            _ => return self.reject_invalid(callback),
        };

        // ASCII-only folding: non-ASCII bytes pass through unchanged and
        // therefore never match a registered name.
        let lowered = name.to_ascii_lowercase();
        let Some(entry) = self.commands.get(lowered.as_slice()) else {
            self.stats.unsupported_command.increment();
            let original = String::from_utf8_lossy(name).into_owned();
            callback(ReplyError::UnsupportedCommand(original).into_reply());
            return None;
        };

        debug!(command = %String::from_utf8_lossy(&lowered), "splitting request");
        entry.total.increment();
        let pool = self.pool.as_ref();
        match entry.kind {
            CommandKind::Simple => request::simple(pool, request, callback),
            CommandKind::Eval => request::eval(pool, request, callback),
            CommandKind::MGet => request::mget(pool, request, callback),
            CommandKind::MSet => request::mset(pool, request, callback),
        }
    }

    /// This instance's rejection counters.
    pub fn stats(&self) -> &SplitterStats {
        &self.stats
    }

    /// Dispatch count for a registered command (lowercase name), or `None`
    /// for a name that was never registered.
    pub fn command_total(&self, name: &str) -> Option<u64> {
        self.commands
            .get(name.as_bytes())
            .map(|entry| entry.total.value())
    }

    fn reject_invalid(&self, callback: ResponseCallback) -> Option<SplitRequest> {
        self.stats.invalid_request.increment();
        callback(ReplyError::InvalidRequest.into_reply());
        None
    }
}

fn register(
    commands: &mut HashMap<Vec<u8>, HandlerEntry>,
    stat_prefix: &str,
    name: &str,
    kind: CommandKind,
) {
    let name = name.to_ascii_lowercase();
    let total = stats::command_total(stat_prefix, &name);
    let previous = commands.insert(name.clone().into_bytes(), HandlerEntry { kind, total });
    debug_assert!(previous.is_none(), "duplicate command registration: {name}");
}
