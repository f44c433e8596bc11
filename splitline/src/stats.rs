//! Splitter counters.
//!
//! Counters are metriken dynamic metrics registered for the lifetime of the
//! splitter that owns them. Names follow the external contract:
//!
//! - `<prefix>splitter.invalid_request`
//! - `<prefix>splitter.unsupported_command`
//! - `<prefix>splitter.command.<name>.total`

use metriken::{Counter, DynBoxedMetric, MetricBuilder};

/// Rejection counters for one splitter instance.
pub struct SplitterStats {
    pub(crate) invalid_request: DynBoxedMetric<Counter>,
    pub(crate) unsupported_command: DynBoxedMetric<Counter>,
}

impl SplitterStats {
    pub(crate) fn new(prefix: &str) -> Self {
        Self {
            invalid_request: counter(format!("{prefix}splitter.invalid_request")),
            unsupported_command: counter(format!("{prefix}splitter.unsupported_command")),
        }
    }

    /// Total requests rejected for malformed shape.
    pub fn invalid_request_count(&self) -> u64 {
        self.invalid_request.value()
    }

    /// Total requests rejected for an unknown command name.
    pub fn unsupported_command_count(&self) -> u64 {
        self.unsupported_command.value()
    }
}

/// Build the per-command dispatch counter for `name` (already lowercased).
pub(crate) fn command_total(prefix: &str, name: &str) -> DynBoxedMetric<Counter> {
    counter(format!("{prefix}splitter.command.{name}.total"))
}

fn counter(name: String) -> DynBoxedMetric<Counter> {
    MetricBuilder::new(name).build(Counter::new())
}
