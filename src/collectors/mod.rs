//! Metrics Collectors
//!
//! Each collector issues one or more `api` commands over the probe's [`Connection`],
//! parses the replies and emits [`Sample`](crate::metrics::Sample)s into the sink.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Accept the probe's `&mut Connection` and a `&mut dyn SampleSink`
//! - Run their command(s) through [`Connection::exchange`]
//! - Parse with [`crate::parsers`] and emit one sample per value or record
//! - Return `Ok(())`, or the first error they hit
//!
//! [`COLLECTORS`] fixes the order they run in. [`run`] walks that list for one probe.
//!
//! # Error Handling
//!
//! The first error stops the probe. The one exception is an entry flagged
//! `ignore_command_not_found`: when its command is unknown to the switch (the module is not
//! loaded) the error is logged as a warning and the probe carries on.

use crate::error::{ExporterError, Result};
use crate::freeswitch::Connection;
use crate::metrics::SampleSink;
use futures_util::future::BoxFuture;
use std::collections::HashSet;
use tracing::{debug, warn};

// Collector modules
pub mod builtin;
pub mod listing;
pub mod memory;
pub mod modules;
pub mod registrations;
pub mod sofia;
pub mod status;
pub mod verto;

// Re-export collector functions for convenient access
pub use builtin::collect_builtin_metrics;
pub use listing::{collect_codec_metrics, collect_endpoint_metrics};
pub use memory::collect_memory_metrics;
pub use modules::collect_load_module_metrics;
pub use registrations::collect_registration_metrics;
pub use sofia::collect_gateway_metrics;
pub use status::collect_status_metrics;
pub use verto::collect_verto_metrics;

/// Signature shared by every collector
pub type CollectFn =
    for<'a> fn(&'a mut Connection, &'a mut dyn SampleSink) -> BoxFuture<'a, Result<()>>;

/// One named step of a probe
#[derive(Clone, Copy)]
pub struct CollectorEntry {
    pub name: &'static str,
    /// Treat "Command not found" from the switch as an empty result
    pub ignore_command_not_found: bool,
    pub collect: CollectFn,
}

impl CollectorEntry {
    /// Whether a failure of this entry may be skipped over
    pub fn tolerates(&self, error: &ExporterError) -> bool {
        self.ignore_command_not_found && error.is_command_not_found()
    }
}

impl std::fmt::Debug for CollectorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorEntry")
            .field("name", &self.name)
            .field("ignore_command_not_found", &self.ignore_command_not_found)
            .finish()
    }
}

/// All collectors, in the order a probe runs them
pub const COLLECTORS: &[CollectorEntry] = &[
    CollectorEntry {
        name: "builtin",
        ignore_command_not_found: false,
        collect: builtin_entry,
    },
    CollectorEntry {
        name: "status",
        ignore_command_not_found: false,
        collect: status_entry,
    },
    CollectorEntry {
        name: "sofiastatus",
        ignore_command_not_found: false,
        collect: sofia_status_entry,
    },
    CollectorEntry {
        name: "memory",
        ignore_command_not_found: false,
        collect: memory_entry,
    },
    CollectorEntry {
        name: "loadmodule",
        ignore_command_not_found: false,
        collect: load_module_entry,
    },
    CollectorEntry {
        name: "endpoint",
        ignore_command_not_found: false,
        collect: endpoint_entry,
    },
    CollectorEntry {
        name: "codec",
        ignore_command_not_found: false,
        collect: codec_entry,
    },
    CollectorEntry {
        name: "registrations",
        ignore_command_not_found: false,
        collect: registrations_entry,
    },
    CollectorEntry {
        name: "verto",
        ignore_command_not_found: true,
        collect: verto_entry,
    },
];

/// Names of every known collector, in run order
pub fn collector_names() -> Vec<&'static str> {
    COLLECTORS.iter().map(|entry| entry.name).collect()
}

/// Runs the enabled subset of [`COLLECTORS`] against an authenticated connection
pub async fn run(
    conn: &mut Connection,
    enabled: &HashSet<&str>,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    run_entries(COLLECTORS, conn, enabled, sink).await
}

/// Runs `entries` in order, skipping the ones not in `enabled`.
///
/// Stops at the first error unless the failing entry tolerates it. Samples emitted
/// before a failure stay in the sink.
pub async fn run_entries(
    entries: &[CollectorEntry],
    conn: &mut Connection,
    enabled: &HashSet<&str>,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    if !conn.is_authenticated() {
        return Err(ExporterError::Auth(
            "collectors require an authenticated connection".to_string(),
        ));
    }

    for entry in entries {
        if !enabled.contains(entry.name) {
            debug!(collector = entry.name, "Collector disabled, skipping");
            continue;
        }

        if let Err(e) = (entry.collect)(conn, sink).await {
            if entry.tolerates(&e) {
                warn!(collector = entry.name, "Ignoring collector error: {}", e);
                continue;
            }
            return Err(e);
        }
        debug!(collector = entry.name, "Collector finished");
    }

    Ok(())
}

fn builtin_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_builtin_metrics(conn, sink))
}

fn status_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_status_metrics(conn, sink))
}

fn sofia_status_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_gateway_metrics(conn, sink))
}

fn memory_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_memory_metrics(conn, sink))
}

fn load_module_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_load_module_metrics(conn, sink))
}

fn endpoint_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_endpoint_metrics(conn, sink))
}

fn codec_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_codec_metrics(conn, sink))
}

fn registrations_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_registration_metrics(conn, sink))
}

fn verto_entry<'a>(
    conn: &'a mut Connection,
    sink: &'a mut dyn SampleSink,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(collect_verto_metrics(conn, sink))
}
