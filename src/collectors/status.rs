//! Status Line Collector
//!
//! Parses the free-text reply of `api status` with a single pattern.
//!
//! # Metrics Produced
//! - `freeswitch_sessions_total` (counter) - Sessions since startup
//! - `freeswitch_current_sessions`, `freeswitch_current_sessions_peak`,
//!   `freeswitch_current_sessions_peak_last_5min`, `freeswitch_max_sessions`
//! - `freeswitch_current_sps`, `freeswitch_current_sps_peak`,
//!   `freeswitch_current_sps_peak_last_5min`, `freeswitch_max_sps`
//! - `freeswitch_min_idle_cpu`, `freeswitch_current_idle_cpu`

use crate::error::Result;
use crate::freeswitch::Connection;
use crate::metrics::SampleSink;
use crate::parsers;

pub const STATUS_COMMAND: &str = "api status";

pub async fn collect_status_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    let body = conn.exchange(STATUS_COMMAND).await?;

    for (definition, value) in parsers::parse_status(&body)? {
        sink.emit(definition.sample(value));
    }

    Ok(())
}
