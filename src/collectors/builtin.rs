//! Built-in Metrics Collector
//!
//! Runs one command per command-backed entry of
//! [`METRIC_DEFINITIONS`](crate::metrics::METRIC_DEFINITIONS).
//!
//! # Metrics Produced
//! - `freeswitch_current_calls`, `freeswitch_detailed_bridged_calls`,
//!   `freeswitch_detailed_calls`, `freeswitch_bridged_calls`, `freeswitch_registrations`,
//!   `freeswitch_current_channels` - `row_count` of the matching `show ... as json`
//! - `freeswitch_uptime_seconds` - Uptime in seconds
//! - `freeswitch_time_synced` - 1 if the switch clock is within 3 seconds of ours

use crate::error::Result;
use crate::freeswitch::Connection;
use crate::metrics::{Extraction, MetricSource, SampleSink, METRIC_DEFINITIONS};
use crate::parsers;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

pub async fn collect_builtin_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    for definition in METRIC_DEFINITIONS {
        let MetricSource::Command {
            command,
            extraction,
        } = definition.source
        else {
            // fetched by the status collector
            continue;
        };

        // Taken before the round trip so the reply can only look late, never early
        let local_now = unix_now();
        let body = conn.exchange(command).await?;

        let value = match extraction {
            Extraction::RowCount => parsers::parse_row_count(definition.name, &body)?,
            Extraction::Uptime => parsers::parse_uptime(&body)?,
            Extraction::TimeSync => {
                let remote = parsers::parse_epoch(&body)?;
                let synced = parsers::time_synced(local_now, remote);
                if synced == 0.0 {
                    warn!(
                        "time not in sync between system ({}) and FreeSWITCH ({})",
                        local_now, remote
                    );
                }
                synced
            }
        };

        sink.emit(definition.sample(value));
    }

    Ok(())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
