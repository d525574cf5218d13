//! Memory Collector
//!
//! # Metrics Produced
//! - `freeswitch_memory_<field>` - One gauge per allocator statistic reported by
//!   `api memory`, help text taken from the line's description

use crate::error::Result;
use crate::freeswitch::Connection;
use crate::metrics::{namespaced, Sample, SampleSink};
use crate::parsers;

pub const MEMORY_COMMAND: &str = "api memory";

pub async fn collect_memory_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    let body = conn.exchange(MEMORY_COMMAND).await?;

    for stat in parsers::parse_memory(&body)? {
        sink.emit(Sample::gauge(
            namespaced(&format!("memory_{}", stat.field)),
            stat.help,
            stat.value,
        ));
    }

    Ok(())
}
