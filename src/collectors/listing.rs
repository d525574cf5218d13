//! Endpoint and Codec Collectors
//!
//! Both listings share the `<result><row>` schema of `show <x> as xml`; every row becomes
//! one presence sample.
//!
//! # Metrics Produced
//! - `freeswitch_endpoint_status` - Loaded endpoint (value is always 1)
//!   - Labels: type, name, ikey
//! - `freeswitch_codec_status` - Loaded codec (value is always 1)
//!   - Labels: type, name, ikey

use crate::error::Result;
use crate::freeswitch::types::{Listing, ListingRow};
use crate::freeswitch::Connection;
use crate::metrics::{namespaced, Sample, SampleSink};
use crate::parsers;

pub const ENDPOINT_COMMAND: &str = "api show endpoint as xml";
pub const CODEC_COMMAND: &str = "api show codec as xml";

/// Presence sample for one listing row
pub fn listing_sample(metric: &str, help: &str, row: &ListingRow) -> Sample {
    Sample::gauge(namespaced(metric), help, 1.0).with_labels([
        ("type", row.kind.as_str()),
        ("name", row.name.as_str()),
        ("ikey", row.ikey.as_str()),
    ])
}

async fn collect_listing(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
    collector: &str,
    command: &str,
    metric: &str,
    help: &str,
) -> Result<()> {
    let body = conn.exchange(command).await?;
    let listing: Listing = parsers::decode_xml(collector, &body)?;
    tracing::debug!(collector, rows = listing.rows.len(), "Decoded listing");

    for row in &listing.rows {
        sink.emit(listing_sample(metric, help, row));
    }

    Ok(())
}

pub async fn collect_endpoint_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    collect_listing(
        conn,
        sink,
        "endpoint",
        ENDPOINT_COMMAND,
        "endpoint_status",
        "freeswitch endpoint status",
    )
    .await
}

pub async fn collect_codec_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    collect_listing(
        conn,
        sink,
        "codec",
        CODEC_COMMAND,
        "codec_status",
        "freeswitch codec status",
    )
    .await
}
