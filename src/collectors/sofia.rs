//! Sofia Gateway Collector
//!
//! Collects SIP gateway state and call counters from `sofia xmlstatus gateway`.
//!
//! # Metrics Produced
//! - `freeswitch_sofia_gateway_status` - Gateway status (1=UP, 0=anything else)
//!   - Labels: name, proxy, profile, context, scheme, status
//! - `freeswitch_sofia_gateway_call_in`, `freeswitch_sofia_gateway_call_out`
//! - `freeswitch_sofia_gateway_failed_call_in`, `freeswitch_sofia_gateway_failed_call_out`
//! - `freeswitch_sofia_gateway_ping`, `freeswitch_sofia_gateway_pingfreq`,
//!   `freeswitch_sofia_gateway_pingmin`, `freeswitch_sofia_gateway_pingmax`,
//!   `freeswitch_sofia_gateway_pingcount`, `freeswitch_sofia_gateway_pingtime`
//!   - Labels: name, proxy, profile

use crate::error::Result;
use crate::freeswitch::types::{Gateway, Gateways};
use crate::freeswitch::Connection;
use crate::metrics::{namespaced, Sample, SampleSink};
use crate::parsers;
use tracing::debug;

pub const GATEWAY_COMMAND: &str = "api sofia xmlstatus gateway";

/// Samples for one gateway record
pub fn gateway_samples(gateway: &Gateway) -> Vec<Sample> {
    let status = if gateway.status == "UP" { 1.0 } else { 0.0 };
    let labels = [
        ("name", gateway.name.as_str()),
        ("proxy", gateway.proxy.as_str()),
        ("profile", gateway.profile.as_str()),
    ];

    let mut samples = vec![Sample::gauge(
        namespaced("sofia_gateway_status"),
        "freeswitch gateways status",
        status,
    )
    .with_labels(labels)
    .with_labels([
        ("context", gateway.context.as_str()),
        ("scheme", gateway.scheme.as_str()),
        ("status", gateway.status.as_str()),
    ])];

    let counters = [
        ("call_in", "call-in", gateway.calls_in as f64),
        ("call_out", "call-out", gateway.calls_out as f64),
        ("failed_call_in", "failed-call-in", gateway.failed_calls_in as f64),
        ("failed_call_out", "failed-call-out", gateway.failed_calls_out as f64),
        ("ping", "ping", gateway.ping as f64),
        ("pingfreq", "pingfreq", gateway.pingfreq as f64),
        ("pingmin", "pingmin", gateway.pingmin as f64),
        ("pingmax", "pingmax", gateway.pingmax as f64),
        ("pingcount", "pingcount", gateway.pingcount as f64),
        ("pingtime", "pingtime", gateway.pingtime),
    ];

    for (suffix, help, value) in counters {
        samples.push(
            Sample::gauge(
                namespaced(&format!("sofia_gateway_{}", suffix)),
                format!("freeswitch gateway {}", help),
                value,
            )
            .with_labels(labels),
        );
    }

    samples
}

pub async fn collect_gateway_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    let body = conn.exchange(GATEWAY_COMMAND).await?;
    let gateways: Gateways = parsers::decode_xml("sofiastatus", &body)?;

    for gateway in &gateways.gateways {
        debug!(sofia = %gateway.name, status = %gateway.status, "Gateway state");
        for sample in gateway_samples(gateway) {
            sink.emit(sample);
        }
    }

    Ok(())
}
