//! Registration Details Collector
//!
//! # Metrics Produced
//! - `freeswitch_registration_details` - One active registration (value is always 1)
//!   - Labels: reg_user, hostname, realm, token, url, expires, network_ip, network_port,
//!     network_proto

use crate::error::Result;
use crate::freeswitch::types::{Registration, Registrations};
use crate::freeswitch::Connection;
use crate::metrics::{namespaced, Sample, SampleSink};
use crate::parsers;

pub const REGISTRATIONS_COMMAND: &str = "api show registrations as xml";

pub fn registration_sample(registration: &Registration) -> Sample {
    Sample::gauge(
        namespaced("registration_details"),
        "freeswitch registration status",
        1.0,
    )
    .with_labels([
        ("reg_user", registration.reg_user.as_str()),
        ("hostname", registration.hostname.as_str()),
        ("realm", registration.realm.as_str()),
        ("token", registration.token.as_str()),
        ("url", registration.url.as_str()),
        ("expires", registration.expires.as_str()),
        ("network_ip", registration.network_ip.as_str()),
        ("network_port", registration.network_port.as_str()),
        ("network_proto", registration.network_proto.as_str()),
    ])
}

pub async fn collect_registration_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    let body = conn.exchange(REGISTRATIONS_COMMAND).await?;
    let registrations: Registrations = parsers::decode_xml("registrations", &body)?;

    for registration in &registrations.rows {
        sink.emit(registration_sample(registration));
    }

    Ok(())
}
