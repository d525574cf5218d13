//! Verto Profile Collector
//!
//! Reports the run state of each verto (WebRTC signalling) profile. Installations without
//! mod_verto answer `-ERR verto Command not found!`, which is why this collector is the
//! one registered with `ignore_command_not_found`.
//!
//! # Metrics Produced
//! - `freeswitch_verto_status` - Profile state (1=RUNNING, 0=anything else)
//!   - Labels: name, type, data

use crate::error::Result;
use crate::freeswitch::types::{VertoProfile, VertoProfiles};
use crate::freeswitch::Connection;
use crate::metrics::{namespaced, Sample, SampleSink};
use crate::parsers;

pub const VERTO_COMMAND: &str = "api verto xmlstatus";

pub fn verto_sample(profile: &VertoProfile) -> Sample {
    let state = if profile.state == "RUNNING" { 1.0 } else { 0.0 };

    Sample::gauge(namespaced("verto_status"), "freeswitch verto profile status", state)
        .with_labels([
            ("name", profile.name.as_str()),
            ("type", profile.kind.as_str()),
            ("data", profile.data.as_str()),
        ])
}

pub async fn collect_verto_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    let body = conn.exchange(VERTO_COMMAND).await?;
    let profiles: VertoProfiles = parsers::decode_xml("verto", &body)?;

    for profile in &profiles.profiles {
        sink.emit(verto_sample(profile));
    }

    Ok(())
}
