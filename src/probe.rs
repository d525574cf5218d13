//! Probe Orchestration
//!
//! One probe is one pass over a target: connect, authenticate, run the enabled collectors in
//! order, then report. It always ends by emitting `probe_duration_seconds` and
//! `probe_success` and by counting the outcome in
//! `freeswitch_exporter_scrapes_total{target,outcome}`, whether or not anything failed.
//!
//! Concurrent probes of the same [`Prober`] queue on an async mutex. Each probe opens its
//! own [`Connection`] and shares nothing with the previous one.

use crate::collectors;
use crate::error::Result;
use crate::freeswitch::Connection;
use crate::metrics::{
    ExporterMetrics, Sample, SampleSink, PROBE_DURATION_SECONDS, PROBE_SUCCESS,
};
use crate::target::Target;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Result of a single probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub success: bool,
    pub duration: Duration,
}

/// Probes one target on demand
pub struct Prober {
    target: Target,
    metrics: ExporterMetrics,
    lock: Mutex<()>,
}

impl Prober {
    pub fn new(target: Target, metrics: ExporterMetrics) -> Self {
        Self {
            target,
            metrics,
            lock: Mutex::new(()),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Runs one probe, emitting every sample into `sink`.
    ///
    /// Never fails: a probe error is logged and reported as `probe_success 0`.
    pub async fn probe(&self, sink: &mut dyn SampleSink) -> ProbeOutcome {
        let _guard = self.lock.lock().await;

        let start = Instant::now();
        let result = self.scrape(sink).await;
        let duration = start.elapsed();
        let seconds = duration.as_secs_f64();
        let success = result.is_ok();

        sink.emit(Sample::gauge(
            PROBE_DURATION_SECONDS,
            "Returns how long the probe took to complete in seconds",
            seconds,
        ));
        sink.emit(Sample::gauge(
            PROBE_SUCCESS,
            "Displays whether or not the probe was a success",
            if success { 1.0 } else { 0.0 },
        ));

        self.metrics.record_scrape(&self.target.to_string(), success);

        match result {
            Ok(()) => info!(freeswitch = %self.target, duration = seconds, "Probe succeeded"),
            Err(e) => error!(freeswitch = %self.target, duration = seconds, "Probe failed: {}", e),
        }

        ProbeOutcome { success, duration }
    }

    async fn scrape(&self, sink: &mut dyn SampleSink) -> Result<()> {
        let mut conn = Connection::open(&self.target).await?;

        let result = async {
            conn.authenticate(self.target.password()).await?;
            let enabled = self.target.enabled_collectors();
            collectors::run(&mut conn, &enabled, sink).await
        }
        .await;

        conn.close().await;
        result
    }
}
