//! Metric Definitions and Exposition
//!
//! Collectors do not touch a Prometheus registry directly. Each probe produces a flat list
//! of [`Sample`]s that is pushed into a [`SampleSink`]; rendering happens afterwards.
//!
//! # Metric Categories
//!
//! ## Command-backed
//! One command per metric, value extracted by an [`Extraction`] rule
//! (row counts, uptime, clock sync).
//!
//! ## Status line
//! Session and CPU figures taken from the `status` reply, see [`crate::parsers::STATUS_FIELDS`].
//!
//! ## Per-record
//! Gateways, endpoints, codecs, registrations, verto profiles, memory and modules emit one
//! sample per record, each with its own labels.
//!
//! ## Probe
//! `probe_success`, `probe_duration_seconds` and the cumulative
//! `freeswitch_exporter_scrapes_total` counter.
//!
//! All switch metrics use the `freeswitch_` namespace prefix.

use prometheus::{CounterVec, Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

pub const NAMESPACE: &str = "freeswitch";

pub const PROBE_SUCCESS: &str = "probe_success";
pub const PROBE_DURATION_SECONDS: &str = "probe_duration_seconds";

/// Prometheus value type of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Label set of one sample, ordered by label name
pub type Labels = BTreeMap<String, String>;

/// One numeric observation produced by a probe
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Labels,
}

impl Sample {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        kind: MetricKind,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind,
            value,
            labels: Labels::new(),
        }
    }

    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self::new(name, help, MetricKind::Gauge, value)
    }

    pub fn with_label(mut self, name: &str, value: impl Into<String>) -> Self {
        self.labels.insert(name.to_string(), value.into());
        self
    }

    pub fn with_labels<'a>(
        mut self,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        for (name, value) in labels {
            self.labels.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

/// Prefixes a metric name with the exporter namespace
pub fn namespaced(name: &str) -> String {
    format!("{}_{}", NAMESPACE, name)
}

/// Destination for samples produced during a probe
pub trait SampleSink: Send {
    fn emit(&mut self, sample: Sample);
}

impl SampleSink for Vec<Sample> {
    fn emit(&mut self, sample: Sample) {
        self.push(sample);
    }
}

/// How the value of a command-backed metric is read from the reply body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// JSON object, numeric `row_count`
    RowCount,
    /// Floating seconds with an optional trailing newline
    Uptime,
    /// Remote epoch seconds compared against the local clock
    TimeSync,
}

/// Where a metric's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    Command {
        command: &'static str,
        extraction: Extraction,
    },
    /// Capture group of the `status` reply, resolved by metric name
    StatusLine,
}

/// Static description of a fixed (non per-record) metric
#[derive(Debug, Clone, Copy)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub source: MetricSource,
}

impl MetricDefinition {
    const fn command(
        name: &'static str,
        help: &'static str,
        command: &'static str,
        extraction: Extraction,
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            source: MetricSource::Command {
                command,
                extraction,
            },
        }
    }

    const fn status(name: &'static str, help: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            help,
            kind,
            source: MetricSource::StatusLine,
        }
    }

    pub fn sample(&self, value: f64) -> Sample {
        Sample::new(namespaced(self.name), self.help, self.kind, value)
    }
}

pub const METRIC_DEFINITIONS: &[MetricDefinition] = &[
    MetricDefinition::command(
        "current_calls",
        "Number of calls active",
        "api show calls count as json",
        Extraction::RowCount,
    ),
    MetricDefinition::command(
        "detailed_bridged_calls",
        "Number of detailed_bridged_calls active",
        "api show detailed_bridged_calls as json",
        Extraction::RowCount,
    ),
    MetricDefinition::command(
        "detailed_calls",
        "Number of detailed_calls active",
        "api show detailed_calls as json",
        Extraction::RowCount,
    ),
    MetricDefinition::command(
        "bridged_calls",
        "Number of bridged_calls active",
        "api show bridged_calls as json",
        Extraction::RowCount,
    ),
    MetricDefinition::command(
        "registrations",
        "Number of registrations active",
        "api show registrations as json",
        Extraction::RowCount,
    ),
    MetricDefinition::command(
        "current_channels",
        "Number of channels active",
        "api show channels count as json",
        Extraction::RowCount,
    ),
    MetricDefinition::command(
        "uptime_seconds",
        "Uptime in seconds",
        "api uptime s",
        Extraction::Uptime,
    ),
    MetricDefinition::command(
        "time_synced",
        "Is FreeSWITCH time in sync with exporter host time",
        "api strepoch",
        Extraction::TimeSync,
    ),
    MetricDefinition::status(
        "sessions_total",
        "Number of sessions since startup",
        MetricKind::Counter,
    ),
    MetricDefinition::status(
        "current_sessions",
        "Number of sessions active",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "current_sessions_peak",
        "Peak sessions since startup",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "current_sessions_peak_last_5min",
        "Peak sessions for the last 5 minutes",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "current_sps",
        "Number of sessions per second",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "current_sps_peak",
        "Peak sessions per second since startup",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "current_sps_peak_last_5min",
        "Peak sessions per second for the last 5 minutes",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "max_sps",
        "Max sessions per second allowed",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "max_sessions",
        "Max sessions allowed",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "current_idle_cpu",
        "CPU idle",
        MetricKind::Gauge,
    ),
    MetricDefinition::status(
        "min_idle_cpu",
        "Minimum CPU idle",
        MetricKind::Gauge,
    ),
];

/// Long-lived exporter metrics plus the renderer for per-probe samples
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Arc<Registry>,
    pub scrapes_total: Arc<IntCounterVec>,
}

impl ExporterMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let scrapes_total = IntCounterVec::new(
            Opts::new("scrapes_total", "Number of probes by target and outcome")
                .namespace("freeswitch_exporter"),
            &["target", "outcome"],
        )?;
        registry.register(Box::new(scrapes_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            scrapes_total: Arc::new(scrapes_total),
        })
    }

    /// Records the outcome of one probe against a target
    pub fn record_scrape(&self, target: &str, success: bool) {
        let outcome = if success { "success" } else { "failed" };
        self.scrapes_total
            .with_label_values(&[target, outcome])
            .inc();
    }

    /// Render probe samples and the long-lived metrics in Prometheus text format
    ///
    /// Samples are grouped into families by name in first-seen order. A family whose
    /// name or labels the Prometheus client rejects is logged and left out.
    pub fn render(&self, samples: &[Sample]) -> anyhow::Result<String> {
        let scrape = Registry::new();

        for (name, family) in group_by_name(samples) {
            if let Err(e) = register_family(&scrape, name, &family) {
                warn!("Skipping metric family {}: {}", name, e);
            }
        }

        let mut metric_families = scrape.gather();
        metric_families.extend(self.registry.gather());

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new().expect("Failed to create exporter metrics")
    }
}

fn group_by_name(samples: &[Sample]) -> Vec<(&str, Vec<&Sample>)> {
    let mut families: Vec<(&str, Vec<&Sample>)> = Vec::new();
    for sample in samples {
        match families.iter_mut().find(|(name, _)| *name == sample.name) {
            Some((_, family)) => family.push(sample),
            None => families.push((sample.name.as_str(), vec![sample])),
        }
    }
    families
}

fn register_family(
    registry: &Registry,
    name: &str,
    family: &[&Sample],
) -> prometheus::Result<()> {
    let first = family[0];
    let label_names: Vec<&str> = first.labels.keys().map(String::as_str).collect();
    let label_values = |sample: &Sample| -> Vec<String> {
        label_names
            .iter()
            .map(|label| sample.labels.get(*label).cloned().unwrap_or_default())
            .collect()
    };

    match first.kind {
        MetricKind::Gauge => {
            let gauge = GaugeVec::new(Opts::new(name, first.help.as_str()), &label_names)?;
            for sample in family {
                let values = label_values(sample);
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                gauge.get_metric_with_label_values(&values)?.set(sample.value);
            }
            registry.register(Box::new(gauge))
        }
        MetricKind::Counter => {
            let counter = CounterVec::new(Opts::new(name, first.help.as_str()), &label_names)?;
            for sample in family {
                if sample.value < 0.0 {
                    warn!("Dropping negative counter value {} for {}", sample.value, name);
                    continue;
                }
                let values = label_values(sample);
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                counter.get_metric_with_label_values(&values)?.inc_by(sample.value);
            }
            registry.register(Box::new(counter))
        }
    }
}
