//! Response Parsers
//!
//! Turn raw `api` reply bodies into numbers. Nothing in here performs I/O; the collectors
//! fetch the bytes and hand them over.
//!
//! | Reply | Parser |
//! |---|---|
//! | `show ... as json` | [`parse_row_count`] |
//! | `uptime s` | [`parse_uptime`] |
//! | `strepoch` | [`parse_epoch`] + [`time_synced`] |
//! | XML listings | [`decode_xml`] |
//! | `status` | [`parse_status`] |
//! | `memory` | [`parse_memory`] |

use crate::error::{ExporterError, Result};
use crate::freeswitch::types::{RowCount, XmlDocument};
use crate::metrics::{MetricDefinition, MetricSource, METRIC_DEFINITIONS};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use regex::Regex;

/// Largest clock difference, in seconds, still reported as in sync (exclusive)
pub const MAX_CLOCK_DRIFT_SECONDS: u64 = 3;

// Multi-line reply of `api status`, e.g.
//   UP 0 years, 0 days, 1 hour, 2 minutes, 3 seconds, ...
//   12 session(s) since startup
//   2 session(s) - peak 5, last 5min 3
//   1 session(s) per Sec out of max 30, peak 4, last 5min 2
//   1000 session(s) max
//   min idle cpu 0.00/97.63
static STATUS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d+) session\(s\) since startup\s+(\d+) session\(s\) - peak (\d+), last 5min (\d+)\s+(\d+) session\(s\) per Sec out of max (\d+), peak (\d+), last 5min (\d+)\s+(\d+) session\(s\) max\s+min idle cpu (\d+\.\d+)/(\d+\.\d+)",
    )
    .unwrap()
});

// `Description (field):   12345` lines of `api memory`
static MEMORY_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.+?) \((.+?)\):\s+(\d+)").unwrap());

static XML_ENCODING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*<\?xml[^>]*encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap());

/// Capture group of [`STATUS_REGEX`] holding each status-line metric.
///
/// This table is the only place the positional groups are named.
pub const STATUS_FIELDS: &[(&str, usize)] = &[
    ("sessions_total", 1),
    ("current_sessions", 2),
    ("current_sessions_peak", 3),
    ("current_sessions_peak_last_5min", 4),
    ("current_sps", 5),
    ("max_sps", 6),
    ("current_sps_peak", 7),
    ("current_sps_peak_last_5min", 8),
    ("max_sessions", 9),
    ("min_idle_cpu", 10),
    ("current_idle_cpu", 11),
];

/// Looks up the capture group of a status-line metric
pub fn status_field_index(name: &str) -> Result<usize> {
    STATUS_FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, index)| *index)
        .ok_or_else(|| ExporterError::UnknownMetric(name.to_string()))
}

/// `row_count` of a JSON listing
pub fn parse_row_count(metric: &str, body: &[u8]) -> Result<f64> {
    let rows: RowCount = serde_json::from_slice(body).map_err(|source| ExporterError::Json {
        metric: metric.to_string(),
        source,
    })?;
    Ok(rows.row_count)
}

/// Uptime in seconds; one trailing newline is tolerated
pub fn parse_uptime(body: &[u8]) -> Result<f64> {
    let raw = String::from_utf8_lossy(body);
    let raw = raw.strip_suffix('\n').unwrap_or(&raw);
    raw.parse::<f64>()
        .map_err(|e| ExporterError::Extraction(format!("uptime {:?}: {}", raw, e)))
}

/// Remote clock as epoch seconds
pub fn parse_epoch(body: &[u8]) -> Result<i64> {
    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim_end_matches(['\r', '\n']);
    raw.parse::<i64>()
        .map_err(|e| ExporterError::Extraction(format!("FreeSWITCH time {:?}: {}", raw, e)))
}

/// 1 when both clocks are less than [`MAX_CLOCK_DRIFT_SECONDS`] apart, 0 otherwise
pub fn time_synced(local: i64, remote: i64) -> f64 {
    if local.abs_diff(remote) < MAX_CLOCK_DRIFT_SECONDS {
        1.0
    } else {
        0.0
    }
}

/// Decodes an XML reply after converting it to UTF-8 from its declared charset.
///
/// The document's root element must be [`XmlDocument::ROOT`]. `collector` names the caller
/// in the error, which also carries the raw reply so a `-ERR ... Command not found` body
/// stays visible to the caller.
pub fn decode_xml<T>(collector: &str, body: &[u8]) -> Result<T>
where
    T: XmlDocument,
{
    let xml_error = |reason: String| ExporterError::Xml {
        collector: collector.to_string(),
        reason,
        response: String::from_utf8_lossy(body).into_owned(),
    };

    let text = normalize_charset(body).map_err(xml_error)?;

    let root = root_element(&text).map_err(xml_error)?;
    if root != T::ROOT {
        return Err(xml_error(format!(
            "unexpected root element <{}>, expected <{}>",
            root,
            T::ROOT
        )));
    }

    quick_xml::de::from_str(&text).map_err(|e| xml_error(e.to_string()))
}

/// Name of the first element of a document
fn root_element(text: &str) -> std::result::Result<String, String> {
    let mut reader = quick_xml::Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) => return Err("missing root element".to_string()),
            Ok(_) => continue,
            Err(e) => return Err(e.to_string()),
        }
    }
}

fn normalize_charset(body: &[u8]) -> std::result::Result<String, String> {
    // The declaration itself is ASCII in every charset we can meet here
    let head = String::from_utf8_lossy(&body[..body.len().min(256)]);
    let label = XML_ENCODING_REGEX
        .captures(&head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let encoding = match label {
        Some(label) => encoding_rs::Encoding::for_label(label.as_bytes())
            .ok_or_else(|| format!("unsupported charset: {}", label))?,
        None => encoding_rs::UTF_8,
    };

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(format!("invalid {} data", encoding.name()));
    }
    Ok(text.into_owned())
}

/// Extracts every status-line metric from an `api status` reply.
///
/// The pattern has to match exactly once; no match, several matches, or a field outside
/// the match are all parse failures.
pub fn parse_status(body: &[u8]) -> Result<Vec<(&'static MetricDefinition, f64)>> {
    let text = String::from_utf8_lossy(body);
    let mut matches = STATUS_REGEX.captures_iter(&text);

    let captures = match (matches.next(), matches.next()) {
        (Some(captures), None) => captures,
        _ => return Err(ExporterError::Extraction("status".to_string())),
    };

    let mut values = Vec::new();
    for definition in METRIC_DEFINITIONS
        .iter()
        .filter(|d| d.source == MetricSource::StatusLine)
    {
        let index = status_field_index(definition.name)?;
        let raw = captures
            .get(index)
            .ok_or_else(|| ExporterError::Extraction("status".to_string()))?
            .as_str();
        let value = raw
            .parse::<f64>()
            .map_err(|e| ExporterError::Extraction(format!("status: {}", e)))?;
        values.push((definition, value));
    }

    Ok(values)
}

/// One line of the allocator statistics
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStat {
    pub field: String,
    pub help: String,
    pub value: f64,
}

/// Parses `api memory` up to its `+OK` trailer. Lines that do not look like a
/// statistic are skipped.
pub fn parse_memory(body: &[u8]) -> Result<Vec<MemoryStat>> {
    let text = String::from_utf8_lossy(body);
    let mut stats = Vec::new();

    for line in text.lines() {
        if line == "+OK" {
            break;
        }

        let Some(captures) = MEMORY_LINE_REGEX.captures(line) else {
            tracing::debug!(line, "cannot find stringsubmatch in parsed memory line");
            continue;
        };

        let value = captures[3]
            .parse::<f64>()
            .map_err(|e| ExporterError::Extraction(format!("memory: {}", e)))?;

        stats.push(MemoryStat {
            help: captures[1].to_string(),
            field: captures[2].to_string(),
            value,
        });
    }

    Ok(stats)
}

/// `module_exists` answers with the literal text `true` for loaded modules
pub fn module_loaded(body: &[u8]) -> f64 {
    if body.trim_ascii() == b"true" {
        1.0
    } else {
        0.0
    }
}
