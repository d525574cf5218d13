use thiserror::Error;

/// Marker FreeSWITCH puts in the body of an `api` reply when the command's module is absent.
pub const COMMAND_NOT_FOUND: &str = "Command not found";

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("cannot connect to {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("cannot write command: {0}")]
    Write(#[source] std::io::Error),

    #[error("cannot read command response: {0}")]
    HeaderParse(String),

    #[error("missing header 'Content-Length'")]
    MissingLengthHeader,

    #[error("short read: expected {expected} bytes, received {received}")]
    ShortRead { expected: usize, received: usize },

    #[error("cannot read JSON response for {metric}: {source}")]
    Json {
        metric: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{collector} error: {reason}, response: {response}")]
    Xml {
        collector: String,
        reason: String,
        response: String,
    },

    #[error("error parsing {0}")]
    Extraction(String),

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Whether the switch answered that the issued command does not exist.
    ///
    /// The marker only ever reaches us embedded in the response text, so the check is
    /// made against the rendered message.
    pub fn is_command_not_found(&self) -> bool {
        self.to_string().contains(COMMAND_NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
