//! Probe Target
//!
//! A [`Target`] is everything a probe needs to know about one FreeSWITCH instance:
//! where its event socket lives, the password, the deadline budget and which collectors
//! are switched off. It is immutable once built.

use crate::collectors;
use crate::config::FreeSwitchConfig;
use crate::error::{ExporterError, Result};
use secrecy::SecretString;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Transport used to reach the event socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// `tcp://host:port`
    Tcp(String),
    /// `unix:///path/to/socket`
    Unix(PathBuf),
}

impl Address {
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| ExporterError::Config(format!("cannot parse URI: {}", uri)))?;

        match scheme {
            "tcp" => {
                let host = rest.trim_end_matches('/');
                if host.is_empty() || !host.contains(':') {
                    return Err(ExporterError::Config(format!(
                        "cannot parse URI: {} (expected tcp://host:port)",
                        uri
                    )));
                }
                Ok(Self::Tcp(host.to_string()))
            }
            "unix" => {
                if rest.is_empty() {
                    return Err(ExporterError::Config(format!(
                        "cannot parse URI: {} (expected unix:///path)",
                        uri
                    )));
                }
                Ok(Self::Unix(PathBuf::from(rest)))
            }
            other => Err(ExporterError::Config(format!(
                "unsupported URI scheme '{}' in {}",
                other, uri
            ))),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(host) => write!(f, "tcp://{}", host),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    address: Address,
    password: SecretString,
    timeout: Duration,
    disabled: HashSet<String>,
}

impl Target {
    pub fn new(
        address: Address,
        password: SecretString,
        timeout: Duration,
        disabled: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            address,
            password,
            timeout,
            disabled: disabled.into_iter().collect(),
        }
    }

    pub fn from_config(config: &FreeSwitchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Address::parse(&config.uri)?,
            config.password.clone(),
            Duration::from_secs(config.timeout_seconds),
            config.disabled_collectors.iter().cloned(),
        ))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Known collector names minus the disabled ones
    pub fn enabled_collectors(&self) -> HashSet<&'static str> {
        collectors::collector_names()
            .into_iter()
            .filter(|name| !self.disabled.contains(*name))
            .collect()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.address.fmt(f)
    }
}
