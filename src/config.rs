use crate::collectors;
use crate::error::ExporterError;
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub freeswitch: FreeSwitchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FreeSwitchConfig {
    /// `tcp://host:port` or `unix:///path/to/socket`
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_password")]
    pub password: SecretString,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub disabled_collectors: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for FreeSwitchConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            password: default_password(),
            timeout_seconds: default_timeout(),
            disabled_collectors: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

fn default_uri() -> String {
    "tcp://localhost:8021".to_string()
}

fn default_password() -> SecretString {
    SecretString::from("ClueCon")
}

fn default_timeout() -> u64 {
    5
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9282
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FREESWITCH_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.freeswitch.validate()?;
        Ok(config)
    }
}

impl FreeSwitchConfig {
    /// Checks the values a probe depends on before any connection is attempted.
    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        if self.timeout_seconds == 0 {
            return Err(ExporterError::Config(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        let known = collectors::collector_names();
        for name in &self.disabled_collectors {
            if !known.contains(&name.as_str()) {
                return Err(ExporterError::Config(format!(
                    "unknown collector '{}', expected one of: {}",
                    name,
                    known.join(", ")
                )));
            }
        }

        crate::target::Address::parse(&self.uri)?;
        Ok(())
    }
}
