//! Configuration validation tests
//!
//! Tests for config loading, validation and target construction.

use std::time::Duration;

use freeswitch_exporter::config::{Config, FreeSwitchConfig, ServerConfig};
use freeswitch_exporter::error::ExporterError;
use freeswitch_exporter::target::{Address, Target};
use secrecy::ExposeSecret;

#[test]
fn test_default_config_file_loads() {
    // This assumes config/Default.toml exists relative to where cargo test is run
    let config = Config::load("config/Default.toml").expect("Failed to load default config");

    assert_eq!(config.freeswitch.uri, "tcp://localhost:8021");
    assert_eq!(config.freeswitch.timeout_seconds, 5);
    assert_eq!(config.server.port, 9282);
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    // Given: A path with no configuration file behind it
    // When
    let config = Config::load("config/no-such-file").expect("Defaults should load");

    // Then: The stock event socket settings are used
    assert_eq!(config.freeswitch.uri, "tcp://localhost:8021");
    assert_eq!(config.freeswitch.password.expose_secret(), "ClueCon");
    assert_eq!(config.freeswitch.timeout_seconds, 5);
    assert_eq!(config.server.port, 9282);
}

#[test]
fn test_defaults_match_stock_freeswitch() {
    // Given: No explicit settings
    let config = FreeSwitchConfig::default();
    let server = ServerConfig::default();

    // Then: The stock event socket address and password are used
    assert_eq!(config.uri, "tcp://localhost:8021");
    assert_eq!(config.password.expose_secret(), "ClueCon");
    assert_eq!(config.timeout_seconds, 5);
    assert!(config.disabled_collectors.is_empty());
    assert_eq!(server.addr, "0.0.0.0");
    assert_eq!(server.port, 9282);
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_timeout_is_rejected() {
    let config = FreeSwitchConfig {
        timeout_seconds: 0,
        ..FreeSwitchConfig::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ExporterError::Config(_)));
    assert!(err.to_string().contains("timeout_seconds"));
}

#[test]
fn test_unknown_collector_is_rejected() {
    // Given: A typo in the disabled collector list
    let config = FreeSwitchConfig {
        disabled_collectors: vec!["sofia".to_string()],
        ..FreeSwitchConfig::default()
    };

    // When
    let err = config.validate().unwrap_err();

    // Then: The valid names are listed
    let message = err.to_string();
    assert!(message.contains("unknown collector 'sofia'"));
    assert!(message.contains("sofiastatus"));
}

#[test]
fn test_known_collectors_can_be_disabled() {
    let config = FreeSwitchConfig {
        disabled_collectors: vec!["verto".to_string(), "loadmodule".to_string()],
        ..FreeSwitchConfig::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_uri_schemes() {
    assert_eq!(
        Address::parse("tcp://10.0.0.5:8021").unwrap(),
        Address::Tcp("10.0.0.5:8021".to_string())
    );
    assert_eq!(
        Address::parse("unix:///var/run/freeswitch/esl.sock").unwrap(),
        Address::Unix("/var/run/freeswitch/esl.sock".into())
    );
    assert!(Address::parse("http://localhost:8021").is_err());
    assert!(Address::parse("localhost:8021").is_err());
    assert!(Address::parse("tcp://localhost").is_err());
    assert!(Address::parse("unix://").is_err());
}

#[test]
fn test_address_display_round_trips_scheme() {
    let tcp = Address::parse("tcp://localhost:8021").unwrap();
    let unix = Address::parse("unix:///tmp/esl.sock").unwrap();

    assert_eq!(tcp.to_string(), "tcp://localhost:8021");
    assert_eq!(unix.to_string(), "unix:///tmp/esl.sock");
}

#[test]
fn test_target_from_config() {
    // Given
    let config = FreeSwitchConfig {
        uri: "tcp://pbx.example.com:8021".to_string(),
        timeout_seconds: 10,
        disabled_collectors: vec!["memory".to_string()],
        ..FreeSwitchConfig::default()
    };

    // When
    let target = Target::from_config(&config).unwrap();

    // Then
    assert_eq!(target.timeout(), Duration::from_secs(10));
    assert_eq!(target.to_string(), "tcp://pbx.example.com:8021");
    let enabled = target.enabled_collectors();
    assert!(!enabled.contains("memory"));
    assert!(enabled.contains("status"));
    assert_eq!(enabled.len(), 8);
}

#[test]
fn test_target_from_invalid_config_fails() {
    let config = FreeSwitchConfig {
        uri: "ftp://pbx:21".to_string(),
        ..FreeSwitchConfig::default()
    };

    assert!(matches!(
        Target::from_config(&config),
        Err(ExporterError::Config(_))
    ));
}
