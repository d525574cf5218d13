//! FreeSWITCH Prometheus Exporter
//!
//! A Prometheus metrics exporter for FreeSWITCH that talks to the switch over its event
//! socket (`mod_event_socket`).
//!
//! # Overview
//!
//! Every scrape of `/metrics` opens a fresh event socket connection, authenticates, runs a
//! fixed battery of `api` commands and turns their JSON, XML and plain-text replies into
//! Prometheus samples. Nothing is cached between scrapes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    Event Socket      ┌──────────────┐
//! │ FreeSWITCH  │ ◄─────────────────►  │   Exporter   │
//! │             │  tcp:// or unix://   │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │ Prober │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Parsers │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`freeswitch`] - Event socket connection, framing and reply types
//! - [`parsers`] - Reply body parsers (JSON, XML, status line, plain numbers)
//! - [`collectors`] - Ordered collector registry
//! - [`metrics`] - Samples, metric definitions and Prometheus rendering
//! - [`probe`] - One probe from connect to outcome
//! - [`target`] - Where and how to reach the switch
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use freeswitch_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod freeswitch;
pub mod metrics;
pub mod parsers;
pub mod probe;
pub mod server;
pub mod target;
