//! FreeSWITCH Response Type Definitions
//!
//! Serde shapes for the structured `api` replies the collectors consume.
//!
//! # Commands Covered
//!
//! - `show ... as json` → [`RowCount`]
//! - `sofia xmlstatus gateway` → [`Gateways`], [`Gateway`]
//! - `show endpoint as xml`, `show codec as xml` → [`Listing`], [`ListingRow`]
//! - `show registrations as xml` → [`Registrations`], [`Registration`]
//! - `verto xmlstatus` → [`VertoProfiles`], [`VertoProfile`]
//! - `xml_locate configuration configuration name modules.conf` → [`ModulesConfiguration`]
//!
//! # Design Notes
//!
//! - **Lenient numbers**: an empty numeric element decodes as zero rather than failing
//!   the whole document, which is what the switch emits for gateways that were never pinged.
//! - **Missing elements**: every field carries `#[serde(default)]`; absent elements become
//!   empty strings or zero.
//! - **Root element**: each XML document type names its root through [`XmlDocument`];
//!   a reply with any other root is rejected before decoding.

#![allow(dead_code)] // Descriptive fields are kept even where no metric reads them
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// Parses element text as a number, treating empty text as the default value.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(serde::de::Error::custom)
}

/// An XML reply decoded as a whole, identified by its root element
pub trait XmlDocument: DeserializeOwned {
    const ROOT: &'static str;
}

/// `row_count` envelope of the `show ... as json` commands
#[derive(Debug, Deserialize)]
pub struct RowCount {
    #[serde(default)]
    pub row_count: f64,
}

/// Root of `sofia xmlstatus gateway`
#[derive(Debug, Deserialize, Default)]
pub struct Gateways {
    #[serde(rename = "gateway", default)]
    pub gateways: Vec<Gateway>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Gateway {
    pub name: String,
    pub profile: String,
    pub scheme: String,
    pub realm: String,
    pub username: String,
    pub from: String,
    pub contact: String,
    pub exten: String,
    pub to: String,
    pub proxy: String,
    pub context: String,
    #[serde(deserialize_with = "lenient_number")]
    pub expires: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub freq: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub ping: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub pingfreq: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub pingmin: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub pingcount: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub pingmax: i64,
    #[serde(deserialize_with = "lenient_number")]
    pub pingtime: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub pinging: i64,
    pub state: String,
    pub status: String,
    #[serde(rename = "uptime-usec")]
    pub uptime_usec: String,
    #[serde(rename = "calls-in", deserialize_with = "lenient_number")]
    pub calls_in: i64,
    #[serde(rename = "calls-out", deserialize_with = "lenient_number")]
    pub calls_out: i64,
    #[serde(rename = "failed-calls-in", deserialize_with = "lenient_number")]
    pub failed_calls_in: i64,
    #[serde(rename = "failed-calls-out", deserialize_with = "lenient_number")]
    pub failed_calls_out: i64,
}

/// `<result row_count="N"><row>..</row></result>` as produced by `show <x> as xml`
#[derive(Debug, Deserialize, Default)]
pub struct Listing {
    #[serde(rename = "row", default)]
    pub rows: Vec<ListingRow>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ListingRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub ikey: String,
}

/// `show registrations as xml`
#[derive(Debug, Deserialize, Default)]
pub struct Registrations {
    #[serde(rename = "row", default)]
    pub rows: Vec<Registration>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Registration {
    pub reg_user: String,
    pub realm: String,
    pub token: String,
    pub url: String,
    pub expires: String,
    pub network_ip: String,
    pub network_port: String,
    pub network_proto: String,
    pub hostname: String,
}

/// `verto xmlstatus`
#[derive(Debug, Deserialize, Default)]
pub struct VertoProfiles {
    #[serde(rename = "profile", default)]
    pub profiles: Vec<VertoProfile>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct VertoProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
    pub state: String,
}

/// `modules.conf` as returned by `xml_locate`
#[derive(Debug, Deserialize, Default)]
pub struct ModulesConfiguration {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(default)]
    pub modules: ModuleList,
}

#[derive(Debug, Deserialize, Default)]
pub struct ModuleList {
    #[serde(rename = "load", default)]
    pub load: Vec<ModuleLoad>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ModuleLoad {
    #[serde(rename = "@module")]
    pub module: String,
}

impl XmlDocument for Gateways {
    const ROOT: &'static str = "gateways";
}

impl XmlDocument for Listing {
    const ROOT: &'static str = "result";
}

impl XmlDocument for Registrations {
    const ROOT: &'static str = "result";
}

impl XmlDocument for VertoProfiles {
    const ROOT: &'static str = "profiles";
}

impl XmlDocument for ModulesConfiguration {
    const ROOT: &'static str = "configuration";
}
