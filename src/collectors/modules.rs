//! Module Load Collector
//!
//! Reads the configured module list from `modules.conf` and asks the switch whether each
//! one is actually loaded. This is the only collector that issues a variable number of
//! commands: one for the configuration plus one per module.
//!
//! # Metrics Produced
//! - `freeswitch_load_module` - Module load status (1=loaded, 0=not loaded)
//!   - Labels: module

use crate::error::Result;
use crate::freeswitch::types::ModulesConfiguration;
use crate::freeswitch::Connection;
use crate::metrics::{namespaced, Sample, SampleSink};
use crate::parsers;
use tracing::debug;

pub const MODULES_CONFIG_COMMAND: &str =
    "api xml_locate configuration configuration name modules.conf";

pub fn module_exists_command(module: &str) -> String {
    format!("api module_exists {}", module)
}

pub async fn collect_load_module_metrics(
    conn: &mut Connection,
    sink: &mut dyn SampleSink,
) -> Result<()> {
    let body = conn.exchange(MODULES_CONFIG_COMMAND).await?;
    let config: ModulesConfiguration = parsers::decode_xml("loadmodule", &body)?;

    for load in &config.modules.load {
        let reply = conn.exchange(&module_exists_command(&load.module)).await?;
        let loaded = parsers::module_loaded(&reply);
        debug!(module = %load.module, loaded, "Module load status");

        sink.emit(
            Sample::gauge(namespaced("load_module"), "freeswitch load module status", loaded)
                .with_label("module", load.module.as_str()),
        );
    }

    Ok(())
}
