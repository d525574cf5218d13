use anyhow::Result;
use clap::Parser;
use freeswitch_exporter::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// FreeSWITCH event socket URI, tcp://host:port or unix:///path (overrides config)
    #[arg(long, env = "FREESWITCH_URI")]
    uri: Option<String>,

    /// Event socket password (overrides config)
    #[arg(long, env = "FREESWITCH_PASSWORD")]
    password: Option<String>,

    /// Probe timeout in seconds (overrides config)
    #[arg(long, env = "FREESWITCH_TIMEOUT")]
    timeout: Option<u64>,

    /// Collector to disable, may be repeated (adds to config)
    #[arg(long = "disable-collector", value_name = "NAME")]
    disable_collector: Vec<String>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT", default_value = "9282")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR", default_value = "0.0.0.0")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting FreeSWITCH Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(uri) = args.uri {
        config.freeswitch.uri = uri;
    }
    if let Some(password) = args.password {
        config.freeswitch.password = secrecy::SecretString::new(password.into());
    }
    if let Some(timeout) = args.timeout {
        config.freeswitch.timeout_seconds = timeout;
    }
    config
        .freeswitch
        .disabled_collectors
        .extend(args.disable_collector);
    config.server.port = args.port;
    config.server.addr = args.addr;

    config.freeswitch.validate()?;

    info!("Configuration loaded successfully");
    info!("FreeSWITCH target: {}", config.freeswitch.uri);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
