use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use apitester::adapters::{serve, TracingTracker};
use apitester::app::build_adapter;
use apitester::config::AppConfig;
use apitester::ports::TrackingPort;

#[derive(Parser, Debug)]
#[clap(version = apitester::BUILD_VERSION, about = "Forward HTTP requests and keep a browsable history")]
pub struct Opts {
    /// Configuration file (TOML); defaults to the per-user config location
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// listen on this network address, overriding the configuration
    #[clap(long, short = 'b')]
    bind: Option<String>,

    /// Log filter directive, e.g. "info" or "apitester=debug"
    #[clap(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    let filter = match &opts.log {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = AppConfig::load(opts.config.as_deref())?;
    if let Some(bind) = opts.bind {
        config.server.bind = bind;
    }

    match rlimit::increase_nofile_limit(u64::MAX) {
        Ok(limit) => log::debug!("Open file limit raised to {}", limit),
        Err(e) => warn!("Could not raise open file limit: {}", e),
    }

    let tracker: Arc<dyn TrackingPort> = Arc::new(TracingTracker::new());
    let adapter = Arc::new(build_adapter(&config, tracker)?);

    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(
        version = apitester::BUILD_VERSION,
        addr = %listener.local_addr()?,
        history = config.history.enabled,
        "Server started"
    );

    tokio::select! {
        _ = serve(listener, adapter) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Shutting down");
        }
    }

    Ok(())
}
