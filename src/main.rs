//! Wallboard BFF
//!
//! Forwards every request under the mount point (default `/bff`) to the
//! private backend API, injecting the server-held bearer credential, and
//! relays responses (including SSE streams) back unmodified.
//!
//! ```text
//!   browser ──▶ /bff/{*path} ──▶ forward ──▶ <BACKEND_URL>/{path}?token=…
//!           ◀── status/headers/live body ◀──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use wallboard_bff::config::{load_config, BffConfig};
use wallboard_bff::lifecycle::startup;
use wallboard_bff::observability::logging;

#[derive(Parser)]
#[command(name = "wallboard-bff")]
#[command(about = "Backend-for-Frontend proxy for the operations wallboard", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(short, long, env = "BFF_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BffConfig::from_env_defaults()?,
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?cli.config,
        environment = ?config.environment,
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        credential_configured = config.upstream.bearer_token.is_some(),
        "wallboard-bff starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
