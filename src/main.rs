//! asset-daemon binary: serves the REST API until SIGINT/SIGTERM.

use asset_daemon::{Config, Daemon, run_with_shutdown};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "asset-daemon")]
#[command(version)]
#[command(about = "Background job daemon for the asset add-on", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides api.bind_address's port)
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Asset server base URL (overrides server_url)
    #[arg(short = 's', long = "server")]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("asset_daemon=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    tracing::info!(
        server = %config.server_url,
        address = %config.api.bind_address,
        temp_dir = %config.cache.temp_dir.display(),
        "starting asset-daemon"
    );

    let daemon = Daemon::new(config)?;
    let api = daemon.spawn_api_server();

    tokio::select! {
        result = run_with_shutdown(daemon.clone()) => result?,
        joined = api => {
            // The server only returns on failure (e.g. port already in use)
            match joined {
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "API server failed");
                    daemon.shutdown().await?;
                    return Err(e.into());
                }
                Ok(Ok(())) => daemon.shutdown().await?,
                Err(e) => {
                    tracing::error!(error = %e, "API server task aborted");
                    daemon.shutdown().await?;
                }
            }
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> asset_daemon::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };

    if let Some(port) = args.port {
        config.api.bind_address.set_port(port);
    }
    if let Some(server) = &args.server {
        config.server_url = server.trim_end_matches('/').to_string();
    }

    config.validate()?;
    Ok(config)
}
