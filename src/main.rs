use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roastery::api_client::HttpBlendApi;
use roastery::cli::{Cli, Session};
use roastery::config::{AppConfig, LogFormat};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    let cli = Cli::parse();
    info!(api = %config.api.base_url, "Starting roastery client");

    let api = HttpBlendApi::new(&config.api).context("Failed to build API client")?;
    let session = Session::new(&api, &config);

    let mut stdout = std::io::stdout();
    session.run(cli.command, &mut stdout).await
}
