use anyhow::Result;
use clap::Parser;
use gradhire_client::{ClientConfig, ConnectivityGate, ResumeFlows, ServiceClient, Session};
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

mod cli;

use cli::{handle_command, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = ClientConfig::load()?;
    config.ensure_directories().await?;

    info!("Environment: {}", config.environment);
    info!("Backend: {}", config.base_url);
    info!("Data: {}", config.data_dir.display());

    let client = ServiceClient::from_config(&config)?;
    let flows = ResumeFlows::from_config(
        &config,
        client,
        Session::new(),
        ConnectivityGate::always_online(),
    );

    handle_command(cli, &config, &flows).await
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gradhire=info,gradhire_client=info"));

    let layer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}
