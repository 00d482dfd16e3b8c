use clap::Parser;
use gateway::GatewayClient;
use processor::api::{self, AppState};
use processor::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not load config: {e}");
            std::process::exit(1);
        }
    };

    let gateway = match GatewayClient::new(&config.gateway) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("could not build gateway client: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(
        gateway,
        config.space_id,
        config.category,
        config.processor_secret,
    );

    if let Err(e) = api::serve(config.listener, state).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
