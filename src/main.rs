//! bedrock-relay server binary.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use bedrock_relay::bedrock::client::BedrockStreamer;
use bedrock_relay::config::{Cli, Config};
use bedrock_relay::server::chat_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "bedrock_relay=debug,tower_http=debug"
    } else {
        "bedrock_relay=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("bedrock-relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;
    let config = Arc::new(config);

    info!(
        region = config.backend.region.as_deref().unwrap_or("(credential chain)"),
        stream_timeout_secs = config.server.stream_timeout_secs,
        "Configuration loaded"
    );

    // Build the shared Bedrock client from the AWS credential chain.
    let backend = BedrockStreamer::connect(&config.backend).await;

    // Build application state.
    let state = Arc::new(AppState {
        backend: Arc::new(backend),
        config: config.clone(),
        start_time: Instant::now(),
    });

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = config.listen_addr(cli.port);
    info!(addr = listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
