use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use critical_mass::gateway::{GatewayConfig, GraphQlClient};
use critical_mass::worker::{PollConfig, Reconciler};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "critical_mass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid store configuration");
            return ExitCode::FAILURE;
        }
    };
    let endpoint = config.redacted_endpoint();

    let client = match GraphQlClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build store client");
            return ExitCode::FAILURE;
        }
    };

    let poll = PollConfig::from_env();
    tracing::info!(%endpoint, "Starting critical-mass reconciler");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
        }
    });

    let cycles = Reconciler::new(client, poll).run(shutdown).await;
    tracing::info!(cycles, "Exiting");

    ExitCode::SUCCESS
}
