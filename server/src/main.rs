use std::sync::Arc;

use anyhow::Context;
use roomcast_config::load as load_config;
use roomcast_gateway::{create_router, GatewayState};
use roomcast_relay::{FileHistorySink, NoopSink, PersistenceSink};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("starting Roomcast relay");

    let config = load_config().context("failed to load configuration")?;

    let sink: Arc<dyn PersistenceSink> = if config.history.enabled {
        info!(directory = %config.history.directory, "chat history sink enabled");
        Arc::new(FileHistorySink::spawn(config.history.directory.clone()))
    } else {
        info!("chat history disabled, dispatched envelopes will not be persisted");
        Arc::new(NoopSink)
    };

    let state = Arc::new(GatewayState::new(sink));
    let app = create_router(state, &config.gateway.ws_path);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, ws_path = %config.gateway.ws_path, "relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("relay shut down");
    Ok(())
}

fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = ?err, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
    }
}
