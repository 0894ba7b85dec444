use tokio_util::sync::CancellationToken;

use sync_server::{init_logger_with_file, Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(None, config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        "Invoice sync bridge starting"
    );

    let state = ServerState::initialize(config)?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    let server = Server::new(state);
    if let Err(e) = server.run(shutdown).await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
