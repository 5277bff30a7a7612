use geezer_slots::shutdown::shutdown_signal;
use geezer_slots::{AppState, BackupTask, DiscordClient, Ledger, SlotsConfig, backup, interactions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="an unset or invalid RUST_LOG falls back to info"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = SlotsConfig::load()?;
    tracing::debug!(?config, "configuration");

    let ledger = Ledger::open(&config.ledger_path)?;

    let discord = DiscordClient::new(config.discord_token.clone());
    discord
        .register_guild_commands(config.application_id, config.guild_id)
        .await?;

    let store = backup::s3_store(&config.s3)?;
    let backups = BackupTask::new(ledger.clone(), store, config.backup_interval);
    tokio::spawn(backups.run());

    let app = interactions::router(AppState::new(ledger.clone(), config.public_key));
    let shutdown = shutdown_signal()?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening for interactions");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    ledger.flush().await?;
    tracing::info!("ledger flushed; shutting down");
    Ok(())
}
