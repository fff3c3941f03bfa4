use std::sync::Arc;

use chat_warden::config::Config;
use chat_warden::pipeline::ModerationPipeline;
use chat_warden::store::{LibSqlStore, ModerationStore};
use chat_warden::telegram::{TelegramApi, UpdatePoller};
use chat_warden::transport::Transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  required: WARDEN_BOT_TOKEN, WARDEN_OWNER_ID");
        eprintln!("  optional: WARDEN_DB_PATH, WARDEN_POLL_TIMEOUT");
        std::process::exit(1);
    });

    eprintln!("🛡  chat-warden v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Owner: {}", config.owner_id);
    eprintln!("   Database: {}", config.db_path.display());

    let store: Arc<dyn ModerationStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: failed to open database at {}: {e}",
                    config.db_path.display()
                );
                std::process::exit(1);
            }),
    );

    let api = Arc::new(TelegramApi::new(config.bot_token.clone()));
    let me = api.get_me().await.map_err(|e| {
        anyhow::anyhow!("could not reach the Bot API (check WARDEN_BOT_TOKEN): {e}")
    })?;
    tracing::info!(bot = %me.first_name, id = me.id, "Connected");

    let transport: Arc<dyn Transport> = api.clone();
    let pipeline = Arc::new(ModerationPipeline::new(
        transport,
        store,
        config.owner_id,
    ));

    let poller = UpdatePoller::new(api, pipeline, me.id, config.poll_timeout_secs);
    poller.run().await;
    Ok(())
}
