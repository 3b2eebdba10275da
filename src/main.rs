//! talerbot - Twitch chat bot for custom commands and Taler counters.

use std::sync::Arc;
use talerbot::chat::twitch;
use talerbot::config::Config;
use talerbot::db::Database;
use talerbot::dispatch::{Dispatcher, DispatcherParams, Shutdown};
use talerbot::followage::HttpFollowAge;
use talerbot::telemetry;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional config file path; environment variables override it.
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    telemetry::init(&config.log_level);

    info!(
        username = %config.bot.username,
        channel = %config.bot.channel,
        "Starting talerbot"
    );

    let db = Database::new(&config.database.path).await.map_err(|e| {
        error!(path = %config.database.path, error = %e, "Failed to open database");
        e
    })?;

    let followage = Arc::new(HttpFollowAge::new(
        &config.followage.base_url,
        config.followage.precision,
        config.followage.timeout(),
    ));

    let (chat, events) = twitch::connect(
        &config.bot.username,
        &config.bot.token,
        &config.bot.channel,
        config.dispatch.queue_size,
    )?;

    let dispatcher = Dispatcher::new(DispatcherParams {
        db: db.clone(),
        chat: Arc::new(chat),
        followage,
        channel: config.bot.channel.clone(),
        on_failure: config.dispatch.on_failure,
        cooldown: config.dispatch.cooldown(),
        aliases: config.aliases.clone(),
    });

    let outcome = dispatcher.run(events).await;
    db.close().await;

    match outcome {
        Ok(Shutdown::Quit) => {
            info!("Quit requested by broadcaster");
            Ok(())
        }
        Ok(Shutdown::StreamClosed) => Err(anyhow::anyhow!("chat connection closed")),
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Fatal error, shutting down");
            Err(e.into())
        }
    }
}
