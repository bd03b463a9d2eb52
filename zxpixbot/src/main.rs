use dotenv::dotenv;
use processor_pix::{PixConfig, PixService};
use std::sync::Arc;
use teloxide::prelude::*;

use crate::commands::BotCommand;
use crate::recent::RecentImages;

mod bot;
mod commands;
mod recent;
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PixConfig::from_env()?;
    log::info!(
        "Pix api: {}, cache dir: {}",
        config.api,
        config.cache_dir.display()
    );
    let service = Arc::new(PixService::new(config)?);
    let recent = Arc::new(RecentImages::default());

    let bot = Bot::from_env();

    log::info!("Bot started. Listening for commands...");

    let handler = Update::filter_message()
        .filter_command::<BotCommand>()
        .endpoint(commands::bot_command_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service, recent])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
