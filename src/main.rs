mod config;
mod database;
mod discord_bot;
mod error;
mod file_logger;
mod markov;
mod normalize;
mod service;

use std::sync::Arc;

use dotenv::dotenv;
use serenity::all::{Client, GatewayIntents};
use tracing::error;

use crate::config::Config;
use crate::database::Database;
use crate::discord_bot::BotHandler;
use crate::file_logger::FileLogger;
use crate::service::SimulatorService;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("invalid configuration");

    let database = Arc::new(Database::open(&config.database_path).expect("failed to open database"));
    let logger =
        Arc::new(FileLogger::new(&config.log_dir).expect("failed to create log directory"));
    let service = Arc::new(SimulatorService::new(database, logger));

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(BotHandler::new(service, config.command_prefix))
        .await
        .expect("failed to build Discord client");

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
        shard_manager.shutdown_all().await;
    });

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
