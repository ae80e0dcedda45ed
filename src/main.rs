use std::sync::Arc;

use slogan_score::bot::{run_dispatcher, BotConfig, Store};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting slogan score bot...");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Configuration error: {}", err);
            std::process::exit(1);
        }
    };

    let store = Store::open(&config.data_file);
    log::info!("Using data file {}", store.path().display());

    let bot = teloxide::Bot::new(config.token.clone());

    log::info!("Slogan score bot started successfully!");

    run_dispatcher(bot, Arc::new(store), Arc::new(config)).await;
}
