use std::{convert::Infallible, sync::Arc};

use axum::routing::get;
use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage, InMemStorageError},
        UpdateHandler,
    },
    prelude::*,
    update_listeners::{webhooks, UpdateListener},
    utils::command::BotCommands,
    RequestError,
};

use super::{
    config::{BotConfig, WebhookConfig},
    handler::{
        action_admin_text, action_check_message, action_help, action_leader_board,
        action_menu_button, action_start, action_total_point, invalid_state, is_admin_input,
        is_group_text,
    },
    processor::ProcessError,
    storage::Store,
    workflow::State,
};

/* Dispatcher wires Telegram updates to the handlers.
 * Commands are always available. Text from the admin feeds the slogan workflow
 * while a step is pending. Other text in groups is checked for slogans.
 * Admin panel buttons arrive as callback queries.
 */

/* Types */
pub type UserDialogue = Dialogue<State, InMemStorage<State>>;
pub type HandlerResult = Result<(), BotError>;

const HEALTH_PATH: &str = "/";

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("User error: {0}")]
    UserError(String),
    #[error("Process error: {0}")]
    ProcessError(ProcessError),
    #[error("Request error: {0}")]
    RequestError(RequestError),
}

impl From<RequestError> for BotError {
    fn from(request_error: RequestError) -> BotError {
        BotError::RequestError(request_error)
    }
}

impl From<InMemStorageError> for BotError {
    fn from(storage_error: InMemStorageError) -> BotError {
        BotError::UserError(storage_error.to_string())
    }
}

impl From<ProcessError> for BotError {
    fn from(process_error: ProcessError) -> BotError {
        BotError::ProcessError(process_error)
    }
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    #[command(description = "Start the bot. Opens the admin panel for the admin.")]
    Start,
    #[command(description = "Show this help message.")]
    Help,
    #[command(description = "Show your total points.")]
    TotalPoint,
    #[command(description = "Show the top scorers.")]
    LeaderBoard,
}

/* Update handling tree */
pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(action_start))
        .branch(case![Command::Help].endpoint(action_help))
        .branch(case![Command::TotalPoint].endpoint(action_total_point))
        .branch(case![Command::LeaderBoard].endpoint(action_leader_board));

    let admin_input_handler = dptree::filter(is_admin_input)
        .branch(case![State::AddSloganText].endpoint(action_admin_text))
        .branch(case![State::AddSloganScore { slogan }].endpoint(action_admin_text))
        .branch(case![State::RemoveSlogan].endpoint(action_admin_text));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(admin_input_handler)
        .branch(dptree::filter(is_group_text).endpoint(action_check_message))
        .branch(dptree::endpoint(invalid_state));

    let callback_query_handler = Update::filter_callback_query().endpoint(action_menu_button);

    dialogue::enter::<Update, InMemStorage<State>, State, _>()
        .branch(message_handler)
        .branch(callback_query_handler)
}

/* Registers the webhook and serves it with axum, alongside a health check route.
 */
async fn webhook_listener(
    bot: Bot,
    webhook: &WebhookConfig,
) -> Result<impl UpdateListener<Err = Infallible>, RequestError> {
    let options = webhooks::Options::new(webhook.address, webhook.url.clone());
    let (mut listener, stop_flag, router) = webhooks::axum_to_router(bot, options).await?;
    let stop_token = listener.stop_token();

    let app = router.route(HEALTH_PATH, get(|| async { "OK" }));
    let address = webhook.address;

    tokio::spawn(async move {
        let served = axum::Server::bind(&address)
            .serve(app.into_make_service())
            .with_graceful_shutdown(stop_flag)
            .await;

        if let Err(err) = served {
            log::error!("Webhook - Server on {} stopped: {}", address, err);
            stop_token.stop();
        }
    });

    Ok(listener)
}

/* Main Dispatch function */
pub async fn run_dispatcher(bot: Bot, store: Arc<Store>, config: Arc<BotConfig>) {
    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![
            InMemStorage::<State>::new(),
            store,
            config.clone()
        ])
        .enable_ctrlc_handler()
        .build();

    match &config.webhook {
        Some(webhook) => {
            let listener = match webhook_listener(bot, webhook).await {
                Ok(listener) => listener,
                Err(err) => {
                    log::error!("Webhook - Failed to set up webhook: {}", err);
                    return;
                }
            };

            log::info!(
                "Webhook - Listening on {} for updates at {}",
                webhook.address,
                webhook.url.path()
            );
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Webhook - Update listener error"),
                )
                .await;
        }
        None => {
            log::info!("Polling - No webhook configured, polling for updates");
            dispatcher.dispatch().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        assert!(matches!(
            Command::parse("/total_point", "slogan_bot"),
            Ok(Command::TotalPoint)
        ));
        assert!(matches!(
            Command::parse("/leader_board@slogan_bot", "slogan_bot"),
            Ok(Command::LeaderBoard)
        ));
        assert!(matches!(Command::parse("/start", ""), Ok(Command::Start)));
        assert!(Command::parse("/add_slogan", "slogan_bot").is_err());
    }

    #[test]
    fn test_descriptions_list_commands() {
        let descriptions = Command::descriptions().to_string();
        for name in ["/start", "/help", "/total_point", "/leader_board"] {
            assert!(descriptions.contains(name), "missing {name}");
        }
    }
}
