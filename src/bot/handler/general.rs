use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::bot::{
    config::BotConfig,
    dispatcher::{Command, HandlerResult, UserDialogue},
    processor::run_admin_step,
    storage::Store,
    workflow::{AdminInput, State},
};

use super::{
    constants::{
        COMMAND_HELP, COMMAND_LEADER_BOARD, COMMAND_TOTAL_POINT, GREETING_MESSAGE,
        UNKNOWN_ERROR_MESSAGE,
    },
    utils::{is_command, send_bot_message, send_reply},
};

/* Invalid state.
 * This action is invoked for any message no other branch wants:
 * private chatter, admin text while idle, service messages.
 * Simply does not respond to anything. Reduces spam.
 */
pub async fn invalid_state(_bot: Bot, msg: Message) -> HandlerResult {
    log::debug!("Ignored message {} in chat {}", msg.id.0, msg.chat.id);
    Ok(())
}

/* Filter for admin workflow input.
 * Only the admin's own, non-command messages may answer a pending workflow step.
 */
pub fn is_admin_input(msg: Message, config: Arc<BotConfig>) -> bool {
    let from_admin = msg.from().map_or(false, |user| config.is_admin(user.id));
    from_admin && !is_command(&msg)
}

/* Start command.
 * The admin gets the admin panel and any pending workflow step is dropped.
 * Everyone else gets a greeting.
 */
pub async fn action_start(
    bot: Bot,
    dialogue: UserDialogue,
    state: State,
    msg: Message,
    store: Arc<Store>,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let sender = match msg.from() {
        Some(user) => user.id,
        None => return Ok(()),
    };

    if !config.is_admin(sender) {
        send_bot_message(
            &bot,
            &msg,
            format!(
                "{GREETING_MESSAGE}\n\nTry {COMMAND_TOTAL_POINT} or {COMMAND_LEADER_BOARD}, \
                 or see {COMMAND_HELP} for everything I can do!"
            ),
        )
        .await?;
        return Ok(());
    }

    match run_admin_step(&store, config.admin_id, sender, state, AdminInput::Start).await {
        Ok(step) => {
            dialogue.update(step.state).await?;
            if let Some(reply) = step.reply {
                send_reply(&bot, msg.chat.id, reply).await?;
            }
            log::info!("Admin Panel - Opened by admin in chat {}", msg.chat.id);
        }
        Err(err) => {
            log::error!(
                "Admin Panel - Failed to open panel in chat {}: {}",
                msg.chat.id,
                err
            );
            send_bot_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE.to_string()).await?;
        }
    }

    Ok(())
}

/* Help command.
 * Displays a list of commands available to the user.
 */
pub async fn action_help(bot: Bot, msg: Message) -> HandlerResult {
    send_bot_message(&bot, &msg, Command::descriptions().to_string()).await?;
    Ok(())
}
