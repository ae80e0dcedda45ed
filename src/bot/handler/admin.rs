use std::sync::Arc;

use teloxide::{payloads::AnswerCallbackQuerySetters, prelude::*, types::ChatId};

use crate::bot::{
    config::BotConfig,
    dispatcher::{HandlerResult, UserDialogue},
    processor::{run_admin_step, ProcessError},
    storage::Store,
    workflow::{AdminInput, MenuButton, State, Step},
};

use super::{
    constants::{NO_ACCESS_MESSAGE, UNKNOWN_ERROR_MESSAGE},
    utils::{edit_reply, send_bot_message, send_reply},
};

/* Utilities */

// Logs what a completed workflow step did to the slogan table.
fn log_step(chat_id: ChatId, input: &AdminInput, step: &Step) {
    if step.changed {
        log::info!(
            "Admin Workflow - Slogan table updated in chat {} by {:?}",
            chat_id,
            input
        );
    } else {
        log::debug!(
            "Admin Workflow - Chat {} moved to {:?} on {:?}",
            chat_id,
            step.state,
            input
        );
    }
}

/* Admin panel button.
 * Bot receives a callback query from the panel keyboard, and edits the panel message
 * to show the next prompt or result. Non-admins are told they have no access
 * and nothing else happens.
 */
pub async fn action_menu_button(
    bot: Bot,
    dialogue: UserDialogue,
    state: State,
    query: CallbackQuery,
    store: Arc<Store>,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let button = match query.data.as_deref().map(str::parse::<MenuButton>) {
        Some(Ok(button)) => button,
        Some(Err(err)) => {
            log::error!(
                "Admin Panel - Invalid button from user {}: {}",
                query.from.id.0,
                err
            );
            bot.answer_callback_query(query.id).await?;
            return Ok(());
        }
        None => {
            bot.answer_callback_query(query.id).await?;
            return Ok(());
        }
    };

    let input = AdminInput::Button(button);
    let sender = query.from.id;
    let step = run_admin_step(&store, config.admin_id, sender, state, input.clone()).await;

    match step {
        Ok(step) => {
            bot.answer_callback_query(query.id).await?;
            if let Some(msg) = query.message {
                log_step(msg.chat.id, &input, &step);
                dialogue.update(step.state).await?;
                if let Some(reply) = step.reply {
                    edit_reply(&bot, msg.chat.id, msg.id, reply).await?;
                }
            }
        }
        Err(ProcessError::Unauthorized(user_id)) => {
            log::warn!(
                "Admin Panel - User {} pressed {:?} without access",
                user_id.0,
                button
            );
            bot.answer_callback_query(query.id)
                .text(NO_ACCESS_MESSAGE)
                .show_alert(true)
                .await?;
        }
        Err(err) => {
            log::error!("Admin Panel - Failed to handle {:?}: {}", button, err);
            bot.answer_callback_query(query.id)
                .text(UNKNOWN_ERROR_MESSAGE)
                .await?;
        }
    }

    Ok(())
}

/* Admin workflow text.
 * Bot receives the admin's answer to the pending prompt (slogan text, score,
 * or slogan to remove), and replies with the next prompt or the result.
 * If saving fails, the admin stays on the same step and can send it again.
 */
pub async fn action_admin_text(
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

    let input = AdminInput::Text(msg.text().map(str::to_string));
    let step = run_admin_step(&store, config.admin_id, sender, state, input.clone()).await;

    match step {
        Ok(step) => {
            log_step(msg.chat.id, &input, &step);
            dialogue.update(step.state).await?;
            if let Some(reply) = step.reply {
                send_reply(&bot, msg.chat.id, reply).await?;
            }
        }
        Err(ProcessError::Unauthorized(user_id)) => {
            log::warn!(
                "Admin Workflow - User {} sent input without access",
                user_id.0
            );
            send_bot_message(&bot, &msg, NO_ACCESS_MESSAGE.to_string()).await?;
        }
        Err(err) => {
            log::error!(
                "Admin Workflow - Failed to apply {:?} in chat {}: {}",
                input,
                msg.chat.id,
                err
            );
            send_bot_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE.to_string()).await?;
        }
    }

    Ok(())
}
