use teloxide::{
    payloads::{EditMessageTextSetters, SendMessage, SendMessageSetters},
    prelude::*,
    requests::JsonRequest,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    ApiError, RequestError,
};

use crate::bot::workflow::{Menu, Reply};

/* Common utilites for handlers. */

// Make a keyboard, button menu. One (label, callback data) button per row.
pub fn make_keyboard(options: Vec<(&str, &str)>) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = options
        .into_iter()
        .map(|(label, data)| vec![InlineKeyboardButton::callback(label, data)])
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

// Keyboard for one of the admin menus.
pub fn menu_keyboard(menu: Menu) -> InlineKeyboardMarkup {
    let options = menu
        .buttons()
        .into_iter()
        .map(|button| (button.label(), button.callback_data()))
        .collect();
    make_keyboard(options)
}

// Sends a message to the chat, as a reply to the triggering message.
pub fn send_bot_message(
    bot: &Bot,
    msg: &Message,
    text: String,
) -> JsonRequest<SendMessage> {
    bot.send_message(msg.chat.id, text)
        .reply_to_message_id(msg.id)
        .allow_sending_without_reply(true)
}

// Sends a workflow reply as a new message, with its keyboard if any.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<(), RequestError> {
    let request = bot.send_message(chat_id, reply.text);
    match reply.menu {
        Some(menu) => request.reply_markup(menu_keyboard(menu)).await?,
        None => request.await?,
    };
    Ok(())
}

/* Replaces the text and keyboard of an existing bot message.
 * Telegram rejects edits that change nothing (pressing the same button twice);
 * that case is not an error for us.
 */
pub async fn edit_reply(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    reply: Reply,
) -> Result<(), RequestError> {
    let request = bot.edit_message_text(chat_id, message_id, reply.text);
    let result = match reply.menu {
        Some(menu) => request.reply_markup(menu_keyboard(menu)).await,
        None => request.await,
    };

    match result {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(err) => Err(err),
    }
}

// Picks the name to show for a user: first name, falling back to the ID.
pub fn display_name(first_name: Option<&str>, user_id: &str) -> String {
    match first_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("User {user_id}"),
    }
}

// Whether a message is a bot command, which is never workflow input or a slogan.
pub fn is_command(msg: &Message) -> bool {
    msg.text().map_or(false, |text| text.starts_with('/'))
}
