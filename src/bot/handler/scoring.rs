use std::sync::Arc;

use teloxide::prelude::*;

use crate::bot::{
    dispatcher::HandlerResult,
    processor::{award_points, Award},
    storage::Store,
};

use super::{
    constants::UNKNOWN_ERROR_MESSAGE,
    utils::{display_name, is_command, send_bot_message},
};

/* Utilities */

fn display_award(name: &str, award: &Award) -> String {
    format!(
        "🎉 Congrats {}!\nPoints earned: {}\nYour total: {}",
        name, award.score, award.total
    )
}

/* Filter for scorable messages: text in a group or supergroup that is not a command.
 * Private chats never score.
 */
pub fn is_group_text(msg: Message) -> bool {
    let is_group = msg.chat.is_group() || msg.chat.is_supergroup();
    is_group && msg.text().is_some() && msg.from().is_some() && !is_command(&msg)
}

/* Checks a group message for slogans.
 * On a match, the sender is credited and congratulated in a reply.
 * No match, no reply.
 */
pub async fn action_check_message(bot: Bot, msg: Message, store: Arc<Store>) -> HandlerResult {
    let (user, text) = match (msg.from(), msg.text()) {
        (Some(user), Some(text)) => (user, text),
        _ => return Ok(()),
    };

    match award_points(&store, user.id, text).await {
        Ok(Some(award)) => {
            log::info!(
                "Score - User {} in chat {} earned {} for \"{}\", total {}",
                user.id.0,
                msg.chat.id,
                award.score,
                award.slogan,
                award.total
            );
            let name = display_name(Some(&user.first_name), &user.id.0.to_string());
            send_bot_message(&bot, &msg, display_award(&name, &award)).await?;
        }
        Ok(None) => (),
        Err(err) => {
            log::error!(
                "Score - Failed to record points for user {} in chat {}: {}",
                user.id.0,
                msg.chat.id,
                err
            );
            send_bot_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE.to_string()).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::handler::utils::tests::{
        group_chat, private_chat, supergroup_chat, text_message,
    };

    #[test]
    fn test_group_text_is_scored() {
        assert!(is_group_text(text_message(group_chat(-5), 42, "go GoTeam go")));
        assert!(is_group_text(text_message(supergroup_chat(-1005), 42, "GoTeam")));
    }

    #[test]
    fn test_private_text_is_not_scored() {
        assert!(!is_group_text(text_message(private_chat(42), 42, "GoTeam")));
    }

    #[test]
    fn test_commands_are_not_scored() {
        assert!(!is_group_text(text_message(
            supergroup_chat(-1005),
            42,
            "/total_point"
        )));
        assert!(!is_group_text(text_message(group_chat(-5), 42, "/start GoTeam")));
    }

    #[test]
    fn test_display_award() {
        let award = Award {
            slogan: "GoTeam".to_string(),
            score: 5,
            total: 15,
        };
        assert_eq!(
            display_award("Sara", &award),
            "🎉 Congrats Sara!\nPoints earned: 5\nYour total: 15"
        );
    }
}
