use std::{future::Future, sync::Arc, time::Duration};

use teloxide::{
    prelude::*,
    types::{ChatId, UserId},
};
use tokio::task::JoinSet;

use crate::bot::{
    dispatcher::HandlerResult,
    processor::{get_leaderboard, get_total_points, LEADERBOARD_SIZE},
    storage::{Store, UserScore},
};

use super::{
    constants::{LEADERBOARD_HEADER, NO_POINTS_MESSAGE},
    utils::{display_name, send_bot_message},
};

/* Utilities */

// A stalled member lookup must not hold up the whole leaderboard.
const NAME_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/* Looks up a user's first name as a member of the chat.
 * Best effort: any failure or timeout gives None.
 */
async fn lookup_first_name(bot: Bot, chat_id: ChatId, user_id: String) -> Option<String> {
    let user_id = UserId(user_id.parse::<u64>().ok()?);
    let lookup = bot.get_chat_member(chat_id, user_id).send();

    match tokio::time::timeout(NAME_LOOKUP_TIMEOUT, lookup).await {
        Ok(Ok(member)) => Some(member.user.first_name),
        Ok(Err(err)) => {
            log::warn!(
                "Leaderboard - Member lookup for user {} in chat {} failed: {}",
                user_id.0,
                chat_id,
                err
            );
            None
        }
        Err(_) => {
            log::warn!(
                "Leaderboard - Member lookup for user {} in chat {} timed out",
                user_id.0,
                chat_id
            );
            None
        }
    }
}

/* Runs one lookup per user ID at the same time, so the slowest lookup
 * bounds the wait. Names come back in the order of `user_ids`.
 */
async fn lookup_names<F, Fut>(user_ids: &[String], lookup: F) -> Vec<Option<String>>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, user_id) in user_ids.iter().enumerate() {
        let name = lookup(user_id.clone());
        tasks.spawn(async move { (index, name.await) });
    }

    let mut names = vec![None; user_ids.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, name)) => names[index] = name,
            Err(err) => log::warn!("Leaderboard - Member lookup task failed: {}", err),
        }
    }
    names
}

// One numbered line per entry, names already resolved.
fn display_leaderboard(entries: &[(String, i64)]) -> String {
    let lines: String = entries
        .iter()
        .enumerate()
        .map(|(index, (name, score))| format!("{}. {} — {} points\n", index + 1, name, score))
        .collect();
    format!("{LEADERBOARD_HEADER}{lines}")
}

/* Total points command.
 * Displays the sender's cumulative score.
 */
pub async fn action_total_point(bot: Bot, msg: Message, store: Arc<Store>) -> HandlerResult {
    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(()),
    };

    let total = get_total_points(&store, user.id).await;
    send_bot_message(&bot, &msg, format!("📊 Your total points: {total}")).await?;
    Ok(())
}

/* Leaderboard command.
 * Displays the top scorers, named by their first name in this chat where possible.
 */
pub async fn action_leader_board(bot: Bot, msg: Message, store: Arc<Store>) -> HandlerResult {
    let ranking: Vec<UserScore> = get_leaderboard(&store, LEADERBOARD_SIZE).await;

    if ranking.is_empty() {
        send_bot_message(&bot, &msg, NO_POINTS_MESSAGE.to_string()).await?;
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let user_ids: Vec<String> = ranking.iter().map(|entry| entry.user_id.clone()).collect();
    let names = lookup_names(&user_ids, |user_id| {
        lookup_first_name(bot.clone(), chat_id, user_id)
    })
    .await;

    let entries: Vec<(String, i64)> = ranking
        .into_iter()
        .zip(names)
        .map(|(UserScore { user_id, score }, first_name)| {
            (display_name(first_name.as_deref(), &user_id), score)
        })
        .collect();

    send_bot_message(&bot, &msg, display_leaderboard(&entries)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn test_lookup_names_run_together() {
        let user_ids: Vec<String> = (1..=10).map(|id| id.to_string()).collect();

        let started = Instant::now();
        let names = lookup_names(&user_ids, |user_id| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            match user_id.as_str() {
                "3" => None,
                _ => Some(format!("Name {user_id}")),
            }
        })
        .await;

        // One after another this would take two seconds
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(names.len(), 10);
        assert_eq!(names[0].as_deref(), Some("Name 1"));
        assert_eq!(names[2], None);
        assert_eq!(names[9].as_deref(), Some("Name 10"));
    }

    #[test]
    fn test_display_leaderboard() {
        let entries = vec![
            ("Sara".to_string(), 30),
            ("User 42".to_string(), 12),
        ];
        assert_eq!(
            display_leaderboard(&entries),
            format!("{LEADERBOARD_HEADER}1. Sara — 30 points\n2. User 42 — 12 points\n")
        );
    }
}
