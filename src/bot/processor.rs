use teloxide::types::UserId;

use super::{
    matcher::find_slogan,
    storage::{CrudError, Store, UserScore},
    workflow::{transition, AdminInput, State, Step},
};

/* Processor is the overall logic center of the bot.
 * It handles the main logic, communicating with the front-facing handler
 * and the back-facing store.
 * Every read or change of the stored document goes through the Store's lock here,
 * so scoring events and admin edits are applied one at a time.
 */

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    CrudError(CrudError),
    #[error("User {0:?} is not allowed to manage slogans")]
    Unauthorized(UserId),
}

// Implement the From trait to convert from CrudError to ProcessError
impl From<CrudError> for ProcessError {
    fn from(crud_error: CrudError) -> ProcessError {
        ProcessError::CrudError(crud_error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub slogan: String,
    pub score: i64,
    pub total: i64,
}

/* Scores a group chat message.
 * Execution flow: find the first slogan contained in the text,
 * credit its score to the sender, persist.
 * Returns None, and touches nothing, when no slogan matches.
 */
pub async fn award_points(
    store: &Store,
    user_id: UserId,
    text: &str,
) -> Result<Option<Award>, ProcessError> {
    let user_key = user_id.0.to_string();

    let award = store
        .update_when(
            |document| find_slogan(text, &document.slogans),
            |document, found| {
                let total = document.users.credit(&user_key, found.score);
                Award {
                    slogan: found.slogan,
                    score: found.score,
                    total,
                }
            },
        )
        .await?;

    Ok(award)
}

/* Total points of a user. Users who never scored have 0.
 */
pub async fn get_total_points(store: &Store, user_id: UserId) -> i64 {
    let user_key = user_id.0.to_string();
    store.read(|document| document.users.total(&user_key)).await
}

/* Top users by score, at most `limit` of them.
 */
pub async fn get_leaderboard(store: &Store, limit: usize) -> Vec<UserScore> {
    store.read(|document| document.users.ranking(limit)).await
}

/* Advances the admin workflow by one input.
 * Execution flow: authorize the sender, run the transition on the slogan table,
 * persist if the slogan table changed.
 * Anyone but the admin gets Unauthorized, and the store is not touched.
 */
pub async fn run_admin_step(
    store: &Store,
    admin_id: UserId,
    sender_id: UserId,
    state: State,
    input: AdminInput,
) -> Result<Step, ProcessError> {
    if sender_id != admin_id {
        return Err(ProcessError::Unauthorized(sender_id));
    }

    let step = store
        .update(|document| {
            let step = transition(state, input, &mut document.slogans);
            (step.changed, step)
        })
        .await?;

    Ok(step)
}
