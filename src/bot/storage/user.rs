use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

/* User Score Table
 * Maps a Telegram user ID (as a string) to the user's cumulative score.
 * Entries are created on the first scoring event and only ever incremented.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserScores {
    scores: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScore {
    pub user_id: String,
    pub score: i64,
}

impl UserScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    // Total score of a user, 0 if they never scored.
    pub fn total(&self, user_id: &str) -> i64 {
        self.scores.get(user_id).copied().unwrap_or(0)
    }

    // Adds points to a user, creating the entry if needed. Returns the new total.
    pub fn credit(&mut self, user_id: &str, points: i64) -> i64 {
        let total = self.scores.entry(user_id.to_string()).or_insert(0);
        *total = total.saturating_add(points);
        *total
    }

    /* Ranks users by score, highest first, and keeps the top `limit`.
     * Ties go to the lower user ID, compared numerically.
     */
    pub fn ranking(&self, limit: usize) -> Vec<UserScore> {
        let mut ranked: Vec<UserScore> = self
            .scores
            .iter()
            .map(|(user_id, score)| UserScore {
                user_id: user_id.clone(),
                score: *score,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| compare_user_ids(&a.user_id, &b.user_id))
        });
        ranked.truncate(limit);
        ranked
    }
}

/* Tie-break order for user IDs: numeric IDs first, by value,
 * then any other key by string order. Must stay a total order for sorting.
 */
fn compare_user_ids(a: &str, b: &str) -> Ordering {
    user_id_key(a).cmp(&user_id_key(b))
}

fn user_id_key(user_id: &str) -> (bool, Option<i64>, &str) {
    let numeric = user_id.parse::<i64>().ok();
    (numeric.is_none(), numeric, user_id)
}

impl<S: AsRef<str>> FromIterator<(S, i64)> for UserScores {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        UserScores {
            scores: iter
                .into_iter()
                .map(|(user_id, score)| (user_id.as_ref().to_string(), score))
                .collect(),
        }
    }
}
