use serde::{Deserialize, Serialize};

use super::{slogan::SloganTable, user::UserScores};

/* Document
 * The whole durable state of the bot, written to disk as one JSON object:
 * { "slogans": { <slogan>: <score>, ... }, "users": { <user id>: <total>, ... } }
 * Missing keys read back as empty tables.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub slogans: SloganTable,
    #[serde(default)]
    pub users: UserScores,
}
