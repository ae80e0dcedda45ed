/* Constants shared by the handlers. */

pub const COMMAND_HELP: &str = "/help";
pub const COMMAND_TOTAL_POINT: &str = "/total_point";
pub const COMMAND_LEADER_BOARD: &str = "/leader_board";

pub const GREETING_MESSAGE: &str = "👋 Hi! The bot is up and running.";
pub const NO_ACCESS_MESSAGE: &str = "⛔️ You don't have access to this.";
pub const UNKNOWN_ERROR_MESSAGE: &str =
    "⁉️ Oh no! Something went wrong on my side. Please try again later!";
pub const NO_POINTS_MESSAGE: &str = "No points recorded yet.";
pub const LEADERBOARD_HEADER: &str = "🏆 Leaderboard:\n\n";
