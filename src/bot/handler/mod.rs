// Exported functions
pub use self::admin::{action_admin_text, action_menu_button};
pub use self::general::{action_help, action_start, invalid_state, is_admin_input};
pub use self::leaderboard::{action_leader_board, action_total_point};
pub use self::scoring::{action_check_message, is_group_text};

// Submodules
mod admin;
mod constants;
mod general;
mod leaderboard;
mod scoring;
mod utils;
