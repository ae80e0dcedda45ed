// bot/mod.rs

// Exported functions
pub use self::dispatcher::{run_dispatcher, schema};

// Exported structs and types
pub use self::config::{BotConfig, ConfigError, WebhookConfig};
pub use self::dispatcher::{BotError, Command, HandlerResult, UserDialogue};
pub use self::storage::{Document, SloganTable, Store, UserScores};
pub use self::workflow::State;

// Declare submodules
mod config;
mod dispatcher;
mod handler;
mod matcher;
mod numerals;
mod processor;
mod storage;
mod workflow;
