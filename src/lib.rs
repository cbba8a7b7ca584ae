pub mod adb;
pub mod args;
pub mod game_automation;

pub use adb::{AdbBackend, BackendKind};
pub use game_automation::{BotConfig, GameAutomation};
