// Game automation module
// Screen-driven merge bot: classify grid slots, pair identical tiles, drag
// them together, and fall back to refill stations when the board is static.

pub mod channels;
pub mod classifier;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod frame;
pub mod fsm;
pub mod grid;
pub mod similarity;
pub mod station;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::create_automation_channels;
pub use classifier::TileClassifier;
pub use config::BotConfig;
pub use device::{FrameSource, InputSink};
pub use engine::MatchingEngine;
pub use error::{AutomationError, AutomationResult, ConfigError};
pub use frame::{Frame, Patch};
pub use fsm::GameAutomation;
pub use grid::GridGeometry;
pub use similarity::SimilarityMatcher;
pub use station::{StationQueue, StationState};
pub use types::{
    AutomationCommand, AutomationEvent, CycleReport, CycleStatus, GameState, GridPosition,
    Pairing, PixelPoint, RunSummary, StopReason,
};
