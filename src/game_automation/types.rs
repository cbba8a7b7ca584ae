// Types and enums for game automation
use serde::Serialize;
use std::fmt;

/// Number of columns in the item grid. Only the row count is configurable.
pub const GRID_COLUMNS: u32 = 9;

/// One slot of the item grid, addressed by (row, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPosition {
    pub row: u32,
    pub col: u32,
}

impl GridPosition {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Integer pixel coordinate on the device screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Two occupied tiles that looked identical during a pass.
///
/// `anchor` was taken from the worklist first; `partner` is the later tile
/// it matched. The merge drag goes from `partner` onto `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub anchor: GridPosition,
    pub partner: GridPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleStatus {
    /// At least one pairing was merged.
    Progressed,
    /// The board was static and the active station was tapped.
    StationUsed,
    /// The board was static and no station is left.
    Halt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub index: u64,
    pub status: CycleStatus,
    pub pairings: Vec<Pairing>,
    pub station_tapped: Option<GridPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    Halted,
    Stopped,
    CycleLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub cycles: u64,
    pub pairings_merged: u64,
    pub station_taps: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameState {
    Idle,
    Capturing,
    Scanning,
    Acting,
    UsingStation,
    Paused,
    Halted,
}

#[derive(Debug, Clone)]
pub enum AutomationCommand {
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Clone)]
pub enum AutomationEvent {
    StateChanged(GameState),
    CycleFinished(CycleReport),
    StationDepleted {
        station: GridPosition,
        next: Option<GridPosition>,
    },
    Halted,
    Error(String),
}
