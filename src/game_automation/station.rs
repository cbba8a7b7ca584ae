//! Refill station queue and its depletion state machine.
//!
//! The front station is the active one. Each tap consumes one use; when the
//! counter reaches zero the station is popped and the counter resets for
//! the next one. Once the queue is empty there is no fallback left.

use super::config::BotConfig;
use super::error::ConfigError;
use super::types::GridPosition;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StationState {
    /// Active station is untouched.
    Awaiting,
    /// Active station has been tapped but still has uses left.
    Depleting,
    /// No stations remain.
    EmptyQueue,
}

/// Result of recording one station tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationUse {
    Used {
        station: GridPosition,
        remaining: u32,
    },
    /// The tapped station hit zero and was popped.
    Exhausted {
        station: GridPosition,
        next: Option<GridPosition>,
    },
}

#[derive(Debug, Clone)]
pub struct StationQueue {
    stations: VecDeque<GridPosition>,
    taps_per_station: u32,
    remaining: u32,
}

impl StationQueue {
    /// `taps_per_station` must be positive; `from_config` checks this.
    pub fn new(stations: impl IntoIterator<Item = GridPosition>, taps_per_station: u32) -> Self {
        Self {
            stations: stations.into_iter().collect(),
            taps_per_station,
            remaining: taps_per_station,
        }
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.station_positions()?,
            config.taps_per_station(),
        ))
    }

    pub fn active(&self) -> Option<GridPosition> {
        self.stations.front().copied()
    }

    /// Uses left on the active station, zero when the queue is empty.
    pub fn remaining_uses(&self) -> u32 {
        if self.stations.is_empty() {
            0
        } else {
            self.remaining
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn state(&self) -> StationState {
        if self.stations.is_empty() {
            StationState::EmptyQueue
        } else if self.remaining == self.taps_per_station {
            StationState::Awaiting
        } else {
            StationState::Depleting
        }
    }

    /// Record a tap on the active station. `None` if the queue is empty.
    pub fn record_use(&mut self) -> Option<StationUse> {
        let station = self.active()?;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Some(StationUse::Used {
                station,
                remaining: self.remaining,
            });
        }
        self.stations.pop_front();
        self.remaining = self.taps_per_station;
        Some(StationUse::Exhausted {
            station,
            next: self.active(),
        })
    }
}
