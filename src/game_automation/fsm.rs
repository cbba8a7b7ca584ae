// Cycle driver for the merge bot
//
// One cycle: capture a frame, run one matching pass dragging each pairing as
// it is found, and fall back to the station queue when the board is static.
use super::config::BotConfig;
use super::device::{FrameSource, InputSink};
use super::engine::MatchingEngine;
use super::error::{AutomationResult, ConfigError};
use super::station::{StationQueue, StationUse};
use super::types::{
    AutomationCommand, AutomationEvent, CycleReport, CycleStatus, GameState, Pairing,
    RunSummary, StopReason,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{Duration, sleep};

const PAUSE_POLL: Duration = Duration::from_millis(100);

pub struct GameAutomation<D> {
    config: BotConfig,
    engine: MatchingEngine,
    stations: StationQueue,
    device: D,
    state: GameState,
    command_rx: Option<mpsc::Receiver<AutomationCommand>>,
    event_tx: Option<mpsc::Sender<AutomationEvent>>,
    cycles: u64,
    stop_requested: bool,
    paused: bool,
}

impl<D: FrameSource + InputSink> GameAutomation<D> {
    /// Validate `config` and build the engine and station queue from it.
    pub fn new(config: BotConfig, device: D) -> Result<Self, ConfigError> {
        let stations = StationQueue::from_config(&config)?;
        let engine = MatchingEngine::new(&config);
        log::info!(
            "🤖 Bot ready: {} rows x 9 columns, {} stations from #{} ({} taps each), threshold {:.2}",
            config.rows,
            stations.len(),
            config.station_start,
            config.taps_per_station(),
            config.threshold
        );
        Ok(Self {
            config,
            engine,
            stations,
            device,
            state: GameState::Idle,
            command_rx: None,
            event_tx: None,
            cycles: 0,
            stop_requested: false,
            paused: false,
        })
    }

    /// Attach the command and event channels used by `run`.
    pub fn with_channels(
        mut self,
        command_rx: mpsc::Receiver<AutomationCommand>,
        event_tx: mpsc::Sender<AutomationEvent>,
    ) -> Self {
        self.command_rx = Some(command_rx);
        self.event_tx = Some(event_tx);
        self
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn stations(&self) -> &StationQueue {
        &self.stations
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    fn emit(&self, event: AutomationEvent) {
        if let Some(tx) = &self.event_tx
            && let Err(e) = tx.try_send(event)
        {
            log::debug!("Dropped automation event: {}", e);
        }
    }

    fn change_state(&mut self, new_state: GameState) {
        if self.state != new_state {
            log::debug!("🎮 Bot state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state.clone();
            self.emit(AutomationEvent::StateChanged(new_state));
        }
    }

    /// Execute exactly one capture, scan and act cycle.
    pub async fn run_cycle(&mut self) -> AutomationResult<CycleReport> {
        self.cycles += 1;
        let index = self.cycles;
        log::info!("Start cycle #{}", index);

        self.change_state(GameState::Capturing);
        let frame = self.device.capture().await?;
        self.engine.check_frame(&frame)?;

        self.change_state(GameState::Scanning);
        let mut pairings: Vec<Pairing> = Vec::new();
        for pairing in self.engine.pass(&frame) {
            // The pass borrows the engine, so set the state field directly.
            if self.state != GameState::Acting {
                log::debug!("🎮 Bot state: {:?} -> {:?}", self.state, GameState::Acting);
                self.state = GameState::Acting;
                self.emit(AutomationEvent::StateChanged(GameState::Acting));
            }
            let from = self.engine.geometry().index_to_pixel(pairing.partner);
            let to = self.engine.geometry().index_to_pixel(pairing.anchor);
            log::info!(
                "Dragging {} -> {} (pixels {} -> {})",
                pairing.partner,
                pairing.anchor,
                from,
                to
            );
            self.device
                .drag(from, to, self.config.drag_duration_ms)
                .await?;
            pairings.push(pairing);
        }

        let report = if !pairings.is_empty() {
            CycleReport {
                index,
                status: CycleStatus::Progressed,
                pairings,
                station_tapped: None,
            }
        } else {
            self.use_station(index).await?
        };

        log::info!(
            "Cycle #{} finished: {:?} ({} pairings)",
            index,
            report.status,
            report.pairings.len()
        );
        self.emit(AutomationEvent::CycleFinished(report.clone()));
        Ok(report)
    }

    /// Board is static: tap the active station or report halt.
    async fn use_station(&mut self, index: u64) -> AutomationResult<CycleReport> {
        log::info!("No matches found, using station if available.");
        let Some(station) = self.stations.active() else {
            log::warn!("No stations available.");
            self.change_state(GameState::Halted);
            self.emit(AutomationEvent::Halted);
            return Ok(CycleReport {
                index,
                status: CycleStatus::Halt,
                pairings: Vec::new(),
                station_tapped: None,
            });
        };

        self.change_state(GameState::UsingStation);
        let at = self.engine.geometry().index_to_pixel(station);
        log::info!("Using station at tile {} (pixel {})", station, at);
        self.device.tap(at).await?;

        match self.stations.record_use() {
            Some(StationUse::Used { remaining, .. }) => {
                log::debug!("Station {} has {} uses left", station, remaining);
            }
            Some(StationUse::Exhausted { next, .. }) => {
                match next {
                    Some(next) => log::info!("Station {} depleted, moving to {}", station, next),
                    None => log::warn!("Station {} depleted, no stations left", station),
                }
                self.emit(AutomationEvent::StationDepleted { station, next });
            }
            None => {}
        }

        Ok(CycleReport {
            index,
            status: CycleStatus::StationUsed,
            pairings: Vec::new(),
            station_tapped: Some(station),
        })
    }

    fn process_command(&mut self, command: AutomationCommand) {
        log::debug!("🤖 Processing automation command: {:?}", command);
        match command {
            AutomationCommand::Pause => {
                if !self.paused {
                    self.paused = true;
                    self.change_state(GameState::Paused);
                    log::info!("⏸️ Bot paused");
                }
            }
            AutomationCommand::Resume => {
                if self.paused {
                    self.paused = false;
                    self.change_state(GameState::Idle);
                    log::info!("▶️ Bot resumed");
                }
            }
            AutomationCommand::Stop => {
                self.stop_requested = true;
                log::info!("⏹️ Stop requested");
            }
        }
    }

    /// Drain pending commands without blocking.
    fn poll_commands(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = self.command_rx.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(command) => pending.push(command),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.command_rx = None;
                        break;
                    }
                }
            }
        }
        for command in pending {
            self.process_command(command);
        }
    }

    /// Cycle until halt, a stop command, or `max_cycles` cycles.
    ///
    /// Commands are only observed between cycles; a running cycle always
    /// finishes its pass. Device failures end the run unretried.
    pub async fn run(&mut self, max_cycles: Option<u64>) -> AutomationResult<RunSummary> {
        log::info!("🎮 Bot loop started");
        let start_cycles = self.cycles;
        let mut summary = RunSummary {
            cycles: 0,
            pairings_merged: 0,
            station_taps: 0,
            stop_reason: StopReason::Stopped,
        };

        loop {
            self.poll_commands();
            if self.stop_requested {
                summary.stop_reason = StopReason::Stopped;
                break;
            }
            if self.paused {
                sleep(PAUSE_POLL).await;
                continue;
            }
            if max_cycles.is_some_and(|max| self.cycles - start_cycles >= max) {
                summary.stop_reason = StopReason::CycleLimit;
                break;
            }

            let report = match self.run_cycle().await {
                Ok(report) => report,
                Err(e) => {
                    log::error!("❌ Cycle failed: {}", e);
                    self.emit(AutomationEvent::Error(e.to_string()));
                    self.change_state(GameState::Idle);
                    return Err(e);
                }
            };
            summary.cycles += 1;
            summary.pairings_merged += report.pairings.len() as u64;
            if report.station_tapped.is_some() {
                summary.station_taps += 1;
            }
            if report.status == CycleStatus::Halt {
                log::warn!("No stations available, exiting bot.");
                summary.stop_reason = StopReason::Halted;
                break;
            }
            sleep(self.config.cycle_delay()).await;
        }

        if self.state != GameState::Halted {
            self.change_state(GameState::Idle);
        }
        log::info!(
            "🎮 Bot loop ended after {} cycles ({:?}): {} pairings merged, {} station taps",
            summary.cycles,
            summary.stop_reason,
            summary.pairings_merged,
            summary.station_taps
        );
        Ok(summary)
    }
}
