use merge_adb_bot::adb::AdbBackend;
use merge_adb_bot::args::{self, Args, Mode, Parsed};
use merge_adb_bot::game_automation::{
    AutomationCommand, AutomationError, AutomationEvent, AutomationResult, BotConfig,
    FrameSource, GameAutomation, MatchingEngine, create_automation_channels,
};
use std::path::PathBuf;
use std::process::ExitCode;

const SCREENSHOT_PATH: &str = "cli-screenshot.png";

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            args::print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Parsed::Version) => {
            println!("Merge ADB Bot v{}", env!("APP_VERSION_DISPLAY"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("❌ {e}");
            args::print_help();
            return ExitCode::from(2);
        }
    };

    // RUST_LOG wins over --debug when set.
    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    let config = match args.bot_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("❌ Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(&args, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {e}");
            if let AutomationError::Device(adb) = &e
                && adb.is_disconnect()
            {
                log::warn!("🔌 Device looks disconnected, check `adb devices` and reconnect");
            }
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(args: &Args, config: BotConfig) -> AutomationResult<()> {
    let device = AdbBackend::connect(args.backend, args.device.as_deref()).await?;
    let (sx, sy) = device.screen_dimensions();
    log::info!(
        "📱 Device: {} size: {}x{} (backend={})",
        device.device_name(),
        sx,
        sy,
        device.kind()
    );

    match args.mode {
        Mode::Screenshot => save_screenshot(&device).await,
        Mode::Inspect => inspect(config, device).await,
        Mode::Run => run_bot(config, device, args.max_cycles).await,
    }
}

async fn save_screenshot(device: &AdbBackend) -> AutomationResult<()> {
    let capture = device.screen_capture().await?;
    tokio::fs::write(SCREENSHOT_PATH, &capture.bytes)
        .await
        .map_err(|source| AutomationError::SaveCapture {
            path: PathBuf::from(SCREENSHOT_PATH),
            source,
        })?;
    println!(
        "✅ Screenshot ({}ms) saved to {}",
        capture.duration_ms, SCREENSHOT_PATH
    );
    Ok(())
}

/// Capture once and report what the bot would see, without touching the device.
async fn inspect(config: BotConfig, mut device: AdbBackend) -> AutomationResult<()> {
    let frame = device.capture().await?;
    let engine = MatchingEngine::new(&config);
    engine.check_frame(&frame)?;
    let geometry = engine.geometry();

    for &pos in engine.positions() {
        let center = geometry.index_to_pixel(pos);
        let color = frame.pixel(center).map(|c| c.0);
        let empty = engine.classifier().is_empty(&frame, pos);
        println!(
            "Tile {} at {}: {:?} {}",
            pos,
            center,
            color,
            if empty { "empty" } else { "occupied" }
        );
    }
    for station in config.station_positions()? {
        let center = geometry.index_to_pixel(station);
        println!(
            "Station {} at {}: {:?}",
            station,
            center,
            frame.pixel(center).map(|c| c.0)
        );
    }

    let pairings = engine.scan(&frame);
    println!("🔍 {} pairings would be merged this cycle", pairings.len());
    for pairing in pairings {
        println!("    {} -> {}", pairing.partner, pairing.anchor);
    }
    Ok(())
}

async fn run_bot(
    config: BotConfig,
    device: AdbBackend,
    max_cycles: Option<u64>,
) -> AutomationResult<()> {
    let (cmd_tx, cmd_rx, event_tx, mut event_rx) = create_automation_channels();
    let mut bot = GameAutomation::new(config, device)?.with_channels(cmd_rx, event_tx);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("🛑 Ctrl-C received, stopping after the current cycle");
            let _ = cmd_tx.send(AutomationCommand::Stop).await;
        }
    });

    let progress = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AutomationEvent::CycleFinished(report) => println!(
                    "🔁 Cycle #{}: {:?} ({} merged)",
                    report.index,
                    report.status,
                    report.pairings.len()
                ),
                AutomationEvent::StationDepleted { station, next } => match next {
                    Some(next) => println!("📦 Station {station} empty, next is {next}"),
                    None => println!("📦 Station {station} empty, none left"),
                },
                AutomationEvent::Halted => println!("🏁 No merges and no stations left"),
                AutomationEvent::StateChanged(_) | AutomationEvent::Error(_) => {}
            }
        }
    });

    let outcome = bot.run(max_cycles).await;
    // Dropping the bot closes the event channel and ends the progress task.
    drop(bot);
    let _ = progress.await;

    let summary = outcome?;
    println!(
        "✅ Done after {} cycles ({:?}): {} pairings merged, {} station taps",
        summary.cycles, summary.stop_reason, summary.pairings_merged, summary.station_taps
    );
    Ok(())
}
