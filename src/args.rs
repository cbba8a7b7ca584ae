use crate::adb::BackendKind;
use crate::game_automation::BotConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Run,
    Screenshot,
    Inspect,
}

#[derive(Debug, Error, PartialEq)]
pub enum ArgsError {
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),

    #[error("Invalid value '{value}' for {flag}")]
    InvalidValue { flag: String, value: String },
}

/// CLI values layered over the JSON/default configuration.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub rows: Option<u32>,
    pub station_capacity: Option<u32>,
    pub station_uses: Option<u32>,
    pub station_count: Option<usize>,
    pub station_start: Option<usize>,
    pub threshold: Option<f64>,
    pub cycle_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut BotConfig) {
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(capacity) = self.station_capacity {
            config.station_capacity = capacity;
        }
        if let Some(uses) = self.station_uses {
            config.station_uses = uses;
        }
        if let Some(count) = self.station_count {
            config.station_count = count;
        }
        if let Some(start) = self.station_start {
            config.station_start = start;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(delay) = self.cycle_delay_ms {
            config.cycle_delay_ms = delay;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub debug_mode: bool,
    pub backend: BackendKind,
    pub device: Option<String>,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub max_cycles: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, ArgsError> {
    value.parse::<T>().map_err(|_| ArgsError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

impl Args {
    pub fn parse() -> Result<Parsed, ArgsError> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse flags, program name already stripped.
    pub fn parse_from<I, S>(args: I) -> Result<Parsed, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mode = Mode::Run;
        let mut debug_mode = false;
        let mut backend = BackendKind::default();
        let mut device: Option<String> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut overrides = ConfigOverrides::default();
        let mut max_cycles: Option<u64> = None;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--screenshot" || arg == "-s" {
                mode = Mode::Screenshot;
            } else if arg == "--inspect" {
                mode = Mode::Inspect;
            } else if let Some((flag, value)) = arg.split_once('=') {
                match flag {
                    "--rows" => overrides.rows = Some(parse_value(flag, value)?),
                    "--station-cap" => overrides.station_capacity = Some(parse_value(flag, value)?),
                    "--station-uses" => overrides.station_uses = Some(parse_value(flag, value)?),
                    "--stations" => overrides.station_count = Some(parse_value(flag, value)?),
                    "--station-start" => overrides.station_start = Some(parse_value(flag, value)?),
                    "--threshold" => overrides.threshold = Some(parse_value(flag, value)?),
                    "--delay-ms" => overrides.cycle_delay_ms = Some(parse_value(flag, value)?),
                    "--max-cycles" => max_cycles = Some(parse_value(flag, value)?),
                    "--config" if !value.is_empty() => config_path = Some(PathBuf::from(value)),
                    "--device" if !value.is_empty() => device = Some(value.to_string()),
                    "--impl" => {
                        backend = value.parse::<BackendKind>().map_err(|_| ArgsError::InvalidValue {
                            flag: flag.to_string(),
                            value: value.to_string(),
                        })?
                    }
                    "--config" | "--device" => {
                        return Err(ArgsError::InvalidValue {
                            flag: flag.to_string(),
                            value: String::new(),
                        });
                    }
                    _ => return Err(ArgsError::UnknownArgument(arg.to_string())),
                }
            } else {
                return Err(ArgsError::UnknownArgument(arg.to_string()));
            }
        }

        Ok(Parsed::Run(Args {
            mode,
            debug_mode,
            backend,
            device,
            config_path,
            overrides,
            max_cycles,
        }))
    }

    /// Defaults, then the `--config` file, then CLI flags.
    pub fn bot_config(&self) -> Result<BotConfig, crate::game_automation::ConfigError> {
        let mut config = match &self.config_path {
            Some(path) => BotConfig::from_json_file(path)?,
            None => BotConfig::default(),
        };
        self.overrides.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

pub fn print_help() {
    println!("🤖 Merge ADB Bot");
    println!();
    println!("USAGE:");
    println!("    merge-adb-bot [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no mode flag)      Run the merge bot until no stations are left");
    println!("    --screenshot, -s    Take a screenshot and save to file (cli-screenshot.png)");
    println!("    --inspect           Capture once and log every tile's center colour");
    println!("    --rows=N            Item rows to scan (default: 3, columns fixed at 9)");
    println!("    --station-cap=N     Total uses per station (default: 5)");
    println!("    --station-uses=N    Uses consumed per station tap (default: 1)");
    println!("    --stations=N        Number of stations to work through (default: 32)");
    println!("    --station-start=N   Stations already used up (default: 0)");
    println!("    --threshold=F       Similarity score a pair must exceed (default: 0.90)");
    println!("    --delay-ms=N        Pause after each cycle (default: 300)");
    println!("    --max-cycles=N      Stop after N cycles");
    println!("    --config=PATH       JSON config file, CLI flags take precedence");
    println!("    --device=SERIAL     Device to use (default: first listed device)");
    println!("    --impl=<shell|rust> Select ADB implementation (default: rust)");
    println!(
        "                        The shell implementation requires the ADB tool to be installed."
    );
    println!("    --debug             Enable debug logging (RUST_LOG overrides)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    merge-adb-bot --screenshot");
    println!("    merge-adb-bot --rows=4 --stations=10 --station-start=3");
    println!("    merge-adb-bot --device=localhost:5555 --impl=shell --debug");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, ArgsError> {
        Args::parse_from(args.iter().copied())
    }

    fn run_args(args: &[&str]) -> Args {
        match parse(args).unwrap() {
            Parsed::Run(args) => args,
            other => panic!("expected run args, got {other:?}"),
        }
    }

    #[test]
    fn test_no_flags_runs_bot_with_defaults() {
        let args = run_args(&[]);
        assert_eq!(args.mode, Mode::Run);
        assert_eq!(args.backend, BackendKind::Rust);
        assert!(!args.debug_mode);
        assert_eq!(args.overrides, ConfigOverrides::default());
        assert_eq!(args.bot_config().unwrap(), BotConfig::default());
    }

    #[test]
    fn test_help_and_version_short_circuit() {
        assert_eq!(parse(&["--rows=2", "--help", "--bogus"]), Ok(Parsed::Help));
        assert_eq!(parse(&["-v"]), Ok(Parsed::Version));
    }

    #[test]
    fn test_overrides_reach_config() {
        let args = run_args(&[
            "--rows=4",
            "--station-cap=6",
            "--station-uses=2",
            "--stations=10",
            "--station-start=3",
            "--threshold=0.8",
            "--delay-ms=0",
        ]);
        let config = args.bot_config().unwrap();
        assert_eq!(config.rows, 4);
        assert_eq!(config.taps_per_station(), 3);
        assert_eq!(config.station_count, 10);
        assert_eq!(config.station_start, 3);
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.cycle_delay_ms, 0);
    }

    #[test]
    fn test_modes_and_device_flags() {
        let args = run_args(&[
            "--inspect",
            "--impl=shell",
            "--device=localhost:5555",
            "--debug",
            "--max-cycles=7",
        ]);
        assert_eq!(args.mode, Mode::Inspect);
        assert_eq!(args.backend, BackendKind::Shell);
        assert_eq!(args.device.as_deref(), Some("localhost:5555"));
        assert!(args.debug_mode);
        assert_eq!(args.max_cycles, Some(7));

        assert_eq!(run_args(&["-s"]).mode, Mode::Screenshot);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        assert_eq!(
            parse(&["--rows=three"]),
            Err(ArgsError::InvalidValue {
                flag: "--rows".to_string(),
                value: "three".to_string(),
            })
        );
        assert!(matches!(
            parse(&["--impl=usb"]),
            Err(ArgsError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse(&["--device="]),
            Err(ArgsError::InvalidValue { .. })
        ));
        assert_eq!(
            parse(&["--gui"]),
            Err(ArgsError::UnknownArgument("--gui".to_string()))
        );
        assert_eq!(
            parse(&["--colour=red"]),
            Err(ArgsError::UnknownArgument("--colour=red".to_string()))
        );
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let args = run_args(&["--stations=30", "--station-start=5"]);
        assert!(args.bot_config().is_err());
    }
}
