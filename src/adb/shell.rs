use super::error::{AdbError, AdbResult};
use super::types::{
    AdbClient, Device, check_bounds, is_network_serial, parse_screen_size, swipe_args,
};
use tokio::process::Command;

/// Backend that drives the external `adb` binary.
pub struct AdbShell {
    pub device: Device,
    pub transport_id: u32,
    pub screen_x: u32,
    pub screen_y: u32,
}

impl AdbShell {
    async fn ensure_adb_available() -> AdbResult<()> {
        Self::check_adb_probe(Command::new("adb").arg("version").output().await)
    }

    /// Interpret the result of `adb version`.
    fn check_adb_probe(probe: std::io::Result<std::process::Output>) -> AdbResult<()> {
        match probe {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(AdbError::AdbUnavailable {
                detail: format!("'adb version' returned non-zero ({})", out.status),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AdbError::AdbUnavailable {
                detail: "'adb' binary not found in PATH".to_string(),
            }),
            Err(e) => Err(AdbError::AdbUnavailable {
                detail: format!("failed to invoke 'adb': {e}"),
            }),
        }
    }

    /// Run `adb <args>` and return stdout, failing on a non-zero exit.
    async fn run(args: &[&str]) -> AdbResult<Vec<u8>> {
        let command = format!("adb {}", args.join(" "));
        log::trace!("Running {}", command);
        let output = Command::new("adb")
            .args(args)
            .output()
            .await
            .map_err(|source| AdbError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Run a command against this device's transport.
    async fn run_on_device(&self, args: &[&str]) -> AdbResult<Vec<u8>> {
        let tid = self.transport_id.to_string();
        let mut full: Vec<&str> = vec!["-t", tid.as_str()];
        full.extend_from_slice(args);
        Self::run(&full).await
    }

    pub async fn new(transport_id: Option<&str>) -> AdbResult<Self> {
        Self::ensure_adb_available().await?;
        let devices = Self::list_devices().await?;
        if devices.is_empty() {
            return Err(AdbError::NoDevices);
        }
        let device = match transport_id {
            Some(tid) => devices
                .into_iter()
                .find(|d| d.transport_id.as_deref() == Some(tid))
                .ok_or_else(|| AdbError::DeviceNotFound {
                    name: format!("transport_id:{tid}"),
                })?,
            None => devices.into_iter().next().ok_or(AdbError::NoDevices)?,
        };
        let transport_id = device
            .transport_id
            .as_deref()
            .and_then(|tid| tid.parse::<u32>().ok())
            .ok_or_else(|| AdbError::MissingTransportId {
                name: device.name.clone(),
            })?;
        let tid = transport_id.to_string();
        let stdout = Self::run(&["-t", tid.as_str(), "shell", "wm", "size"]).await?;
        let (screen_x, screen_y) = parse_screen_size(&String::from_utf8_lossy(&stdout))?;
        Ok(Self {
            device,
            transport_id,
            screen_x,
            screen_y,
        })
    }

    /// `adb connect` a network serial such as `localhost:5555`.
    pub async fn connect(serial: &str) -> AdbResult<()> {
        Self::ensure_adb_available().await?;
        let command = format!("adb connect {serial}");
        let output = Command::new("adb")
            .arg("connect")
            .arg(serial)
            .output()
            .await
            .map_err(|source| AdbError::Spawn { command, source })?;
        let stdout_str = String::from_utf8_lossy(&output.stdout);
        let stderr_str = String::from_utf8_lossy(&output.stderr);
        if !output.status.success()
            || stdout_str.contains("Connection refused")
            || stdout_str.contains("failed")
            || stderr_str.contains("Connection refused")
        {
            return Err(AdbError::ConnectFailed {
                serial: serial.to_string(),
                output: format!("Out:{} Err:{}", stdout_str.trim(), stderr_str.trim()),
            });
        }
        log::info!("🔌 adb connect {}: {}", serial, stdout_str.trim());
        Ok(())
    }

    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 && parts[1] == "device" {
                    let transport_id = parts
                        .iter()
                        .find_map(|part| part.strip_prefix("transport_id:"))
                        .map(str::to_string);
                    Some(Device {
                        name: parts[0].to_string(),
                        transport_id,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

impl AdbClient for AdbShell {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        Self::ensure_adb_available().await?;
        let stdout = Self::run(&["devices", "-l"]).await?;
        Ok(Self::parse_devices(&String::from_utf8_lossy(&stdout)))
    }

    async fn new_with_device(device_name: &str) -> AdbResult<Self> {
        let devices = Self::list_devices().await?;
        if let Some(device) = devices.iter().find(|d| d.name == device_name) {
            return Self::new(device.transport_id.as_deref()).await;
        }
        if !is_network_serial(device_name) {
            return Err(AdbError::DeviceNotFound {
                name: device_name.to_string(),
            });
        }
        Self::connect(device_name).await?;
        let devices = Self::list_devices().await?;
        match devices.iter().find(|d| d.name == device_name) {
            Some(device) => Self::new(device.transport_id.as_deref()).await,
            None => Err(AdbError::DeviceNotFound {
                name: device_name.to_string(),
            }),
        }
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        self.run_on_device(&["exec-out", "screencap", "-p"]).await
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        check_bounds(&[(x, y)], self.screen_dimensions())?;
        let (xs, ys) = (x.to_string(), y.to_string());
        self.run_on_device(&["shell", "input", "tap", xs.as_str(), ys.as_str()])
            .await?;
        Ok(())
    }

    async fn swipe(
        &self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration: Option<u32>,
    ) -> AdbResult<()> {
        check_bounds(&[(x1, y1), (x2, y2)], self.screen_dimensions())?;
        let args = swipe_args(x1, y1, x2, y2, duration);
        let mut refs: Vec<&str> = vec!["shell"];
        refs.extend(args.iter().map(String::as_str));
        self.run_on_device(&refs).await?;
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_x, self.screen_y)
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}
