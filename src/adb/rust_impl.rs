// https://crates.io/crates/adb_client
use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device, check_bounds, parse_screen_size, swipe_args};
use adb_client::{ADBDeviceExt, ADBServer, ADBServerDevice};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const SHELL_TIMEOUT: Duration = Duration::from_secs(5);
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend that talks to the local ADB server through `adb_client`.
pub struct RustAdb {
    device: Device,
    server_device: Arc<Mutex<ADBServerDevice>>, // underlying connected device
    screen_x: u32,
    screen_y: u32,
}

impl RustAdb {
    /// Run a device shell command on a blocking thread, bounded by `timeout`.
    async fn shell(&self, args: Vec<String>, timeout: Duration) -> AdbResult<Vec<u8>> {
        let server_device = Arc::clone(&self.server_device);
        let operation = args.join(" ");
        let task = tokio::task::spawn_blocking({
            let operation = operation.clone();
            move || -> AdbResult<Vec<u8>> {
                let mut out: Vec<u8> = Vec::new();
                // This blocks until we get the lock, then blocks on shell_command
                let mut dev = server_device.blocking_lock();
                let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
                dev.shell_command(&refs, &mut out)
                    .map_err(|source| AdbError::Server { operation, source })?;
                Ok(out)
            }
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(AdbError::Timeout {
                duration: timeout,
                description: format!(
                    "'{operation}' on {} (device may be disconnected)",
                    self.device.name
                ),
            }),
        }
    }
}

impl AdbClient for RustAdb {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        let mut server = ADBServer::default();
        let device_list = tokio::task::spawn_blocking(move || server.devices())
            .await?
            .map_err(|source| AdbError::Server {
                operation: "devices".to_string(),
                source,
            })?;
        Ok(device_list
            .into_iter()
            .map(|d| Device {
                name: d.identifier,
                transport_id: None,
            })
            .collect())
    }

    async fn new_with_device(device_name: &str) -> AdbResult<Self> {
        let mut server = ADBServer::default();
        let name = device_name.to_string();
        let server_device = tokio::task::spawn_blocking(move || {
            if name.is_empty() {
                server.get_device()
            } else {
                server.get_device_by_name(&name)
            }
        })
        .await?
        .map_err(|source| AdbError::Server {
            operation: format!("open device '{device_name}'"),
            source,
        })?;

        let mut adb = RustAdb {
            device: Device {
                name: device_name.to_string(),
                transport_id: None,
            },
            server_device: Arc::new(Mutex::new(server_device)),
            screen_x: 0,
            screen_y: 0,
        };
        let stdout = adb
            .shell(vec!["wm".into(), "size".into()], SHELL_TIMEOUT)
            .await?;
        let (sx, sy) = parse_screen_size(&String::from_utf8_lossy(&stdout))?;
        adb.screen_x = sx;
        adb.screen_y = sy;
        Ok(adb)
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        self.shell(vec!["screencap".into(), "-p".into()], CAPTURE_TIMEOUT)
            .await
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        check_bounds(&[(x, y)], self.screen_dimensions())?;
        let args = vec!["input".into(), "tap".into(), x.to_string(), y.to_string()];
        self.shell(args, SHELL_TIMEOUT).await?;
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
        self.shell(swipe_args(x1, y1, x2, y2, duration), SHELL_TIMEOUT)
            .await?;
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_x, self.screen_y)
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}
