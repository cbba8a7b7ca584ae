use super::error::AdbResult;
use super::rust_impl::RustAdb;
use super::shell::AdbShell;
use super::types::{AdbClient, Device, ImageCapture, is_network_serial};
use std::fmt;
use std::str::FromStr;

/// Which ADB implementation drives the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Pure Rust client talking to the ADB server
    #[default]
    Rust,
    /// External `adb` binary
    Shell,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" => Ok(BackendKind::Rust),
            "shell" => Ok(BackendKind::Shell),
            other => Err(format!(
                "Unknown impl '{other}', expected 'rust' or 'shell'"
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Rust => write!(f, "rust"),
            BackendKind::Shell => write!(f, "shell"),
        }
    }
}

pub enum AdbBackend {
    Shell(AdbShell),
    Rust(RustAdb),
}

impl AdbBackend {
    pub async fn list_devices(kind: BackendKind) -> AdbResult<Vec<Device>> {
        match kind {
            BackendKind::Rust => RustAdb::list_devices().await,
            BackendKind::Shell => AdbShell::list_devices().await,
        }
    }

    /// Open `device`, or the first listed device when `None`.
    ///
    /// Network serials that the server does not know yet are connected with
    /// `adb connect` first.
    pub async fn connect(kind: BackendKind, device: Option<&str>) -> AdbResult<Self> {
        let name = match device {
            Some(name) => name.to_string(),
            None => Self::list_devices(kind)
                .await?
                .into_iter()
                .next()
                .ok_or(super::AdbError::NoDevices)?
                .name,
        };
        Self::new_with_device(&name, kind).await
    }

    pub async fn new_with_device(name: &str, kind: BackendKind) -> AdbResult<Self> {
        match kind {
            BackendKind::Rust => {
                if is_network_serial(name)
                    && !RustAdb::list_devices().await?.iter().any(|d| d.name == name)
                {
                    AdbShell::connect(name).await?;
                }
                Ok(AdbBackend::Rust(RustAdb::new_with_device(name).await?))
            }
            BackendKind::Shell => Ok(AdbBackend::Shell(AdbShell::new_with_device(name).await?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AdbBackend::Shell(_) => BackendKind::Shell,
            AdbBackend::Rust(_) => BackendKind::Rust,
        }
    }

    pub fn device_name(&self) -> &str {
        match self {
            AdbBackend::Shell(s) => s.device_name(),
            AdbBackend::Rust(r) => r.device_name(),
        }
    }

    pub fn screen_dimensions(&self) -> (u32, u32) {
        match self {
            AdbBackend::Shell(s) => s.screen_dimensions(),
            AdbBackend::Rust(r) => r.screen_dimensions(),
        }
    }

    pub async fn screen_capture(&self) -> AdbResult<ImageCapture> {
        match self {
            AdbBackend::Shell(s) => <AdbShell as AdbClient>::screen_capture(s).await,
            AdbBackend::Rust(r) => <RustAdb as AdbClient>::screen_capture(r).await,
        }
    }

    pub async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        match self {
            AdbBackend::Shell(s) => s.tap(x, y).await,
            AdbBackend::Rust(r) => r.tap(x, y).await,
        }
    }

    pub async fn swipe(
        &self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration: Option<u32>,
    ) -> AdbResult<()> {
        match self {
            AdbBackend::Shell(s) => s.swipe(x1, y1, x2, y2, duration).await,
            AdbBackend::Rust(r) => r.swipe(x1, y1, x2, y2, duration).await,
        }
    }
}
