// Core ADB types and traits
use super::error::{AdbError, AdbResult};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ImageCapture {
    pub bytes: Vec<u8>,
    pub duration_ms: u128,
}

// Trait defining ADB capabilities (shell or rust implementations)
#[allow(async_fn_in_trait)]
pub trait AdbClient: Send + Sync {
    async fn list_devices() -> AdbResult<Vec<Device>>
    where
        Self: Sized;
    async fn new_with_device(device_name: &str) -> AdbResult<Self>
    where
        Self: Sized;

    // Raw backend-specific capture (implemented per backend)
    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>>;

    // Default high-level capture with timing
    async fn screen_capture(&self) -> AdbResult<ImageCapture> {
        let start = std::time::Instant::now();
        let bytes = self.screen_capture_bytes().await?;
        Ok(ImageCapture {
            bytes,
            duration_ms: start.elapsed().as_millis(),
        })
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()>;
    async fn swipe(
        &self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration: Option<u32>,
    ) -> AdbResult<()>;
    fn screen_dimensions(&self) -> (u32, u32);
    fn device_name(&self) -> &str;
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub transport_id: Option<String>,
}

/// Reject gesture coordinates that fall off the screen. Valid pixels are
/// `0..width` by `0..height`.
pub fn check_bounds(points: &[(u32, u32)], (width, height): (u32, u32)) -> AdbResult<()> {
    for &(x, y) in points {
        if x >= width || y >= height {
            return Err(AdbError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
    }
    Ok(())
}

/// Parse `wm size` output, e.g. "Physical size: 1080x2280".
pub fn parse_screen_size(stdout: &str) -> AdbResult<(u32, u32)> {
    for line in stdout.lines() {
        if let Some(size_str) = line.strip_prefix("Physical size: ") {
            let parts: Vec<&str> = size_str.trim().split('x').collect();
            if parts.len() == 2
                && let (Ok(x), Ok(y)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>())
            {
                return Ok((x, y));
            }
        }
    }
    Err(AdbError::ScreenSizeParseFailed)
}

/// Build `input swipe` arguments, appending the duration when given.
pub fn swipe_args(x1: u32, y1: u32, x2: u32, y2: u32, duration: Option<u32>) -> Vec<String> {
    let mut args: Vec<String> = vec!["input".into(), "swipe".into()];
    args.extend([x1, y1, x2, y2].iter().map(|v| v.to_string()));
    if let Some(d) = duration {
        args.push(d.to_string());
    }
    args
}

/// Network serials ("host:port") need an `adb connect` before use.
pub fn is_network_serial(name: &str) -> bool {
    name.rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
}
