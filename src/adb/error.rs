use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' binary not usable: {detail}. Install Android Platform Tools (https://developer.android.com/tools/adb) or run with --impl=rust."
    )]
    AdbUnavailable { detail: String },

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("ADB server request '{operation}' failed: {source}")]
    Server {
        operation: String,
        source: adb_client::RustADBError,
    },

    #[error("Operation timed out after {duration:?}: {description}")]
    Timeout {
        duration: std::time::Duration,
        description: String,
    },

    #[error("Task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("No devices found")]
    NoDevices,

    #[error("Device '{name}' not found")]
    DeviceNotFound { name: String },

    #[error("Device '{name}' has no usable transport_id")]
    MissingTransportId { name: String },

    #[error("adb connect {serial} failed: {output}. Try: 'adb tcpip 5555'")]
    ConnectFailed { serial: String, output: String },

    #[error("Could not parse screen size from 'wm size' output.")]
    ScreenSizeParseFailed,

    #[error("Coordinates out of bounds: x={x}, y={y} (screen {width}x{height})")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl AdbError {
    /// Check if this error indicates the device went away mid-operation
    pub fn is_disconnect(&self) -> bool {
        match self {
            AdbError::Timeout { .. } | AdbError::NoDevices | AdbError::DeviceNotFound { .. } => true,
            AdbError::Server { source, .. } => is_disconnect_message(&source.to_string()),
            AdbError::CommandFailed { stderr, .. } => is_disconnect_message(stderr),
            _ => false,
        }
    }
}

pub(crate) fn is_disconnect_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["device offline", "not found", "no devices", "closed", "broken pipe", "clse"]
        .iter()
        .any(|needle| lower.contains(needle))
}
