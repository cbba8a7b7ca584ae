// ADB module - device access for the merge bot
// Two interchangeable implementations: the external `adb` binary and a
// pure Rust client talking to the ADB server.

pub mod backend;
pub mod error;
pub mod rust_impl;
pub mod shell;
pub mod types;


// Re-export the main types and functions for easy access
pub use backend::{AdbBackend, BackendKind};
pub use error::{AdbError, AdbResult};
pub use types::{AdbClient, Device, ImageCapture};
