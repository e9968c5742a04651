//! Platform abstraction layer.
//!
//! All `#[cfg]` blocks for OS-specific behavior live in this module rather
//! than scattered throughout the codebase.
//!
//! # Supported Platforms
//!
//! - **macOS**: Full support (bundle resolution, `open` relaunch)
//! - **Linux**: Signals and liveness; relaunch runs the executable directly
//! - **Windows**: `taskkill` signals, `start` relaunch

pub mod process;

pub use process::{
    find_app_bundle, is_process_running, launch, resolve_bundle_path, send_signal,
    SystemProcessControl,
};

/// Returns the current platform name.
pub fn current_platform() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "linux"
    }
    #[cfg(target_os = "windows")]
    {
        "windows"
    }
    #[cfg(target_os = "macos")]
    {
        "macos"
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform() {
        let platform = current_platform();
        assert!(["linux", "windows", "macos", "unknown"].contains(&platform));
    }
}
