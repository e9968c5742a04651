//! Platform-specific process primitives.
//!
//! Signal delivery, process table queries and application launching. The
//! free functions here are synchronous; [`SystemProcessControl`] wraps them
//! behind the async [`ProcessControl`] trait.

use crate::error::{ProcctlError, Result};
use crate::process::{LaunchTarget, ProcessControl, TerminationSignal};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, info, warn};

/// Send a termination signal to a single process.
///
/// # Platform Behavior
/// - **Linux/macOS**: `kill(pid, SIGTERM)` or `kill(pid, SIGKILL)`
/// - **Windows**: `taskkill /PID {pid}`, with `/F` for forced termination
///
/// A process that no longer exists yields [`ProcctlError::ProcessNotFound`].
pub fn send_signal(pid: u32, signal: TerminationSignal) -> Result<()> {
    // pid 0 and values that wrap to negative i32 address process groups
    if pid == 0 || pid > i32::MAX as u32 {
        return Err(ProcctlError::ProcessNotFound(pid));
    }

    #[cfg(unix)]
    {
        send_signal_unix(pid, signal)
    }

    #[cfg(windows)]
    {
        send_signal_windows(pid, signal)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = signal;
        Err(ProcctlError::Other(
            "Signal delivery not implemented for this platform".into(),
        ))
    }
}

#[cfg(unix)]
fn send_signal_unix(pid: u32, signal: TerminationSignal) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid as NixPid;

    let nix_signal = match signal {
        TerminationSignal::Graceful => Signal::SIGTERM,
        TerminationSignal::Forced => Signal::SIGKILL,
    };

    debug!("Sending {} to process {}", signal, pid);
    match kill(NixPid::from_raw(pid as i32), nix_signal) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(ProcctlError::ProcessNotFound(pid)),
        Err(e) => Err(ProcctlError::Signal {
            pid,
            signal: signal.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(windows)]
fn send_signal_windows(pid: u32, signal: TerminationSignal) -> Result<()> {
    use std::process::Command;

    let pid_arg = pid.to_string();
    let mut args = vec!["/PID", pid_arg.as_str()];
    if signal == TerminationSignal::Forced {
        args.push("/F");
    }

    debug!("Running taskkill {:?}", args);
    let output = Command::new("taskkill")
        .args(&args)
        .output()
        .map_err(|e| ProcctlError::Signal {
            pid,
            signal: signal.to_string(),
            message: format!("Failed to run taskkill: {}", e),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("not found") || stderr.contains("not running") {
        Err(ProcctlError::ProcessNotFound(pid))
    } else {
        Err(ProcctlError::Signal {
            pid,
            signal: signal.to_string(),
            message: stderr.trim().to_string(),
        })
    }
}

/// Check whether the process table has a live entry for `pid`.
///
/// Exited processes and zombies (exited but not yet reaped) are reported as
/// not running.
pub fn is_process_running(pid: u32) -> bool {
    let sysinfo_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sysinfo_pid]),
        true,
        ProcessRefreshKind::new(),
    );

    match system.process(sysinfo_pid) {
        Some(process) => !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
        None => false,
    }
}

/// Look up the launchable path of a running process.
///
/// # Platform Behavior
/// - **macOS**: the enclosing `.app` bundle of the executable
/// - **Other platforms**: the executable itself
///
/// Returns `None` when the process is gone or its executable is unknown.
pub fn resolve_bundle_path(pid: u32) -> Option<PathBuf> {
    let sysinfo_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sysinfo_pid]),
        true,
        ProcessRefreshKind::new().with_exe(UpdateKind::OnlyIfNotSet),
    );

    let exe = system.process(sysinfo_pid)?.exe()?;
    if exe.as_os_str().is_empty() {
        return None;
    }

    #[cfg(target_os = "macos")]
    {
        find_app_bundle(exe)
    }

    #[cfg(not(target_os = "macos"))]
    {
        Some(exe.to_path_buf())
    }
}

/// Nearest ancestor of `exe` (itself included) with an `.app` extension.
pub fn find_app_bundle(exe: &Path) -> Option<PathBuf> {
    exe.ancestors()
        .find(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("app"))
        })
        .map(Path::to_path_buf)
}

/// Build the command that starts `target`.
///
/// # Platform Behavior
/// - **macOS**: `open <path>` or `open -a <name>`
/// - **Windows**: `cmd /C start "" <target>`
/// - **Other Unix**: runs the path, or the name resolved through `PATH`
pub fn launch_command(target: &LaunchTarget) -> tokio::process::Command {
    #[cfg(target_os = "macos")]
    {
        let mut cmd = tokio::process::Command::new("open");
        match target {
            LaunchTarget::Path(path) => {
                cmd.arg(path);
            }
            LaunchTarget::Name(name) => {
                cmd.arg("-a").arg(name);
            }
        }
        cmd
    }

    #[cfg(windows)]
    {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        match target {
            LaunchTarget::Path(path) => cmd.arg(path),
            LaunchTarget::Name(name) => cmd.arg(name),
        };
        cmd
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    {
        match target {
            LaunchTarget::Path(path) => tokio::process::Command::new(path),
            LaunchTarget::Name(name) => tokio::process::Command::new(name),
        }
    }
}

/// Start an application detached from this process.
///
/// The child handle is dropped right away; tokio reaps it in the
/// background once it exits.
pub fn launch(target: &LaunchTarget) -> Result<()> {
    let mut cmd = launch_command(target);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);

    // Own process group, so signals aimed at us do not reach the relaunched app
    #[cfg(unix)]
    {
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }

    let child = cmd.spawn().map_err(|e| ProcctlError::LaunchFailed {
        target: target.to_string(),
        message: e.to_string(),
    })?;

    info!("Launched {} (pid {:?})", target, child.id());
    Ok(())
}

/// [`ProcessControl`] backed by the real operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessControl;

impl SystemProcessControl {
    pub fn new() -> Self {
        Self
    }
}

/// Run a blocking OS query off the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ProcctlError::Other(format!("Blocking task failed: {}", e)))
}

#[async_trait]
impl ProcessControl for SystemProcessControl {
    async fn send_signal(&self, pid: u32, signal: TerminationSignal) -> Result<()> {
        blocking(move || send_signal(pid, signal)).await?
    }

    async fn is_running(&self, pid: u32) -> Result<bool> {
        blocking(move || is_process_running(pid)).await
    }

    async fn resolve_bundle_path(&self, pid: u32) -> Option<PathBuf> {
        match blocking(move || resolve_bundle_path(pid)).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Bundle path lookup for {} failed: {}", pid, e);
                None
            }
        }
    }

    async fn launch(&self, target: &LaunchTarget) -> Result<()> {
        launch(target)
    }
}
