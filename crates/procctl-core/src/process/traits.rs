//! Process control capability trait.

use async_trait::async_trait;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationSignal {
    /// A request the target may intercept before exiting (SIGTERM).
    Graceful,
    /// An unmaskable request the OS enforces immediately (SIGKILL).
    Forced,
}

impl TerminationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationSignal::Graceful => "SIGTERM",
            TerminationSignal::Forced => "SIGKILL",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a relaunch needs to start an application again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Launchable bundle path, when it could be resolved.
    pub bundle_path: Option<PathBuf>,
    /// Human-readable application name, the fallback launch key.
    pub name: String,
}

impl AppIdentity {
    /// Build an identity, dropping an empty path.
    pub fn new(bundle_path: Option<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            bundle_path: bundle_path.filter(|p| !p.as_os_str().is_empty()),
            name: name.into(),
        }
    }

    /// The key used to relaunch: the bundle path if known, else the name.
    pub fn launch_target(&self) -> LaunchTarget {
        match &self.bundle_path {
            Some(path) => LaunchTarget::Path(path.clone()),
            None => LaunchTarget::Name(self.name.clone()),
        }
    }
}

/// Argument of a launch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LaunchTarget {
    Path(PathBuf),
    Name(String),
}

impl fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchTarget::Path(path) => write!(f, "{}", path.display()),
            LaunchTarget::Name(name) => f.write_str(name),
        }
    }
}

/// OS capabilities the process actions are built on.
///
/// Every call is best-effort from the caller's point of view; the
/// dispatcher and the restart orchestrator log failures and move on.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Deliver a termination signal to `pid`.
    async fn send_signal(&self, pid: u32, signal: TerminationSignal) -> Result<()>;

    /// Whether the process table has a live entry for `pid`.
    ///
    /// An exited process is `Ok(false)`, not an error.
    async fn is_running(&self, pid: u32) -> Result<bool>;

    /// Best-effort lookup of the launchable bundle path of a running process.
    async fn resolve_bundle_path(&self, pid: u32) -> Option<PathBuf>;

    /// Start an application by path or by name.
    async fn launch(&self, target: &LaunchTarget) -> Result<()>;
}
