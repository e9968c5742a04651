//! procctl core - process actions for a process monitoring UI.
//!
//! Provides quit, force-quit and a supervised restart (graceful request,
//! bounded wait, escalation, relaunch) for running applications, plus the
//! refresh notifications that tell process-list views to re-query.
//!
//! The UI holds an [`ActionDispatcher`], builds per-row menus with
//! [`build_menu`], and subscribes to the dispatcher's [`RefreshNotifier`].
//! OS access goes through the [`ProcessControl`] trait; the default
//! implementation is [`platform::SystemProcessControl`].

pub mod config;
pub mod error;
pub mod menu;
pub mod notify;
pub mod platform;
pub mod process;
pub mod system;

// Re-export commonly used types
pub use config::{ActionConfig, ActionTimings};
pub use error::{ProcctlError, Result};
pub use menu::{build_menu, MenuItem, ProcessAction};
pub use notify::{MonitorModule, RefreshEvent, RefreshNotifier};
pub use process::{
    ActionDispatcher, AppIdentity, LaunchTarget, ProcessControl, RestartOrchestrator,
    RestartOutcome, RestartReport, RestartState, TerminationSignal,
};
pub use system::{ProcessLister, ProcessSnapshot, SortKey};
