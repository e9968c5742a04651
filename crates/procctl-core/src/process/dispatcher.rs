//! Quit, force-quit and restart requests from the UI.

use super::restart::RestartOrchestrator;
use super::traits::{ProcessControl, TerminationSignal};
use crate::config::ActionTimings;
use crate::error::{ProcctlError, Result};
use crate::menu::{MenuItem, ProcessAction};
use crate::notify::RefreshNotifier;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, info, info_span, warn, Instrument};

/// Entry point for process actions.
///
/// Every operation returns immediately and reports nothing; the work runs
/// on the runtime the dispatcher was built with, and failures only show up
/// in the logs. Once an operation has done its work it posts one refresh
/// event per monitor module.
#[derive(Clone)]
pub struct ActionDispatcher {
    control: Arc<dyn ProcessControl>,
    notifier: RefreshNotifier,
    timings: ActionTimings,
    orchestrator: RestartOrchestrator,
    runtime: Handle,
}

impl ActionDispatcher {
    /// Create a dispatcher on the current tokio runtime.
    pub fn new(
        control: Arc<dyn ProcessControl>,
        notifier: RefreshNotifier,
        timings: ActionTimings,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| ProcctlError::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(control, notifier, timings, runtime))
    }

    /// Create a dispatcher that spawns its work on `runtime`.
    ///
    /// Use this when the caller lives on a thread outside the runtime, such
    /// as a UI event loop.
    pub fn with_runtime(
        control: Arc<dyn ProcessControl>,
        notifier: RefreshNotifier,
        timings: ActionTimings,
        runtime: Handle,
    ) -> Self {
        let orchestrator =
            RestartOrchestrator::new(control.clone(), notifier.clone(), timings.clone());
        Self {
            control,
            notifier,
            timings,
            orchestrator,
            runtime,
        }
    }

    pub fn notifier(&self) -> &RefreshNotifier {
        &self.notifier
    }

    pub fn timings(&self) -> &ActionTimings {
        &self.timings
    }

    /// Ask `pid` to terminate.
    pub fn quit(&self, pid: u32) {
        self.terminate(pid, TerminationSignal::Graceful);
    }

    /// Terminate `pid` immediately.
    pub fn force_quit(&self, pid: u32) {
        self.terminate(pid, TerminationSignal::Forced);
    }

    /// Restart `pid`, relaunching it as `app_name` if its bundle path
    /// cannot be resolved.
    pub fn restart(&self, pid: u32, app_name: &str) {
        info!("Restart requested for {} (pid {})", app_name, pid);
        drop(self.orchestrator.spawn(&self.runtime, pid, app_name));
    }

    /// Run the action a menu item is bound to.
    pub fn perform(&self, item: &MenuItem) {
        match item.action {
            ProcessAction::Restart => self.restart(item.pid, &item.app_name),
            ProcessAction::Quit => self.quit(item.pid),
            ProcessAction::ForceQuit => self.force_quit(item.pid),
        }
    }

    fn terminate(&self, pid: u32, signal: TerminationSignal) {
        let control = self.control.clone();
        let notifier = self.notifier.clone();
        let delay = self.timings.quit_refresh_delay();
        let span = info_span!("terminate", pid, %signal);

        self.runtime.spawn(
            async move {
                match control.send_signal(pid, signal).await {
                    Ok(()) => info!("Sent {} to {}", signal, pid),
                    Err(e) if e.is_process_gone() => debug!("Process {} already gone", pid),
                    Err(e) => warn!("{}", e),
                }
                // let the OS process the signal before lists re-query
                sleep(delay).await;
                notifier.post_refresh();
            }
            .instrument(span),
        );
    }
}
