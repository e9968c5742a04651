//! Supervised restart of a running application.
//!
//! A restart session is a single-shot state machine:
//!
//! ```text
//! Resolving -> GracefulPending -> (exited) ---------------> Relaunching
//!                              \-> (deadline) Escalating -> Relaunching
//! ```
//!
//! The launchable identity is captured while the target is still alive,
//! because it can no longer be looked up by pid once the process is gone.
//! Every OS call is best-effort; none of them can stop the session from
//! reaching the relaunch.

use super::traits::{AppIdentity, LaunchTarget, ProcessControl, TerminationSignal};
use crate::config::ActionTimings;
use crate::notify::RefreshNotifier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// States of a restart session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartState {
    Resolving,
    GracefulPending,
    Escalating,
    Relaunching,
}

/// How the target went down before the relaunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartOutcome {
    /// Exited on its own after the graceful request.
    Graceful,
    /// Still alive at the deadline and force-terminated.
    Forced,
}

/// Summary of a finished restart session.
#[derive(Debug, Clone, Serialize)]
pub struct RestartReport {
    pub session_id: Uuid,
    pub pid: u32,
    pub identity: AppIdentity,
    pub outcome: RestartOutcome,
    pub launch_target: LaunchTarget,
    pub started_at: DateTime<Utc>,
}

/// Per-invocation state, owned by the task running the session.
#[derive(Debug)]
struct RestartSession {
    id: Uuid,
    pid: u32,
    identity: AppIdentity,
    /// When graceful termination was requested.
    started_at: Instant,
    /// Exit confirmed by polling.
    terminated: bool,
    state: RestartState,
}

impl RestartSession {
    fn transition(&mut self, next: RestartState) {
        info!(from = ?self.state, to = ?next, "Restart state transition");
        self.state = next;
    }
}

/// Runs restart sessions against a [`ProcessControl`].
///
/// Cloning is cheap; each call to [`run`](Self::run) or
/// [`spawn`](Self::spawn) starts an independent session. Sessions for the
/// same pid are neither deduplicated nor serialized.
#[derive(Clone)]
pub struct RestartOrchestrator {
    control: Arc<dyn ProcessControl>,
    notifier: RefreshNotifier,
    timings: ActionTimings,
}

impl RestartOrchestrator {
    pub fn new(
        control: Arc<dyn ProcessControl>,
        notifier: RefreshNotifier,
        timings: ActionTimings,
    ) -> Self {
        Self {
            control,
            notifier,
            timings,
        }
    }

    /// Start a session on `runtime` and return without waiting for it.
    pub fn spawn(
        &self,
        runtime: &Handle,
        pid: u32,
        app_name: impl Into<String>,
    ) -> JoinHandle<RestartReport> {
        let orchestrator = self.clone();
        let app_name = app_name.into();
        runtime.spawn(async move { orchestrator.run(pid, app_name).await })
    }

    /// Run one session to completion.
    pub async fn run(&self, pid: u32, app_name: impl Into<String>) -> RestartReport {
        let session_id = Uuid::new_v4();
        let span = info_span!("restart", session = %session_id, pid);
        self.drive(session_id, pid, app_name.into())
            .instrument(span)
            .await
    }

    async fn drive(&self, session_id: Uuid, pid: u32, app_name: String) -> RestartReport {
        let started_at = Utc::now();

        // Resolving: must finish before any signal is sent
        info!("Restarting {} (pid {})", app_name, pid);
        let bundle_path = self.control.resolve_bundle_path(pid).await;
        let identity = AppIdentity::new(bundle_path, app_name);
        match &identity.bundle_path {
            Some(path) => debug!("Resolved {} to {}", identity.name, path.display()),
            None => warn!(
                "No bundle path for pid {}, relaunching by name {:?}",
                pid, identity.name
            ),
        }

        let mut session = RestartSession {
            id: session_id,
            pid,
            identity,
            started_at: Instant::now(),
            terminated: false,
            state: RestartState::Resolving,
        };
        session.transition(RestartState::GracefulPending);
        self.signal(pid, TerminationSignal::Graceful).await;
        self.wait_for_exit(&mut session).await;

        let outcome = if session.terminated {
            info!(
                "Process {} exited after {:?}",
                pid,
                session.started_at.elapsed()
            );
            RestartOutcome::Graceful
        } else {
            session.transition(RestartState::Escalating);
            self.signal(pid, TerminationSignal::Forced).await;
            sleep(self.timings.escalate_settle()).await;
            RestartOutcome::Forced
        };

        session.transition(RestartState::Relaunching);
        sleep(self.timings.relaunch_settle()).await;
        let launch_target = session.identity.launch_target();
        match self.control.launch(&launch_target).await {
            Ok(()) => info!("Relaunch requested for {}", launch_target),
            Err(e) => warn!("Relaunch of {} failed: {}", launch_target, e),
        }

        sleep(self.timings.post_launch_refresh_delay()).await;
        self.notifier.post_refresh();

        RestartReport {
            session_id: session.id,
            pid: session.pid,
            identity: session.identity,
            outcome,
            launch_target,
            started_at,
        }
    }

    /// Poll until the target is gone or the graceful deadline passes.
    async fn wait_for_exit(&self, session: &mut RestartSession) {
        let timeout = self.timings.graceful_timeout();
        let interval = self.timings.poll_interval();

        loop {
            if !self.probe(session.pid).await {
                session.terminated = true;
                return;
            }

            let elapsed = session.started_at.elapsed();
            if elapsed >= timeout {
                warn!(
                    "Process {} still running after {:?}, escalating",
                    session.pid, timeout
                );
                return;
            }
            sleep(interval.min(timeout - elapsed)).await;
        }
    }

    /// Liveness check; a failed query counts as still running.
    async fn probe(&self, pid: u32) -> bool {
        match self.control.is_running(pid).await {
            Ok(running) => running,
            Err(e) => {
                warn!("Liveness query for {} failed: {}", pid, e);
                true
            }
        }
    }

    async fn signal(&self, pid: u32, signal: TerminationSignal) {
        match self.control.send_signal(pid, signal).await {
            Ok(()) => debug!("Sent {} to {}", signal, pid),
            Err(e) if e.is_process_gone() => debug!("Process {} already gone", pid),
            Err(e) => warn!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MonitorModule;
    use crate::process::mock::{Call, MockControl};
    use std::path::PathBuf;
    use std::time::Duration;

    fn orchestrator(control: Arc<MockControl>) -> (RestartOrchestrator, RefreshNotifier) {
        let notifier = RefreshNotifier::default();
        let orchestrator =
            RestartOrchestrator::new(control, notifier.clone(), ActionTimings::default());
        (orchestrator, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_exit_skips_escalation() {
        let control = Arc::new(
            MockControl::new()
                .with_bundle_path("/Applications/TextEdit.app")
                .dies_after(Duration::from_millis(500)),
        );
        let (orchestrator, _notifier) = orchestrator(control.clone());

        let report = orchestrator.run(1234, "TextEdit").await;

        assert_eq!(report.outcome, RestartOutcome::Graceful);
        assert_eq!(control.signals(), vec![(1234, TerminationSignal::Graceful)]);
        assert_eq!(
            report.launch_target,
            LaunchTarget::Path(PathBuf::from("/Applications/TextEdit.app"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_escalates_to_forced() {
        let control = Arc::new(MockControl::new());
        let (orchestrator, _notifier) = orchestrator(control.clone());

        let report = orchestrator.run(5678, "Finder").await;

        assert_eq!(report.outcome, RestartOutcome::Forced);
        assert_eq!(
            control.signals(),
            vec![
                (5678, TerminationSignal::Graceful),
                (5678, TerminationSignal::Forced)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_resolved_before_graceful_signal() {
        let control = Arc::new(MockControl::new().dies_after(Duration::ZERO));
        let (orchestrator, _notifier) = orchestrator(control.clone());

        orchestrator.run(42, "Notes").await;

        let calls = control.calls();
        let resolve = calls
            .iter()
            .position(|c| matches!(c, Call::Resolve(42)))
            .unwrap();
        let graceful = calls
            .iter()
            .position(|c| matches!(c, Call::Signal(42, TerminationSignal::Graceful)))
            .unwrap();
        assert!(resolve < graceful);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_path_launches_by_name() {
        let control = Arc::new(MockControl::new().dies_after(Duration::from_millis(100)));
        let (orchestrator, _notifier) = orchestrator(control.clone());

        let report = orchestrator.run(7, "Calculator").await;

        assert!(report.identity.bundle_path.is_none());
        assert_eq!(
            control.launches(),
            vec![LaunchTarget::Name("Calculator".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_abort_session() {
        let control = Arc::new(
            MockControl::new()
                .failing_signals()
                .failing_liveness()
                .failing_launch(),
        );
        let (orchestrator, notifier) = orchestrator(control.clone());
        let mut rx = notifier.subscribe();

        let report = orchestrator.run(99, "Mail").await;

        // Liveness errors count as running, so the deadline decides
        assert_eq!(report.outcome, RestartOutcome::Forced);
        assert_eq!(control.launches().len(), 1);
        assert_eq!(rx.try_recv().unwrap().module, MonitorModule::Ram);
        assert_eq!(rx.try_recv().unwrap().module, MonitorModule::Cpu);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_exited_target_relaunches_without_polling_wait() {
        let control = Arc::new(MockControl::new().dies_after(Duration::ZERO));
        let (orchestrator, _notifier) = orchestrator(control.clone());

        let start = Instant::now();
        let report = orchestrator.run(11, "Preview").await;

        assert_eq!(report.outcome, RestartOutcome::Graceful);
        // relaunch settle + post-launch delay only
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1300));
        assert!(elapsed < Duration::from_millis(1300) + ActionTimings::default().poll_interval());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_returns_before_session_completes() {
        let control = Arc::new(MockControl::new());
        let (orchestrator, _notifier) = orchestrator(control.clone());

        let handle = orchestrator.spawn(&Handle::current(), 3, "Music");
        assert!(!handle.is_finished());
        assert!(control.launches().is_empty());

        let report = handle.await.unwrap();
        assert_eq!(report.pid, 3);
        assert_eq!(control.launches(), vec![LaunchTarget::Name("Music".into())]);
    }
}
