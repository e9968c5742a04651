//! Recording [`ProcessControl`] double for unit tests.

use super::traits::{LaunchTarget, ProcessControl, TerminationSignal};
use crate::error::{ProcctlError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Resolve(u32),
    Signal(u32, TerminationSignal),
    IsRunning(u32),
    Launch(LaunchTarget),
}

/// Simulated target that exits `dies_after` the graceful signal (never, if
/// unset) and immediately on the forced one.
#[derive(Default)]
pub(crate) struct MockControl {
    bundle_path: Option<PathBuf>,
    dies_after: Option<Duration>,
    fail_signals: bool,
    fail_liveness: bool,
    fail_launch: bool,
    graceful_at: Mutex<Option<Instant>>,
    killed: AtomicBool,
    calls: Mutex<Vec<(Instant, Call)>>,
}

impl MockControl {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_bundle_path(mut self, path: &str) -> Self {
        self.bundle_path = Some(PathBuf::from(path));
        self
    }

    pub(crate) fn dies_after(mut self, delay: Duration) -> Self {
        self.dies_after = Some(delay);
        self
    }

    pub(crate) fn failing_signals(mut self) -> Self {
        self.fail_signals = true;
        self
    }

    pub(crate) fn failing_liveness(mut self) -> Self {
        self.fail_liveness = true;
        self
    }

    pub(crate) fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub(crate) fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn signals(&self) -> Vec<(u32, TerminationSignal)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Signal(pid, signal) => Some((pid, signal)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn launches(&self) -> Vec<LaunchTarget> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Launch(target) => Some(target),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProcessControl for MockControl {
    async fn send_signal(&self, pid: u32, signal: TerminationSignal) -> Result<()> {
        self.record(Call::Signal(pid, signal));
        if self.fail_signals {
            return Err(ProcctlError::Signal {
                pid,
                signal: signal.to_string(),
                message: "EPERM".into(),
            });
        }
        match signal {
            TerminationSignal::Graceful => {
                self.graceful_at.lock().unwrap().get_or_insert_with(Instant::now);
            }
            TerminationSignal::Forced => self.killed.store(true, Ordering::SeqCst),
        }
        Ok(())
    }

    async fn is_running(&self, pid: u32) -> Result<bool> {
        self.record(Call::IsRunning(pid));
        if self.fail_liveness {
            return Err(ProcctlError::Other("process table unavailable".into()));
        }
        if self.killed.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let graceful_at = *self.graceful_at.lock().unwrap();
        Ok(match (graceful_at, self.dies_after) {
            (Some(at), Some(delay)) => at.elapsed() < delay,
            _ => true,
        })
    }

    async fn resolve_bundle_path(&self, pid: u32) -> Option<PathBuf> {
        self.record(Call::Resolve(pid));
        self.bundle_path.clone()
    }

    async fn launch(&self, target: &LaunchTarget) -> Result<()> {
        self.record(Call::Launch(target.clone()));
        if self.fail_launch {
            return Err(ProcctlError::LaunchFailed {
                target: target.to_string(),
                message: "not found".into(),
            });
        }
        Ok(())
    }
}
