//! Shared test double for the scenario tests.

use async_trait::async_trait;
use procctl_core::{LaunchTarget, ProcctlError, ProcessControl, Result, TerminationSignal};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Resolve,
    Signal(TerminationSignal),
    Probe(bool),
    Launch(LaunchTarget),
}

/// A fake target process. It exits `exit_after` the graceful signal, or
/// never if that is `None`; the forced signal always kills it.
pub struct FakeProcess {
    pub pid: u32,
    bundle_path: Option<PathBuf>,
    exit_after: Option<Duration>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    graceful_at: Option<Instant>,
    killed: bool,
    log: Vec<(Instant, u32, Event)>,
}

impl FakeProcess {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            bundle_path: None,
            exit_after: None,
            state: Mutex::new(State::default()),
        }
    }

    pub fn bundle(mut self, path: &str) -> Self {
        self.bundle_path = Some(PathBuf::from(path));
        self
    }

    pub fn exits_after(mut self, delay: Duration) -> Self {
        self.exit_after = Some(delay);
        self
    }

    pub fn log(&self) -> Vec<(Instant, u32, Event)> {
        self.state.lock().unwrap().log.clone()
    }

    /// Time of the first logged event matching `pred`.
    pub fn first(&self, pred: impl Fn(&Event) -> bool) -> Option<Instant> {
        self.log()
            .into_iter()
            .find(|(_, _, e)| pred(e))
            .map(|(at, _, _)| at)
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.log().iter().filter(|(_, _, e)| pred(e)).count()
    }

    /// Moment the process stopped existing, if it did.
    pub fn exited_at(&self) -> Option<Instant> {
        let state = self.state.lock().unwrap();
        match (state.graceful_at, self.exit_after) {
            (Some(at), Some(delay)) => Some(at + delay),
            _ => None,
        }
    }

    fn push(&self, state: &mut State, event: Event) {
        state.log.push((Instant::now(), self.pid, event));
    }
}

#[async_trait]
impl ProcessControl for FakeProcess {
    async fn send_signal(&self, pid: u32, signal: TerminationSignal) -> Result<()> {
        if pid != self.pid {
            return Err(ProcctlError::ProcessNotFound(pid));
        }
        let mut state = self.state.lock().unwrap();
        self.push(&mut state, Event::Signal(signal));
        match signal {
            TerminationSignal::Graceful => {
                state.graceful_at.get_or_insert_with(Instant::now);
            }
            TerminationSignal::Forced => state.killed = true,
        }
        Ok(())
    }

    async fn is_running(&self, pid: u32) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let running = pid == self.pid
            && !state.killed
            && match (state.graceful_at, self.exit_after) {
                (Some(at), Some(delay)) => at.elapsed() < delay,
                _ => true,
            };
        self.push(&mut state, Event::Probe(running));
        Ok(running)
    }

    async fn resolve_bundle_path(&self, _pid: u32) -> Option<PathBuf> {
        let mut state = self.state.lock().unwrap();
        self.push(&mut state, Event::Resolve);
        self.bundle_path.clone()
    }

    async fn launch(&self, target: &LaunchTarget) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.push(&mut state, Event::Launch(target.clone()));
        Ok(())
    }
}
