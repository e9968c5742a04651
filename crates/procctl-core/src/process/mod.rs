//! Process actions.
//!
//! [`ActionDispatcher`] is what a UI holds: it turns quit, force-quit and
//! restart requests into signals, and hands restarts to the
//! [`RestartOrchestrator`]. Both run against a [`ProcessControl`], the
//! capability set the OS layer provides.
//!
//! # Example
//!
//! ```rust,no_run
//! use procctl_core::platform::SystemProcessControl;
//! use procctl_core::{ActionDispatcher, ActionTimings, RefreshNotifier};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> procctl_core::Result<()> {
//!     let notifier = RefreshNotifier::default();
//!     let mut refreshes = notifier.subscribe();
//!     let dispatcher = ActionDispatcher::new(
//!         Arc::new(SystemProcessControl::new()),
//!         notifier,
//!         ActionTimings::default(),
//!     )?;
//!
//!     dispatcher.restart(1234, "TextEdit");
//!
//!     while let Ok(event) = refreshes.recv().await {
//!         println!("refresh {}", event.module);
//!     }
//!     Ok(())
//! }
//! ```

mod dispatcher;
mod restart;
mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use dispatcher::ActionDispatcher;
pub use restart::{RestartOrchestrator, RestartOutcome, RestartReport, RestartState};
pub use traits::{AppIdentity, LaunchTarget, ProcessControl, TerminationSignal};
