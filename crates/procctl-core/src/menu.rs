//! Context menu for a process row.
//!
//! Each item carries its [`ProcessAction`] together with the target pid and
//! application name; [`ActionDispatcher::perform`](crate::ActionDispatcher::perform)
//! maps the action to the matching operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operations offered for a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessAction {
    Restart,
    Quit,
    ForceQuit,
}

impl ProcessAction {
    /// Menu order.
    pub const ALL: [ProcessAction; 3] = [
        ProcessAction::Restart,
        ProcessAction::Quit,
        ProcessAction::ForceQuit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProcessAction::Restart => "Restart",
            ProcessAction::Quit => "Quit",
            ProcessAction::ForceQuit => "Force Quit",
        }
    }
}

impl fmt::Display for ProcessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the menu, bound to its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: ProcessAction,
    pub pid: u32,
    pub app_name: String,
}

/// Build the "Restart", "Quit", "Force Quit" menu for a process.
pub fn build_menu(pid: u32, app_name: &str) -> Vec<MenuItem> {
    ProcessAction::ALL
        .iter()
        .map(|&action| MenuItem {
            label: action.label(),
            action,
            pid,
            app_name: app_name.to_string(),
        })
        .collect()
}
