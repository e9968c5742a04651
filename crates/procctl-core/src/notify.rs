//! Refresh notifications for UI modules that display process lists.
//!
//! A [`RefreshNotifier`] is a broadcast channel. Any task may post to it;
//! UI collaborators subscribe and drain their receiver on their own
//! context, re-rendering the named module for each event.

use crate::system::SortKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::broadcast;
use tracing::debug;

/// Name of the event posted after a process action completes.
pub const REFRESH_EVENT_NAME: &str = "RefreshProcessList";

/// Payload key naming the module that should refresh.
pub const MODULE_KEY: &str = "module";

const DEFAULT_CAPACITY: usize = 64;

/// UI modules that show process lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonitorModule {
    #[serde(rename = "RAM")]
    Ram,
    #[serde(rename = "CPU")]
    Cpu,
}

impl MonitorModule {
    /// Every module a refresh is posted for, in posting order.
    pub const ALL: [MonitorModule; 2] = [MonitorModule::Ram, MonitorModule::Cpu];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorModule::Ram => "RAM",
            MonitorModule::Cpu => "CPU",
        }
    }

    /// How this module orders its process list.
    pub fn sort_key(&self) -> SortKey {
        match self {
            MonitorModule::Ram => SortKey::Ram,
            MonitorModule::Cpu => SortKey::Cpu,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RAM" => Some(MonitorModule::Ram),
            "CPU" => Some(MonitorModule::Cpu),
            _ => None,
        }
    }
}

impl fmt::Display for MonitorModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named event asking one module to refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshEvent {
    pub name: &'static str,
    pub module: MonitorModule,
}

impl RefreshEvent {
    pub fn new(module: MonitorModule) -> Self {
        Self {
            name: REFRESH_EVENT_NAME,
            module,
        }
    }

    /// Key-value payload of the event.
    pub fn payload(&self) -> HashMap<String, String> {
        HashMap::from([(MODULE_KEY.to_string(), self.module.as_str().to_string())])
    }
}

/// Broadcast channel for refresh events.
#[derive(Debug, Clone)]
pub struct RefreshNotifier {
    sender: broadcast::Sender<RefreshEvent>,
}

impl RefreshNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event posted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Post one refresh event per monitor module.
    pub fn post_refresh(&self) {
        for module in MonitorModule::ALL {
            if self.sender.send(RefreshEvent::new(module)).is_err() {
                debug!("No subscribers for {} refresh", module);
            }
        }
    }
}

impl Default for RefreshNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
