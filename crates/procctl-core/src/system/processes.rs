//! Process table snapshots.

use crate::notify::MonitorModule;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Column a process list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Ram,
    Cpu,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Ram => f.write_str("ram"),
            SortKey::Cpu => f.write_str("cpu"),
        }
    }
}

/// One row of a process list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    /// CPU usage percentage (can exceed 100 on multi-core).
    pub cpu_usage: f32,
    /// Resident memory in bytes.
    pub memory_bytes: u64,
}

/// Order heaviest first by `key`, breaking ties by ascending pid.
pub fn sort_snapshots(snapshots: &mut [ProcessSnapshot], key: SortKey) {
    snapshots.sort_by(|a, b| {
        let primary = match key {
            SortKey::Ram => b.memory_bytes.cmp(&a.memory_bytes),
            SortKey::Cpu => b
                .cpu_usage
                .partial_cmp(&a.cpu_usage)
                .unwrap_or(Ordering::Equal),
        };
        primary.then(a.pid.cmp(&b.pid))
    });
}

/// Reads the process table through sysinfo.
///
/// CPU usage is a rate, so the first [`sample`](Self::sample) after
/// creation reports zero for every process; keep the lister around between
/// refreshes to get meaningful CPU numbers.
pub struct ProcessLister {
    system: System,
}

impl ProcessLister {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Refresh the process table (CPU and memory only).
    pub fn refresh(&mut self) {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new().with_cpu().with_memory(),
        );
    }

    /// Refresh twice, `MINIMUM_CPU_UPDATE_INTERVAL` apart, so CPU usage is
    /// populated. Blocks the calling thread.
    pub fn sample(&mut self) {
        self.refresh();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.refresh();
    }

    /// Current processes, heaviest first by `key`, at most `limit` rows.
    pub fn snapshot(&self, key: SortKey, limit: usize) -> Vec<ProcessSnapshot> {
        let mut rows: Vec<ProcessSnapshot> = self
            .system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessSnapshot {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                cpu_usage: process.cpu_usage(),
                memory_bytes: process.memory(),
            })
            .collect();

        sort_snapshots(&mut rows, key);
        rows.truncate(limit);
        rows
    }

    /// The list `module` displays, in that module's order.
    pub fn snapshot_for(&self, module: MonitorModule, limit: usize) -> Vec<ProcessSnapshot> {
        self.snapshot(module.sort_key(), limit)
    }
}

impl Default for ProcessLister {
    fn default() -> Self {
        Self::new()
    }
}
