//! Process listings for the monitor modules.
//!
//! The "RAM" and "CPU" modules show the heaviest processes by memory and by
//! CPU usage, and re-query these lists when a refresh event arrives
//! (see [`ProcessLister::snapshot_for`]).

mod processes;

pub use processes::{sort_snapshots, ProcessLister, ProcessSnapshot, SortKey};
