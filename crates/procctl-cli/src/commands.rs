//! Subcommand implementations.

use anyhow::{anyhow, Context, Result};
use procctl_core::{
    build_menu, ActionDispatcher, ActionTimings, MonitorModule, ProcessAction, ProcessLister,
    ProcessSnapshot, RefreshEvent,
};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;

/// Slack on top of the configured delays before giving up on a refresh.
const WAIT_MARGIN: Duration = Duration::from_secs(2);

const NAME_WIDTH: usize = 32;

#[derive(Debug, Serialize)]
struct ActionSummary {
    action: ProcessAction,
    pid: u32,
    refreshed: Vec<MonitorModule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    listings: Vec<ModuleListing>,
}

/// What one monitor module shows after a refresh.
#[derive(Debug, Serialize)]
struct ModuleListing {
    module: MonitorModule,
    rows: Vec<ProcessSnapshot>,
}

pub async fn list(module: MonitorModule, limit: usize, json: bool) -> Result<()> {
    let mut listings = requery(vec![module], limit).await?;
    let rows = listings.pop().map(|listing| listing.rows).unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_rows(&rows);
    }
    Ok(())
}

/// Sample the process table once and build each module's list from it.
async fn requery(modules: Vec<MonitorModule>, limit: usize) -> Result<Vec<ModuleListing>> {
    tokio::task::spawn_blocking(move || {
        let mut lister = ProcessLister::new();
        lister.sample();
        listings(&lister, &modules, limit)
    })
    .await
    .context("process listing task failed")
}

fn listings(
    lister: &ProcessLister,
    modules: &[MonitorModule],
    limit: usize,
) -> Vec<ModuleListing> {
    modules
        .iter()
        .map(|&module| ModuleListing {
            module,
            rows: lister.snapshot_for(module, limit),
        })
        .collect()
}

fn print_rows(rows: &[ProcessSnapshot]) {
    println!(
        "{:>8}  {:<width$} {:>7} {:>10}",
        "PID",
        "NAME",
        "CPU%",
        "MEM",
        width = NAME_WIDTH
    );
    for row in rows {
        println!(
            "{:>8}  {:<width$} {:>7.1} {:>10}",
            row.pid,
            truncate(&row.name, NAME_WIDTH),
            row.cpu_usage,
            format_bytes(row.memory_bytes),
            width = NAME_WIDTH
        );
    }
}

pub fn menu(pid: u32, name: &str, json: bool) -> Result<()> {
    let items = build_menu(pid, name);
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for item in items {
            println!("{}", item.label);
        }
    }
    Ok(())
}

/// Dispatch `action` and wait until both monitor modules were told to
/// refresh. With `relist`, each refreshed module's list is queried again
/// and printed.
pub async fn run_action(
    dispatcher: &ActionDispatcher,
    action: ProcessAction,
    pid: u32,
    name: &str,
    relist: Option<usize>,
    json: bool,
) -> Result<()> {
    let item = build_menu(pid, name)
        .into_iter()
        .find(|item| item.action == action)
        .ok_or_else(|| anyhow!("no menu entry for {}", action))?;

    // Subscribe first so no event can slip past
    let mut rx = dispatcher.notifier().subscribe();
    dispatcher.perform(&item);

    let budget = wait_budget(action, dispatcher.timings());
    let refreshed = tokio::time::timeout(budget, collect_refresh(&mut rx))
        .await
        .map_err(|_| anyhow!("no refresh within {:?}", budget))??;

    let listings = match relist {
        Some(limit) => requery(refreshed.clone(), limit).await?,
        None => Vec::new(),
    };

    let summary = ActionSummary {
        action,
        pid,
        refreshed,
        listings,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let modules: Vec<_> = summary.refreshed.iter().map(|m| m.as_str()).collect();
        println!("{} {}: refreshed {}", action, pid, modules.join(", "));
        for listing in &summary.listings {
            println!("\n[{}]", listing.module);
            print_rows(&listing.rows);
        }
    }
    Ok(())
}

async fn collect_refresh(rx: &mut broadcast::Receiver<RefreshEvent>) -> Result<Vec<MonitorModule>> {
    let mut seen = Vec::new();
    while seen.len() < MonitorModule::ALL.len() {
        let event = rx.recv().await?;
        if !seen.contains(&event.module) {
            seen.push(event.module);
        }
    }
    Ok(seen)
}

/// Longest an action can take to post its refresh, plus margin.
fn wait_budget(action: ProcessAction, timings: &ActionTimings) -> Duration {
    let work = match action {
        ProcessAction::Quit | ProcessAction::ForceQuit => timings.quit_refresh_delay(),
        ProcessAction::Restart => {
            timings.graceful_timeout()
                + timings.escalate_settle()
                + timings.relaunch_settle()
                + timings.post_launch_refresh_delay()
        }
    };
    work + WAIT_MARGIN
}

fn format_bytes(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let bytes = bytes as f64;
    if bytes >= GIB {
        format!("{:.2} GB", bytes / GIB)
    } else {
        format!("{:.1} MB", bytes / MIB)
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut cut: String = name.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
