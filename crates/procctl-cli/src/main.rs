//! procctl - quit, force-quit and restart running applications.
//!
//! Thin command-line front end over `procctl-core`. Logs go to stderr,
//! results to stdout.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use procctl_core::platform::{self, SystemProcessControl};
use procctl_core::{ActionDispatcher, ActionTimings, MonitorModule, ProcessAction, RefreshNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "procctl")]
#[command(about = "Quit, force-quit and restart running applications")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Timing configuration file (JSON); defaults to the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List running processes, heaviest first
    List {
        /// Column to sort by
        #[arg(long, value_enum, default_value_t = SortArg::Ram)]
        sort: SortArg,

        /// Maximum number of rows
        #[arg(long, default_value = "15")]
        limit: usize,
    },
    /// Show the action menu for a process
    Menu { pid: u32, name: String },
    /// Ask a process to terminate
    Quit {
        pid: u32,
        #[command(flatten)]
        relist: Relist,
    },
    /// Terminate a process immediately
    ForceQuit {
        pid: u32,
        #[command(flatten)]
        relist: Relist,
    },
    /// Terminate a process and launch its application again
    Restart {
        pid: u32,
        name: String,
        #[command(flatten)]
        relist: Relist,
    },
}

#[derive(clap::Args, Debug)]
struct Relist {
    /// Re-list each refreshed module with this many rows
    #[arg(long, value_name = "ROWS")]
    relist: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Ram,
    Cpu,
}

impl From<SortArg> for MonitorModule {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Ram => MonitorModule::Ram,
            SortArg::Cpu => MonitorModule::Cpu,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG wins over --debug
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!("Running on {}", platform::current_platform());

    let timings = ActionTimings::load_or_default(args.config.as_deref())?;

    let (action, pid, name, relist) = match args.command {
        Command::List { sort, limit } => {
            return commands::list(sort.into(), limit, args.json).await
        }
        Command::Menu { pid, name } => return commands::menu(pid, &name, args.json),
        Command::Quit { pid, relist } => (ProcessAction::Quit, pid, String::new(), relist),
        Command::ForceQuit { pid, relist } => {
            (ProcessAction::ForceQuit, pid, String::new(), relist)
        }
        Command::Restart { pid, name, relist } => (ProcessAction::Restart, pid, name, relist),
    };

    let dispatcher = ActionDispatcher::new(
        Arc::new(SystemProcessControl::new()),
        RefreshNotifier::default(),
        timings,
    )?;

    info!("{} requested for pid {}", action, pid);
    commands::run_action(&dispatcher, action, pid, &name, relist.relist, args.json).await
}
