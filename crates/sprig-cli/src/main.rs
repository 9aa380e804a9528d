mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use sprig_porcelain::PorcelainError;
use tracing_subscriber::EnvFilter;

use commands::Commands;

#[derive(Parser)]
#[command(name = "sprig", about = "Record and inspect changes in a git repository", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Run as if started in <path>
    #[arg(short = 'C', global = true)]
    change_dir: Option<PathBuf>,

    /// Set a configuration value (key=value)
    #[arg(short = 'c', global = true)]
    config: Vec<String>,

    /// Set the path to the .git directory
    #[arg(long = "git-dir", global = true)]
    git_dir: Option<PathBuf>,
}

/// Rewrite `log -<n>` into `log --max-count <n>`.
fn preprocess_args() -> Vec<String> {
    let args: Vec<String> = std::env::args().collect();
    let is_log = args.iter().any(|a| a == "log");
    let mut result = Vec::with_capacity(args.len());

    for arg in args {
        if let Some(count) = arg.strip_prefix('-') {
            if is_log && !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) {
                result.push("--max-count".to_string());
                result.push(count.to_string());
                continue;
            }
        }
        result.push(arg);
    }
    result
}

/// Log to stderr, filtered by `SPRIG_LOG` (warnings only by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPRIG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse_from(preprocess_args()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(128),
            }
        }
    };

    if let Some(dir) = &cli.change_dir {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("fatal: cannot change to '{}': {}", dir.display(), e);
            process::exit(128);
        }
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            if let Some(PorcelainError::NothingStaged) = e.downcast_ref::<PorcelainError>() {
                println!("{e}");
                process::exit(1);
            }
            eprintln!("fatal: {e}");
            process::exit(128);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    commands::run(cli)
}
