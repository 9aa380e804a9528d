use std::io::{self, Write};

use anyhow::{bail, Result};
use clap::Args;
use sprig_porcelain::{log, DEFAULT_LOG_LIMIT};
use sprig_utils::GitDate;

use super::{open_repo, write_commit_medium};
use crate::Cli;

#[derive(Args)]
pub struct LogArgs {
    /// Show at most <n> commits
    #[arg(short = 'n', long = "max-count", default_value_t = DEFAULT_LOG_LIMIT, allow_negative_numbers = true)]
    max_count: i64,

    /// Only show commits made at or after this date
    #[arg(long, alias = "since", value_name = "date")]
    after: Option<String>,

    /// One line per commit: abbreviated id and summary
    #[arg(long)]
    oneline: bool,

    /// Where to start; HEAD by default
    revision: Option<String>,
}

pub fn run(args: &LogArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let after = match &args.after {
        Some(raw) => Some(GitDate::parse(raw)?.timestamp),
        None => None,
    };

    let rev = match &args.revision {
        Some(rev) => rev.as_str(),
        None if repo.is_unborn()? => {
            let branch = repo.current_branch()?.unwrap_or_else(|| "HEAD".into());
            bail!("your current branch '{branch}' does not have any commits yet");
        }
        None => "HEAD",
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, info) in log(&repo, rev, args.max_count, after)?.iter().enumerate() {
        if args.oneline {
            writeln!(out, "{} {}", info.id.short_hex(), info.summary())?;
        } else {
            if i > 0 {
                writeln!(out)?;
            }
            write_commit_medium(&mut out, info)?;
        }
    }
    Ok(0)
}
