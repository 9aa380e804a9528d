use std::io::{self, Write};

use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use sprig_porcelain::commit_info;
use sprig_utils::date::DateFormat;

use super::{open_repo, write_commit_medium};
use crate::Cli;

#[derive(Args)]
pub struct ShowCommitArgs {
    /// Print the raw headers and message instead
    #[arg(long)]
    raw: bool,

    /// Commit to show
    #[arg(default_value = "HEAD")]
    revision: String,
}

pub fn run(args: &ShowCommitArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let info = commit_info(&repo, &args.revision)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !args.raw {
        write_commit_medium(&mut out, &info)?;
        return Ok(0);
    }

    writeln!(out, "commit {}", info.id)?;
    writeln!(out, "tree {}", info.tree)?;
    for parent in &info.parents {
        writeln!(out, "parent {parent}")?;
    }
    writeln!(out, "author {} {}", info.author, info.author.date.format(DateFormat::Raw))?;
    writeln!(out, "committer {} {}", info.committer, info.committer.date.format(DateFormat::Raw))?;
    writeln!(out)?;
    write!(out, "{}", info.message.to_str_lossy())?;
    Ok(0)
}
