use std::io::{self, Write};

use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use sprig_porcelain::{conflicts, ConflictSide};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct ConflictsArgs {
    /// Only print the unmerged paths
    #[arg(long)]
    name_only: bool,
}

/// Exits 1 when there are unmerged paths.
pub fn run(args: &ConflictsArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let entries = conflicts(&repo)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in &entries {
        let path = entry.path.to_str_lossy();
        if args.name_only {
            writeln!(out, "{path}")?;
            continue;
        }
        // Same layout as `ls-files --unmerged`.
        let sides = [(1, entry.base), (2, entry.ours), (3, entry.theirs)];
        for (stage, side) in sides {
            if let Some(ConflictSide { id, mode }) = side {
                writeln!(out, "{mode} {id} {stage}\t{path}")?;
            }
        }
    }
    Ok(if entries.is_empty() { 0 } else { 1 })
}
