use std::io::{self, Write};

use anyhow::Result;
use bstr::{BString, ByteSlice};
use clap::Args;
use sprig_porcelain::rm;
use sprig_repository::Repository;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct RmArgs {
    /// Be quiet
    #[arg(short, long)]
    quiet: bool,

    /// Paths or pathspecs to remove from the index
    #[arg(required = true)]
    files: Vec<String>,
}

pub fn run(args: &RmArgs, cli: &Cli) -> Result<i32> {
    let mut repo = open_repo(cli)?;
    let before: Vec<BString> = tracked(&repo)?;
    rm(&mut repo, &args.files)?;

    if !args.quiet {
        let after = tracked(&repo)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for path in before.iter().filter(|p| after.binary_search(p).is_err()) {
            writeln!(out, "rm '{}'", path.to_str_lossy())?;
        }
    }
    Ok(0)
}

/// Index paths, sorted and without repeats.
fn tracked(repo: &Repository) -> Result<Vec<BString>> {
    let index = repo.current_index()?;
    let mut paths: Vec<BString> = index.iter().map(|e| e.path.clone()).collect();
    paths.dedup();
    Ok(paths)
}
