use std::io::{self, Write};

use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use sprig_porcelain::ls;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct LsArgs {
    /// Only print paths
    #[arg(long)]
    name_only: bool,

    /// List this commit's tree instead of the index
    revision: Option<String>,
}

pub fn run(args: &LsArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let entries = ls(&repo, args.revision.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in &entries {
        if args.name_only {
            writeln!(out, "{}", entry.path.to_str_lossy())?;
        } else {
            writeln!(out, "{} {}\t{}", entry.mode, entry.id, entry.path.to_str_lossy())?;
        }
    }
    Ok(0)
}
