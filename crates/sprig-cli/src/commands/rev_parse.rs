use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use sprig_porcelain::commit_id;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct RevParseArgs {
    /// Print the abbreviated id
    #[arg(long)]
    short: bool,

    /// Revisions to resolve
    #[arg(required = true)]
    revisions: Vec<String>,
}

pub fn run(args: &RevParseArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for rev in &args.revisions {
        let oid = commit_id(&repo, rev)?;
        if args.short {
            writeln!(out, "{}", oid.short_hex())?;
        } else {
            writeln!(out, "{oid}")?;
        }
    }
    Ok(0)
}
