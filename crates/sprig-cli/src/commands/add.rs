use anyhow::Result;
use clap::Args;
use sprig_porcelain::add;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct AddArgs {
    /// Allow adding otherwise ignored files
    #[arg(short, long)]
    force: bool,

    /// Files, directories or pathspecs to add
    #[arg(required = true)]
    pathspec: Vec<String>,
}

pub fn run(args: &AddArgs, cli: &Cli) -> Result<i32> {
    let mut repo = open_repo(cli)?;
    add(&mut repo, &args.pathspec, args.force)?;
    Ok(0)
}
