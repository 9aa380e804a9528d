use anyhow::Result;
use clap::Args;
use sprig_porcelain::commit_descendant_of;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct MergeBaseArgs {
    /// Check if the first commit is an ancestor of the second (exit 0=yes, 1=no)
    #[arg(long, required = true)]
    is_ancestor: bool,

    /// The presumed ancestor
    ancestor: String,

    /// The presumed descendant
    descendant: String,
}

pub fn run(args: &MergeBaseArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let found = commit_descendant_of(&repo, &args.descendant, &args.ancestor)?;
    Ok(if found { 0 } else { 1 })
}
