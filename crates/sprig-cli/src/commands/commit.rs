use std::io::{self, Write};

use anyhow::{bail, Result};
use clap::Args;
use sprig_porcelain::identity::parse_identity;
use sprig_porcelain::{commit, commit_all, commit_info, default_identity, PorcelainError, Role};
use sprig_utils::GitDate;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct CommitArgs {
    /// Commit message; repeated messages become separate paragraphs
    #[arg(short = 'm', long = "message", num_args = 1)]
    message: Vec<String>,

    /// Stage modified and deleted tracked files first
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Override the author (format: "Name <email>")
    #[arg(long, value_name = "author")]
    author: Option<String>,

    /// Override the author date
    #[arg(long, value_name = "date")]
    date: Option<String>,

    /// Suppress the summary line
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: &CommitArgs, cli: &Cli) -> Result<i32> {
    if args.message.is_empty() {
        bail!("no commit message given, use -m");
    }
    let message = args.message.join("\n\n");
    let mut repo = open_repo(cli)?;

    let author = match &args.author {
        Some(ident) => {
            let date = match &args.date {
                Some(raw) => GitDate::parse(raw)?,
                None => GitDate::now(),
            };
            Some(parse_identity(ident, date)?)
        }
        None if args.date.is_some() => bail!("--date requires --author"),
        None => None,
    };

    // The committer signs as the author unless an identity of its own is
    // configured.
    let committer = match default_identity(&repo, Role::Committer) {
        Ok(sig) => Some(sig),
        Err(PorcelainError::NoIdentityConfigured { .. }) => None,
        Err(e) => return Err(e.into()),
    };

    let oid = if args.all {
        commit_all(&mut repo, &message, author.as_ref(), committer.as_ref())?
    } else {
        commit(&mut repo, &message, author.as_ref(), committer.as_ref())?
    };

    if !args.quiet {
        let info = commit_info(&repo, &oid.to_hex())?;
        let branch = repo.current_branch()?.unwrap_or_else(|| "detached HEAD".into());
        let root = if info.parents.is_empty() { " (root-commit)" } else { "" };
        writeln!(io::stdout(), "[{branch}{root} {}] {}", oid.short_hex(), info.summary())?;
    }
    Ok(0)
}
