pub mod add;
pub mod commit;
pub mod conflicts;
pub mod init;
pub mod log;
pub mod ls;
pub mod merge_base;
pub mod rev_parse;
pub mod rm;
pub mod show_commit;
pub mod status;

use std::io::{self, Write};

use anyhow::Result;
use bstr::ByteSlice;
use clap::Subcommand;
use sprig_porcelain::CommitInfo;
use sprig_repository::{EnvOverrides, Repository};
use sprig_utils::date::DateFormat;
use tracing::debug;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init(init::InitArgs),
    /// Show staged, unstaged and untracked changes
    Status(status::StatusArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Remove paths from the index, keeping the working tree
    Rm(rm::RmArgs),
    /// Record the index as a new commit
    Commit(commit::CommitArgs),
    /// Show commit history, newest first
    Log(log::LogArgs),
    /// List tracked files
    Ls(ls::LsArgs),
    /// Show one commit's metadata
    ShowCommit(show_commit::ShowCommitArgs),
    /// Resolve a revision to a commit id
    RevParse(rev_parse::RevParseArgs),
    /// Check ancestry between two commits
    MergeBase(merge_base::MergeBaseArgs),
    /// List unmerged paths
    Conflicts(conflicts::ConflictsArgs),
}

/// Open a repository, respecting --git-dir and -c overrides.
pub fn open_repo(cli: &Cli) -> Result<Repository> {
    let env = EnvOverrides::from_env().with_config(cli.config.iter().cloned());
    let repo = if let Some(ref git_dir) = cli.git_dir {
        Repository::open_with_env(git_dir, &env)?
    } else {
        Repository::discover_with_env(".", &env)?
    };
    debug!(git_dir = %repo.git_dir().display(), bare = repo.is_bare(), "opened repository");
    Ok(repo)
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init(args) => init::run(args, &cli),
        Commands::Status(args) => status::run(args, &cli),
        Commands::Add(args) => add::run(args, &cli),
        Commands::Rm(args) => rm::run(args, &cli),
        Commands::Commit(args) => commit::run(args, &cli),
        Commands::Log(args) => log::run(args, &cli),
        Commands::Ls(args) => ls::run(args, &cli),
        Commands::ShowCommit(args) => show_commit::run(args, &cli),
        Commands::RevParse(args) => rev_parse::run(args, &cli),
        Commands::MergeBase(args) => merge_base::run(args, &cli),
        Commands::Conflicts(args) => conflicts::run(args, &cli),
    }
}

/// `git log` medium format: header lines, blank line, indented message.
pub(crate) fn write_commit_medium(out: &mut impl Write, info: &CommitInfo) -> io::Result<()> {
    writeln!(out, "commit {}", info.id)?;
    if info.parents.len() > 1 {
        let short: Vec<String> = info.parents.iter().map(|p| p.short_hex()).collect();
        writeln!(out, "Merge: {}", short.join(" "))?;
    }
    writeln!(out, "Author: {}", info.author)?;
    writeln!(out, "Date:   {}", info.author.date.format(DateFormat::Default))?;
    writeln!(out)?;
    for line in info.message.lines() {
        if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "    {}", line.to_str_lossy())?;
        }
    }
    Ok(())
}
