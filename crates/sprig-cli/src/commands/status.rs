use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::Result;
use bstr::{BString, ByteSlice};
use clap::Args;
use sprig_index::Pathspec;
use sprig_porcelain::{status, StagedFilter, Status, StatusEntry};
use sprig_repository::Repository;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct StatusArgs {
    /// Only show changes between HEAD and the index
    #[arg(long, conflicts_with = "unstaged")]
    staged: bool,

    /// Only show changes between the index and the working tree
    #[arg(long)]
    unstaged: bool,

    /// Give the output in the short, machine-readable format
    #[arg(long, alias = "short", short = 's')]
    porcelain: bool,

    /// Limit the report to these paths
    paths: Vec<String>,
}

pub fn run(args: &StatusArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let filter = if args.staged {
        StagedFilter::StagedOnly
    } else if args.unstaged {
        StagedFilter::UnstagedOnly
    } else {
        StagedFilter::Both
    };
    let pathspec = Pathspec::parse(&args.paths)?;
    let entries = status(&repo, filter, &pathspec)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.porcelain {
        print_short(&entries, &mut out)?;
    } else {
        print_long(&repo, &entries, &mut out)?;
    }
    Ok(0)
}

/// `XY path`: X is the staged code, Y the unstaged one.
fn print_short(entries: &[StatusEntry], out: &mut impl Write) -> Result<()> {
    let mut rows: BTreeMap<&BString, (char, char, Option<&BString>)> = BTreeMap::new();
    for entry in entries {
        let row = rows.entry(&entry.path).or_insert((' ', ' ', None));
        match (entry.status, entry.staged) {
            (Status::Conflicted, _) => (row.0, row.1) = ('U', 'U'),
            (Status::New, false) => (row.0, row.1) = ('?', '?'),
            (status, true) => {
                row.0 = status.as_char();
                row.2 = entry.source.as_ref();
            }
            (status, false) => row.1 = status.as_char(),
        }
    }

    for (path, (x, y, source)) in rows {
        match source {
            Some(source) => writeln!(out, "{x}{y} {} -> {}", source.to_str_lossy(), path.to_str_lossy())?,
            None => writeln!(out, "{x}{y} {}", path.to_str_lossy())?,
        }
    }
    Ok(())
}

fn print_long(repo: &Repository, entries: &[StatusEntry], out: &mut impl Write) -> Result<()> {
    match repo.current_branch()? {
        Some(branch) => writeln!(out, "On branch {branch}")?,
        None => match repo.head_oid()? {
            Some(oid) => writeln!(out, "HEAD detached at {}", oid.short_hex())?,
            None => writeln!(out, "HEAD detached")?,
        },
    }
    if repo.is_unborn()? {
        writeln!(out, "\nNo commits yet")?;
    }

    let staged: Vec<&StatusEntry> = entries.iter().filter(|e| e.staged).collect();
    let conflicted: Vec<&StatusEntry> = entries.iter().filter(|e| e.status == Status::Conflicted).collect();
    let unstaged: Vec<&StatusEntry> = entries
        .iter()
        .filter(|e| !e.staged && !matches!(e.status, Status::New | Status::Conflicted))
        .collect();
    let untracked: Vec<&StatusEntry> = entries
        .iter()
        .filter(|e| !e.staged && e.status == Status::New)
        .collect();

    section(out, "Changes to be committed:", &staged)?;
    section(out, "Unmerged paths:", &conflicted)?;
    section(out, "Changes not staged for commit:", &unstaged)?;
    if !untracked.is_empty() {
        writeln!(out, "\nUntracked files:")?;
        for entry in &untracked {
            writeln!(out, "\t{}", entry.path.to_str_lossy())?;
        }
    }

    if entries.is_empty() {
        writeln!(out, "\nnothing to commit, working tree clean")?;
    }
    Ok(())
}

fn section(out: &mut impl Write, title: &str, entries: &[&StatusEntry]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{title}")?;
    for entry in entries {
        let label = format!("{}:", entry.status);
        match &entry.source {
            Some(source) => writeln!(
                out,
                "\t{label:<12}{} -> {}",
                source.to_str_lossy(),
                entry.path.to_str_lossy()
            )?,
            None => writeln!(out, "\t{label:<12}{}", entry.path.to_str_lossy())?,
        }
    }
    Ok(())
}
