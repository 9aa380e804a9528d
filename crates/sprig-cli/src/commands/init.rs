use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sprig_repository::{InitOptions, Repository};

use crate::Cli;

#[derive(Args)]
pub struct InitArgs {
    /// Create a bare repository
    #[arg(long)]
    bare: bool,

    /// Name of the initial branch
    #[arg(short = 'b', long, value_name = "branch-name")]
    initial_branch: Option<String>,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// Directory to create the repository in
    directory: Option<PathBuf>,
}

pub fn run(args: &InitArgs, _cli: &Cli) -> Result<i32> {
    let target = match &args.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    if !target.exists() {
        std::fs::create_dir_all(&target)?;
    }

    let opts = InitOptions {
        bare: args.bare,
        default_branch: args.initial_branch.clone(),
    };
    let repo = Repository::init_opts(&target, &opts)?;

    if !args.quiet {
        let git_dir = std::fs::canonicalize(repo.git_dir())?;
        let kind = if args.bare { "bare " } else { "" };
        writeln!(io::stdout(), "Initialized empty {kind}Git repository in {}/", git_dir.display())?;
    }
    Ok(0)
}
