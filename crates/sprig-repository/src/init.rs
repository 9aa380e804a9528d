use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{DiscoveredRepo, InitOptions, RepoError, RepositoryKind};

const EXCLUDE_TEMPLATE: &str = "\
# Patterns listed here are ignored in this repository only.
# Lines that start with '#' are comments.
";

/// Create the git directory layout:
///
/// ```text
/// HEAD            ref: refs/heads/<default branch>
/// config          [core] repositoryformatversion, filemode, bare
/// description
/// info/exclude
/// objects/
/// refs/heads/
/// refs/tags/
/// ```
///
/// Running it on an existing repository changes nothing.
pub fn init_repository(path: &Path, options: &InitOptions) -> Result<DiscoveredRepo, RepoError> {
    let path = if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path.to_path_buf()
    };
    let (git_dir, work_tree, kind) = if options.bare {
        (path.clone(), None, RepositoryKind::Bare)
    } else {
        (path.join(".git"), Some(path.clone()), RepositoryKind::Normal)
    };

    if git_dir.join("HEAD").is_file() {
        debug!(git_dir = %git_dir.display(), "reinitializing existing repository");
        return canonical(git_dir, work_tree, kind);
    }

    fs::create_dir_all(git_dir.join("objects"))?;
    fs::create_dir_all(git_dir.join("refs").join("heads"))?;
    fs::create_dir_all(git_dir.join("refs").join("tags"))?;
    fs::create_dir_all(git_dir.join("info"))?;

    let branch = options.default_branch.as_deref().unwrap_or("main");
    fs::write(git_dir.join("HEAD"), format!("ref: refs/heads/{branch}\n"))?;

    let config = format!(
        "[core]\n\trepositoryformatversion = 0\n\tfilemode = {}\n\tbare = {}\n",
        cfg!(unix),
        options.bare
    );
    fs::write(git_dir.join("config"), config)?;
    fs::write(
        git_dir.join("description"),
        "Unnamed repository; edit this file 'description' to name the repository.\n",
    )?;
    fs::write(git_dir.join("info").join("exclude"), EXCLUDE_TEMPLATE)?;

    debug!(git_dir = %git_dir.display(), bare = options.bare, %branch, "initialized repository");
    canonical(git_dir, work_tree, kind)
}

fn canonical(
    git_dir: PathBuf,
    work_tree: Option<PathBuf>,
    kind: RepositoryKind,
) -> Result<DiscoveredRepo, RepoError> {
    Ok(DiscoveredRepo {
        git_dir: fs::canonicalize(git_dir)?,
        work_tree: work_tree.map(fs::canonicalize).transpose()?,
        kind,
    })
}
