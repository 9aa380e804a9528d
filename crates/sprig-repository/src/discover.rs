use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::EnvOverrides;
use crate::{DiscoveredRepo, RepoError, RepositoryKind};

/// Find the repository containing `start` by walking up the directory tree.
///
/// `GIT_DIR` short-circuits the walk. Otherwise each directory is checked
/// for a `.git` directory, a `.git` file (`gitdir: <path>`), and finally
/// for being a bare repository itself. The walk stops at any
/// `GIT_CEILING_DIRECTORIES` entry.
pub fn discover_git_dir(start: &Path, env: &EnvOverrides) -> Result<DiscoveredRepo, RepoError> {
    if let Some(git_dir) = &env.git_dir {
        let git_dir = if git_dir.is_absolute() {
            git_dir.clone()
        } else {
            start.join(git_dir)
        };
        return open_git_dir(&git_dir);
    }

    let start = std::fs::canonicalize(start).map_err(|_| RepoError::NotFound(start.to_path_buf()))?;
    let ceilings: Vec<PathBuf> = env
        .ceiling_directories
        .iter()
        .filter_map(|p| std::fs::canonicalize(p).ok())
        .collect();

    let mut current = start.clone();
    loop {
        if ceilings.contains(&current) {
            return Err(RepoError::NotFound(start));
        }

        if let Some(found) = probe(&current)? {
            debug!(git_dir = %found.git_dir.display(), "discovered repository");
            return Ok(found);
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return Err(RepoError::NotFound(start)),
        }
    }
}

fn probe(dir: &Path) -> Result<Option<DiscoveredRepo>, RepoError> {
    let dot_git = dir.join(".git");
    if dot_git.is_dir() && is_git_dir(&dot_git) {
        return Ok(Some(DiscoveredRepo {
            git_dir: dot_git,
            work_tree: Some(dir.to_path_buf()),
            kind: RepositoryKind::Normal,
        }));
    }
    if dot_git.is_file() {
        return follow_gitdir_file(&dot_git, dir).map(Some);
    }
    if is_git_dir(dir) {
        return Ok(Some(DiscoveredRepo {
            git_dir: dir.to_path_buf(),
            work_tree: None,
            kind: RepositoryKind::Bare,
        }));
    }
    Ok(None)
}

/// Open a path known to be a git directory.
///
/// A directory named `.git` gets its parent as the working tree; anything
/// else is treated as bare.
pub fn open_git_dir(git_dir: &Path) -> Result<DiscoveredRepo, RepoError> {
    let git_dir = std::fs::canonicalize(git_dir).map_err(|_| RepoError::NotFound(git_dir.to_path_buf()))?;
    if !is_git_dir(&git_dir) {
        return Err(RepoError::InvalidGitDir {
            path: git_dir,
            reason: "missing HEAD, objects/, or refs/".to_string(),
        });
    }

    let work_tree = match (git_dir.file_name(), git_dir.parent()) {
        (Some(name), Some(parent)) if name == ".git" => Some(parent.to_path_buf()),
        _ => None,
    };
    let kind = if work_tree.is_some() {
        RepositoryKind::Normal
    } else {
        RepositoryKind::Bare
    };
    Ok(DiscoveredRepo {
        git_dir,
        work_tree,
        kind,
    })
}

/// Open the repository whose working tree root is `work_tree`.
pub fn open_work_tree(work_tree: &Path) -> Result<DiscoveredRepo, RepoError> {
    let work_tree = std::fs::canonicalize(work_tree).map_err(|_| RepoError::NotFound(work_tree.to_path_buf()))?;
    probe(&work_tree)?
        .filter(|found| found.work_tree.as_deref() == Some(work_tree.as_path()))
        .ok_or(RepoError::NotFound(work_tree))
}

fn follow_gitdir_file(dot_git: &Path, work_tree: &Path) -> Result<DiscoveredRepo, RepoError> {
    let target = parse_gitdir_file(dot_git)?;
    let target = if target.is_absolute() {
        target
    } else {
        work_tree.join(target)
    };
    let git_dir = std::fs::canonicalize(&target).map_err(|e| RepoError::InvalidGitDir {
        path: dot_git.to_path_buf(),
        reason: format!("cannot resolve gitdir target: {e}"),
    })?;
    if !is_git_dir(&git_dir) {
        return Err(RepoError::InvalidGitDir {
            path: git_dir,
            reason: "gitdir target is not a repository".to_string(),
        });
    }
    Ok(DiscoveredRepo {
        git_dir,
        work_tree: Some(work_tree.to_path_buf()),
        kind: RepositoryKind::Normal,
    })
}

/// Whether `path` has the shape of a git directory.
pub fn is_git_dir(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir() && path.join("refs").is_dir()
}

/// Parse a `.git` file containing `gitdir: <path>`.
pub fn parse_gitdir_file(path: &Path) -> Result<PathBuf, RepoError> {
    let content = std::fs::read_to_string(path).map_err(|e| RepoError::InvalidGitDir {
        path: path.to_path_buf(),
        reason: format!("cannot read .git file: {e}"),
    })?;
    let content = content.trim();
    let target = content.strip_prefix("gitdir:").ok_or_else(|| RepoError::InvalidGitDir {
        path: path.to_path_buf(),
        reason: format!("expected 'gitdir: <path>', got: {content}"),
    })?;
    Ok(PathBuf::from(target.trim()))
}
