//! Staging and unstaging paths.

use std::fs;
use std::io;
use std::path::Path;

use bstr::{BStr, BString, ByteSlice};
use sprig_diff::worktree::{file_mode_from_metadata, read_worktree_file, relative_path, worktree_path};
use sprig_index::{IgnoreStack, IndexEntry, Pathspec, Stage, StatData};
use sprig_repository::Repository;
use tracing::debug;

use crate::status::{status, StagedFilter, StatusEntry};
use crate::{PorcelainError, Result};

/// Stage files, directories or glob pathspecs from the working tree.
///
/// Ignored files are skipped unless `force`. A named path that is gone
/// from the working tree but still tracked is left as it is. Returns the
/// full status afterwards.
pub fn add<S: AsRef<str>>(repo: &mut Repository, paths: &[S], force: bool) -> Result<Vec<StatusEntry>> {
    if paths.is_empty() {
        return Err(PorcelainError::InvalidArgument("nothing specified, nothing added".into()));
    }
    let work_tree = repo.require_work_tree()?.to_path_buf();
    let ignores = repo.ignore_stack()?;

    // Resolve every argument before touching the index.
    let mut files = Vec::new();
    for arg in paths {
        let arg = arg.as_ref();
        let before = files.len();
        let matched = collect_for_add(repo, &work_tree, &ignores, arg, force, &mut files)?;
        if !matched {
            return Err(PorcelainError::PathNotFound(arg.to_string()));
        }
        debug!(pathspec = arg, files = files.len() - before, "resolved add argument");
    }
    files.sort();
    files.dedup();

    for rel in &files {
        stage_file(repo, &work_tree, rel.as_bstr())?;
    }
    repo.write_index()?;
    status(repo, StagedFilter::Both, &Pathspec::all())
}

/// Remove every index entry, at any stage, matched by one of `paths`. The
/// working tree is left alone. Returns the full status afterwards.
pub fn rm<S: AsRef<str>>(repo: &mut Repository, paths: &[S]) -> Result<Vec<StatusEntry>> {
    if paths.is_empty() {
        return Err(PorcelainError::InvalidArgument("nothing specified, nothing removed".into()));
    }
    let normalized = paths
        .iter()
        .map(|p| normalize_arg(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let pathspec = parse_pathspec(&normalized)?;

    let index = repo.index_mut()?;
    let mut matched: Vec<BString> = index
        .iter()
        .filter(|e| pathspec.matches(e.path.as_bstr(), false))
        .map(|e| e.path.clone())
        .collect();
    matched.dedup();
    if matched.is_empty() {
        return Err(PorcelainError::PathNotFound(joined(paths)));
    }
    for path in &matched {
        index.remove_path(path.as_bstr());
    }
    debug!(removed = matched.len(), "unstaged paths");

    repo.write_index()?;
    status(repo, StagedFilter::Both, &Pathspec::all())
}

/// Stage exactly these repository-relative paths, or drop them from the
/// index when they are gone from the working tree.
pub(crate) fn update_tracked(repo: &mut Repository, to_stage: &[BString], to_remove: &[BString]) -> Result<()> {
    let work_tree = repo.require_work_tree()?.to_path_buf();
    for rel in to_stage {
        stage_file(repo, &work_tree, rel.as_bstr())?;
    }
    let index = repo.index_mut()?;
    for rel in to_remove {
        index.remove_path(rel.as_bstr());
    }
    repo.write_index()?;
    Ok(())
}

/// Write the file's blob and record it at stage 0 with fresh stat data.
/// Any conflict stages for the path are dropped.
fn stage_file(repo: &mut Repository, work_tree: &Path, rel: &BStr) -> Result<()> {
    let path = worktree_path(work_tree, rel);
    let meta = fs::symlink_metadata(&path)?;
    let data = read_worktree_file(&path, &meta)?;
    let oid = repo.odb().write_blob(&data)?;

    let mut entry = IndexEntry::new(rel, oid, file_mode_from_metadata(&meta), Stage::Normal);
    entry.stat = StatData::snapshot(&meta);
    repo.index_mut()?.add(entry);
    Ok(())
}

/// Push the files `arg` selects onto `out`. Returns whether the argument
/// matched anything at all, ignored or already-deleted paths included.
fn collect_for_add(
    repo: &mut Repository,
    work_tree: &Path,
    ignores: &IgnoreStack,
    arg: &str,
    force: bool,
    out: &mut Vec<BString>,
) -> Result<bool> {
    let rel = normalize_arg(arg)?;
    let path = worktree_path(work_tree, rel.as_bstr());

    match fs::symlink_metadata(&path) {
        Ok(meta) if !meta.is_dir() => {
            if !force && ignores.is_ignored(rel.as_bstr(), false) {
                debug!(path = %rel, "skipping ignored path");
            } else {
                out.push(rel);
            }
            return Ok(true);
        }
        Ok(_) => {
            if !rel.is_empty() && path.join(".git").exists() {
                debug!(path = %rel, "skipping nested repository");
            } else if rel.is_empty() || force || !ignores.is_ignored(rel.as_bstr(), true) {
                walk(work_tree, &path, ignores, force, &Pathspec::all(), out)?;
            } else {
                debug!(path = %rel, "skipping ignored directory");
            }
            return Ok(true);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    // Not a literal path: match it as a pathspec against the working tree,
    // and against the index for tracked files that are gone.
    let pathspec = parse_pathspec(&[rel.to_str_lossy().into_owned()])?;
    let before = out.len();
    let ignored_hits = walk(work_tree, work_tree, ignores, force, &pathspec, out)?;
    let tracked = repo
        .index()?
        .iter()
        .any(|e| pathspec.matches(e.path.as_bstr(), false));
    Ok(out.len() > before || ignored_hits > 0 || tracked)
}

/// Recursively collect files under `dir` that `pathspec` selects. Returns
/// how many matching paths were skipped as ignored.
fn walk(
    work_tree: &Path,
    dir: &Path,
    ignores: &IgnoreStack,
    force: bool,
    pathspec: &Pathspec,
    out: &mut Vec<BString>,
) -> Result<usize> {
    let mut ignored = 0;
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        let rel = relative_path(work_tree, &path);
        let is_dir = entry.file_type()?.is_dir();

        if !pathspec.matches(rel.as_bstr(), is_dir) {
            continue;
        }
        if !force && ignores.is_ignored(rel.as_bstr(), is_dir) {
            debug!(path = %rel, "skipping ignored path");
            ignored += 1;
            continue;
        }
        if is_dir {
            if path.join(".git").exists() {
                debug!(path = %rel, "skipping nested repository");
                continue;
            }
            ignored += walk(work_tree, &path, ignores, force, pathspec, out)?;
        } else {
            out.push(rel);
        }
    }
    Ok(ignored)
}

/// Turn a user path into a repository-relative one: `./` and `.` segments
/// dropped, `..` resolved, trailing `/` removed. `.` alone is the root.
fn normalize_arg(arg: &str) -> Result<BString> {
    // Pathspec magic is passed through untouched.
    if arg.starts_with(':') {
        return Ok(arg.into());
    }
    let mut parts: Vec<&str> = Vec::new();
    for part in arg.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(PorcelainError::InvalidArgument(format!(
                        "'{arg}' is outside the repository"
                    )));
                }
            }
            part => parts.push(part),
        }
    }
    Ok(parts.join("/").into())
}

fn parse_pathspec<S: AsRef<[u8]>>(args: &[S]) -> Result<Pathspec> {
    let args: Vec<String> = args
        .iter()
        .map(|a| a.as_ref().to_str_lossy().into_owned())
        .collect();
    Pathspec::parse(&args).map_err(|e| PorcelainError::InvalidArgument(e.to_string()))
}

fn joined<S: AsRef<str>>(paths: &[S]) -> String {
    paths.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizing_arguments() {
        let n = |s| normalize_arg(s).unwrap().to_string();
        assert_eq!(n("a.txt"), "a.txt");
        assert_eq!(n("./src/"), "src");
        assert_eq!(n("src/../docs/./x"), "docs/x");
        assert_eq!(n("."), "");
        assert_eq!(n(":(exclude)*.log"), ":(exclude)*.log");
        assert!(matches!(normalize_arg("../up"), Err(PorcelainError::InvalidArgument(_))));
    }

    #[test]
    fn empty_root_argument_selects_everything() {
        let spec = parse_pathspec(&[normalize_arg(".").unwrap()]).unwrap();
        assert!(spec.matches(BStr::new("any/file"), false));
    }
}
