//! The index against the working tree (`diff` with no arguments), plus
//! discovery of untracked files.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};
use sprig_hash::{Hasher, ObjectId};
use sprig_index::{IgnoreStack, Index, IndexEntry, Pathspec};
use sprig_object::FileMode;
use tracing::trace;

use crate::{join_path, DiffError, DiffOptions, DiffResult, FileDiff};

/// Unstaged changes of tracked files.
///
/// Cached stat data lets unchanged files skip hashing. Conflicted paths and
/// entries marked assume-valid or skip-worktree are not examined. A tracked
/// file that is missing, or replaced by a directory, is reported deleted.
pub fn diff_index_to_worktree(
    index: &Index,
    work_tree: &Path,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    let mut result = DiffResult::default();
    for entry in index.stage0() {
        if entry.flags.assume_valid
            || entry.flags.skip_worktree
            || index.is_conflicted(entry.path.as_bstr())
            || !options.pathspec.matches(entry.path.as_bstr(), false)
        {
            continue;
        }
        if let Some(diff) = compare_entry(entry, work_tree)? {
            result.files.push(diff);
        }
    }
    result.sort();
    Ok(result)
}

fn compare_entry(entry: &IndexEntry, work_tree: &Path) -> Result<Option<FileDiff>, DiffError> {
    let path = worktree_path(work_tree, entry.path.as_bstr());
    let deleted = || Ok(Some(FileDiff::deleted(entry.path.clone(), entry.mode, entry.oid)));

    let meta = match std::fs::symlink_metadata(&path) {
        Ok(meta) => meta,
        // `a/b` is tracked but `a` is now a file.
        Err(e) if e.kind() == io::ErrorKind::NotFound || !path.exists() => return deleted(),
        Err(source) => {
            return Err(DiffError::WorktreeRead {
                path: entry.path.clone(),
                source,
            })
        }
    };

    if entry.mode.is_gitlink() {
        // Submodule contents are not inspected.
        return if meta.is_dir() { Ok(None) } else { deleted() };
    }
    if meta.is_dir() {
        return deleted();
    }

    let mode = worktree_mode(&meta, entry.mode);
    if entry.flags.intent_to_add {
        let oid = hash(entry, &path, &meta)?;
        return Ok(Some(FileDiff::added(entry.path.clone(), mode, Some(oid))));
    }
    if mode == entry.mode && entry.stat.matches_metadata(&meta) {
        return Ok(None);
    }

    let oid = hash(entry, &path, &meta)?;
    if oid == entry.oid && mode == entry.mode {
        trace!(path = %entry.path, "stat changed, content did not");
        return Ok(None);
    }
    Ok(Some(FileDiff::changed(
        entry.path.clone(),
        (entry.mode, entry.oid),
        (mode, Some(oid)),
    )))
}

fn hash(entry: &IndexEntry, path: &Path, meta: &Metadata) -> Result<ObjectId, DiffError> {
    let data = read_worktree_file(path, meta).map_err(|source| DiffError::WorktreeRead {
        path: entry.path.clone(),
        source,
    })?;
    Ok(Hasher::hash_object("blob", &data)?)
}

/// Files in the working tree that have no index entry, sorted by path.
///
/// Ignored files and directories are skipped, as are directories the
/// pathspec cannot match. A nested repository is reported once, as its
/// directory path with a trailing `/`.
pub fn find_untracked(
    index: &Index,
    work_tree: &Path,
    ignores: &IgnoreStack,
    pathspec: &Pathspec,
) -> Result<Vec<BString>, DiffError> {
    let mut found = Vec::new();
    walk_untracked(index, work_tree, BStr::new(""), ignores, pathspec, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk_untracked(
    index: &Index,
    dir: &Path,
    rel_dir: &BStr,
    ignores: &IgnoreStack,
    pathspec: &Pathspec,
    found: &mut Vec<BString>,
) -> Result<(), DiffError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".git" {
            continue;
        }
        let rel = join_path(rel_dir, Vec::from_os_str_lossy(&name).as_bstr());
        let is_dir = entry.file_type()?.is_dir();

        if ignores.is_ignored(rel.as_bstr(), is_dir) {
            trace!(path = %rel, "ignored");
            continue;
        }
        if !pathspec.matches(rel.as_bstr(), is_dir) {
            continue;
        }
        if index.contains_path(rel.as_bstr()) {
            continue;
        }

        if is_dir {
            if entry.path().join(".git").exists() {
                let mut nested = rel;
                nested.push(b'/');
                found.push(nested);
            } else {
                walk_untracked(index, &entry.path(), rel.as_bstr(), ignores, pathspec, found)?;
            }
        } else {
            found.push(rel);
        }
    }
    Ok(())
}

/// Location of a repository-relative path inside `work_tree`.
pub fn worktree_path(work_tree: &Path, rel: &BStr) -> PathBuf {
    work_tree.join(rel.to_path_lossy())
}

/// `path` relative to `work_tree`, '/'-separated.
pub fn relative_path(work_tree: &Path, path: &Path) -> BString {
    let rel = path.strip_prefix(work_tree).unwrap_or(path);
    let parts: Vec<Vec<u8>> = rel
        .components()
        .map(|c| Vec::from_os_str_lossy(c.as_os_str()).into_owned())
        .collect();
    BString::from(parts.join(&b'/'))
}

/// The mode git would record for a file with this metadata.
pub fn file_mode_from_metadata(meta: &Metadata) -> FileMode {
    if meta.is_symlink() {
        FileMode::Symlink
    } else if meta.is_dir() {
        FileMode::Tree
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if meta.permissions().mode() & 0o111 != 0 {
                return FileMode::Executable;
            }
        }
        FileMode::Regular
    }
}

/// Like [`file_mode_from_metadata`], but keeps the recorded executable bit
/// on platforms that cannot report one.
fn worktree_mode(meta: &Metadata, recorded: FileMode) -> FileMode {
    let mode = file_mode_from_metadata(meta);
    if cfg!(unix) || !(mode.is_blob() && recorded.is_blob()) {
        mode
    } else {
        recorded
    }
}

/// Blob content of a working tree file: the file bytes, or the link target
/// for a symlink.
pub fn read_worktree_file(path: &Path, meta: &Metadata) -> io::Result<Vec<u8>> {
    if meta.is_symlink() {
        let target = std::fs::read_link(path)?;
        Ok(Vec::from_path_lossy(&target).into_owned())
    } else {
        std::fs::read(path)
    }
}

/// Blob id of a working tree file without storing it.
pub fn hash_worktree_file(path: &Path, meta: &Metadata) -> Result<ObjectId, DiffError> {
    let data = read_worktree_file(path, meta)?;
    Ok(Hasher::hash_object("blob", &data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(relative_path(root, &root.join("a").join("b.txt")), "a/b.txt");
        assert_eq!(relative_path(root, &root.join("top")), "top");
        assert_eq!(worktree_path(root, BStr::new("a/b")), root.join("a/b"));
    }

    #[test]
    fn hashing_matches_git() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"hello\n").unwrap();
        let meta = std::fs::symlink_metadata(&path).unwrap();
        let oid = hash_worktree_file(&path, &meta).unwrap();
        assert_eq!(oid.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert_eq!(file_mode_from_metadata(&meta), FileMode::Regular);
    }
}
