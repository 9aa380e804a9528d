use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};
use sprig_index::IgnoreStack;

use crate::RepoError;

/// Collect the ignore rules of a working tree, lowest precedence first:
/// `core.excludesFile`, `info/exclude`, then every `.gitignore` with parent
/// directories before their children. Directories that are already ignored
/// are not searched.
pub(crate) fn load(
    work_tree: &Path,
    git_dir: &Path,
    excludes_file: Option<PathBuf>,
) -> Result<IgnoreStack, RepoError> {
    let mut stack = IgnoreStack::new();
    let root = BStr::new("");
    if let Some(file) = excludes_file {
        stack.add_file(&file, root)?;
    }
    stack.add_file(&git_dir.join("info").join("exclude"), root)?;
    collect(&mut stack, work_tree, BString::default())?;
    Ok(stack)
}

fn collect(stack: &mut IgnoreStack, dir: &Path, rel: BString) -> Result<(), RepoError> {
    stack.add_file(&dir.join(".gitignore"), rel.as_bstr())?;

    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() || entry.file_name() == ".git" {
            continue;
        }
        let name = Vec::from_os_str_lossy(&entry.file_name()).into_owned();
        let mut child = rel.clone();
        if !child.is_empty() {
            child.push(b'/');
        }
        child.extend_from_slice(&name);
        subdirs.push((child, entry.path()));
    }
    subdirs.sort();

    for (child, path) in subdirs {
        if !stack.is_ignored(child.as_bstr(), true) {
            collect(stack, &path, child)?;
        }
    }
    Ok(())
}

/// Expand a leading `~/` using `$HOME`.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
