use bstr::BString;
use sprig_diff::{head_tree, read_tree_recursive};
use sprig_hash::ObjectId;
use sprig_object::FileMode;
use sprig_repository::Repository;

use crate::commit::commit_id;
use crate::Result;

/// A tracked file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LsEntry {
    pub path: BString,
    pub id: ObjectId,
    pub mode: FileMode,
}

/// Tracked files sorted by path.
///
/// With `rev`, the files of that commit's tree. Without it, the index of a
/// repository with a working tree (an unmerged path appears once, at its
/// lowest stage), or HEAD's tree in a bare repository.
pub fn ls(repo: &Repository, rev: Option<&str>) -> Result<Vec<LsEntry>> {
    let tree = match rev {
        Some(rev) => {
            let id = commit_id(repo, rev)?;
            Some(repo.odb().read_commit(&id)?.tree)
        }
        None if repo.is_bare() => head_tree(repo)?,
        None => return Ok(index_entries(repo)?),
    };

    let Some(tree) = tree else {
        return Ok(Vec::new());
    };
    let mut entries: Vec<LsEntry> = read_tree_recursive(repo.odb(), &tree)?
        .into_iter()
        .map(|f| LsEntry {
            path: f.path,
            id: f.oid,
            mode: f.mode,
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn index_entries(repo: &Repository) -> Result<Vec<LsEntry>> {
    let index = repo.current_index()?;
    // Entries are ordered by path, then stage, so the first entry of each
    // path is its lowest stage.
    let mut entries: Vec<LsEntry> = Vec::with_capacity(index.len());
    for entry in index.iter() {
        if entries.last().is_some_and(|last| last.path == entry.path) {
            continue;
        }
        entries.push(LsEntry {
            path: entry.path.clone(),
            id: entry.oid,
            mode: entry.mode,
        });
    }
    entries.sort();
    Ok(entries)
}
