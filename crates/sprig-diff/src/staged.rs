//! HEAD against the index (`diff --cached`).
//!
//! The index is compared with a flattened HEAD tree, so nothing is written
//! to the object database.

use std::cmp::Ordering;

use bstr::ByteSlice;
use sprig_hash::ObjectId;
use sprig_index::{Index, IndexEntry};
use sprig_odb::ObjectDatabase;
use sprig_repository::Repository;

use crate::tree::{read_tree_recursive, TreeFile};
use crate::{rename, DiffError, DiffOptions, DiffResult, FileDiff};

/// Tree of the commit HEAD points at; `None` on an unborn branch.
pub fn head_tree(repo: &Repository) -> Result<Option<ObjectId>, DiffError> {
    let Some(head) = repo.head_oid()? else {
        return Ok(None);
    };
    let commit = repo
        .odb()
        .read_commit(&head)
        .map_err(|source| DiffError::ObjectRead { oid: head, source })?;
    Ok(Some(commit.tree))
}

/// Staged changes: HEAD's tree against the merged entries of `index`.
pub fn diff_head_to_index(
    repo: &Repository,
    index: &Index,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    let tree = head_tree(repo)?;
    diff_tree_to_index(repo.odb(), tree.as_ref(), index, options)
}

/// Compare a tree (`None` for empty) with the index.
///
/// Paths in the conflict state and intent-to-add placeholders are left out;
/// neither has staged content yet.
pub fn diff_tree_to_index(
    odb: &ObjectDatabase,
    tree: Option<&ObjectId>,
    index: &Index,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    let selected = |path: &[u8]| options.pathspec.matches(path.as_bstr(), false) && !index.is_conflicted(path.as_bstr());

    let tree_files: Vec<TreeFile> = match tree {
        Some(oid) => read_tree_recursive(odb, oid)?,
        None => Vec::new(),
    };
    let tree_files: Vec<&TreeFile> = tree_files.iter().filter(|f| selected(f.path.as_bytes())).collect();
    let entries: Vec<&IndexEntry> = index
        .stage0()
        .filter(|e| !e.flags.intent_to_add && selected(e.path.as_bytes()))
        .collect();

    let mut result = DiffResult::default();
    let (mut ti, mut ii) = (0, 0);
    loop {
        let order = match (tree_files.get(ti), entries.get(ii)) {
            (Some(t), Some(e)) => t.path.cmp(&e.path),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Less => {
                let t = tree_files[ti];
                result.files.push(FileDiff::deleted(t.path.clone(), t.mode, t.oid));
                ti += 1;
            }
            Ordering::Greater => {
                let e = entries[ii];
                result.files.push(FileDiff::added(e.path.clone(), e.mode, Some(e.oid)));
                ii += 1;
            }
            Ordering::Equal => {
                let (t, e) = (tree_files[ti], entries[ii]);
                if t.oid != e.oid || t.mode != e.mode {
                    result
                        .files
                        .push(FileDiff::changed(e.path.clone(), (t.mode, t.oid), (e.mode, Some(e.oid))));
                }
                ti += 1;
                ii += 1;
            }
        }
    }

    if options.detect_renames {
        rename::detect_renames(odb, &mut result, options.rename_threshold)?;
    }
    result.sort();
    Ok(result)
}
