//! Flattening stored trees into path-sorted file lists.

use bstr::{BStr, BString, ByteSlice};
use sprig_hash::ObjectId;
use sprig_object::{FileMode, Tree};
use sprig_odb::ObjectDatabase;

use crate::{join_path, DiffError};

/// A file reachable from a tree, with its full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    pub path: BString,
    pub mode: FileMode,
    pub oid: ObjectId,
}

/// Every file below `tree`, sorted by path bytes (the index order).
pub fn read_tree_recursive(odb: &ObjectDatabase, tree: &ObjectId) -> Result<Vec<TreeFile>, DiffError> {
    let mut files = Vec::new();
    collect_files(odb, tree, BStr::new(""), &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn collect_files(
    odb: &ObjectDatabase,
    tree: &ObjectId,
    prefix: &BStr,
    files: &mut Vec<TreeFile>,
) -> Result<(), DiffError> {
    for entry in read_tree(odb, tree)?.entries {
        let path = join_path(prefix, entry.name.as_bstr());
        if entry.mode.is_tree() {
            collect_files(odb, &entry.oid, path.as_bstr(), files)?;
        } else {
            files.push(TreeFile {
                path,
                mode: entry.mode,
                oid: entry.oid,
            });
        }
    }
    Ok(())
}

fn read_tree(odb: &ObjectDatabase, oid: &ObjectId) -> Result<Tree, DiffError> {
    odb.read_tree(oid).map_err(|source| DiffError::ObjectRead { oid: *oid, source })
}
