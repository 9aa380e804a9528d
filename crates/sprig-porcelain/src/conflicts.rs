use bstr::BString;
use sprig_hash::ObjectId;
use sprig_index::Stage;
use sprig_object::FileMode;
use sprig_repository::Repository;

use crate::Result;

/// One side of an unmerged path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictSide {
    pub id: ObjectId,
    pub mode: FileMode,
}

/// An unmerged path and whichever of its three stages exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    pub path: BString,
    pub base: Option<ConflictSide>,
    pub ours: Option<ConflictSide>,
    pub theirs: Option<ConflictSide>,
}

/// Unresolved paths left in the index by a merge, sorted by path.
pub fn conflicts(repo: &Repository) -> Result<Vec<ConflictEntry>> {
    let index = repo.current_index()?;
    let entries = index
        .conflicted_paths()
        .into_iter()
        .map(|path| {
            let mut conflict = ConflictEntry {
                path: path.to_owned(),
                base: None,
                ours: None,
                theirs: None,
            };
            for entry in index.get_all(path) {
                let side = Some(ConflictSide {
                    id: entry.oid,
                    mode: entry.mode,
                });
                match entry.stage {
                    Stage::Base => conflict.base = side,
                    Stage::Ours => conflict.ours = side,
                    Stage::Theirs => conflict.theirs = side,
                    Stage::Normal => {}
                }
            }
            conflict
        })
        .collect();
    Ok(entries)
}
