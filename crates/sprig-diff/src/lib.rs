//! Change detection: HEAD against the index, the index against the working
//! tree, untracked file discovery, and rename pairing.
//!
//! Results are file level only. Each [`FileDiff`] names the paths, modes and
//! object ids on both sides of a change; line hunks are not computed.

pub mod rename;
pub mod staged;
pub mod tree;
pub mod worktree;

pub use rename::{detect_renames, similarity_score};
pub use staged::{diff_head_to_index, diff_tree_to_index, head_tree};
pub use tree::{read_tree_recursive, TreeFile};
pub use worktree::{diff_index_to_worktree, find_untracked};

use std::fmt;

use bstr::{BStr, BString, ByteSlice};
use sprig_hash::ObjectId;
use sprig_index::Pathspec;
use sprig_object::FileMode;

/// Default minimum similarity, in percent, for a delete/add pair to count
/// as a rename.
pub const DEFAULT_RENAME_THRESHOLD: u8 = 50;

#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Pair deletions with additions of similar content.
    pub detect_renames: bool,
    /// Percent similarity a pair needs to count as a rename.
    pub rename_threshold: u8,
    /// Paths outside this pathspec are never looked at.
    pub pathspec: Pathspec,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            pathspec: Pathspec::all(),
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
            detect_renames: false,
        }
    }
}

/// Changed files of one comparison, ordered by [`FileDiff::path`].
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub files: Vec<FileDiff>,
}

impl DiffResult {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn sort(&mut self) {
        self.files.sort_by(|a, b| a.path().cmp(b.path()));
    }
}

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub status: FileStatus,
    /// `None` for added files.
    pub old_path: Option<BString>,
    /// `None` for deleted files.
    pub new_path: Option<BString>,
    pub old_mode: Option<FileMode>,
    pub new_mode: Option<FileMode>,
    pub old_oid: Option<ObjectId>,
    pub new_oid: Option<ObjectId>,
    /// Percent similarity for renames.
    pub similarity: Option<u8>,
}

impl FileDiff {
    fn empty(status: FileStatus) -> Self {
        Self {
            status,
            old_path: None,
            new_path: None,
            old_mode: None,
            new_mode: None,
            old_oid: None,
            new_oid: None,
            similarity: None,
        }
    }

    pub(crate) fn added(path: BString, mode: FileMode, oid: Option<ObjectId>) -> Self {
        Self {
            new_path: Some(path),
            new_mode: Some(mode),
            new_oid: oid,
            ..Self::empty(FileStatus::Added)
        }
    }

    pub(crate) fn deleted(path: BString, mode: FileMode, oid: ObjectId) -> Self {
        Self {
            old_path: Some(path),
            old_mode: Some(mode),
            old_oid: Some(oid),
            ..Self::empty(FileStatus::Deleted)
        }
    }

    /// One path changed in place. Moving between file, symlink and
    /// submodule is [`FileStatus::TypeChanged`].
    pub(crate) fn changed(
        path: BString,
        (old_mode, old_oid): (FileMode, ObjectId),
        (new_mode, new_oid): (FileMode, Option<ObjectId>),
    ) -> Self {
        let status = if old_mode.same_kind(&new_mode) {
            FileStatus::Modified
        } else {
            FileStatus::TypeChanged
        };
        Self {
            old_path: Some(path.clone()),
            new_path: Some(path),
            old_mode: Some(old_mode),
            new_mode: Some(new_mode),
            old_oid: Some(old_oid),
            new_oid,
            ..Self::empty(status)
        }
    }

    /// Where the change lands: the new path, or the old one when deleted.
    pub fn path(&self) -> &BStr {
        match (&self.new_path, &self.old_path) {
            (Some(path), _) | (None, Some(path)) => path.as_bstr(),
            (None, None) => BStr::new(""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
}

impl FileStatus {
    /// The letter git's `--name-status` output uses.
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Deleted => 'D',
            FileStatus::Modified => 'M',
            FileStatus::Renamed => 'R',
            FileStatus::TypeChanged => 'T',
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("cannot load object {oid}: {source}")]
    ObjectRead {
        oid: ObjectId,
        #[source]
        source: sprig_odb::OdbError,
    },

    #[error("cannot read '{path}' from the working tree: {source}")]
    WorktreeRead {
        path: BString,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Hash(#[from] sprig_hash::HashError),

    #[error(transparent)]
    Repo(#[from] sprig_repository::RepoError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `prefix/name`, or `name` at the root.
pub(crate) fn join_path(prefix: &BStr, name: &BStr) -> BString {
    if prefix.is_empty() {
        return name.to_owned();
    }
    let mut path = BString::from(prefix);
    path.push(b'/');
    path.extend_from_slice(name);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_letters() {
        assert_eq!(FileStatus::Added.as_char(), 'A');
        assert_eq!(FileStatus::Renamed.to_string(), "R");
        assert_eq!(FileStatus::TypeChanged.to_string(), "T");
    }

    #[test]
    fn changed_classifies_kind_changes() {
        let oid = ObjectId::from_raw([1; 20]);
        let exec = FileDiff::changed("run".into(), (FileMode::Regular, oid), (FileMode::Executable, Some(oid)));
        assert_eq!(exec.status, FileStatus::Modified);
        let link = FileDiff::changed("run".into(), (FileMode::Regular, oid), (FileMode::Symlink, None));
        assert_eq!(link.status, FileStatus::TypeChanged);
    }

    #[test]
    fn path_prefers_new_side() {
        let oid = ObjectId::from_raw([1; 20]);
        let mut diff = FileDiff::deleted("old".into(), FileMode::Regular, oid);
        assert_eq!(diff.path(), "old");
        diff.new_path = Some("new".into());
        assert_eq!(diff.path(), "new");
        assert_eq!(join_path(BStr::new(""), BStr::new("a")), "a");
        assert_eq!(join_path(BStr::new("a/b"), BStr::new("c")), "a/b/c");
    }
}
