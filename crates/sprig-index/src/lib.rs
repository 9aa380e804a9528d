//! Index (staging area) for sprig.
//!
//! The index maps repository-relative paths to staged blobs. Each path has a
//! single stage-0 entry, except during an unresolved merge where stages 1-3
//! (base/ours/theirs) take its place. This crate reads and writes the on-disk
//! `.git/index` file, snapshots the index into tree objects, and provides the
//! pathspec and ignore-rule matchers used to select paths.

pub mod entry;
pub mod ignore;
pub mod pathspec;
mod read;
mod write;

use std::cmp::Ordering;
use std::path::Path;

use bstr::{BStr, ByteSlice};
use sprig_hash::ObjectId;
use sprig_odb::ObjectDatabase;

pub use entry::{EntryFlags, FileTime, IndexEntry, StatData};
pub use error::IndexError;
pub use ignore::IgnoreStack;
pub use pathspec::Pathspec;

mod error {
    use std::path::PathBuf;

    #[derive(Debug, thiserror::Error)]
    pub enum IndexError {
        #[error("invalid index header: {0}")]
        InvalidHeader(String),

        #[error("unsupported index version: {0}")]
        UnsupportedVersion(u32),

        #[error("index checksum mismatch")]
        ChecksumMismatch,

        #[error("invalid index entry at offset {offset}: {reason}")]
        InvalidEntry { offset: usize, reason: String },

        #[error("invalid pathspec: {0}")]
        InvalidPathspec(String),

        #[error("unable to lock index '{path}': {source}")]
        LockFailed {
            path: PathBuf,
            #[source]
            source: sprig_utils::UtilError,
        },

        #[error(transparent)]
        Io(#[from] std::io::Error),

        #[error(transparent)]
        Odb(#[from] sprig_odb::OdbError),
    }
}

/// Merge stage of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Stage 0: the entry is merged.
    Normal,
    /// Stage 1: common ancestor version.
    Base,
    /// Stage 2: our version.
    Ours,
    /// Stage 3: their version.
    Theirs,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        match self {
            Stage::Normal => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }

    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(Stage::Normal),
            1 => Some(Stage::Base),
            2 => Some(Stage::Ours),
            3 => Some(Stage::Theirs),
            _ => None,
        }
    }
}

/// The staging area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    /// Sorted by (path, stage).
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an index file (memory-mapped).
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path.as_ref())?;
        if file.metadata()?.len() == 0 {
            return Err(IndexError::InvalidHeader("index file is empty".into()));
        }
        // SAFETY: the map is read-only and dropped before returning; writers
        // replace the file by rename rather than modifying it in place.
        let data = unsafe { memmap2::Mmap::map(&file) }?;
        let entries = read::parse_index(&data)?;
        Ok(Self { entries })
    }

    /// Read an index file, treating a missing file as an empty index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        match Self::read_from(path) {
            Err(IndexError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            other => other,
        }
    }

    /// Write the index atomically under `<path>.lock`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &BStr, stage: Stage) -> Option<&IndexEntry> {
        self.position(path, stage).ok().map(|i| &self.entries[i])
    }

    /// All entries for `path`, in stage order.
    pub fn get_all(&self, path: &BStr) -> &[IndexEntry] {
        let start = self.entries.partition_point(|e| e.path.as_bstr() < path);
        let end = start
            + self.entries[start..]
                .iter()
                .take_while(|e| e.path == path)
                .count();
        &self.entries[start..end]
    }

    /// Whether any entry exists for `path`.
    pub fn contains_path(&self, path: &BStr) -> bool {
        !self.get_all(path).is_empty()
    }

    /// Insert or replace an entry.
    ///
    /// A stage-0 entry replaces every conflict stage of its path, and evicts
    /// entries that would clash with it as file versus directory (`a` versus
    /// `a/b`).
    pub fn add(&mut self, entry: IndexEntry) {
        if entry.stage == Stage::Normal {
            let path = entry.path.clone();
            self.remove_path(path.as_bstr());
            self.remove_dir_conflicts(path.as_bstr());
        }
        match self.position(entry.path.as_bstr(), entry.stage) {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    /// Remove one stage of a path. Returns whether it was present.
    pub fn remove(&mut self, path: &BStr, stage: Stage) -> bool {
        match self.position(path, stage) {
            Ok(i) => {
                self.entries.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Remove every stage of a path. Returns whether anything was removed.
    pub fn remove_path(&mut self, path: &BStr) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.path != path);
        self.entries.len() != before
    }

    fn remove_dir_conflicts(&mut self, path: &BStr) {
        let mut dir_prefix = path.to_vec();
        dir_prefix.push(b'/');
        self.entries.retain(|e| {
            let is_parent = path.starts_with(&e.path) && path.get(e.path.len()) == Some(&b'/');
            !is_parent && !e.path.starts_with(&dir_prefix)
        });
    }

    /// Whether any path is in the conflict state.
    pub fn has_conflicts(&self) -> bool {
        self.entries.iter().any(|e| e.stage != Stage::Normal)
    }

    pub fn is_conflicted(&self, path: &BStr) -> bool {
        self.get_all(path).iter().any(|e| e.stage != Stage::Normal)
    }

    /// Paths with conflict stages, sorted and deduplicated.
    pub fn conflicted_paths(&self) -> Vec<&BStr> {
        let mut paths: Vec<&BStr> = self
            .entries
            .iter()
            .filter(|e| e.stage != Stage::Normal)
            .map(|e| e.path.as_bstr())
            .collect();
        paths.dedup();
        paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Merged (stage 0) entries only.
    pub fn stage0(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(|e| e.stage == Stage::Normal)
    }

    /// Snapshot the merged entries as a tree and return its id.
    pub fn write_tree(&self, odb: &ObjectDatabase) -> Result<ObjectId, IndexError> {
        write::write_tree(self, odb)
    }

    fn position(&self, path: &BStr, stage: Stage) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| {
            e.path
                .as_bstr()
                .cmp(path)
                .then(e.stage.cmp(&stage))
        })
    }
}

/// Sort order of index entries: by path bytes, then stage.
pub fn cmp_entries(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    a.path.cmp(&b.path).then(a.stage.cmp(&b.stage))
}
