use bstr::BString;
use sprig_hash::ObjectId;
use sprig_object::FileMode;

use crate::Stage;

/// One `(path, stage)` slot of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Slash-separated, relative to the work tree root.
    pub path: BString,
    pub oid: ObjectId,
    pub mode: FileMode,
    pub stage: Stage,
    pub stat: StatData,
    pub flags: EntryFlags,
}

impl IndexEntry {
    /// Stat data left zeroed, so the next status hashes the file.
    pub fn new(path: impl Into<BString>, oid: ObjectId, mode: FileMode, stage: Stage) -> Self {
        Self {
            path: path.into(),
            oid,
            mode,
            stage,
            stat: StatData::default(),
            flags: EntryFlags::default(),
        }
    }
}

/// A timestamp as the index stores it: two 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileTime {
    pub secs: u32,
    pub nanos: u32,
}

impl FileTime {
    fn new(secs: i64, nanos: i64) -> Self {
        // The on-disk format keeps only the low 32 bits.
        Self {
            secs: secs as u32,
            nanos: nanos as u32,
        }
    }
}

/// The slice of `stat(2)` the index caches to spot unchanged files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatData {
    pub ctime: FileTime,
    pub mtime: FileTime,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl StatData {
    #[cfg(unix)]
    pub fn snapshot(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            ctime: FileTime::new(meta.ctime(), meta.ctime_nsec()),
            mtime: FileTime::new(meta.mtime(), meta.mtime_nsec()),
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }

    #[cfg(not(unix))]
    pub fn snapshot(meta: &std::fs::Metadata) -> Self {
        let since_epoch = |t: std::io::Result<std::time::SystemTime>| {
            t.ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| FileTime::new(d.as_secs() as i64, i64::from(d.subsec_nanos())))
        };
        let mtime = since_epoch(meta.modified()).unwrap_or_default();
        Self {
            ctime: since_epoch(meta.created()).unwrap_or(mtime),
            mtime,
            size: meta.len() as u32,
            ..Self::default()
        }
    }

    /// True when `meta` looks like the file this stat was taken from, so
    /// its content need not be hashed again. A zeroed stat never matches.
    /// Inode and device only count when both sides know them.
    pub fn matches_metadata(&self, meta: &std::fs::Metadata) -> bool {
        if *self == Self::default() {
            return false;
        }
        let now = Self::snapshot(meta);
        let known_equal = |a: u32, b: u32| a == 0 || b == 0 || a == b;
        (self.size, self.mtime, self.ctime) == (now.size, now.mtime, now.ctime)
            && known_equal(self.ino, now.ino)
            && known_equal(self.dev, now.dev)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryFlags {
    pub assume_valid: bool,
    /// Recorded by `add --intent-to-add`; the blob is a placeholder.
    pub intent_to_add: bool,
    pub skip_worktree: bool,
}

impl EntryFlags {
    /// Whether the entry needs the extra flag word of a version 3 index.
    pub fn needs_extended_word(&self) -> bool {
        self.intent_to_add || self.skip_worktree
    }
}
