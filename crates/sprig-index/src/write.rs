//! Index serialization and tree snapshots.

use std::io::Write;
use std::path::Path;

use bstr::{BString, ByteSlice};
use sprig_hash::ObjectId;
use sprig_object::{FileMode, Tree, TreeEntry};
use sprig_odb::ObjectDatabase;
use sprig_utils::lockfile::LockFile;
use tracing::debug;

use crate::entry::IndexEntry;
use crate::read::{
    entry_size, EXT_INTENT_TO_ADD, EXT_SKIP_WORKTREE, FLAG_ASSUME_VALID, FLAG_EXTENDED, NAME_MASK,
    SIGNATURE,
};
use crate::{Index, IndexError, Stage};

pub(crate) fn write_index(index: &Index, path: &Path) -> Result<(), IndexError> {
    let lock_failed = |source| IndexError::LockFailed {
        path: path.to_path_buf(),
        source,
    };
    let data = serialize(index);
    let mut lock = LockFile::acquire(path).map_err(lock_failed)?;
    lock.write_all(&data)?;
    lock.commit().map_err(lock_failed)?;
    debug!(path = %path.display(), entries = index.entries.len(), "wrote index");
    Ok(())
}

/// Version 3 is used only when some entry carries extended flags.
pub(crate) fn serialize(index: &Index) -> Vec<u8> {
    let version: u32 = if index.entries.iter().any(|e| e.flags.needs_extended_word()) {
        3
    } else {
        2
    };

    let mut buf = Vec::with_capacity(12 + index.entries.len() * 80 + 20);
    buf.extend_from_slice(SIGNATURE);
    buf.extend_from_slice(&version.to_be_bytes());
    buf.extend_from_slice(&(index.entries.len() as u32).to_be_bytes());
    for entry in &index.entries {
        write_entry(&mut buf, entry);
    }
    let checksum = sprig_hash::hasher::checksum(&buf);
    buf.extend_from_slice(&checksum);
    buf
}

fn write_entry(buf: &mut Vec<u8>, entry: &IndexEntry) {
    let start = buf.len();
    let stat = &entry.stat;
    for word in [
        stat.ctime.secs,
        stat.ctime.nanos,
        stat.mtime.secs,
        stat.mtime.nanos,
        stat.dev,
        stat.ino,
        entry.mode.raw(),
        stat.uid,
        stat.gid,
        stat.size,
    ] {
        buf.extend_from_slice(&word.to_be_bytes());
    }
    buf.extend_from_slice(entry.oid.as_bytes());

    let extended = entry.flags.needs_extended_word();
    let mut flags = entry.path.len().min(NAME_MASK as usize) as u16;
    flags |= u16::from(entry.stage.as_u8()) << 12;
    if entry.flags.assume_valid {
        flags |= FLAG_ASSUME_VALID;
    }
    if extended {
        flags |= FLAG_EXTENDED;
    }
    buf.extend_from_slice(&flags.to_be_bytes());
    if extended {
        let mut ext = 0u16;
        if entry.flags.intent_to_add {
            ext |= EXT_INTENT_TO_ADD;
        }
        if entry.flags.skip_worktree {
            ext |= EXT_SKIP_WORKTREE;
        }
        buf.extend_from_slice(&ext.to_be_bytes());
    }

    buf.extend_from_slice(&entry.path);
    buf.resize(start + entry_size(entry.path.len(), extended), 0);
}

/// Build the tree hierarchy for the stage-0 entries, bottom-up.
pub(crate) fn write_tree(index: &Index, odb: &ObjectDatabase) -> Result<ObjectId, IndexError> {
    let entries: Vec<&IndexEntry> = index
        .entries
        .iter()
        .filter(|e| e.stage == Stage::Normal && !e.flags.intent_to_add)
        .collect();
    let oid = build_tree(&entries, 0, odb)?;
    debug!(%oid, entries = entries.len(), "wrote tree from index");
    Ok(oid)
}

/// `entries` all share a directory prefix of `depth` bytes (including the
/// trailing '/') and are sorted by path.
fn build_tree(entries: &[&IndexEntry], depth: usize, odb: &ObjectDatabase) -> Result<ObjectId, IndexError> {
    let mut tree = Tree::new();
    let mut i = 0;
    while i < entries.len() {
        let rest = &entries[i].path[depth..];
        match rest.find_byte(b'/') {
            None => {
                tree.entries.push(TreeEntry {
                    mode: entries[i].mode,
                    name: BString::from(rest),
                    oid: entries[i].oid,
                });
                i += 1;
            }
            Some(slash) => {
                let dir = &rest[..=slash];
                let end = i + entries[i..]
                    .iter()
                    .take_while(|e| e.path[depth..].starts_with(dir))
                    .count();
                let oid = build_tree(&entries[i..end], depth + slash + 1, odb)?;
                tree.entries.push(TreeEntry {
                    mode: FileMode::Tree,
                    name: BString::from(&rest[..slash]),
                    oid,
                });
                i = end;
            }
        }
    }
    tree.sort();
    Ok(odb.write_tree(&tree)?)
}
