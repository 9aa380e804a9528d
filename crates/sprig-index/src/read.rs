//! Index file parsing (versions 2 and 3).

use std::cmp::Ordering;

use bstr::BString;
use sprig_hash::ObjectId;
use sprig_object::FileMode;
use tracing::debug;

use crate::entry::{EntryFlags, FileTime, IndexEntry, StatData};
use crate::{cmp_entries, IndexError, Stage};

pub(crate) const SIGNATURE: &[u8; 4] = b"DIRC";
pub(crate) const CHECKSUM_LEN: usize = 20;

/// Stat block before the object id: ctime, mtime, dev, ino, mode, uid, gid, size.
pub(crate) const STAT_LEN: usize = 40;

pub(crate) const FLAG_ASSUME_VALID: u16 = 0x8000;
pub(crate) const FLAG_EXTENDED: u16 = 0x4000;
pub(crate) const NAME_MASK: u16 = 0x0fff;
pub(crate) const EXT_INTENT_TO_ADD: u16 = 0x2000;
pub(crate) const EXT_SKIP_WORKTREE: u16 = 0x4000;

/// On-disk size of an entry, NUL padded to a multiple of eight.
pub(crate) fn entry_size(name_len: usize, extended: bool) -> usize {
    let flags_len = if extended { 4 } else { 2 };
    (STAT_LEN + CHECKSUM_LEN + flags_len + name_len + 8) & !7
}

pub(crate) fn parse_index(data: &[u8]) -> Result<Vec<IndexEntry>, IndexError> {
    if data.len() < 12 + CHECKSUM_LEN {
        return Err(IndexError::InvalidHeader("index file too short".into()));
    }
    let content_end = data.len() - CHECKSUM_LEN;
    if sprig_hash::hasher::checksum(&data[..content_end])[..] != data[content_end..] {
        return Err(IndexError::ChecksumMismatch);
    }

    if &data[..4] != SIGNATURE {
        return Err(IndexError::InvalidHeader(format!(
            "bad signature {:?}",
            bstr::BStr::new(&data[..4])
        )));
    }
    let version = read_u32(data, 4);
    if !(2..=3).contains(&version) {
        return Err(IndexError::UnsupportedVersion(version));
    }
    let count = read_u32(data, 8) as usize;

    let mut cursor = 12;
    let mut entries: Vec<IndexEntry> = Vec::with_capacity(count);
    for _ in 0..count {
        let (entry, next) = parse_entry(data, cursor, version, content_end)?;
        if let Some(prev) = entries.last() {
            if cmp_entries(prev, &entry) != Ordering::Less {
                return Err(IndexError::InvalidEntry {
                    offset: cursor,
                    reason: format!("'{}' is out of order", entry.path),
                });
            }
        }
        entries.push(entry);
        cursor = next;
    }

    // Extensions (cache tree, resolve-undo, ...) are optional and skipped.
    let mut skipped = 0;
    while cursor + 8 <= content_end {
        let size = read_u32(data, cursor + 4) as usize;
        cursor += 8;
        if cursor + size > content_end {
            return Err(IndexError::InvalidHeader("extension exceeds index bounds".into()));
        }
        cursor += size;
        skipped += 1;
    }
    debug!(version, entries = entries.len(), skipped_extensions = skipped, "read index");

    Ok(entries)
}

fn parse_entry(
    data: &[u8],
    start: usize,
    version: u32,
    content_end: usize,
) -> Result<(IndexEntry, usize), IndexError> {
    let bad = |reason: String| IndexError::InvalidEntry {
        offset: start,
        reason,
    };
    if start + STAT_LEN + CHECKSUM_LEN + 2 > content_end {
        return Err(bad("entry truncated".into()));
    }

    let stat = StatData {
        ctime: FileTime {
            secs: read_u32(data, start),
            nanos: read_u32(data, start + 4),
        },
        mtime: FileTime {
            secs: read_u32(data, start + 8),
            nanos: read_u32(data, start + 12),
        },
        dev: read_u32(data, start + 16),
        ino: read_u32(data, start + 20),
        uid: read_u32(data, start + 28),
        gid: read_u32(data, start + 32),
        size: read_u32(data, start + 36),
    };
    let mode = FileMode::from_raw(read_u32(data, start + 24));

    let mut cursor = start + STAT_LEN;
    let oid = ObjectId::from_bytes(&data[cursor..cursor + CHECKSUM_LEN])
        .map_err(|e| bad(e.to_string()))?;
    cursor += CHECKSUM_LEN;

    let flags = read_u16(data, cursor);
    cursor += 2;
    let stage_bits = ((flags >> 12) & 0x3) as u8;
    let stage = Stage::from_u8(stage_bits).ok_or_else(|| bad(format!("invalid stage {stage_bits}")))?;
    let extended = flags & FLAG_EXTENDED != 0;

    let mut entry_flags = EntryFlags {
        assume_valid: flags & FLAG_ASSUME_VALID != 0,
        ..EntryFlags::default()
    };
    if extended {
        if version < 3 {
            return Err(bad("extended flags in a version 2 index".into()));
        }
        if cursor + 2 > content_end {
            return Err(bad("truncated extended flags".into()));
        }
        let ext = read_u16(data, cursor);
        cursor += 2;
        entry_flags.intent_to_add = ext & EXT_INTENT_TO_ADD != 0;
        entry_flags.skip_worktree = ext & EXT_SKIP_WORKTREE != 0;
    }

    // Names of 0xfff bytes or more are stored with a saturated length field.
    let name_len = match (flags & NAME_MASK) as usize {
        len if len < NAME_MASK as usize => len,
        _ => data[cursor..content_end]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| bad("unterminated path".into()))?,
    };
    if cursor + name_len > content_end {
        return Err(bad("path exceeds index bounds".into()));
    }
    let path = BString::from(&data[cursor..cursor + name_len]);
    if path.is_empty() {
        return Err(bad("empty path".into()));
    }

    let next = start + entry_size(name_len, extended);
    if next > content_end {
        return Err(bad("entry padding exceeds index bounds".into()));
    }

    Ok((
        IndexEntry {
            path,
            oid,
            mode,
            stage,
            stat,
            flags: entry_flags,
        },
        next,
    ))
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(mut body: Vec<u8>) -> Vec<u8> {
        let sum = sprig_hash::hasher::checksum(&body);
        body.extend_from_slice(&sum);
        body
    }

    #[test]
    fn empty_v2_index() {
        let mut body = SIGNATURE.to_vec();
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&0u32.to_be_bytes());
        assert!(parse_index(&with_checksum(body)).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut body = SIGNATURE.to_vec();
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&0u32.to_be_bytes());
        let mut data = with_checksum(body);
        let last = data.len() - 1;
        data[last] ^= 0xff;
        assert!(matches!(parse_index(&data), Err(IndexError::ChecksumMismatch)));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut body = SIGNATURE.to_vec();
        body.extend_from_slice(&4u32.to_be_bytes());
        body.extend_from_slice(&0u32.to_be_bytes());
        assert!(matches!(
            parse_index(&with_checksum(body)),
            Err(IndexError::UnsupportedVersion(4))
        ));
    }

    #[test]
    fn skips_extensions() {
        let mut body = SIGNATURE.to_vec();
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend_from_slice(b"TREE");
        body.extend_from_slice(&3u32.to_be_bytes());
        body.extend_from_slice(b"abc");
        assert!(parse_index(&with_checksum(body)).unwrap().is_empty());
    }

    #[test]
    fn entry_sizes_are_padded() {
        // 62 fixed bytes + name, rounded up with at least one NUL.
        assert_eq!(entry_size(1, false), 64);
        assert_eq!(entry_size(2, false), 72);
        assert_eq!(entry_size(9, false), 72);
        assert_eq!(entry_size(10, false), 80);
        assert_eq!(entry_size(1, true), 72);
    }
}
