use std::cmp::Ordering;

use bstr::{BString, ByteSlice};
use sprig_hash::ObjectId;

use crate::ObjectError;

/// Mode of a tree or index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileMode {
    Regular,
    Executable,
    Symlink,
    /// A submodule commit.
    Gitlink,
    Tree,
    /// Anything else, kept so odd trees still parse.
    Unknown(u32),
}

const MODE_BITS: [(FileMode, u32); 5] = [
    (FileMode::Regular, 0o100644),
    (FileMode::Executable, 0o100755),
    (FileMode::Symlink, 0o120000),
    (FileMode::Gitlink, 0o160000),
    (FileMode::Tree, 0o040000),
];

/// What an entry is, ignoring the executable bit.
#[derive(PartialEq, Eq)]
enum Kind {
    File,
    Link,
    Submodule,
    Dir,
    Other(u32),
}

impl FileMode {
    /// Octal ASCII as found in tree objects, e.g. `b"100644"`.
    pub fn from_bytes(octal: &[u8]) -> Result<Self, ObjectError> {
        let bad = || ObjectError::InvalidFileMode(String::from_utf8_lossy(octal).into_owned());
        if octal.is_empty() {
            return Err(bad());
        }
        let bits = octal.iter().try_fold(0u32, |acc, &digit| match digit {
            b'0'..=b'7' => acc.checked_mul(8)?.checked_add(u32::from(digit - b'0')),
            _ => None,
        });
        bits.map(Self::from_raw).ok_or_else(bad)
    }

    pub fn from_raw(bits: u32) -> Self {
        // Old git wrote group-writable files as 100664.
        if bits == 0o100664 {
            return FileMode::Regular;
        }
        MODE_BITS
            .iter()
            .find(|(_, b)| *b == bits)
            .map_or(FileMode::Unknown(bits), |(mode, _)| *mode)
    }

    pub fn raw(&self) -> u32 {
        match self {
            FileMode::Unknown(bits) => *bits,
            known => MODE_BITS
                .iter()
                .find(|(mode, _)| mode == known)
                .map_or(0, |(_, bits)| *bits),
        }
    }

    /// As written in trees: directories have no leading zero.
    pub fn to_octal(&self) -> String {
        format!("{:o}", self.raw())
    }

    pub fn is_tree(&self) -> bool {
        *self == FileMode::Tree
    }

    /// Regular or executable file.
    pub fn is_blob(&self) -> bool {
        self.kind() == Kind::File
    }

    pub fn is_gitlink(&self) -> bool {
        *self == FileMode::Gitlink
    }

    /// Whether moving from `self` to `other` keeps the entry's kind, so the
    /// change is one of content or executable bit only.
    pub fn same_kind(&self, other: &FileMode) -> bool {
        self.kind() == other.kind()
    }

    fn kind(&self) -> Kind {
        match *self {
            FileMode::Regular | FileMode::Executable => Kind::File,
            FileMode::Symlink => Kind::Link,
            FileMode::Gitlink => Kind::Submodule,
            FileMode::Tree => Kind::Dir,
            FileMode::Unknown(bits) => Kind::Other(bits),
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.raw())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// The name with a trailing '/' for directories, as git sorts it.
    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let slash = self.mode.is_tree().then_some(b'/');
        self.name.iter().copied().chain(slash)
    }
}

impl Ord for TreeEntry {
    /// A directory "foo" sorts after "foo-bar" and "foo.c" but before "foo0".
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode repeated `<octal mode> <name>\0<20-byte id>` records.
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut rest = body;
        while !rest.is_empty() {
            let offset = body.len() - rest.len();
            let bad = |reason: &str| ObjectError::InvalidTreeEntry {
                offset,
                reason: reason.into(),
            };

            let (mode, after_mode) = rest
                .split_once_str(" ")
                .ok_or_else(|| bad("missing space after mode"))?;
            let mode = FileMode::from_bytes(mode).map_err(|_| bad("invalid mode"))?;
            let (name, after_name) = after_mode
                .split_once_str("\0")
                .ok_or_else(|| bad("missing NUL after name"))?;
            if name.is_empty() {
                return Err(bad("empty name"));
            }
            if after_name.len() < 20 {
                return Err(bad("truncated object id"));
            }
            let (id, tail) = after_name.split_at(20);

            entries.push(TreeEntry {
                mode,
                name: name.into(),
                oid: ObjectId::from_bytes(id)?,
            });
            rest = tail;
        }
        Ok(Self { entries })
    }

    /// Entries are written in their current order; call [`Tree::sort`]
    /// first when building a tree by hand.
    pub fn serialize_content(&self) -> Vec<u8> {
        self.entries
            .iter()
            .flat_map(|entry| {
                [
                    entry.mode.to_octal().into_bytes(),
                    b" ".to_vec(),
                    entry.name.to_vec(),
                    b"\0".to_vec(),
                    entry.oid.as_bytes().to_vec(),
                ]
            })
            .flatten()
            .collect()
    }

    pub fn sort(&mut self) {
        self.entries.sort();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
