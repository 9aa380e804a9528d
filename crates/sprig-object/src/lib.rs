//! In-memory forms of the four stored object kinds.
//!
//! Every object is `"<kind> <len>\0"` followed by its body. The body bytes
//! produced here are exactly what git hashes, so an id computed by
//! [`Object::compute_id`] names the same object in any git repository.

mod blob;
mod commit;
pub mod header;
mod tag;
mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use std::fmt;

use bstr::BString;
use sprig_hash::{HashError, Hasher, ObjectId};

#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("unknown object kind '{0}'")]
    InvalidType(BString),

    #[error("malformed object header: {0}")]
    InvalidHeader(String),

    #[error("object body is {actual} bytes, header promised {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("bad tree entry at byte {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("{kind} object has no '{field}' line")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("unsupported file mode {0}")]
    InvalidFileMode(String),

    #[error("bad identity line: {0}")]
    Signature(#[from] sprig_utils::UtilError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Kind tag written in the object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

const KIND_NAMES: [(ObjectType, &str); 4] = [
    (ObjectType::Blob, "blob"),
    (ObjectType::Tree, "tree"),
    (ObjectType::Commit, "commit"),
    (ObjectType::Tag, "tag"),
];

impl ObjectType {
    pub fn from_bytes(name: &[u8]) -> Result<Self, ObjectError> {
        KIND_NAMES
            .iter()
            .find(|(_, n)| n.as_bytes() == name)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| ObjectError::InvalidType(name.into()))
    }

    pub fn as_str(&self) -> &'static str {
        KIND_NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map_or("", |(_, n)| *n)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Decode a full loose-object payload. The body must be exactly as long
    /// as the header says.
    pub fn parse(raw: &[u8]) -> Result<Self, ObjectError> {
        let (kind, expected, body_start) = header::parse_header(raw)?;
        let body = &raw[body_start..];
        if body.len() == expected {
            Self::parse_content(kind, body)
        } else {
            Err(ObjectError::SizeMismatch {
                expected,
                actual: body.len(),
            })
        }
    }

    pub fn parse_content(kind: ObjectType, body: &[u8]) -> Result<Self, ObjectError> {
        let object = match kind {
            ObjectType::Blob => Object::Blob(Blob::new(body.to_vec())),
            ObjectType::Tree => Object::Tree(Tree::parse(body)?),
            ObjectType::Commit => Object::Commit(Commit::parse(body)?),
            ObjectType::Tag => Object::Tag(Tag::parse(body)?),
        };
        Ok(object)
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Blob(_) => ObjectType::Blob,
            Object::Tree(_) => ObjectType::Tree,
            Object::Commit(_) => ObjectType::Commit,
            Object::Tag(_) => ObjectType::Tag,
        }
    }

    /// The body alone, without the header.
    pub fn serialize_content(&self) -> Vec<u8> {
        match self {
            Object::Blob(blob) => blob.data.clone(),
            Object::Tree(tree) => tree.serialize_content(),
            Object::Commit(commit) => commit.serialize_content(),
            Object::Tag(tag) => tag.serialize_content(),
        }
    }

    /// Header and body, as stored before compression.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_content();
        [header::write_header(self.object_type(), body.len()), body].concat()
    }

    pub fn compute_id(&self) -> Result<ObjectId, HashError> {
        Hasher::hash_object(self.object_type().as_str(), &self.serialize_content())
    }
}
