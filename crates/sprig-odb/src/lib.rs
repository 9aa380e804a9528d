//! Object storage for sprig.
//!
//! [`ObjectStore`] is the boundary the porcelain talks to: anything that can
//! read, write and enumerate objects by id. [`LooseStore`] keeps objects as
//! zlib files under `.git/objects`, and [`MemoryStore`] keeps them in memory.
//! [`ObjectDatabase`] wraps a store with typed accessors.

mod loose;
mod memory;

pub use loose::LooseStore;
pub use memory::MemoryStore;

use std::path::Path;

use sprig_hash::ObjectId;
use sprig_object::{Blob, Commit, Object, ObjectType, Tree};

/// Errors from object storage.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("ambiguous object prefix '{prefix}': {count} candidates")]
    Ambiguous { prefix: String, count: usize },

    #[error("object {oid} is a {actual}, expected {expected}")]
    UnexpectedType {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error("object parse error: {0}")]
    Object(#[from] sprig_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] sprig_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A place objects live.
pub trait ObjectStore: Send + Sync {
    /// Read an object. `Ok(None)` when absent, `Err` when present but unreadable.
    fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError>;

    fn contains(&self, oid: &ObjectId) -> bool;

    /// Store an object and return its id. Storing an existing object is a no-op.
    fn write(&self, obj: &Object) -> Result<ObjectId, OdbError>;

    /// All ids whose hex form starts with `prefix`.
    fn lookup_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>, OdbError>;
}

/// Typed access over an [`ObjectStore`].
pub struct ObjectDatabase {
    store: Box<dyn ObjectStore>,
}

impl ObjectDatabase {
    pub fn new(store: Box<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Open the loose store at `objects_dir`.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self::new(Box::new(LooseStore::open(objects_dir)))
    }

    /// A database backed by memory only.
    pub fn in_memory() -> Self {
        Self::new(Box::<MemoryStore>::default())
    }

    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        self.store.read(oid)
    }

    /// Read an object that must exist.
    pub fn find(&self, oid: &ObjectId) -> Result<Object, OdbError> {
        self.store.read(oid)?.ok_or(OdbError::NotFound(*oid))
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.store.contains(oid)
    }

    pub fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        self.store.write(obj)
    }

    pub fn write_blob(&self, data: &[u8]) -> Result<ObjectId, OdbError> {
        self.write(&Object::Blob(Blob::new(data.to_vec())))
    }

    pub fn write_tree(&self, tree: &Tree) -> Result<ObjectId, OdbError> {
        self.write(&Object::Tree(tree.clone()))
    }

    pub fn write_commit(&self, commit: &Commit) -> Result<ObjectId, OdbError> {
        self.write(&Object::Commit(commit.clone()))
    }

    pub fn read_commit(&self, oid: &ObjectId) -> Result<Commit, OdbError> {
        match self.find(oid)? {
            Object::Commit(c) => Ok(c),
            other => Err(unexpected(oid, ObjectType::Commit, &other)),
        }
    }

    pub fn read_tree(&self, oid: &ObjectId) -> Result<Tree, OdbError> {
        match self.find(oid)? {
            Object::Tree(t) => Ok(t),
            other => Err(unexpected(oid, ObjectType::Tree, &other)),
        }
    }

    pub fn read_blob(&self, oid: &ObjectId) -> Result<Blob, OdbError> {
        match self.find(oid)? {
            Object::Blob(b) => Ok(b),
            other => Err(unexpected(oid, ObjectType::Blob, &other)),
        }
    }

    /// Resolve an abbreviated hex id. `Ok(None)` when nothing matches.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Option<ObjectId>, OdbError> {
        let mut matches = self.store.lookup_prefix(prefix)?;
        matches.sort();
        matches.dedup();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            count => Err(OdbError::Ambiguous {
                prefix: prefix.to_string(),
                count,
            }),
        }
    }
}

fn unexpected(oid: &ObjectId, expected: ObjectType, actual: &Object) -> OdbError {
    OdbError::UnexpectedType {
        oid: *oid,
        expected,
        actual: actual.object_type(),
    }
}
