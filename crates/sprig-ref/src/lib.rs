//! Reference storage for sprig.
//!
//! Refs are read from loose files under the git directory, falling back to
//! `packed-refs`. Writes always produce loose files under a lock.

mod error;
mod loose;
mod name;
pub mod packed;

use std::path::{Path, PathBuf};

use sprig_hash::ObjectId;
use tracing::debug;

pub use error::RefError;
pub use name::RefName;
pub use packed::{PackedRef, PackedRefs};

/// Symbolic refs are followed at most this deep.
pub const MAX_SYMREF_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Direct { name: RefName, target: ObjectId },
    Symbolic { name: RefName, target: RefName },
}

impl Reference {
    pub fn name(&self) -> &RefName {
        match self {
            Reference::Direct { name, .. } | Reference::Symbolic { name, .. } => name,
        }
    }

    pub fn symbolic_target(&self) -> Option<&RefName> {
        match self {
            Reference::Symbolic { target, .. } => Some(target),
            Reference::Direct { .. } => None,
        }
    }
}

/// Read side of a reference backend.
pub trait RefStore: Send + Sync {
    /// Look up one ref without following symbolic links.
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError>;

    /// `HEAD` as stored, symbolic or detached.
    fn read_head(&self) -> Result<Option<Reference>, RefError> {
        self.resolve(&RefName::head())
    }

    /// Follow symbolic refs to an object id. `Ok(None)` for a missing or
    /// unborn ref.
    fn resolve_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        let mut current = name.clone();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.resolve(&current)? {
                None => return Ok(None),
                Some(Reference::Direct { target, .. }) => return Ok(Some(target)),
                Some(Reference::Symbolic { target, .. }) => current = target,
            }
        }
        Err(RefError::SymrefLoop(name.to_string()))
    }

    /// The last ref in the symbolic chain starting at `name`, which is the
    /// ref a commit on `name` must update. It may not exist yet.
    fn final_target(&self, name: &RefName) -> Result<RefName, RefError> {
        let mut current = name.clone();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.resolve(&current)? {
                Some(Reference::Symbolic { target, .. }) => current = target,
                _ => return Ok(current),
            }
        }
        Err(RefError::SymrefLoop(name.to_string()))
    }
}

/// The loose-files backend rooted at a git directory.
pub struct FilesRefStore {
    git_dir: PathBuf,
}

impl FilesRefStore {
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        loose::write_direct(&self.git_dir, name, oid)?;
        debug!(%name, %oid, "updated ref");
        Ok(())
    }

    pub fn write_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        loose::write_symbolic(&self.git_dir, name, target)?;
        debug!(%name, %target, "updated symbolic ref");
        Ok(())
    }

    /// Move whatever HEAD ultimately points at to `oid`: the current branch,
    /// or HEAD itself when detached. Returns the ref that was written.
    pub fn update_head(&self, oid: &ObjectId) -> Result<RefName, RefError> {
        let target = self.final_target(&RefName::head())?;
        self.write_ref(&target, oid)?;
        Ok(target)
    }
}

impl RefStore for FilesRefStore {
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        if let Some(reference) = loose::read(&self.git_dir, name)? {
            return Ok(Some(reference));
        }
        if name.is_pseudo() {
            return Ok(None);
        }
        Ok(PackedRefs::load(&self.git_dir)?
            .find(name)
            .map(|packed| Reference::Direct {
                name: packed.name.clone(),
                target: packed.oid,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_raw([byte; 20])
    }

    fn store() -> (tempfile::TempDir, FilesRefStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesRefStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn unborn_head() {
        let (_dir, store) = store();
        let main = RefName::branch("main").unwrap();
        store.write_symbolic_ref(&RefName::head(), &main).unwrap();

        assert_eq!(store.resolve_to_oid(&RefName::head()).unwrap(), None);
        assert_eq!(store.final_target(&RefName::head()).unwrap(), main);
    }

    #[test]
    fn update_head_moves_the_branch() {
        let (dir, store) = store();
        let main = RefName::branch("main").unwrap();
        store.write_symbolic_ref(&RefName::head(), &main).unwrap();

        assert_eq!(store.update_head(&oid(1)).unwrap(), main);
        assert_eq!(store.resolve_to_oid(&RefName::head()).unwrap(), Some(oid(1)));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("refs/heads/main")).unwrap(),
            format!("{}\n", oid(1))
        );
        // HEAD is still symbolic.
        assert!(store.resolve(&RefName::head()).unwrap().unwrap().symbolic_target().is_some());
    }

    #[test]
    fn detached_head_is_written_directly() {
        let (_dir, store) = store();
        store.write_ref(&RefName::head(), &oid(1)).unwrap();
        assert_eq!(store.update_head(&oid(2)).unwrap(), RefName::head());
        assert_eq!(store.resolve_to_oid(&RefName::head()).unwrap(), Some(oid(2)));
    }

    #[test]
    fn packed_refs_are_a_fallback() {
        let (dir, store) = store();
        std::fs::write(
            dir.path().join("packed-refs"),
            format!("# pack-refs with: sorted\n{} refs/heads/old\n", oid(5)),
        )
        .unwrap();
        let old = RefName::branch("old").unwrap();
        assert_eq!(store.resolve_to_oid(&old).unwrap(), Some(oid(5)));

        store.write_ref(&old, &oid(6)).unwrap();
        assert_eq!(store.resolve_to_oid(&old).unwrap(), Some(oid(6)));
    }

    #[test]
    fn symref_loops_are_detected() {
        let (_dir, store) = store();
        let a = RefName::new("refs/heads/a").unwrap();
        let b = RefName::new("refs/heads/b").unwrap();
        store.write_symbolic_ref(&a, &b).unwrap();
        store.write_symbolic_ref(&b, &a).unwrap();
        assert!(matches!(store.resolve_to_oid(&a), Err(RefError::SymrefLoop(_))));
    }

    #[test]
    fn file_and_directory_refs_conflict() {
        let (_dir, store) = store();
        store.write_ref(&RefName::branch("topic").unwrap(), &oid(1)).unwrap();
        let err = store
            .write_ref(&RefName::branch("topic/sub").unwrap(), &oid(2))
            .unwrap_err();
        assert!(matches!(err, RefError::DirectoryConflict { .. }));
    }

    #[test]
    fn garbage_ref_file_is_a_parse_error() {
        let (dir, store) = store();
        std::fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        std::fs::write(dir.path().join("refs/heads/bad"), "zzzz\n").unwrap();
        assert!(matches!(
            store.resolve(&RefName::branch("bad").unwrap()),
            Err(RefError::Parse { .. })
        ));
    }
}
