//! Revision walking for sprig.
//!
//! [`resolve_revision`] turns expressions such as `HEAD~2` or `v1.0^2` into
//! object ids, [`RevWalk`] yields commits newest first, and [`is_ancestor`]
//! answers reachability questions.

mod ancestry;
mod revision;
mod walk;

pub use ancestry::is_ancestor;
pub use revision::{peel_to_commit, resolve_commit, resolve_revision};
pub use walk::{RevWalk, WalkOptions};

use sprig_hash::ObjectId;
use sprig_odb::OdbError;

/// Errors from revision parsing and graph traversal.
#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error("invalid revision syntax: {0}")]
    InvalidRevision(String),

    #[error("unknown revision: {0}")]
    RevisionNotFound(String),

    #[error("short object id {prefix} is ambiguous ({count} candidates)")]
    AmbiguousRevision { prefix: String, count: usize },

    #[error("commit not found: {0}")]
    CommitNotFound(ObjectId),

    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    #[error(transparent)]
    Odb(OdbError),

    #[error(transparent)]
    Ref(#[from] sprig_ref::RefError),

    #[error(transparent)]
    Repo(#[from] sprig_repository::RepoError),
}

impl From<OdbError> for RevWalkError {
    fn from(err: OdbError) -> Self {
        match err {
            OdbError::Ambiguous { prefix, count } => Self::AmbiguousRevision { prefix, count },
            other => Self::Odb(other),
        }
    }
}

/// Read a commit, mapping a missing or mistyped object to the walk errors.
pub(crate) fn read_commit(
    odb: &sprig_odb::ObjectDatabase,
    oid: &ObjectId,
) -> Result<sprig_object::Commit, RevWalkError> {
    odb.read_commit(oid).map_err(|err| match err {
        OdbError::NotFound(oid) => RevWalkError::CommitNotFound(oid),
        OdbError::UnexpectedType { oid, .. } => RevWalkError::NotACommit(oid),
        other => other.into(),
    })
}
