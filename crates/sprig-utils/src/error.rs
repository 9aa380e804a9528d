use std::path::PathBuf;

/// Errors from dates, signatures and lock files.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("bad date: {0}")]
    DateParse(String),

    #[error("invalid identity: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures taking or releasing a `<path>.lock` file. `path` is the file
/// being replaced, not the lock itself.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("'{}' is locked by another writer", path.display())]
    AlreadyLocked { path: PathBuf },

    #[error("cannot lock '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot replace '{}' from its lock file: {source}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
