use sprig_revwalk::RevWalkError;

/// Errors from porcelain operations.
#[derive(Debug, thiserror::Error)]
pub enum PorcelainError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("{role} identity unknown: set user.name and user.email, or GIT_{env}_NAME and GIT_{env}_EMAIL")]
    NoIdentityConfigured { role: &'static str, env: &'static str },

    #[error("nothing added to commit")]
    NothingStaged,

    #[error("pathspec '{0}' did not match any files")]
    PathNotFound(String),

    #[error("unknown revision '{0}'")]
    RefNotFound(String),

    #[error("short object id '{prefix}' is ambiguous ({count} candidates)")]
    AmbiguousRevision { prefix: String, count: usize },

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A failure below the porcelain: object, index, ref or config storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Repo(#[from] sprig_repository::RepoError),

    #[error(transparent)]
    Odb(#[from] sprig_odb::OdbError),

    #[error(transparent)]
    Index(#[from] sprig_index::IndexError),

    #[error(transparent)]
    Ref(#[from] sprig_ref::RefError),

    #[error(transparent)]
    Config(#[from] sprig_config::ConfigError),

    #[error(transparent)]
    Diff(#[from] sprig_diff::DiffError),

    #[error(transparent)]
    RevWalk(RevWalkError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

macro_rules! store_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PorcelainError {
                fn from(err: $ty) -> Self {
                    Self::Store(err.into())
                }
            }
        )*
    };
}

store_error!(
    sprig_repository::RepoError,
    sprig_odb::OdbError,
    sprig_index::IndexError,
    sprig_ref::RefError,
    sprig_config::ConfigError,
    sprig_diff::DiffError,
    std::io::Error,
);

impl From<RevWalkError> for PorcelainError {
    fn from(err: RevWalkError) -> Self {
        match err {
            RevWalkError::AmbiguousRevision { prefix, count } => Self::AmbiguousRevision { prefix, count },
            other => Self::Store(StoreError::RevWalk(other)),
        }
    }
}

impl PorcelainError {
    /// Map a failure to resolve the revision `expr` to the caller-facing kinds.
    pub(crate) fn from_revision(expr: &str, err: RevWalkError) -> Self {
        match err {
            RevWalkError::InvalidRevision(_)
            | RevWalkError::RevisionNotFound(_)
            | RevWalkError::CommitNotFound(_) => Self::RefNotFound(expr.to_string()),
            RevWalkError::NotACommit(oid) => Self::InvalidArgument(format!("'{expr}' ({oid}) is not a commit")),
            other => other.into(),
        }
    }
}
