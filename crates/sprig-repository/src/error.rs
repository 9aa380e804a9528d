use std::path::PathBuf;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a git repository (or any of the parent directories): {0}")]
    NotFound(PathBuf),

    #[error("invalid git directory: {path}: {reason}")]
    InvalidGitDir { path: PathBuf, reason: String },

    #[error("bare repository has no working tree")]
    BareNoWorkTree,

    #[error("invalid MERGE_HEAD line {line}: {reason}")]
    InvalidMergeHead { line: usize, reason: String },

    #[error(transparent)]
    Config(#[from] sprig_config::ConfigError),

    #[error(transparent)]
    Odb(#[from] sprig_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] sprig_ref::RefError),

    #[error(transparent)]
    Index(#[from] sprig_index::IndexError),

    #[error(transparent)]
    Util(#[from] sprig_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
