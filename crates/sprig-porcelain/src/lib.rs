//! The commit-and-status core of sprig.
//!
//! Free functions over a [`Repository`] handle: [`status`] compares HEAD,
//! the index and the working tree; [`add`] and [`rm`] edit the index;
//! [`commit`] and [`commit_all`] record history; [`log`], [`ls`],
//! [`commit_info`] and [`commit_descendant_of`] read it back.
//!
//! Read-only operations take `&Repository`, mutations take
//! `&mut Repository`.
//!
//! [`Repository`]: sprig_repository::Repository

mod commit;
mod conflicts;
mod error;
pub mod identity;
mod log;
mod ls;
mod stage;
mod status;

pub use commit::{commit, commit_all, commit_descendant_of, commit_id, commit_info, CommitInfo};
pub use conflicts::{conflicts, ConflictEntry, ConflictSide};
pub use error::{PorcelainError, StoreError};
pub use identity::{default_identity, Role};
pub use log::{log, DEFAULT_LOG_LIMIT};
pub use ls::{ls, LsEntry};
pub use stage::{add, rm};
pub use status::{status, StagedFilter, Status, StatusEntry};

pub type Result<T, E = PorcelainError> = std::result::Result<T, E>;
