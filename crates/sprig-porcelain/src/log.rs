use sprig_repository::Repository;
use sprig_revwalk::{RevWalk, WalkOptions};
use tracing::debug;

use crate::commit::{commit_id, CommitInfo};
use crate::Result;

/// How many commits [`log`] callers show when they have no limit of their own.
pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Up to `max` commits reachable from `rev`, newest committer time first.
///
/// `max <= 0` yields nothing. With `after`, commits older than that
/// timestamp are left out, but the walk still passes through them to reach
/// newer ancestors.
pub fn log(repo: &Repository, rev: &str, max: i64, after: Option<i64>) -> Result<Vec<CommitInfo>> {
    if max <= 0 {
        return Ok(Vec::new());
    }
    let start = commit_id(repo, rev)?;

    let mut walk = RevWalk::new(repo);
    walk.set_options(WalkOptions {
        max_count: Some(usize::try_from(max).unwrap_or(usize::MAX)),
        since: after,
    });
    walk.push(start)?;

    let commits = walk
        .map(|item| item.map(|(id, commit)| CommitInfo::new(id, commit)))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(rev, count = commits.len(), "walked history");
    Ok(commits)
}
