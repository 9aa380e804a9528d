use std::collections::HashSet;

use sprig_hash::ObjectId;
use sprig_repository::Repository;
use tracing::trace;

use crate::{read_commit, RevWalkError};

/// Whether `ancestor` is reachable from `descendant` through any parent
/// link. A commit is its own ancestor.
///
/// Walks an explicit frontier with a visited set, so deep histories do not
/// grow the call stack and diamonds are expanded once.
pub fn is_ancestor(
    repo: &Repository,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> Result<bool, RevWalkError> {
    if ancestor == descendant {
        return Ok(true);
    }

    let mut frontier = vec![*descendant];
    let mut visited = HashSet::from([*descendant]);
    while let Some(oid) = frontier.pop() {
        let commit = read_commit(repo.odb(), &oid)?;
        for parent in commit.parents {
            if parent == *ancestor {
                trace!(%ancestor, %descendant, visited = visited.len(), "ancestor found");
                return Ok(true);
            }
            if visited.insert(parent) {
                frontier.push(parent);
            }
        }
    }
    Ok(false)
}
