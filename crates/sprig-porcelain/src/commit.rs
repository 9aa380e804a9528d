//! Creating commits and querying them.

use bstr::{BStr, BString, ByteSlice};
use sprig_hash::ObjectId;
use sprig_index::Pathspec;
use sprig_object::Commit;
use sprig_repository::Repository;
use sprig_revwalk::{is_ancestor, resolve_commit};
use sprig_utils::Signature;
use tracing::{debug, info};

use crate::identity::{default_identity, validate_signature, Role};
use crate::stage::update_tracked;
use crate::status::{status, StagedFilter, Status};
use crate::{PorcelainError, Result};

/// A commit together with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: ObjectId,
    pub tree: ObjectId,
    /// In order; the first parent is the mainline.
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: BString,
}

impl CommitInfo {
    pub fn new(id: ObjectId, commit: Commit) -> Self {
        Self {
            id,
            tree: commit.tree,
            parents: commit.parents,
            author: commit.author,
            committer: commit.committer,
            message: commit.message,
        }
    }

    /// First line of the message.
    pub fn summary(&self) -> &BStr {
        self.message.lines().next().unwrap_or_default().as_bstr()
    }

    /// Committer timestamp in seconds since the epoch.
    pub fn commit_time(&self) -> i64 {
        self.committer.date.timestamp
    }
}

/// Record the index as a new commit on the current branch.
///
/// The parents are HEAD (none on an unborn branch) followed by any recorded
/// merge heads, which are cleared afterwards. An empty staged view fails
/// with [`PorcelainError::NothingStaged`] even while a merge is pending.
/// Without `author` the default identity is used; without `committer` the
/// author signs both.
pub fn commit(
    repo: &mut Repository,
    message: &str,
    author: Option<&Signature>,
    committer: Option<&Signature>,
) -> Result<ObjectId> {
    let (author, committer) = prepare(repo, message, author, committer)?;

    if status(repo, StagedFilter::StagedOnly, &Pathspec::all())?.is_empty() {
        return Err(PorcelainError::NothingStaged);
    }

    let index = repo.index()?;
    if index.has_conflicts() {
        let paths: Vec<String> = index.conflicted_paths().iter().map(|p| p.to_string()).collect();
        return Err(PorcelainError::InvalidArgument(format!(
            "cannot commit with unmerged paths: {}",
            paths.join(", ")
        )));
    }

    let merge_heads = repo.merge_heads().to_vec();
    let mut parents: Vec<ObjectId> = repo.head_oid()?.into_iter().collect();
    parents.extend(merge_heads);

    let tree = repo.current_index()?.write_tree(repo.odb())?;
    let commit = Commit {
        tree,
        parents,
        author,
        committer,
        encoding: None,
        extra_headers: Vec::new(),
        message: normalize_message(message),
    };
    let oid = repo.odb().write_commit(&commit)?;
    let updated = repo.refs().update_head(&oid)?;
    repo.clear_merge_heads()?;

    info!(%oid, %updated, parents = commit.parents.len(), summary = %commit.summary(), "created commit");
    Ok(oid)
}

/// Stage every tracked change in the working tree, then [`commit`].
///
/// Modified, renamed and type-changed files are re-staged and deleted files
/// are removed from the index. Untracked files are never added. Index
/// updates made before a failing commit are kept.
pub fn commit_all(
    repo: &mut Repository,
    message: &str,
    author: Option<&Signature>,
    committer: Option<&Signature>,
) -> Result<ObjectId> {
    let (author, committer) = prepare(repo, message, author, committer)?;

    let mut to_stage = Vec::new();
    let mut to_remove = Vec::new();
    for entry in status(repo, StagedFilter::UnstagedOnly, &Pathspec::all())? {
        match entry.status {
            Status::Modified | Status::Renamed | Status::TypeChange => to_stage.push(entry.path),
            Status::Deleted => to_remove.push(entry.path),
            Status::New | Status::Conflicted | Status::Unmodified => {}
        }
    }
    debug!(staged = to_stage.len(), removed = to_remove.len(), "updating tracked files");
    if !to_stage.is_empty() || !to_remove.is_empty() {
        update_tracked(repo, &to_stage, &to_remove)?;
    }

    commit(repo, message, Some(&author), Some(&committer))
}

/// Validate the message and settle both identities.
fn prepare(
    repo: &Repository,
    message: &str,
    author: Option<&Signature>,
    committer: Option<&Signature>,
) -> Result<(Signature, Signature)> {
    if message.trim().is_empty() {
        return Err(PorcelainError::InvalidArgument("empty commit message".into()));
    }
    let author = match author {
        Some(sig) => {
            validate_signature(sig)?;
            sig.clone()
        }
        None => default_identity(repo, Role::Author)?,
    };
    let committer = match committer {
        Some(sig) => {
            validate_signature(sig)?;
            sig.clone()
        }
        None => author.clone(),
    };
    Ok((author, committer))
}

/// Trailing whitespace trimmed, then exactly one newline.
fn normalize_message(message: &str) -> BString {
    format!("{}\n", message.trim_end()).into()
}

/// The commit a revision expression names.
pub fn commit_info(repo: &Repository, rev: &str) -> Result<CommitInfo> {
    let id = commit_id(repo, rev)?;
    let commit = repo.odb().read_commit(&id)?;
    Ok(CommitInfo::new(id, commit))
}

/// Resolve a revision expression to a commit id.
pub fn commit_id(repo: &Repository, rev: &str) -> Result<ObjectId> {
    resolve_commit(repo, rev).map_err(|e| PorcelainError::from_revision(rev, e))
}

/// Whether `ancestor` is reachable from `rev` through parent links. Every
/// commit descends from itself.
pub fn commit_descendant_of(repo: &Repository, rev: &str, ancestor: &str) -> Result<bool> {
    let descendant = commit_id(repo, rev)?;
    let ancestor = commit_id(repo, ancestor)?;
    Ok(is_ancestor(repo, &ancestor, &descendant)?)
}
