//! Date-ordered commit traversal.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use sprig_hash::ObjectId;
use sprig_object::Commit;
use sprig_repository::Repository;
use tracing::trace;

use crate::{read_commit, RevWalkError};

/// Options for a walk.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Stop after emitting this many commits.
    pub max_count: Option<usize>,
    /// Hide commits whose committer time is before this timestamp. Their
    /// parents are still visited.
    pub since: Option<i64>,
}

/// A queued commit. Ordered by committer time, then by id, so the heap
/// pops the newest commit and breaks ties on the greater id.
struct WalkEntry {
    oid: ObjectId,
    commit_time: i64,
    commit: Commit,
}

impl PartialEq for WalkEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WalkEntry {}

impl PartialOrd for WalkEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WalkEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.commit_time
            .cmp(&other.commit_time)
            .then_with(|| self.oid.cmp(&other.oid))
    }
}

/// Iterator over commits reachable from the pushed starting points, newest
/// committer time first. Each commit is yielded once even when several paths
/// lead to it.
pub struct RevWalk<'a> {
    repo: &'a Repository,
    queue: BinaryHeap<WalkEntry>,
    seen: HashSet<ObjectId>,
    options: WalkOptions,
    emitted: usize,
}

impl<'a> RevWalk<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            options: WalkOptions::default(),
            emitted: 0,
        }
    }

    pub fn set_options(&mut self, options: WalkOptions) {
        self.options = options;
    }

    /// Add a starting commit.
    pub fn push(&mut self, oid: ObjectId) -> Result<(), RevWalkError> {
        if self.seen.insert(oid) {
            let commit = read_commit(self.repo.odb(), &oid)?;
            self.enqueue(oid, commit);
        }
        Ok(())
    }

    /// Start from HEAD. Does nothing on an unborn branch.
    pub fn push_head(&mut self) -> Result<(), RevWalkError> {
        if let Some(oid) = self.repo.head_oid()? {
            self.push(oid)?;
        }
        Ok(())
    }

    fn enqueue(&mut self, oid: ObjectId, commit: Commit) {
        self.queue.push(WalkEntry {
            oid,
            commit_time: commit.commit_time(),
            commit,
        });
    }

    fn exhausted(&self) -> bool {
        self.options.max_count.is_some_and(|max| self.emitted >= max)
    }

    fn step(&mut self) -> Result<Option<(ObjectId, Commit)>, RevWalkError> {
        while !self.exhausted() {
            let Some(entry) = self.queue.pop() else {
                return Ok(None);
            };
            trace!(oid = %entry.oid, time = entry.commit_time, "walk pop");

            for parent in &entry.commit.parents {
                if self.seen.insert(*parent) {
                    let commit = read_commit(self.repo.odb(), parent)?;
                    self.enqueue(*parent, commit);
                }
            }

            if self.options.since.is_some_and(|since| entry.commit_time < since) {
                continue;
            }
            self.emitted += 1;
            return Ok(Some((entry.oid, entry.commit)));
        }
        Ok(None)
    }
}

impl Iterator for RevWalk<'_> {
    type Item = Result<(ObjectId, Commit), RevWalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(err) => {
                // A broken parent chain ends the walk after reporting it.
                self.queue.clear();
                Some(Err(err))
            }
        }
    }
}
