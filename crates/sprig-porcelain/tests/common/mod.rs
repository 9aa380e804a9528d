#![allow(dead_code)]

use std::path::Path;

use sprig_index::Pathspec;
use sprig_porcelain::{status, StagedFilter, Status, StatusEntry};
use sprig_repository::Repository;
use sprig_utils::{GitDate, Signature};

pub fn setup() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

pub fn sig(time: i64) -> Signature {
    Signature::new("Test Author", "author@example.com", GitDate::new(time, 0)).unwrap()
}

/// `(path, status, staged)` rows of a status view.
pub fn rows(repo: &Repository, filter: StagedFilter) -> Vec<(String, Status, bool)> {
    simplify(&status(repo, filter, &Pathspec::all()).unwrap())
}

pub fn simplify(entries: &[StatusEntry]) -> Vec<(String, Status, bool)> {
    entries
        .iter()
        .map(|e| (e.path.to_string(), e.status, e.staged))
        .collect()
}

pub fn row(path: &str, status: Status, staged: bool) -> (String, Status, bool) {
    (path.to_string(), status, staged)
}
