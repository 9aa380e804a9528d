//! Merge parents, unmerged paths and listing tracked files.

mod common;

use common::{row, rows, setup, sig, write};
use sprig_hash::ObjectId;
use sprig_index::{IndexEntry, Stage};
use sprig_object::{Commit, FileMode};
use sprig_porcelain::{add, commit, commit_info, conflicts, ls, ConflictSide, PorcelainError, StagedFilter, Status};
use sprig_repository::Repository;

/// A commit on the side, not reachable from HEAD, with `parent` as parent.
fn side_commit(repo: &Repository, parent: ObjectId) -> ObjectId {
    let tree = repo.odb().read_commit(&parent).unwrap().tree;
    let commit = Commit {
        tree,
        parents: vec![parent],
        author: sig(50),
        committer: sig(50),
        encoding: None,
        extra_headers: Vec::new(),
        message: "side\n".into(),
    };
    repo.odb().write_commit(&commit).unwrap()
}

#[test]
fn merge_heads_become_extra_parents() {
    let (dir, mut repo) = setup();
    write(dir.path(), "a.txt", "a\n");
    add(&mut repo, &["a.txt"], false).unwrap();
    let h1 = commit(&mut repo, "base", Some(&sig(10)), None).unwrap();
    let h2 = side_commit(&repo, h1);

    repo.set_merge_heads(vec![h2]).unwrap();
    write(dir.path(), "b.txt", "merged in\n");
    add(&mut repo, &["b.txt"], false).unwrap();
    let merge = commit(&mut repo, "merge side", Some(&sig(100)), None).unwrap();

    assert_eq!(commit_info(&repo, "HEAD").unwrap().parents, [h1, h2]);
    assert!(repo.merge_heads().is_empty());
    // The cleared merge state is gone from disk too.
    let reopened = Repository::open(dir.path()).unwrap();
    assert!(reopened.merge_heads().is_empty());
    assert_eq!(reopened.head_oid().unwrap(), Some(merge));
}

#[test]
fn pending_merge_with_nothing_staged_is_refused() {
    let (dir, mut repo) = setup();
    write(dir.path(), "a.txt", "a\n");
    add(&mut repo, &["a.txt"], false).unwrap();
    let h1 = commit(&mut repo, "base", Some(&sig(10)), None).unwrap();
    let h2 = side_commit(&repo, h1);

    repo.set_merge_heads(vec![h2]).unwrap();
    assert!(matches!(
        commit(&mut repo, "merge", Some(&sig(20)), None),
        Err(PorcelainError::NothingStaged)
    ));
    // Nothing moved and the merge is still pending.
    assert_eq!(repo.head_oid().unwrap(), Some(h1));
    assert_eq!(repo.merge_heads(), [h2]);
}

/// Replace `path` in the index with base/ours/theirs stages.
fn conflict(repo: &mut Repository, path: &str) -> [ObjectId; 3] {
    let base = repo.odb().write_blob(b"base\n").unwrap();
    let ours = repo.odb().write_blob(b"ours\n").unwrap();
    let theirs = repo.odb().write_blob(b"theirs\n").unwrap();
    let index = repo.index_mut().unwrap();
    index.remove_path(path.into());
    index.add(IndexEntry::new(path, base, FileMode::Regular, Stage::Base));
    index.add(IndexEntry::new(path, ours, FileMode::Regular, Stage::Ours));
    index.add(IndexEntry::new(path, theirs, FileMode::Executable, Stage::Theirs));
    repo.write_index().unwrap();
    [base, ours, theirs]
}

#[test]
fn unmerged_paths_block_commits_until_added() {
    let (dir, mut repo) = setup();
    write(dir.path(), "c.txt", "base\n");
    write(dir.path(), "d.txt", "d\n");
    add(&mut repo, &["."], false).unwrap();
    commit(&mut repo, "base", Some(&sig(10)), None).unwrap();

    let [base, ours, theirs] = conflict(&mut repo, "c.txt");
    write(dir.path(), "c.txt", "<<<<<<< ours\nours\n=======\ntheirs\n>>>>>>> theirs\n");

    let found = conflicts(&repo).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, "c.txt");
    assert_eq!(found[0].base, Some(ConflictSide { id: base, mode: FileMode::Regular }));
    assert_eq!(found[0].ours, Some(ConflictSide { id: ours, mode: FileMode::Regular }));
    assert_eq!(found[0].theirs, Some(ConflictSide { id: theirs, mode: FileMode::Executable }));

    // Reported once, as an unstaged row, and never as untracked.
    assert_eq!(rows(&repo, StagedFilter::Both), [row("c.txt", Status::Conflicted, false)]);
    assert!(rows(&repo, StagedFilter::StagedOnly).is_empty());

    // Only conflict entries: the staged view is empty.
    assert!(matches!(
        commit(&mut repo, "too early", Some(&sig(20)), None),
        Err(PorcelainError::NothingStaged)
    ));

    write(dir.path(), "d.txt", "d changed\n");
    add(&mut repo, &["d.txt"], false).unwrap();
    let err = commit(&mut repo, "still too early", Some(&sig(20)), None).unwrap_err();
    assert!(matches!(err, PorcelainError::InvalidArgument(ref m) if m.contains("c.txt")));

    write(dir.path(), "c.txt", "resolved\n");
    add(&mut repo, &["c.txt"], false).unwrap();
    assert!(conflicts(&repo).unwrap().is_empty());
    assert_eq!(
        rows(&repo, StagedFilter::Both),
        [row("c.txt", Status::Modified, true), row("d.txt", Status::Modified, true)]
    );
    commit(&mut repo, "resolved", Some(&sig(20)), None).unwrap();
}

#[test]
fn conflicts_with_missing_sides() {
    let (_dir, mut repo) = setup();
    let ours = repo.odb().write_blob(b"added by us\n").unwrap();
    let theirs = repo.odb().write_blob(b"added by them\n").unwrap();
    let index = repo.index_mut().unwrap();
    index.add(IndexEntry::new("both-added", ours, FileMode::Regular, Stage::Ours));
    index.add(IndexEntry::new("both-added", theirs, FileMode::Regular, Stage::Theirs));
    index.add(IndexEntry::new("deleted-by-them", ours, FileMode::Regular, Stage::Base));
    index.add(IndexEntry::new("deleted-by-them", ours, FileMode::Regular, Stage::Ours));
    repo.write_index().unwrap();

    let found = conflicts(&repo).unwrap();
    let paths: Vec<String> = found.iter().map(|c| c.path.to_string()).collect();
    assert_eq!(paths, ["both-added", "deleted-by-them"]);
    assert!(found[0].base.is_none());
    assert!(found[1].theirs.is_none());
    assert_eq!(found[1].ours.map(|s| s.id), Some(ours));
}

#[test]
fn ls_index_and_revisions() {
    let (dir, mut repo) = setup();
    assert!(ls(&repo, None).unwrap().is_empty());
    assert!(matches!(ls(&repo, Some("HEAD")), Err(PorcelainError::RefNotFound(_))));

    write(dir.path(), "b.txt", "b\n");
    write(dir.path(), "dir/a.txt", "a\n");
    add(&mut repo, &["."], false).unwrap();
    commit(&mut repo, "first", Some(&sig(10)), None).unwrap();

    write(dir.path(), "c.txt", "c\n");
    add(&mut repo, &["c.txt"], false).unwrap();
    conflict(&mut repo, "b.txt");

    let paths = |entries: Vec<sprig_porcelain::LsEntry>| -> Vec<String> {
        entries.into_iter().map(|e| e.path.to_string()).collect()
    };
    // The index: staged file included, conflicted path listed once.
    let index = ls(&repo, None).unwrap();
    assert_eq!(paths(index.clone()), ["b.txt", "c.txt", "dir/a.txt"]);
    assert_eq!(index[0].id, repo.odb().write_blob(b"base\n").unwrap());

    let head = ls(&repo, Some("HEAD")).unwrap();
    assert_eq!(paths(head.clone()), ["b.txt", "dir/a.txt"]);
    assert_eq!(head[1].id, repo.odb().write_blob(b"a\n").unwrap());
    assert_eq!(head[1].mode, FileMode::Regular);
}

#[test]
fn ls_in_a_bare_repository_reads_head() {
    let dir = tempfile::tempdir().unwrap();
    let bare = Repository::init_bare(dir.path()).unwrap();
    assert!(ls(&bare, None).unwrap().is_empty());
    assert!(matches!(
        add(&mut Repository::open(dir.path()).unwrap(), &["x"], false),
        Err(PorcelainError::Store(_))
    ));
}
