//! add, rm and status details.

mod common;

use common::{row, rows, setup, sig, simplify, write};
use sprig_index::Pathspec;
use sprig_porcelain::{add, commit, rm, status, PorcelainError, StagedFilter, Status};

#[test]
fn add_then_rm_restores_status() {
    let (dir, mut repo) = setup();
    write(dir.path(), "p.txt", "p\n");
    let before = rows(&repo, StagedFilter::Both);

    add(&mut repo, &["p.txt"], false).unwrap();
    let after = simplify(&rm(&mut repo, &["p.txt"]).unwrap());
    assert_eq!(after, before);
    assert!(dir.path().join("p.txt").exists());
}

#[test]
fn directories_expand_and_ignored_files_are_skipped() {
    let (dir, mut repo) = setup();
    write(dir.path(), ".gitignore", "*.log\nbuild/\n");
    write(dir.path(), "src/main.rs", "fn main() {}\n");
    write(dir.path(), "src/util/mod.rs", "\n");
    write(dir.path(), "src/debug.log", "noise\n");
    write(dir.path(), "build/out.bin", "bin\n");

    add(&mut repo, &["src"], false).unwrap();
    assert_eq!(
        rows(&repo, StagedFilter::StagedOnly),
        [row("src/main.rs", Status::New, true), row("src/util/mod.rs", Status::New, true)]
    );

    // Naming an ignored file is not an error, it is just skipped.
    add(&mut repo, &["src/debug.log", "build"], false).unwrap();
    assert_eq!(rows(&repo, StagedFilter::StagedOnly).len(), 2);

    add(&mut repo, &["src/debug.log"], true).unwrap();
    assert!(rows(&repo, StagedFilter::StagedOnly).contains(&row("src/debug.log", Status::New, true)));

    add(&mut repo, &["."], false).unwrap();
    let staged: Vec<String> = rows(&repo, StagedFilter::StagedOnly).into_iter().map(|r| r.0).collect();
    assert_eq!(staged, [".gitignore", "src/debug.log", "src/main.rs", "src/util/mod.rs"]);
}

#[test]
fn glob_pathspecs() {
    let (dir, mut repo) = setup();
    write(dir.path(), "a.txt", "a\n");
    write(dir.path(), "docs/b.txt", "b\n");
    write(dir.path(), "c.md", "c\n");

    add(&mut repo, &["*.txt"], false).unwrap();
    let staged: Vec<String> = rows(&repo, StagedFilter::StagedOnly).into_iter().map(|r| r.0).collect();
    assert_eq!(staged, ["a.txt", "docs/b.txt"]);

    rm(&mut repo, &["docs/*"]).unwrap();
    let staged: Vec<String> = rows(&repo, StagedFilter::StagedOnly).into_iter().map(|r| r.0).collect();
    assert_eq!(staged, ["a.txt"]);
}

#[test]
fn unmatched_paths() {
    let (dir, mut repo) = setup();
    write(dir.path(), "a.txt", "a\n");
    assert!(matches!(
        add(&mut repo, &["missing.txt"], false),
        Err(PorcelainError::PathNotFound(p)) if p == "missing.txt"
    ));
    assert!(matches!(add(&mut repo, &["*.rs"], false), Err(PorcelainError::PathNotFound(_))));
    // Nothing was staged by the failed call.
    assert!(rows(&repo, StagedFilter::StagedOnly).is_empty());

    add(&mut repo, &["a.txt"], false).unwrap();
    assert!(matches!(rm(&mut repo, &["b.txt"]), Err(PorcelainError::PathNotFound(_))));
    // A partial match succeeds.
    rm(&mut repo, &["a.txt", "b.txt"]).unwrap();
    assert!(rows(&repo, StagedFilter::StagedOnly).is_empty());

    assert!(matches!(add(&mut repo, &["../outside"], false), Err(PorcelainError::InvalidArgument(_))));
    let none: [&str; 0] = [];
    assert!(matches!(rm(&mut repo, &none), Err(PorcelainError::InvalidArgument(_))));
}

#[test]
fn adding_a_deleted_tracked_file_leaves_it_alone() {
    let (dir, mut repo) = setup();
    write(dir.path(), "a.txt", "a\n");
    add(&mut repo, &["a.txt"], false).unwrap();
    commit(&mut repo, "a", Some(&sig(1)), None).unwrap();

    std::fs::remove_file(dir.path().join("a.txt")).unwrap();
    let result = add(&mut repo, &["a.txt"], false).unwrap();
    assert_eq!(simplify(&result), [row("a.txt", Status::Deleted, false)]);
}

#[test]
fn staged_and_unstaged_rows_for_one_path() {
    let (dir, mut repo) = setup();
    write(dir.path(), "a.txt", "one\n");
    add(&mut repo, &["a.txt"], false).unwrap();
    commit(&mut repo, "a", Some(&sig(1)), None).unwrap();

    write(dir.path(), "a.txt", "two, staged\n");
    add(&mut repo, &["a.txt"], false).unwrap();
    write(dir.path(), "a.txt", "three, not staged yet\n");

    assert_eq!(
        rows(&repo, StagedFilter::Both),
        [row("a.txt", Status::Modified, true), row("a.txt", Status::Modified, false)]
    );
}

#[test]
fn staged_renames_follow_config() {
    let (dir, mut repo) = setup();
    let content = "line 1\nline 2\nline 3\nline 4\n";
    write(dir.path(), "old.txt", content);
    add(&mut repo, &["old.txt"], false).unwrap();
    commit(&mut repo, "old", Some(&sig(1)), None).unwrap();

    std::fs::rename(dir.path().join("old.txt"), dir.path().join("new.txt")).unwrap();
    rm(&mut repo, &["old.txt"]).unwrap();
    add(&mut repo, &["new.txt"], false).unwrap();

    let staged = status(&repo, StagedFilter::StagedOnly, &Pathspec::all()).unwrap();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].status, Status::Renamed);
    assert_eq!(staged[0].path, "new.txt");
    assert_eq!(staged[0].source.as_ref().map(|s| s.to_string()).as_deref(), Some("old.txt"));

    repo.config_mut().add_override("status.renames=false").unwrap();
    assert_eq!(
        rows(&repo, StagedFilter::StagedOnly),
        [row("new.txt", Status::New, true), row("old.txt", Status::Deleted, true)]
    );
}

#[test]
fn pathspecs_restrict_status() {
    let (dir, mut repo) = setup();
    write(dir.path(), "src/a.rs", "a\n");
    write(dir.path(), "src/b.rs", "b\n");
    write(dir.path(), "README", "r\n");
    add(&mut repo, &["src/a.rs"], false).unwrap();

    let only_src = Pathspec::parse(&["src"]).unwrap();
    let got = simplify(&status(&repo, StagedFilter::Both, &only_src).unwrap());
    assert_eq!(
        got,
        [row("src/a.rs", Status::New, true), row("src/b.rs", Status::New, false)]
    );

    let exclude = Pathspec::parse(&[":!src/a.rs"]).unwrap();
    let got = simplify(&status(&repo, StagedFilter::Both, &exclude).unwrap());
    assert_eq!(got, [row("README", Status::New, false), row("src/b.rs", Status::New, false)]);
}

#[cfg(unix)]
#[test]
fn type_changes_are_reported() {
    let (dir, mut repo) = setup();
    write(dir.path(), "target.txt", "t\n");
    write(dir.path(), "link", "plain file\n");
    add(&mut repo, &["."], false).unwrap();
    commit(&mut repo, "files", Some(&sig(1)), None).unwrap();

    std::fs::remove_file(dir.path().join("link")).unwrap();
    std::os::unix::fs::symlink("target.txt", dir.path().join("link")).unwrap();
    assert_eq!(rows(&repo, StagedFilter::Both), [row("link", Status::TypeChange, false)]);

    add(&mut repo, &["link"], false).unwrap();
    assert_eq!(rows(&repo, StagedFilter::Both), [row("link", Status::TypeChange, true)]);
}
