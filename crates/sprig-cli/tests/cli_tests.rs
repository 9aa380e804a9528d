mod common;

use common::{init_repo, ok, sprig, sprig_anonymous, sprig_at, write_file};

#[test]
fn init_reports_the_git_dir() {
    let root = tempfile::tempdir().unwrap();
    let out = ok(root.path(), &["init", "fresh"]);
    let git_dir = std::fs::canonicalize(root.path().join("fresh/.git")).unwrap();
    assert_eq!(out, format!("Initialized empty Git repository in {}/\n", git_dir.display()));

    let out = ok(root.path(), &["init", "--bare", "bare.git"]);
    assert!(out.starts_with("Initialized empty bare Git repository"));
    assert!(root.path().join("bare.git/HEAD").is_file());
}

#[test]
fn add_commit_modify_commit_all() {
    let (_root, dir) = init_repo();
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "");

    write_file(&dir, "a.txt", "1\n2\n3\n4\n5\n6\n");
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "?? a.txt\n");
    ok(&dir, &["add", "a.txt"]);
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "A  a.txt\n");

    let first = sprig_at(&dir, &["commit", "-m", "first"], 1000);
    assert_eq!(first.exit_code, 0, "{}", first.stderr);
    assert!(first.stdout.starts_with("[main (root-commit) "));
    assert!(first.stdout.ends_with("] first\n"));
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "");

    write_file(&dir, "a.txt", "1\n2\n3\n4\n5\n6\n7\n8\n9\n");
    assert_eq!(ok(&dir, &["status", "--porcelain"]), " M a.txt\n");
    let second = sprig_at(&dir, &["commit", "-a", "-m", "second"], 2000);
    assert_eq!(second.exit_code, 0, "{}", second.stderr);

    let log = ok(&dir, &["log", "--oneline"]);
    let summaries: Vec<&str> = log.lines().map(|l| &l[8..]).collect();
    assert_eq!(summaries, ["second", "first"]);
    assert_eq!(ok(&dir, &["log", "--oneline", "-1"]).lines().count(), 1);
    assert_eq!(ok(&dir, &["log", "--oneline", "-n", "0"]), "");
    assert_eq!(ok(&dir, &["log", "--oneline", "--after", "1500 +0000"]).lines().count(), 1);

    let head = ok(&dir, &["rev-parse", "HEAD"]);
    assert_eq!(head.trim().len(), 40);
    assert!(log.starts_with(&head[..7]));
}

#[test]
fn nothing_to_commit_exits_one() {
    let (_root, dir) = init_repo();
    let result = sprig(&dir, &["commit", "-m", "empty"]);
    assert_eq!(result.exit_code, 1);
    assert_eq!(result.stdout, "nothing added to commit\n");

    let result = sprig(&dir, &["commit", "-m", "  "]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.starts_with("fatal: "));
}

#[test]
fn unknown_revisions_are_fatal() {
    let (_root, dir) = init_repo();
    let result = sprig(&dir, &["log"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.contains("does not have any commits yet"), "{}", result.stderr);

    write_file(&dir, "f", "f\n");
    ok(&dir, &["add", "f"]);
    ok(&dir, &["commit", "-m", "f"]);
    let result = sprig(&dir, &["rev-parse", "nope"]);
    assert_eq!(result.exit_code, 128);
    assert_eq!(result.stderr, "fatal: unknown revision 'nope'\n");
}

#[test]
fn ancestry_exit_codes() {
    let (_root, dir) = init_repo();
    for (i, time) in [100, 200, 300].into_iter().enumerate() {
        write_file(&dir, "f", &format!("{i}\n"));
        ok(&dir, &["add", "f"]);
        let result = sprig_at(&dir, &["commit", "-m", &format!("c{i}")], time);
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
    }
    assert_eq!(sprig(&dir, &["merge-base", "--is-ancestor", "HEAD~2", "HEAD"]).exit_code, 0);
    assert_eq!(sprig(&dir, &["merge-base", "--is-ancestor", "HEAD", "HEAD"]).exit_code, 0);
    assert_eq!(sprig(&dir, &["merge-base", "--is-ancestor", "HEAD", "HEAD~1"]).exit_code, 1);
}

#[test]
fn show_commit_and_ls() {
    let (_root, dir) = init_repo();
    write_file(&dir, "src/lib.rs", "pub fn f() {}\n");
    write_file(&dir, "README", "hi\n");
    ok(&dir, &["add", "."]);
    ok(&dir, &["commit", "-m", "subject", "-m", "body"]);

    let raw = ok(&dir, &["show-commit", "--raw"]);
    assert!(raw.contains("\nauthor Test Author <test@example.com> 1234567890 +0000\n"));
    assert!(raw.contains("\ncommitter Test Committer <test@example.com> 1234567890 +0000\n"));
    assert!(raw.ends_with("\n\nsubject\n\nbody\n"));

    let medium = ok(&dir, &["show-commit", "HEAD"]);
    assert!(medium.contains("Author: Test Author <test@example.com>\n"));
    assert!(medium.contains("Date:   Fri Feb 13 23:31:30 2009 +0000\n"));
    assert!(medium.ends_with("\n    subject\n\n    body\n"));

    assert_eq!(ok(&dir, &["ls", "--name-only"]), "README\nsrc/lib.rs\n");
    let listing = ok(&dir, &["ls", "HEAD"]);
    let first = listing.lines().next().unwrap();
    assert!(first.starts_with("100644 "));
    assert!(first.ends_with("\tREADME"));
}

#[test]
fn rm_keeps_the_working_tree() {
    let (_root, dir) = init_repo();
    write_file(&dir, "a.txt", "a\n");
    write_file(&dir, "b.txt", "b\n");
    ok(&dir, &["add", "a.txt", "b.txt"]);
    assert_eq!(ok(&dir, &["rm", "a.txt"]), "rm 'a.txt'\n");
    assert!(dir.join("a.txt").exists());
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "?? a.txt\nA  b.txt\n");

    let missing = sprig(&dir, &["rm", "zzz"]);
    assert_eq!(missing.exit_code, 128);
    assert_eq!(missing.stderr, "fatal: pathspec 'zzz' did not match any files\n");
}

#[test]
fn status_views_and_long_format() {
    let (_root, dir) = init_repo();
    write_file(&dir, "a.txt", "a\n");
    write_file(&dir, "b.txt", "b\n");
    ok(&dir, &["add", "a.txt"]);

    assert_eq!(ok(&dir, &["status", "--porcelain", "--staged"]), "A  a.txt\n");
    assert_eq!(ok(&dir, &["status", "--porcelain", "--unstaged"]), "?? b.txt\n");
    assert_eq!(ok(&dir, &["status", "--porcelain", "b.txt"]), "?? b.txt\n");

    let long = ok(&dir, &["status"]);
    assert!(long.starts_with("On branch main\n\nNo commits yet\n"));
    assert!(long.contains("Changes to be committed:\n\tnew:        a.txt\n"));
    assert!(long.contains("Untracked files:\n\tb.txt\n"));
}

#[test]
fn identity_from_config_overrides() {
    let (root, dir) = init_repo();
    write_file(&dir, "a.txt", "a\n");
    ok(&dir, &["add", "a.txt"]);

    let result = sprig_anonymous(&dir, root.path(), &["commit", "-m", "who"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.contains("identity unknown"), "{}", result.stderr);

    let result = sprig_anonymous(
        &dir,
        root.path(),
        &["-c", "user.name=Config User", "-c", "user.email=config@example.com", "commit", "-m", "who"],
    );
    assert_eq!(result.exit_code, 0, "{}", result.stderr);
    let raw = ok(&dir, &["show-commit", "--raw"]);
    assert!(raw.contains("\nauthor Config User <config@example.com> "));
    assert!(raw.contains("\ncommitter Config User <config@example.com> "));

    write_file(&dir, "a.txt", "changed\n");
    let result = sprig(&dir, &["commit", "-a", "-m", "explicit", "--author", "Jane Doe <jane@example.com>", "--date", "@42"]);
    assert_eq!(result.exit_code, 0, "{}", result.stderr);
    let raw = ok(&dir, &["show-commit", "--raw"]);
    assert!(raw.contains("\nauthor Jane Doe <jane@example.com> 42 +0000\n"));
    assert!(raw.contains("\ncommitter Test Committer <test@example.com> "));
}

#[test]
fn change_dir_and_conflicts() {
    let (root, dir) = init_repo();
    let result = sprig(root.path(), &["-C", "repo", "conflicts"]);
    assert_eq!(result.exit_code, 0, "{}", result.stderr);
    assert_eq!(result.stdout, "");

    let result = sprig(root.path(), &["-C", "does-not-exist", "status"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.starts_with("fatal: cannot change to 'does-not-exist'"));
    drop(dir);
}

#[test]
fn bareness_from_command_line_config() {
    let (_root, dir) = init_repo();
    write_file(&dir, "a.txt", "a\n");
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "?? a.txt\n");

    assert_eq!(ok(&dir, &["-c", "core.bare=true", "status", "--porcelain"]), "");
    let result = sprig(&dir, &["-c", "core.bare=true", "add", "a.txt"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.contains("no working tree"), "{}", result.stderr);
    assert_eq!(ok(&dir, &["status", "--porcelain"]), "?? a.txt\n");
}
