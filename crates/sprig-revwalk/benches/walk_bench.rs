use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sprig_object::{Commit, Tree};
use sprig_ref::RefName;
use sprig_repository::Repository;
use sprig_revwalk::{is_ancestor, resolve_commit, RevWalk, WalkOptions};
use sprig_utils::{GitDate, Signature};

const DEPTH: i64 = 1_000;

fn linear_repo() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let tree = repo.odb().write_tree(&Tree::new()).unwrap();
    let mut parents = Vec::new();
    for time in 0..DEPTH {
        let sig = Signature::new("Bench", "bench@example.com", GitDate::new(time, 0)).unwrap();
        let oid = repo
            .odb()
            .write_commit(&Commit {
                tree,
                parents,
                author: sig.clone(),
                committer: sig,
                encoding: None,
                extra_headers: Vec::new(),
                message: format!("commit {time}\n").into(),
            })
            .unwrap();
        parents = vec![oid];
    }
    repo.refs().write_ref(&RefName::branch("main").unwrap(), &parents[0]).unwrap();
    (dir, repo)
}

fn log_walk(c: &mut Criterion) {
    let (_dir, repo) = linear_repo();
    let mut group = c.benchmark_group("log_walk");
    for max in [100usize, DEPTH as usize] {
        group.bench_function(format!("first_{max}"), |b| {
            b.iter_batched(
                || {
                    let mut walk = RevWalk::new(&repo);
                    walk.set_options(WalkOptions {
                        max_count: Some(max),
                        ..Default::default()
                    });
                    walk.push_head().unwrap();
                    walk
                },
                |walk| black_box(walk.count()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn ancestry(c: &mut Criterion) {
    let (_dir, repo) = linear_repo();
    let head = repo.head_oid().unwrap().unwrap();
    let root = resolve_commit(&repo, &format!("HEAD~{}", DEPTH - 1)).unwrap();
    c.bench_function("is_ancestor_full_depth", |b| {
        b.iter(|| is_ancestor(&repo, black_box(&root), black_box(&head)).unwrap())
    });
}

criterion_group!(benches, log_walk, ancestry);
criterion_main!(benches);
