//! Revision expressions.
//!
//! ```text
//! rev    := base suffix*
//! base   := HEAD | @ | <40 hex> | <ref name> | <hex prefix, 4+ chars>
//! suffix := ~[N] | ^[N] | ^{} | ^{commit} | ^{tree}
//! ```
//!
//! Ref names are tried as given, then under `refs/`, `refs/tags/`,
//! `refs/heads/`, `refs/remotes/` and as `refs/remotes/<name>/HEAD`.

use sprig_hash::hex::is_hex;
use sprig_hash::ObjectId;
use sprig_object::Object;
use sprig_odb::{ObjectDatabase, OdbError};
use sprig_ref::{RefName, RefStore};
use sprig_repository::Repository;
use tracing::trace;

use crate::{read_commit, RevWalkError};

const MIN_PREFIX_LEN: usize = 4;

/// Tags pointing at tags are followed at most this deep.
const MAX_PEEL_DEPTH: usize = 16;

/// Resolve a revision expression to an object id. The result may be a tag
/// or tree; see [`resolve_commit`] for a commit.
pub fn resolve_revision(repo: &Repository, expr: &str) -> Result<ObjectId, RevWalkError> {
    let expr = expr.trim();
    let split = expr.find(|c| c == '~' || c == '^').unwrap_or(expr.len());
    let (base, mut suffixes) = expr.split_at(split);
    if base.is_empty() {
        return Err(RevWalkError::InvalidRevision(expr.to_string()));
    }

    let mut oid = resolve_base(repo, base)?;
    while !suffixes.is_empty() {
        let (suffix, rest) = next_suffix(expr, suffixes)?;
        oid = apply_suffix(repo.odb(), expr, oid, suffix)?;
        suffixes = rest;
    }
    trace!(expr, %oid, "resolved revision");
    Ok(oid)
}

/// [`resolve_revision`], peeled to a commit.
pub fn resolve_commit(repo: &Repository, expr: &str) -> Result<ObjectId, RevWalkError> {
    let oid = resolve_revision(repo, expr)?;
    peel_to_commit(repo.odb(), &oid)
}

/// Follow annotated tags until a commit is reached.
pub fn peel_to_commit(odb: &ObjectDatabase, oid: &ObjectId) -> Result<ObjectId, RevWalkError> {
    let mut current = *oid;
    for _ in 0..MAX_PEEL_DEPTH {
        match odb.find(&current) {
            Ok(Object::Commit(_)) => return Ok(current),
            Ok(Object::Tag(tag)) => current = tag.target,
            Ok(_) => return Err(RevWalkError::NotACommit(current)),
            Err(OdbError::NotFound(oid)) => return Err(RevWalkError::CommitNotFound(oid)),
            Err(err) => return Err(err.into()),
        }
    }
    Err(RevWalkError::NotACommit(*oid))
}

fn peel_tags(odb: &ObjectDatabase, oid: &ObjectId) -> Result<ObjectId, RevWalkError> {
    let mut current = *oid;
    for _ in 0..MAX_PEEL_DEPTH {
        match odb.find(&current)? {
            Object::Tag(tag) => current = tag.target,
            _ => return Ok(current),
        }
    }
    Err(RevWalkError::InvalidRevision(format!("tag chain at {oid} is too deep")))
}

fn resolve_base(repo: &Repository, base: &str) -> Result<ObjectId, RevWalkError> {
    let base = if base == "@" { "HEAD" } else { base };

    if base.len() == 40 && is_hex(base) {
        return ObjectId::from_hex(base).map_err(|e| RevWalkError::InvalidRevision(e.to_string()));
    }

    for candidate in ref_candidates(base) {
        // Names that are not valid refs simply do not match.
        let Ok(name) = RefName::new(candidate) else {
            continue;
        };
        if let Some(oid) = repo.refs().resolve_to_oid(&name)? {
            return Ok(oid);
        }
    }

    if base.len() >= MIN_PREFIX_LEN && is_hex(base) {
        if let Some(oid) = repo.odb().resolve_prefix(&base.to_ascii_lowercase())? {
            return Ok(oid);
        }
    }
    Err(RevWalkError::RevisionNotFound(base.to_string()))
}

fn ref_candidates(base: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(6);
    // Only all-caps names and full paths are looked up directly in the git
    // directory, so `config` or `index` never read as refs.
    let toplevel = base.bytes().all(|c| c.is_ascii_uppercase() || c == b'_');
    if toplevel || base.starts_with("refs/") {
        out.push(base.to_string());
    }
    for pattern in ["refs/", "refs/tags/", "refs/heads/", "refs/remotes/"] {
        out.push(format!("{pattern}{base}"));
    }
    out.push(format!("refs/remotes/{base}/HEAD"));
    out
}

#[derive(Debug, PartialEq, Eq)]
enum Suffix<'a> {
    Ancestor(usize),
    Parent(usize),
    Peel(&'a str),
}

fn next_suffix<'a>(expr: &str, s: &'a str) -> Result<(Suffix<'a>, &'a str), RevWalkError> {
    let invalid = || RevWalkError::InvalidRevision(expr.to_string());
    let mut chars = s.chars();
    let op = chars.next();
    let rest = chars.as_str();
    if op == Some('^') && rest.starts_with('{') {
        let close = rest.find('}').ok_or_else(invalid)?;
        return Ok((Suffix::Peel(&rest[1..close]), &rest[close + 1..]));
    }

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (num, rest) = rest.split_at(digits);
    let n = if num.is_empty() { 1 } else { num.parse().map_err(|_| invalid())? };
    match op {
        Some('~') => Ok((Suffix::Ancestor(n), rest)),
        Some('^') => Ok((Suffix::Parent(n), rest)),
        _ => Err(invalid()),
    }
}

fn apply_suffix(
    odb: &ObjectDatabase,
    expr: &str,
    oid: ObjectId,
    suffix: Suffix<'_>,
) -> Result<ObjectId, RevWalkError> {
    let not_found = || RevWalkError::RevisionNotFound(expr.to_string());
    match suffix {
        Suffix::Ancestor(n) => {
            let mut current = peel_to_commit(odb, &oid)?;
            for _ in 0..n {
                current = *read_commit(odb, &current)?.first_parent().ok_or_else(not_found)?;
            }
            Ok(current)
        }
        Suffix::Parent(0) => peel_to_commit(odb, &oid),
        Suffix::Parent(n) => {
            let commit = read_commit(odb, &peel_to_commit(odb, &oid)?)?;
            commit.parents.get(n - 1).copied().ok_or_else(not_found)
        }
        Suffix::Peel("") => peel_tags(odb, &oid),
        Suffix::Peel("commit") => peel_to_commit(odb, &oid),
        Suffix::Peel("tree") => Ok(read_commit(odb, &peel_to_commit(odb, &oid)?)?.tree),
        Suffix::Peel(_) => Err(RevWalkError::InvalidRevision(expr.to_string())),
    }
}
