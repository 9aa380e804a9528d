//! `MERGE_HEAD`: the extra parents of an in-progress merge, one hex id per line.

use std::io;
use std::path::Path;

use sprig_hash::ObjectId;

use crate::RepoError;

pub(crate) const MERGE_HEAD: &str = "MERGE_HEAD";

pub(crate) fn read(git_dir: &Path) -> Result<Vec<ObjectId>, RepoError> {
    let content = match std::fs::read_to_string(git_dir.join(MERGE_HEAD)) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    parse(&content)
}

pub(crate) fn parse(content: &str) -> Result<Vec<ObjectId>, RepoError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            // Lines written by `git merge` may carry a tab and a description.
            let hex = line.split_whitespace().next().unwrap_or_default();
            ObjectId::from_hex(hex).map_err(|e| RepoError::InvalidMergeHead {
                line: n + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

pub(crate) fn write(git_dir: &Path, heads: &[ObjectId]) -> Result<(), RepoError> {
    let content: String = heads.iter().map(|oid| format!("{oid}\n")).collect();
    sprig_utils::lockfile::write_locked(git_dir.join(MERGE_HEAD), content.as_bytes())?;
    Ok(())
}

pub(crate) fn remove(git_dir: &Path) -> Result<(), RepoError> {
    match std::fs::remove_file(git_dir.join(MERGE_HEAD)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
