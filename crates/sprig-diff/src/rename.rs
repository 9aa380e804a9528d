//! Rename detection.
//!
//! Deleted and added files are paired first by identical object id, then by
//! content similarity. A pair scoring at least the threshold becomes one
//! [`FileStatus::Renamed`] entry; the best-scoring pairs are taken first.

use std::collections::HashMap;

use sprig_hash::ObjectId;
use sprig_odb::ObjectDatabase;
use tracing::debug;

use crate::{DiffError, DiffResult, FileDiff, FileStatus};

/// Rewrite delete/add pairs in `result` into renames.
pub fn detect_renames(odb: &ObjectDatabase, result: &mut DiffResult, threshold: u8) -> Result<(), DiffError> {
    let deleted: Vec<usize> = indices(result, FileStatus::Deleted);
    let added: Vec<usize> = indices(result, FileStatus::Added);
    if deleted.is_empty() || added.is_empty() {
        return Ok(());
    }

    let mut del_taken = vec![false; deleted.len()];
    let mut add_taken = vec![false; added.len()];
    let mut pairs: Vec<(usize, usize, u8)> = Vec::new();

    for (di, &d) in deleted.iter().enumerate() {
        let old_oid = result.files[d].old_oid;
        let exact = added
            .iter()
            .enumerate()
            .find(|&(ai, &a)| !add_taken[ai] && old_oid.is_some() && result.files[a].new_oid == old_oid);
        if let Some((ai, &a)) = exact {
            del_taken[di] = true;
            add_taken[ai] = true;
            pairs.push((d, a, 100));
        }
    }

    if threshold < 100 {
        let mut candidates = Vec::new();
        let mut blobs: HashMap<ObjectId, Vec<u8>> = HashMap::new();
        for (di, &d) in deleted.iter().enumerate() {
            if del_taken[di] {
                continue;
            }
            let Some(old_oid) = result.files[d].old_oid else { continue };
            for (ai, &a) in added.iter().enumerate() {
                if add_taken[ai] {
                    continue;
                }
                let Some(new_oid) = result.files[a].new_oid else { continue };
                load(odb, &mut blobs, &old_oid)?;
                load(odb, &mut blobs, &new_oid)?;
                let content = |oid: &ObjectId| blobs.get(oid).map(Vec::as_slice).unwrap_or_default();
                let score = similarity_score(content(&old_oid), content(&new_oid));
                if score >= threshold {
                    candidates.push((score, di, ai));
                }
            }
        }
        // Highest score first; ties keep path order.
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
        for (score, di, ai) in candidates {
            if del_taken[di] || add_taken[ai] {
                continue;
            }
            del_taken[di] = true;
            add_taken[ai] = true;
            pairs.push((deleted[di], added[ai], score));
        }
    }

    if pairs.is_empty() {
        return Ok(());
    }
    let mut consumed = vec![false; result.files.len()];
    for &(d, a, score) in &pairs {
        let source = result.files[d].clone();
        let target = &mut result.files[a];
        debug!(from = %source.path(), to = %target.path(), score, "detected rename");
        *target = FileDiff {
            status: FileStatus::Renamed,
            old_path: source.old_path,
            old_mode: source.old_mode,
            old_oid: source.old_oid,
            similarity: Some(score),
            ..target.clone()
        };
        consumed[d] = true;
    }
    let mut i = 0;
    result.files.retain(|_| {
        let keep = !consumed[i];
        i += 1;
        keep
    });
    Ok(())
}

fn indices(result: &DiffResult, status: FileStatus) -> Vec<usize> {
    result
        .files
        .iter()
        .enumerate()
        .filter(|(_, f)| f.status == status)
        .map(|(i, _)| i)
        .collect()
}

fn load(odb: &ObjectDatabase, cache: &mut HashMap<ObjectId, Vec<u8>>, oid: &ObjectId) -> Result<(), DiffError> {
    if !cache.contains_key(oid) {
        let blob = odb
            .read_blob(oid)
            .map_err(|source| DiffError::ObjectRead { oid: *oid, source })?;
        cache.insert(*oid, blob.data);
    }
    Ok(())
}

/// Percent of content shared by `old` and `new`, by lines.
///
/// Lines present in both (counted with multiplicity) contribute their byte
/// length; the total is divided by the size of the larger input. Two empty
/// inputs are identical; an empty and a non-empty one share nothing.
pub fn similarity_score(old: &[u8], new: &[u8]) -> u8 {
    if old.is_empty() && new.is_empty() {
        return 100;
    }
    if old.is_empty() || new.is_empty() {
        return 0;
    }

    let mut remaining: HashMap<&[u8], usize> = HashMap::new();
    for line in old.split_inclusive(|&b| b == b'\n') {
        *remaining.entry(line).or_insert(0) += 1;
    }
    let mut shared = 0usize;
    for line in new.split_inclusive(|&b| b == b'\n') {
        if let Some(count) = remaining.get_mut(line) {
            if *count > 0 {
                *count -= 1;
                shared += line.len();
            }
        }
    }

    let base = old.len().max(new.len());
    (shared * 100 / base) as u8
}
