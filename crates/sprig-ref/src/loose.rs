//! One file per ref under the git directory, holding `<hex>\n` or
//! `ref: <target>\n`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use sprig_hash::ObjectId;
use sprig_utils::lockfile::LockFile;

use crate::error::RefError;
use crate::name::RefName;
use crate::Reference;

pub(crate) fn ref_path(git_dir: &Path, name: &RefName) -> PathBuf {
    git_dir.join(name.as_str())
}

pub(crate) fn read(git_dir: &Path, name: &RefName) -> Result<Option<Reference>, RefError> {
    let path = ref_path(git_dir, name);
    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        // A ref named like a directory of refs (`refs/heads`), or one below
        // a file (`refs/heads/main/x`).
        Err(_) if path.is_dir() || !path.exists() => return Ok(None),
        Err(source) => return Err(RefError::IoPath { path, source }),
    };
    let parse_err = |reason: &str| RefError::Parse {
        path: path.clone(),
        reason: reason.into(),
    };

    let content = content.trim();
    if let Some(target) = content.strip_prefix(b"ref:") {
        let target = target.trim().to_str().map_err(|_| parse_err("non-utf8 target"))?;
        return Ok(Some(Reference::Symbolic {
            name: name.clone(),
            target: RefName::new(target)?,
        }));
    }
    let hex = content.to_str().map_err(|_| parse_err("non-utf8 object id"))?;
    let target = ObjectId::from_hex(hex).map_err(|e| parse_err(&e.to_string()))?;
    Ok(Some(Reference::Direct {
        name: name.clone(),
        target,
    }))
}

pub(crate) fn write_direct(git_dir: &Path, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
    write_content(git_dir, name, format!("{}\n", oid.to_hex()).as_bytes())
}

pub(crate) fn write_symbolic(git_dir: &Path, name: &RefName, target: &RefName) -> Result<(), RefError> {
    write_content(git_dir, name, format!("ref: {target}\n").as_bytes())
}

fn write_content(git_dir: &Path, name: &RefName, content: &[u8]) -> Result<(), RefError> {
    let path = ref_path(git_dir, name);
    check_dir_file_conflict(git_dir, name)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RefError::IoPath {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut lock = LockFile::acquire(&path)?;
    lock.write_all(content).map_err(|source| RefError::IoPath {
        path: path.clone(),
        source,
    })?;
    lock.commit()?;
    Ok(())
}

/// `refs/heads/a` cannot coexist with `refs/heads/a/b`.
fn check_dir_file_conflict(git_dir: &Path, name: &RefName) -> Result<(), RefError> {
    let path = ref_path(git_dir, name);
    if path.is_dir() {
        return Err(RefError::DirectoryConflict {
            name: name.to_string(),
            conflict: format!("{name}/"),
        });
    }
    let mut prefix = String::new();
    for component in name.as_str().split('/') {
        if !prefix.is_empty() {
            if git_dir.join(&prefix).is_file() {
                return Err(RefError::DirectoryConflict {
                    name: name.to_string(),
                    conflict: prefix,
                });
            }
            prefix.push('/');
        }
        prefix.push_str(component);
    }
    Ok(())
}
