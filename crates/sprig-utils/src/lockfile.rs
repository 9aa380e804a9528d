use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, UtilError};
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// Exclusive writer for a file that other processes may read concurrently.
///
/// Acquiring creates `<path>.lock` exclusively. Content is written to the lock
/// file and [`LockFile::commit`] renames it over the target, so readers see
/// either the old or the new file. Dropping without committing removes the
/// lock file and leaves the target untouched.
pub struct LockFile {
    path: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
    done: bool,
}

impl LockFile {
    /// Take the lock for `path`. Fails with [`LockError::AlreadyLocked`] if a
    /// `.lock` file is already present.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.as_os_str().to_os_string();
        lock_name.push(LOCK_SUFFIX);
        let lock_path = PathBuf::from(lock_name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|source| {
                if source.kind() == io::ErrorKind::AlreadyExists {
                    LockError::AlreadyLocked {
                        path: lock_path.clone(),
                    }
                } else {
                    LockError::Create {
                        path: lock_path.clone(),
                        source,
                    }
                }
            })?;

        Ok(Self {
            path,
            lock_path,
            file: Some(file),
            done: false,
        })
    }

    /// Path of the file being replaced.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `.lock` file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Flush, sync and atomically move the lock file over the target.
    pub fn commit(mut self) -> Result<()> {
        let commit_err = |source| {
            UtilError::Lock(LockError::Commit {
                path: self.lock_path.clone(),
                source,
            })
        };
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(commit_err)?;
            file.sync_all().map_err(commit_err)?;
        }
        fs::rename(&self.lock_path, &self.path).map_err(commit_err)?;
        self.done = true;
        Ok(())
    }

    /// Discard the pending content.
    pub fn rollback(mut self) -> Result<()> {
        self.file.take();
        self.done = true;
        match fs::remove_file(&self.lock_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.done {
            self.file.take();
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

/// Replace `path` with `data` under a lock.
pub fn write_locked(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let mut lock = LockFile::acquire(path)?;
    lock.write_all(data)?;
    lock.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("HEAD");
        fs::write(&target, b"old").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        assert!(lock.lock_path().exists());
        lock.write_all(b"new").unwrap();
        lock.commit().unwrap();

        assert!(!dir.path().join("HEAD.lock").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn drop_without_commit_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("index");
        fs::write(&target, b"original").unwrap();

        {
            let mut lock = LockFile::acquire(&target).unwrap();
            lock.write_all(b"discarded").unwrap();
        }

        assert!(!dir.path().join("index.lock").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn rollback_removes_lock() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("index");
        let lock = LockFile::acquire(&target).unwrap();
        lock.rollback().unwrap();
        assert!(!dir.path().join("index.lock").exists());
        assert!(!target.exists());
    }

    #[test]
    fn second_lock_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config");
        let _held = LockFile::acquire(&target).unwrap();

        match LockFile::acquire(&target) {
            Err(UtilError::Lock(LockError::AlreadyLocked { path })) => {
                assert!(path.ends_with("config.lock"));
            }
            Err(e) => panic!("expected AlreadyLocked, got error: {e}"),
            Ok(_) => panic!("expected AlreadyLocked, got Ok"),
        }
    }

    #[test]
    fn write_locked_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("MERGE_HEAD");
        write_locked(&target, b"abc\n").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"abc\n");
    }
}
