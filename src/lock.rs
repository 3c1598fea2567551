use std::fs::{self, File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

use crate::error::{Result, WordmillError};

/// Exclusive lock over the corpus files, shared by the ingestion append path
/// and the generation pipeline: at most one mutator at any time. Held for
/// the full duration of a mutating run and released on every exit path when
/// dropped. Functions that mutate the corpus take `&CorpusLock`, so callers
/// cannot reach them without holding the lock.
pub struct CorpusLock {
    file: File,
}

impl CorpusLock {
    /// Block until the exclusive lock on `path` is acquired.
    pub fn acquire(path: &Path) -> Result<CorpusLock> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| WordmillError::Lock {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|source| WordmillError::Lock {
                path: path.to_path_buf(),
                source,
            })?;

        file.lock_exclusive().map_err(|source| WordmillError::Lock {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(CorpusLock { file })
    }
}

impl Drop for CorpusLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::CorpusLock;

    #[test]
    fn reacquire_after_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.lock");

        let lock = CorpusLock::acquire(&path).unwrap();
        drop(lock);
        let _again = CorpusLock::acquire(&path).unwrap();
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("corpus.lock");

        let _lock = CorpusLock::acquire(&path).unwrap();
        assert!(path.exists());
    }
}
