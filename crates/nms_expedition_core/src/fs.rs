//! Filesystem access used by the swap engine.
//!
//! [`CacheFs`] is the seam between [`SwapEngine`](crate::SwapEngine) and the
//! disk. [`StdFs`] writes through a temp file in the target's directory and
//! renames it into place, so readers of the cache file see either the old or
//! the new content, never a partial write.

use camino::Utf8Path;
use std::fs;
use std::io::{self, Write};
use tempfile::NamedTempFile;

/// File operations the swap engine needs.
pub trait CacheFs {
    fn exists(&self, path: &Utf8Path) -> bool;

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;

    /// Atomically creates or replaces `path` with `contents`.
    fn replace(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;

    /// Atomically creates `path` with `contents`.
    /// Fails with [`io::ErrorKind::AlreadyExists`] if `path` exists.
    fn create_new(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;

    fn remove(&self, path: &Utf8Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl StdFs {
    fn write_temp_beside(path: &Utf8Path, contents: &[u8]) -> io::Result<NamedTempFile> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir.as_std_path())?;
        temp.write_all(contents)?;
        temp.as_file().sync_all()?;
        Ok(temp)
    }
}

impl CacheFs for StdFs {
    fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        fs::read(path.as_std_path())
    }

    fn replace(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        let temp = Self::write_temp_beside(path, contents)?;
        temp.persist(path.as_std_path()).map_err(|e| e.error)?;
        Ok(())
    }

    fn create_new(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        let temp = Self::write_temp_beside(path, contents)?;
        temp.persist_noclobber(path.as_std_path())
            .map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, path: &Utf8Path) -> io::Result<()> {
        fs::remove_file(path.as_std_path())
    }
}
