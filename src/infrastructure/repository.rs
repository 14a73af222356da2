//! File system access: source discovery and locked reads/writes

use super::config::DialectRegistry;
use crate::error::{Result, TaggerError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Collect the supported source files under `dir`, sorted by path.
///
/// Hidden directories (`.git`, `.terraform`, ...) are never entered. Without
/// `recursive` only direct children of `dir` are considered.
pub fn discover_sources(
    dir: &Path,
    recursive: bool,
    registry: &DialectRegistry,
) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(TaggerError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(TaggerError::NotADirectory(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        if entry.file_type().is_file() && registry.is_supported(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), count = files.len(), "discovered source files");
    Ok(files)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// A source file held under an exclusive advisory lock.
///
/// The lock is released when the value is dropped.
#[derive(Debug)]
pub struct LockedFile {
    path: PathBuf,
    file: File,
}

impl LockedFile {
    /// Open `path` for reading and writing and wait for an exclusive lock.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TaggerError::NotFound(path.to_path_buf())
                } else {
                    TaggerError::Io(e)
                }
            })?;

        file.lock_exclusive()
            .map_err(|_| TaggerError::Lock(path.to_path_buf()))?;

        Ok(LockedFile {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn read_to_string(&mut self) -> Result<String> {
        let mut contents = String::new();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// Replace the whole file content in place, keeping the lock.
    pub fn write_all(&mut self, contents: &str) -> Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(contents.as_bytes())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), error = %e, "failed to release file lock");
        }
    }
}
