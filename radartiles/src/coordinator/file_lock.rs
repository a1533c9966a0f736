//! Advisory per-tile file lock for multi-process deployments.
//!
//! Uses `flock(LOCK_EX)` on `<tile>.lock`. The lock is released when the
//! file handle is dropped, including when the holding process dies. Lock
//! files are left in place; removing them would race with other lockers.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Held exclusive lock on a tile's lock file.
#[derive(Debug)]
pub(crate) struct TileFileLock {
    _file: File,
}

impl TileFileLock {
    /// Acquire the lock, waiting on the blocking pool if another process holds it.
    pub(crate) async fn acquire(path: PathBuf) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::acquire_blocking(&path))
            .await
            .map_err(io::Error::other)?
    }

    fn acquire_blocking(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        lock_exclusive(&file)?;
        Ok(Self { _file: file })
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and valid for this call.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "tile file locks require a unix platform",
    ))
}
