//! Exclusive access to a repository for the snapshot-then-create sequence.
//!
//! A [RepoLock] combines the in-process mutex owned by one repository handle with a
//! `bump.lock` file in the git directory, so that neither threads nor concurrent
//! `git-bump` processes can interleave tag creation. Dropping the guard removes the
//! file and then releases the mutex.

use crate::config::LockConfig;
use crate::error::{BumpError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use tracing::{debug, error, warn};

/// Name of the lock file created inside the git directory
pub const LOCK_FILE_NAME: &str = "bump.lock";

/// Scoped lock over a repository handle
pub struct RepoLock<'a, T> {
    guard: MutexGuard<'a, T>,
    lock_file: PathBuf,
}

impl<'a, T> RepoLock<'a, T> {
    /// Acquire the mutex, then the lock file in `git_dir`
    ///
    /// # Returns
    /// * `Ok(RepoLock)` - Both locks held until the guard is dropped
    /// * `Err(BumpError::Lock)` - If the lock file stayed busy for `config.attempts` tries
    pub fn acquire(mutex: &'a Mutex<T>, git_dir: &Path, config: &LockConfig) -> Result<Self> {
        let guard = mutex
            .lock()
            .map_err(|_| BumpError::lock("repository handle mutex poisoned"))?;

        let lock_file = git_dir.join(LOCK_FILE_NAME);

        for attempt in 1..=config.attempts {
            match OpenOptions::new().write(true).create_new(true).open(&lock_file) {
                Ok(mut file) => {
                    let stamp = chrono::Local::now().to_rfc3339();
                    if let Err(e) = writeln!(file, "pid: {}\ntime: {}", std::process::id(), stamp) {
                        error!(lock_file = %lock_file.display(), error = %e, "failed to write lock file");
                    }
                    debug!(lock_file = %lock_file.display(), attempt, "acquired repository lock");
                    return Ok(RepoLock { guard, lock_file });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&lock_file, config) {
                        warn!(lock_file = %lock_file.display(), "removing stale lock file");
                        if let Err(e) = fs::remove_file(&lock_file) {
                            error!(lock_file = %lock_file.display(), error = %e, "failed to remove stale lock file");
                        }
                        continue;
                    }
                    thread::sleep(config.retry_delay());
                }
                Err(e) => {
                    return Err(BumpError::lock(format!(
                        "failed to create lock file {}: {}",
                        lock_file.display(),
                        e
                    )));
                }
            }
        }

        Err(BumpError::lock(format!(
            "failed to acquire {} after {} attempts: repository may be busy",
            lock_file.display(),
            config.attempts
        )))
    }

    /// Path of the lock file held by this guard
    pub fn lock_file(&self) -> &Path {
        &self.lock_file
    }
}

fn is_stale(lock_file: &Path, config: &LockConfig) -> bool {
    fs::metadata(lock_file)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .map(|age| age >= config.stale_after())
        .unwrap_or(false)
}

impl<T> Deref for RepoLock<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for RepoLock<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for RepoLock<'_, T> {
    fn drop(&mut self) {
        match fs::remove_file(&self.lock_file) {
            Ok(()) => debug!(lock_file = %self.lock_file.display(), "released repository lock"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => error!(lock_file = %self.lock_file.display(), error = %e, "failed to remove lock file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn quick_config(attempts: u32, stale_after_secs: u64) -> LockConfig {
        LockConfig {
            attempts,
            retry_delay_ms: 1,
            stale_after_secs,
        }
    }

    #[test]
    fn test_lock_creates_and_removes_file() {
        let dir = TempDir::new().unwrap();
        let mutex = Mutex::new(());

        let lock = RepoLock::acquire(&mutex, dir.path(), &LockConfig::default()).unwrap();
        let path = lock.lock_file().to_path_buf();
        assert!(path.exists());
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains(&format!("pid: {}", std::process::id())));

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_lock_busy_file_times_out() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCK_FILE_NAME), "pid: 1\n").unwrap();
        let mutex = Mutex::new(());

        let result = RepoLock::acquire(&mutex, dir.path(), &quick_config(3, 3600));
        let err = result.err().expect("lock should be busy");
        assert!(matches!(err, BumpError::Lock(_)));
        assert!(err.to_string().contains("after 3 attempts"));
        // a foreign lock file is left alone
        assert!(dir.path().join(LOCK_FILE_NAME).exists());
    }

    #[test]
    fn test_lock_removes_stale_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCK_FILE_NAME), "pid: 1\n").unwrap();
        let mutex = Mutex::new(());

        let lock = RepoLock::acquire(&mutex, dir.path(), &quick_config(3, 0)).unwrap();
        let contents = fs::read_to_string(lock.lock_file()).unwrap();
        assert!(!contents.starts_with("pid: 1\n"));
    }

    #[test]
    fn test_lock_missing_git_dir_fails() {
        let dir = TempDir::new().unwrap();
        let mutex = Mutex::new(());
        let missing = dir.path().join("does-not-exist");

        let result = RepoLock::acquire(&mutex, &missing, &quick_config(2, 3600));
        assert!(result.err().unwrap().to_string().contains("failed to create lock file"));
    }

    #[test]
    fn test_lock_serializes_threads() {
        let dir = Arc::new(TempDir::new().unwrap());
        let counter = Arc::new(Mutex::new(0u32));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let dir = Arc::clone(&dir);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let mut value = RepoLock::acquire(&*counter, dir.path(), &LockConfig::default())
                        .unwrap();
                    *value += 1;
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*counter.lock().unwrap(), 4);
        assert!(!dir.path().join(LOCK_FILE_NAME).exists());
    }
}
