//! Scratch directory management.
//!
//! The service owns two scratch areas under its storage root:
//!
//! - `tmp`: wiped once at start-up.
//! - `generation`: holds one private subdirectory per job. Each submission
//!   sweeps the subdirectories of jobs that are no longer running, so disk
//!   use stays bounded without touching files an in-flight job still needs.

use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::types::{parse_job_id, JobId};

/// Name of the start-up scratch area.
pub const TMP_DIR_NAME: &str = "tmp";

/// Name of the per-job generation area.
pub const GENERATION_DIR_NAME: &str = "generation";

/// Remove `path` recursively if it exists, then recreate it empty.
pub async fn clear_directory(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::create_dir_all(path).await
}

/// Private scratch directory for a job.
pub fn job_directory(root: &Path, id: JobId) -> PathBuf {
    root.join(id.to_string())
}

/// Remove every entry of `root` that is not the directory of a job in
/// `keep`. Returns how many entries were removed.
pub async fn sweep_directory(root: &Path, keep: &HashSet<JobId>) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let owner = name.to_str().and_then(parse_job_id);
        if owner.is_some_and(|id| keep.contains(&id)) {
            continue;
        }

        let path = entry.path();
        let result = if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    Ok(removed)
}

/// The service's scratch areas.
///
/// Sweeps and job directory creation are serialized so a sweep can never
/// observe a half-registered job.
#[derive(Debug)]
pub struct Workspace {
    tmp_dir: PathBuf,
    generation_dir: PathBuf,
    lock: Mutex<()>,
}

impl Workspace {
    pub fn new(storage_root: &Path) -> Self {
        Self {
            tmp_dir: storage_root.join(TMP_DIR_NAME),
            generation_dir: storage_root.join(GENERATION_DIR_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    pub fn generation_dir(&self) -> &Path {
        &self.generation_dir
    }

    /// Wipe both scratch areas. Called once at start-up, when no job can
    /// exist yet.
    pub async fn reset(&self) -> io::Result<()> {
        let _guard = self.lock.lock().await;
        clear_directory(&self.tmp_dir).await?;
        clear_directory(&self.generation_dir).await
    }

    /// Sweep finished jobs' directories and create an empty one for `id`.
    ///
    /// `active` must report every job still running, and `id` must already
    /// be registered as running before this is called. Returns the job's
    /// directory and the number of swept entries.
    pub async fn prepare_job<F, Fut>(&self, id: JobId, active: F) -> io::Result<(PathBuf, usize)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HashSet<JobId>>,
    {
        let _guard = self.lock.lock().await;

        let mut keep = active().await;
        keep.insert(id);

        tokio::fs::create_dir_all(&self.generation_dir).await?;
        let swept = sweep_directory(&self.generation_dir, &keep).await?;

        let dir = job_directory(&self.generation_dir, id);
        clear_directory(&dir).await?;
        Ok((dir, swept))
    }
}
