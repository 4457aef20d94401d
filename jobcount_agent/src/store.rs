//! Job stores that answer count queries for this node.
//!
//! A job is counted when it is active (`INIT` or `RUNNING`), runs on the
//! store's host, and for range queries has a start time in `[lower, upper)`.
//! Jobs that have not recorded a start time only show up in the total.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::counting::CountingService;
use crate::error::CountingError;
use crate::window::{TimeWindow, EIGHT_HOURS_MS, FIFTEEN_MINUTES_MS, TWO_HOURS_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Init,
    Running,
    Succeeded,
    Failed,
    Killed,
}

impl JobStatus {
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Init | JobStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub host: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_ms: Option<i64>,
}

impl JobRecord {
    pub fn new(
        id: impl Into<String>,
        host: impl Into<String>,
        status: JobStatus,
        started_ms: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            status,
            started_ms,
        }
    }
}

fn checked_window(
    lower_ms: Option<i64>,
    upper_ms: Option<i64>,
) -> Result<TimeWindow, CountingError> {
    let window = TimeWindow::new(lower_ms, upper_ms);
    match (lower_ms, upper_ms) {
        (Some(lower), Some(upper)) if !window.is_ordered() => {
            Err(CountingError::InvalidWindow { lower, upper })
        }
        _ => Ok(window),
    }
}

fn count_matching<'a, I>(jobs: I, host: &str, window: Option<&TimeWindow>) -> u64
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    jobs.into_iter()
        .filter(|j| j.host == host && j.status.is_active())
        .filter(|j| match window {
            None => true,
            Some(w) => j.started_ms.is_some_and(|ts| w.contains(ts)),
        })
        .count() as u64
}

/// Job table held in memory. Useful as an embedded store and for exercising
/// outages via [`InMemoryJobStore::set_unavailable`].
#[derive(Debug)]
pub struct InMemoryJobStore {
    host: String,
    jobs: RwLock<Vec<JobRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryJobStore {
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_jobs(host, Vec::new())
    }

    pub fn with_jobs(host: impl Into<String>, jobs: impl IntoIterator<Item = JobRecord>) -> Self {
        Self {
            host: host.into(),
            jobs: RwLock::new(jobs.into_iter().collect()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn insert(&self, job: JobRecord) {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job);
    }

    /// Returns false when no job has that id.
    pub fn set_status(&self, id: &str, status: JobStatus) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        match jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }

    /// While set, every query fails with [`CountingError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn read_jobs<R>(&self, f: impl FnOnce(&[JobRecord]) -> R) -> Result<R, CountingError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(CountingError::Unavailable(
                "in-memory job store is offline".into(),
            ));
        }
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&jobs))
    }
}

impl CountingService for InMemoryJobStore {
    async fn count(
        &self,
        lower_ms: Option<i64>,
        upper_ms: Option<i64>,
    ) -> Result<u64, CountingError> {
        let window = checked_window(lower_ms, upper_ms)?;
        self.read_jobs(|jobs| count_matching(jobs, &self.host, Some(&window)))
    }

    async fn total_count(&self) -> Result<u64, CountingError> {
        self.read_jobs(|jobs| count_matching(jobs, &self.host, None))
    }
}

/// Job table kept as a JSON array of [`JobRecord`] on disk, maintained by
/// whatever launches jobs on this node. Re-read on every query.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    path: PathBuf,
    host: String,
}

impl FileJobStore {
    pub fn new(path: impl Into<PathBuf>, host: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            host: host.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn load(&self) -> Result<Vec<JobRecord>, CountingError> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl CountingService for FileJobStore {
    async fn count(
        &self,
        lower_ms: Option<i64>,
        upper_ms: Option<i64>,
    ) -> Result<u64, CountingError> {
        let window = checked_window(lower_ms, upper_ms)?;
        let jobs = self.load().await?;
        Ok(count_matching(&jobs, &self.host, Some(&window)))
    }

    async fn total_count(&self) -> Result<u64, CountingError> {
        let jobs = self.load().await?;
        Ok(count_matching(&jobs, &self.host, None))
    }
}

/// Sample job table for `--demo`: one or more active jobs in every bucket,
/// plus finished jobs and a job on another host that must not be counted.
pub fn demo_jobs(host: &str, now_ms: i64) -> Vec<JobRecord> {
    let minute = 60 * 1000;
    vec![
        JobRecord::new("demo-1", host, JobStatus::Running, Some(now_ms - 2 * minute)),
        JobRecord::new("demo-2", host, JobStatus::Init, Some(now_ms - 10 * minute)),
        JobRecord::new("demo-3", host, JobStatus::Running, Some(now_ms - FIFTEEN_MINUTES_MS - minute)),
        JobRecord::new("demo-4", host, JobStatus::Running, Some(now_ms - TWO_HOURS_MS - 30 * minute)),
        JobRecord::new("demo-5", host, JobStatus::Running, Some(now_ms - EIGHT_HOURS_MS - 60 * minute)),
        JobRecord::new("demo-6", host, JobStatus::Succeeded, Some(now_ms - 5 * minute)),
        JobRecord::new("demo-7", host, JobStatus::Failed, Some(now_ms - TWO_HOURS_MS)),
        JobRecord::new("demo-8", "some-other-node", JobStatus::Running, Some(now_ms - minute)),
        JobRecord::new("demo-9", host, JobStatus::Init, None),
    ]
}
