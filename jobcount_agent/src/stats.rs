//! Node statistics registry: named gauges shared across the process.
//!
//! The job count monitor is the only writer of the `jobs.running*` gauges,
//! but other components may register and write their own gauges through the
//! same registry while reporters read snapshots concurrently.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub const RUNNING_JOBS: &str = "jobs.running";
pub const RUNNING_JOBS_0M_15M: &str = "jobs.running.0m-15m";
pub const RUNNING_JOBS_15M_2H: &str = "jobs.running.15m-2h";
pub const RUNNING_JOBS_2H_8H: &str = "jobs.running.2h-8h";
pub const RUNNING_JOBS_8H_PLUS: &str = "jobs.running.8h-plus";

/// Write side of the registry. Publishing never fails.
pub trait NodeStatistics: Send + Sync {
    fn set_gauge(&self, name: &str, value: u64);

    fn set_running_jobs(&self, value: u64) {
        self.set_gauge(RUNNING_JOBS, value);
    }

    fn set_running_jobs_0m_15m(&self, value: u64) {
        self.set_gauge(RUNNING_JOBS_0M_15M, value);
    }

    fn set_running_jobs_15m_2h(&self, value: u64) {
        self.set_gauge(RUNNING_JOBS_15M_2H, value);
    }

    fn set_running_jobs_2h_8h(&self, value: u64) {
        self.set_gauge(RUNNING_JOBS_2H_8H, value);
    }

    fn set_running_jobs_8h_plus(&self, value: u64) {
        self.set_gauge(RUNNING_JOBS_8H_PLUS, value);
    }
}

/// Point-in-time copy of every gauge, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub ts_unix_ms: i64,
    pub gauges: BTreeMap<String, u64>,
}

/// In-process gauge registry. Clones share the same gauges.
#[derive(Debug, Clone, Default)]
pub struct GaugeRegistry {
    gauges: Arc<RwLock<BTreeMap<String, Arc<AtomicU64>>>>,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gauge(&self, name: &str) -> Option<u64> {
        let gauges = self.gauges.read().unwrap_or_else(PoisonError::into_inner);
        gauges.get(name).map(|g| g.load(Ordering::Acquire))
    }

    pub fn len(&self) -> usize {
        self.gauges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let gauges = self.gauges.read().unwrap_or_else(PoisonError::into_inner);
        StatsSnapshot {
            ts_unix_ms: chrono::Utc::now().timestamp_millis(),
            gauges: gauges
                .iter()
                .map(|(name, g)| (name.clone(), g.load(Ordering::Acquire)))
                .collect(),
        }
    }
}

impl NodeStatistics for GaugeRegistry {
    fn set_gauge(&self, name: &str, value: u64) {
        // Existing gauges only need the read lock; the atomic carries the write.
        {
            let gauges = self.gauges.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(g) = gauges.get(name) {
                g.store(value, Ordering::Release);
                return;
            }
        }
        let mut gauges = self.gauges.write().unwrap_or_else(PoisonError::into_inner);
        gauges
            .entry(name.to_string())
            .or_default()
            .store(value, Ordering::Release);
    }
}
