//! Job count monitor: a background task that periodically counts the jobs
//! running on this node per age bucket and republishes them as gauges.
//!
//! Each cycle queries the buckets in [`Bucket::ALL`] order, reading the clock
//! afresh for every query, then waits for the configured interval. A failed
//! query is logged and the cycle moves on; a woken wait starts the next cycle
//! early. Only a stop request ends the loop, and it is checked before every
//! query so a stop takes effect mid-cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::counting::CountingService;
use crate::error::{CountingError, InterruptedWait, MonitorError};
use crate::stats::NodeStatistics;
use crate::stop::StopSignal;
use crate::window::Bucket;

pub const DEFAULT_SLEEP: Duration = Duration::from_millis(30_000);

struct Inner<C> {
    counter: C,
    stats: Arc<dyn NodeStatistics>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    stop: Arc<StopSignal>,
    wake: Arc<Notify>,
    started: AtomicBool,
}

/// Cheap to clone; clones share the same loop, stop flag and collaborators.
pub struct JobCountMonitor<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for JobCountMonitor<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: CountingService> JobCountMonitor<C> {
    pub fn new(
        counter: C,
        stats: Arc<dyn NodeStatistics>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                counter,
                stats,
                clock,
                interval,
                stop: Arc::new(StopSignal::new()),
                wake: Arc::new(Notify::new()),
                started: AtomicBool::new(false),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn stop_signal(&self) -> Arc<StopSignal> {
        Arc::clone(&self.inner.stop)
    }

    /// Ask the loop to finish. Wakes a pending inter-cycle wait but never
    /// cancels a query already in flight. Repeated calls have no further effect.
    pub fn request_stop(&self) {
        if self.inner.stop.request() {
            info!("job count monitor stop requested");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.stop.is_requested()
    }

    /// Cut the current (or next) inter-cycle wait short without stopping.
    pub fn interrupt(&self) {
        self.inner.wake.notify_one();
    }

    /// Spawn the sampling loop on the tokio runtime.
    ///
    /// A monitor runs at most once: any later call, from this handle or a
    /// clone, fails with [`MonitorError::AlreadyStarted`]. There is no restart.
    pub fn start(&self) -> Result<MonitorHandle, MonitorError> {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return Err(MonitorError::AlreadyStarted);
        }
        let monitor = self.clone();
        let task = tokio::spawn(async move { monitor.run().await });
        Ok(MonitorHandle {
            stop: Arc::clone(&self.inner.stop),
            wake: Arc::clone(&self.inner.wake),
            task,
        })
    }

    pub async fn instant_count(&self) -> Result<u64, CountingError> {
        debug!("instant_count called");
        self.count_bucket(Bucket::Instant).await
    }

    pub async fn count_15m(&self) -> Result<u64, CountingError> {
        debug!("count_15m called");
        self.count_bucket(Bucket::Recent).await
    }

    pub async fn count_2h(&self) -> Result<u64, CountingError> {
        debug!("count_2h called");
        self.count_bucket(Bucket::Short).await
    }

    pub async fn count_8h(&self) -> Result<u64, CountingError> {
        debug!("count_8h called");
        self.count_bucket(Bucket::Long).await
    }

    pub async fn count_8h_plus(&self) -> Result<u64, CountingError> {
        debug!("count_8h_plus called");
        self.count_bucket(Bucket::VeryLong).await
    }

    /// Count one bucket against a window anchored at the current clock reading.
    pub async fn count_bucket(&self, bucket: Bucket) -> Result<u64, CountingError> {
        let now_ms = self.inner.clock.now_ms();
        match bucket.window(now_ms) {
            None => self.inner.counter.total_count().await,
            Some(w) => self.inner.counter.count(w.lower_ms, w.upper_ms).await,
        }
    }

    /// Run a single sampling cycle in the caller's task: query and publish
    /// every bucket, skipping the rest once a stop is requested.
    pub async fn sample_once(&self) {
        for bucket in Bucket::ALL {
            if self.inner.stop.is_requested() {
                debug!(%bucket, "stop requested mid-cycle, skipping remaining buckets");
                return;
            }
            match self.count_bucket(bucket).await {
                Ok(count) => {
                    publish(self.inner.stats.as_ref(), bucket, count);
                    debug!(%bucket, count, "published running job count");
                }
                Err(e) => warn!(%bucket, "failed to sample running jobs: {e}"),
            }
        }
    }

    async fn run(&self) {
        loop {
            info!("job count monitor waking up");
            if self.inner.stop.is_requested() {
                info!("job count monitor stopping as requested");
                return;
            }

            self.sample_once().await;

            if self.inner.stop.is_requested() {
                continue;
            }
            info!(
                interval_ms = self.inner.interval.as_millis() as u64,
                "job count monitor going to sleep"
            );
            if let Err(e) = self.pause().await {
                warn!("{e}; starting next cycle early");
            }
        }
    }

    async fn pause(&self) -> Result<(), InterruptedWait> {
        tokio::select! {
            biased;
            _ = self.inner.stop.wait() => Ok(()),
            _ = self.inner.wake.notified() => Err(InterruptedWait),
            _ = tokio::time::sleep(self.inner.interval) => Ok(()),
        }
    }
}

fn publish(stats: &dyn NodeStatistics, bucket: Bucket, count: u64) {
    match bucket {
        Bucket::Instant => stats.set_running_jobs(count),
        Bucket::Recent => stats.set_running_jobs_0m_15m(count),
        Bucket::Short => stats.set_running_jobs_15m_2h(count),
        Bucket::Long => stats.set_running_jobs_2h_8h(count),
        Bucket::VeryLong => stats.set_running_jobs_8h_plus(count),
    }
}

/// Owner's side of a started monitor.
pub struct MonitorHandle {
    stop: Arc<StopSignal>,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn request_stop(&self) {
        if self.stop.request() {
            info!("job count monitor stop requested");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    pub fn interrupt(&self) {
        self.wake.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to observe the stop and exit.
    pub async fn join(self) -> Result<(), MonitorError> {
        self.task.await?;
        Ok(())
    }
}
