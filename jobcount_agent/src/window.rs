//! Age buckets for running jobs and the "now"-anchored start-time windows
//! each bucket queries.
//!
//! Bounds are absolute epoch milliseconds. The monitor only supplies them;
//! the counting service owns inclusivity (lower inclusive, upper exclusive).

use serde::Serialize;
use std::fmt;

use crate::stats::{
    RUNNING_JOBS, RUNNING_JOBS_0M_15M, RUNNING_JOBS_15M_2H, RUNNING_JOBS_2H_8H,
    RUNNING_JOBS_8H_PLUS,
};

pub const FIFTEEN_MINUTES_MS: i64 = 15 * 60 * 1000;
pub const TWO_HOURS_MS: i64 = 2 * 60 * 60 * 1000;
pub const EIGHT_HOURS_MS: i64 = 8 * 60 * 60 * 1000;

/// Range of job start times. `None` on either side leaves it open:
/// no lower bound means since the beginning of time, no upper bound means
/// through now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    pub lower_ms: Option<i64>,
    pub upper_ms: Option<i64>,
}

impl TimeWindow {
    pub const fn new(lower_ms: Option<i64>, upper_ms: Option<i64>) -> Self {
        Self { lower_ms, upper_ms }
    }

    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// False only when both bounds are present and lower > upper.
    pub fn is_ordered(&self) -> bool {
        match (self.lower_ms, self.upper_ms) {
            (Some(lower), Some(upper)) => lower <= upper,
            _ => true,
        }
    }

    /// Half-open membership: `lower <= ts < upper`.
    pub fn contains(&self, ts_ms: i64) -> bool {
        self.lower_ms.is_none_or(|lower| ts_ms >= lower)
            && self.upper_ms.is_none_or(|upper| ts_ms < upper)
    }
}

/// The five published metrics, in publish order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Every active job, regardless of start time.
    Instant,
    /// Started within the last 15 minutes.
    Recent,
    /// Started between 2 hours and 15 minutes ago.
    Short,
    /// Started between 8 hours and 2 hours ago.
    Long,
    /// Started more than 8 hours ago.
    VeryLong,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Instant,
        Bucket::Recent,
        Bucket::Short,
        Bucket::Long,
        Bucket::VeryLong,
    ];

    /// Window anchored at `now_ms`. `None` for [`Bucket::Instant`], which is
    /// answered by the service's total count rather than a range query.
    pub fn window(self, now_ms: i64) -> Option<TimeWindow> {
        // Saturate so any i64 "now" yields a window rather than overflowing.
        let ago = |ms: i64| now_ms.saturating_sub(ms);
        let window = match self {
            Bucket::Instant => return None,
            Bucket::Recent => TimeWindow::new(Some(ago(FIFTEEN_MINUTES_MS)), None),
            Bucket::Short => {
                TimeWindow::new(Some(ago(TWO_HOURS_MS)), Some(ago(FIFTEEN_MINUTES_MS)))
            }
            Bucket::Long => TimeWindow::new(Some(ago(EIGHT_HOURS_MS)), Some(ago(TWO_HOURS_MS))),
            Bucket::VeryLong => TimeWindow::new(None, Some(ago(EIGHT_HOURS_MS))),
        };
        Some(window)
    }

    pub fn gauge_name(self) -> &'static str {
        match self {
            Bucket::Instant => RUNNING_JOBS,
            Bucket::Recent => RUNNING_JOBS_0M_15M,
            Bucket::Short => RUNNING_JOBS_15M_2H,
            Bucket::Long => RUNNING_JOBS_2H_8H,
            Bucket::VeryLong => RUNNING_JOBS_8H_PLUS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Instant => "instant",
            Bucket::Recent => "0m-15m",
            Bucket::Short => "15m-2h",
            Bucket::Long => "2h-8h",
            Bucket::VeryLong => "8h-plus",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
