//! Counting service interface: how many active jobs this node has, optionally
//! restricted to a start-time range.

use std::future::Future;
use std::sync::Arc;

use crate::error::CountingError;

pub trait CountingService: Send + Sync + 'static {
    /// Active jobs whose start time lies in `[lower_ms, upper_ms)`. An absent
    /// bound leaves that side open.
    fn count(
        &self,
        lower_ms: Option<i64>,
        upper_ms: Option<i64>,
    ) -> impl Future<Output = Result<u64, CountingError>> + Send;

    /// Every active job on the node, whatever its start time.
    fn total_count(&self) -> impl Future<Output = Result<u64, CountingError>> + Send;
}

impl<T: CountingService> CountingService for Arc<T> {
    fn count(
        &self,
        lower_ms: Option<i64>,
        upper_ms: Option<i64>,
    ) -> impl Future<Output = Result<u64, CountingError>> + Send {
        (**self).count(lower_ms, upper_ms)
    }

    fn total_count(&self) -> impl Future<Output = Result<u64, CountingError>> + Send {
        (**self).total_count()
    }
}
