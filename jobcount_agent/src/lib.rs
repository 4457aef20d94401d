//! jobcount_agent: counts the jobs running on this node per age bucket and
//! keeps those counts published as gauges in the node statistics registry.

pub mod clock;
pub mod config;
pub mod counting;
pub mod error;
pub mod monitor;
pub mod stats;
pub mod stop;
pub mod store;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counting::CountingService;
pub use error::{ConfigError, CountingError, InterruptedWait, MonitorError};
pub use monitor::{JobCountMonitor, MonitorHandle, DEFAULT_SLEEP};
pub use stats::{GaugeRegistry, NodeStatistics, StatsSnapshot};
pub use stop::StopSignal;
pub use window::{Bucket, TimeWindow};
