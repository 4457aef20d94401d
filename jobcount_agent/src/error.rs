use thiserror::Error;

/// Failure answering a job count query.
#[derive(Error, Debug)]
pub enum CountingError {
    #[error("job store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read job store: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed job store: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid window: lower bound {lower} is after upper bound {upper}")]
    InvalidWindow { lower: i64, upper: i64 },
}

/// The inter-cycle wait was woken before the interval elapsed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("inter-cycle wait interrupted")]
pub struct InterruptedWait;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("job count monitor already started")]
    AlreadyStarted,

    #[error("job count monitor task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("invalid value for {flag}: {value:?}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("sleep interval must be greater than zero")]
    ZeroInterval,

    #[error("no job store given; pass --jobs FILE or --demo")]
    NoJobStore,

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}
