//! Command-line and environment configuration for the agent binary.
//!
//! Flags win over environment variables:
//! - `--interval-ms`/`-i` or `JOBCOUNT_AGENT_SLEEP_MS` (default 30000)
//! - `--jobs`/`-j` or `JOBCOUNT_AGENT_JOBS`: JSON job table to count from
//! - `--host` or `JOBCOUNT_AGENT_HOST`: node whose jobs are counted (default: hostname)
//! - `--once`: run one cycle, print the gauges as JSON and exit
//! - `--demo`: count an in-memory sample job table instead of a file

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_SLEEP_MS: u64 = 30_000;

pub const ENV_SLEEP_MS: &str = "JOBCOUNT_AGENT_SLEEP_MS";
pub const ENV_JOBS: &str = "JOBCOUNT_AGENT_JOBS";
pub const ENV_HOST: &str = "JOBCOUNT_AGENT_HOST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    File(PathBuf),
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub interval: Duration,
    pub source: JobSource,
    pub host: Option<String>,
    pub once: bool,
}

impl AgentConfig {
    /// Configured host, else the machine hostname, else "localhost".
    pub fn resolve_host(&self) -> String {
        self.host.clone().unwrap_or_else(|| {
            hostname::get()
                .ok()
                .and_then(|s| s.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(AgentConfig),
    Help(String),
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--jobs FILE|-j FILE] [--interval-ms MS|-i MS] [--host NAME] [--once] [--demo]"
    )
}

/// Parse process arguments (program name first), falling back to the real
/// environment.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, ConfigError> {
    parse_args_with_env(args, |key| std::env::var(key).ok())
}

pub fn parse_args_with_env<I, F>(args: I, env: F) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "jobcount_agent".into());
    let mut interval: Option<String> = None;
    let mut jobs: Option<String> = None;
    let mut host: Option<String> = None;
    let mut once = false;
    let mut demo = false;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help(usage(&prog))),
            "--interval-ms" | "-i" => {
                interval = Some(it.next().ok_or(ConfigError::MissingValue("--interval-ms"))?);
            }
            "--jobs" | "-j" => {
                jobs = Some(it.next().ok_or(ConfigError::MissingValue("--jobs"))?);
            }
            "--host" => {
                host = Some(it.next().ok_or(ConfigError::MissingValue("--host"))?);
            }
            "--once" => once = true,
            "--demo" => demo = true,
            _ if arg.starts_with("--interval-ms=") => {
                interval = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ if arg.starts_with("--jobs=") => {
                jobs = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ if arg.starts_with("--host=") => {
                host = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ => return Err(ConfigError::UnexpectedArgument(arg)),
        }
    }

    let interval_ms = match interval.or_else(|| env(ENV_SLEEP_MS)) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue {
                flag: "--interval-ms",
                value: raw.clone(),
            })?,
        None => DEFAULT_SLEEP_MS,
    };
    if interval_ms == 0 {
        return Err(ConfigError::ZeroInterval);
    }

    let source = if demo {
        JobSource::Demo
    } else {
        match jobs.or_else(|| env(ENV_JOBS)).filter(|p| !p.is_empty()) {
            Some(path) => JobSource::File(PathBuf::from(path)),
            None => return Err(ConfigError::NoJobStore),
        }
    };

    let host = host.or_else(|| env(ENV_HOST)).filter(|h| !h.is_empty());

    Ok(Command::Run(AgentConfig {
        interval: Duration::from_millis(interval_ms),
        source,
        host,
        once,
    }))
}
