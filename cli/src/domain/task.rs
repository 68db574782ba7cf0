//! Upload task state machine and poll budget.
//!
//! Pure types only. The orchestrator in `application::services` is the one
//! place that mutates a task.

use std::fmt;
use std::time::Duration;

use imgrelay_common::policy::{POLL_INTERVAL_MS, POLL_TIMEOUT_MS};

use crate::domain::error::ConfigError;

// ── Task status ───────────────────────────────────────────────────────────────

/// Where an upload task is in its lifecycle.
///
/// `Idle → Ready → Uploading → Waiting → {Done | TimedOut | Failed}`; a reset
/// returns any state to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    Ready,
    Uploading,
    Waiting,
    Done { url: String },
    TimedOut,
    Failed { message: String },
}

impl TaskStatus {
    /// An upload or poll is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading | Self::Waiting)
    }

    /// Only a reset leaves these.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::TimedOut | Self::Failed { .. })
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Uploading => "uploading",
            Self::Waiting => "waiting",
            Self::Done { .. } => "done",
            Self::TimedOut => "timed_out",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The file being processed. Created on selection, dropped on reset.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub filename: String,
    pub payload: Vec<u8>,
    pub status: TaskStatus,
}

impl UploadTask {
    #[must_use]
    pub fn new(filename: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            payload,
            status: TaskStatus::Ready,
        }
    }
}

// ── Poll policy ───────────────────────────────────────────────────────────────

/// Total budget and spacing of output checks after an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(POLL_TIMEOUT_MS),
            interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }
}

impl PollPolicy {
    /// # Errors
    ///
    /// Either value is zero.
    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll.timeout_ms".to_string(),
                value: timeout_ms.to_string(),
                valid: "a positive number of milliseconds".to_string(),
            });
        }
        if interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll.interval_ms".to_string(),
                value: interval_ms.to_string(),
                valid: "a positive number of milliseconds".to_string(),
            });
        }
        Ok(Self {
            timeout: Duration::from_millis(timeout_ms),
            interval: Duration::from_millis(interval_ms),
        })
    }

    /// Number of checks a cycle makes before giving up.
    #[must_use]
    pub fn max_checks(&self) -> u128 {
        self.timeout.as_millis().div_ceil(self.interval.as_millis())
    }
}

/// Remaining budget of one poll cycle.
#[derive(Debug, Clone, Copy)]
pub struct PollCycle {
    remaining: Duration,
    interval: Duration,
}

impl PollCycle {
    #[must_use]
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            remaining: policy.timeout,
            interval: policy.interval,
        }
    }

    /// Spends one interval; `true` once the budget is used up.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(self.interval);
        self.remaining.is_zero()
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}
