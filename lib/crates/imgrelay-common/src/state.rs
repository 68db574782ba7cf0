use std::fmt;

use serde::{Deserialize, Serialize};

/// Run state of the external compute instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Pending,
    Stopping,
    Stopped,
    #[default]
    Unknown,
}

impl RunState {
    /// Maps an EC2 `instanceState/name` value onto a run state.
    ///
    /// `shutting-down` and `terminated` fold into `Stopping` and `Stopped`;
    /// anything unrecognised is `Unknown`.
    #[must_use]
    pub fn from_ec2(name: &str) -> Self {
        match name {
            "running" => Self::Running,
            "pending" => Self::Pending,
            "stopping" | "shutting-down" => Self::Stopping,
            "stopped" | "terminated" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    /// Maps the optional `state` field of the status endpoint.
    #[must_use]
    pub fn from_reported(state: Option<&str>) -> Self {
        state.map_or(Self::Unknown, Self::from_ec2)
    }

    #[must_use]
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Pending => "pending",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
