//! Telemetry types shared between the agent backend and the Flowline core.
//!
//! This crate is shared by the visualization core and whatever feeds it
//! (IPC bridge, replay tooling) to prevent schema drift. The backend is the
//! authority on what it emits; consumers must tolerate values they do not
//! recognize, so the state enum carries an `Unknown` catch-all instead of
//! failing deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// What the agent session is doing right now, as reported by the backend.
///
/// The wire format is a lowercase snake_case string. New states may appear
/// before this crate learns about them; they deserialize as [`Unknown`]
/// and are treated as idle-like by consumers.
///
/// [`Unknown`]: AgentActivityState::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentActivityState {
    #[default]
    Idle,
    AwaitingInput,
    LoadingHistory,
    Thinking,
    Streaming,
    Compacting,
    Restarting,
    Unknown,
}

impl<'de> Deserialize<'de> for AgentActivityState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&value))
    }
}

impl AgentActivityState {
    /// Parses a wire value, mapping anything unrecognized to `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "idle" => Self::Idle,
            "awaiting_input" => Self::AwaitingInput,
            "loading_history" => Self::LoadingHistory,
            "thinking" => Self::Thinking,
            "streaming" => Self::Streaming,
            "compacting" => Self::Compacting,
            "restarting" => Self::Restarting,
            _ => Self::Unknown,
        }
    }

    /// Whether the agent is actively working a turn.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::Thinking | Self::Streaming | Self::Compacting | Self::Restarting
        )
    }

    /// Whether the session is waiting on the user or the host.
    pub fn is_idle_like(&self) -> bool {
        !self.is_in_progress()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingInput => "awaiting_input",
            Self::LoadingHistory => "loading_history",
            Self::Thinking => "thinking",
            Self::Streaming => "streaming",
            Self::Compacting => "compacting",
            Self::Restarting => "restarting",
            Self::Unknown => "unknown",
        }
    }
}

/// One observation of the externally-changing session signals.
///
/// Token counters are cumulative for the session; `message` only grows
/// during a turn. Consumers are responsible for diffing against their
/// last-seen values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TelemetryFrame {
    #[serde(default)]
    pub state: AgentActivityState,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub latest_tool: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<String>,
}

impl TelemetryFrame {
    /// Parsed observation time, when the frame carried a valid RFC 3339
    /// stamp. Invalid or missing stamps are not an error; the frame is
    /// still usable.
    pub fn recorded_at_time(&self) -> Option<DateTime<Utc>> {
        let value = self.recorded_at.as_deref()?;
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|stamp| stamp.with_timezone(&Utc))
    }
}
