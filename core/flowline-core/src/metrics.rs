//! Per-stage metrics accumulation.
//!
//! Duration is frame-count based: each active tick adds a fixed increment
//! rather than a measured wall-clock delta, so accuracy depends on the tick
//! loop actually running at its assumed 60 Hz cadence.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Fixed duration credited to the active stage per tick (one frame at 60 Hz).
pub const FRAME_MS: u64 = 16;

/// Lifecycle status of a single stage within the session.
///
/// `Error` is part of the contract but not produced by the current
/// bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Idle,
    Active,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct StageMetrics {
    pub tokens_used: u64,
    pub tool_calls: u32,
    pub duration_ms: u64,
    pub status: StageStatus,
}

/// One [`StageMetrics`] per stage, indexed by pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct MetricsTable {
    stages: [StageMetrics; 6],
}

impl MetricsTable {
    pub fn get(&self, stage: Stage) -> &StageMetrics {
        &self.stages[stage.index()]
    }

    fn get_mut(&mut self, stage: Stage) -> &mut StageMetrics {
        &mut self.stages[stage.index()]
    }

    /// Completes the outgoing stage (if it was active) and activates the
    /// incoming one.
    pub fn record_transition(&mut self, from: Option<Stage>, to: Stage) {
        if let Some(from) = from {
            if from != to && self.get(from).status == StageStatus::Active {
                self.get_mut(from).status = StageStatus::Complete;
            }
        }
        self.get_mut(to).status = StageStatus::Active;
    }

    /// Finalizes the last active stage when the pipeline falls back to
    /// waiting.
    pub fn record_waiting(&mut self, last_active: Option<Stage>) {
        if let Some(stage) = last_active {
            if self.get(stage).status == StageStatus::Active {
                self.get_mut(stage).status = StageStatus::Complete;
            }
        }
    }

    pub fn add_tokens(&mut self, stage: Stage, amount: u64) {
        let metrics = self.get_mut(stage);
        metrics.tokens_used = metrics.tokens_used.saturating_add(amount);
    }

    pub fn add_duration(&mut self, stage: Stage, ms: u64) {
        let metrics = self.get_mut(stage);
        metrics.duration_ms = metrics.duration_ms.saturating_add(ms);
    }

    pub fn add_tool_call(&mut self, stage: Stage) {
        let metrics = self.get_mut(stage);
        metrics.tool_calls = metrics.tool_calls.saturating_add(1);
    }

    /// The stage currently marked active, if any.
    pub fn active_stage(&self) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| self.get(*stage).status == StageStatus::Active)
    }
}
