//! Session controller: owns the composed pipeline state and exposes the
//! mutation surface the bridge and the renderer drive.
//!
//! Synchronous and not thread-safe, like the rest of the core; each
//! mutation is a single old-state to new-state transform, so a host that
//! batches updates cannot observe a half-applied change.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use flowline_telemetry::AgentActivityState;

use crate::activity::{ActivityKind, ActivityLog};
use crate::mapper::{mode_for, stage_for, PipelineMode};
use crate::metrics::{MetricsTable, FRAME_MS};
use crate::particle::{Particle, ParticleSim};
use crate::stage::Stage;

/// Stage a tool-call activity entry is tagged with when none resolves.
const DEFAULT_TOOL_STAGE: Stage = Stage::Execute;

/// The full composed snapshot read by the rendering layer.
#[derive(Debug, Serialize, Default)]
pub struct PipelineState {
    pub mode: PipelineMode,
    pub active_stage: Option<Stage>,
    /// The stage that was active immediately before the current one.
    /// Updated only when `active_stage` actually changes.
    pub previous_stage: Option<Stage>,
    pub particles: Vec<Particle>,
    pub activity: ActivityLog,
    pub metrics: MetricsTable,
    pub elapsed_ms: u64,
    pub total_tokens: u64,
    /// Raw external value, kept for observability.
    pub agent_state: AgentActivityState,
}

/// Owns one session's [`PipelineState`] for its whole life.
pub struct PipelineSession {
    state: PipelineState,
    sim: ParticleSim,
    started_at: Option<DateTime<Utc>>,
}

impl PipelineSession {
    pub fn new() -> Self {
        Self::with_sim(ParticleSim::new())
    }

    /// Deterministic particle behavior for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_sim(ParticleSim::with_seed(seed))
    }

    fn with_sim(sim: ParticleSim) -> Self {
        Self {
            state: PipelineState::default(),
            sim,
            started_at: None,
        }
    }

    /// Read-only snapshot for the renderer.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Primary driver: ingests a new external activity state.
    pub fn sync_agent_state(&mut self, agent_state: AgentActivityState) {
        let new_mode = mode_for(agent_state);
        let new_stage = stage_for(agent_state);
        let was_active = self.state.mode == PipelineMode::Active;
        let old_stage = self.state.active_stage;

        if !was_active && new_mode == PipelineMode::Active {
            self.started_at = Some(Utc::now());
        }

        if new_stage != old_stage {
            if let (Some(from), Some(to)) = (old_stage, new_stage) {
                self.sim.burst(&mut self.state.particles, from, to);
            }
        }

        if let Some(to) = new_stage {
            self.state.metrics.record_transition(old_stage, to);
        }
        if new_mode == PipelineMode::Waiting {
            self.state.metrics.record_waiting(old_stage);
        }

        if new_stage != old_stage {
            self.state.previous_stage = old_stage;
            self.state.active_stage = new_stage;
        }

        self.state.mode = new_mode;
        self.state.agent_state = agent_state;
        debug!(
            state = agent_state.as_str(),
            mode = ?new_mode,
            stage = ?new_stage,
            "agent state synced"
        );
    }

    /// Accounts a token delta. The caller passes deltas, not cumulative
    /// totals; no de-duplication happens here.
    ///
    /// The delta always counts toward the session total; it is attributed
    /// to a stage only while one is active, so tokens consumed outside any
    /// identified stage are never misattributed.
    pub fn sync_tokens(&mut self, input_delta: u64, output_delta: u64) {
        let amount = input_delta.saturating_add(output_delta);
        self.state.total_tokens = self.state.total_tokens.saturating_add(amount);
        if let Some(stage) = self.state.active_stage {
            self.state.metrics.add_tokens(stage, amount);
        }
    }

    pub fn push_activity(&mut self, stage: Stage, kind: ActivityKind, message: impl Into<String>) {
        self.state.activity.push(stage, kind, message);
    }

    /// Counts a tool call against the given stage, or the active stage when
    /// none is given. With neither, metrics are untouched; the activity
    /// entry is always appended.
    pub fn record_tool_call(&mut self, tool_name: &str, stage: Option<Stage>) {
        let resolved = stage.or(self.state.active_stage);
        if let Some(stage) = resolved {
            self.state.metrics.add_tool_call(stage);
        }
        let tag = resolved.unwrap_or(DEFAULT_TOOL_STAGE);
        self.state
            .activity
            .push(tag, ActivityKind::Tool, format!("Tool: {}", tool_name));
    }

    /// One animation frame. Returns whether the snapshot changed, so the
    /// caller can skip a re-render on idle ticks.
    pub fn tick(&mut self) -> bool {
        let changed = self.sim.tick(
            &mut self.state.particles,
            self.state.mode,
            self.state.active_stage,
            self.state.previous_stage,
        );

        if self.state.mode != PipelineMode::Active {
            return changed;
        }

        if let Some(stage) = self.state.active_stage {
            self.state.metrics.add_duration(stage, FRAME_MS);
        }
        if let Some(started) = self.started_at {
            let elapsed = Utc::now().signed_duration_since(started).num_milliseconds();
            self.state.elapsed_ms = elapsed.max(0) as u64;
        }
        true
    }
}

impl Default for PipelineSession {
    fn default() -> Self {
        Self::new()
    }
}
