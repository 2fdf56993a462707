//! Bridges external agent telemetry into session mutations.
//!
//! Each of the four signals is guarded against redundant re-delivery: a
//! call reaches the session only when the observed value actually changed.
//! Token counters arrive cumulative and are converted to deltas here; the
//! session never de-duplicates.

use flowline_telemetry::{AgentActivityState, TelemetryFrame};

use crate::activity::ActivityKind;
use crate::classify::{classify_kind, classify_stage};
use crate::session::PipelineSession;
use crate::stage::Stage;

/// Appended message text shorter than this is dropped, so fine-grained
/// streaming does not flood the activity log.
const MIN_CONTENT_CHARS: usize = 20;

#[derive(Debug, Default)]
pub struct TelemetryBridge {
    last_state: Option<AgentActivityState>,
    last_input_tokens: u64,
    last_output_tokens: u64,
    last_tool: Option<String>,
    content_seen: usize,
}

impl TelemetryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one telemetry observation through all four signal paths.
    pub fn observe(&mut self, session: &mut PipelineSession, frame: &TelemetryFrame) {
        self.observe_state(session, frame.state);
        self.observe_tokens(session, frame.input_tokens, frame.output_tokens);
        if let Some(tool) = frame.latest_tool.as_deref() {
            self.observe_tool(session, tool);
        }
        if let Some(message) = frame.message.as_deref() {
            self.observe_content(session, message);
        }
    }

    pub fn observe_state(&mut self, session: &mut PipelineSession, state: AgentActivityState) {
        if self.last_state == Some(state) {
            return;
        }
        self.last_state = Some(state);
        session.sync_agent_state(state);
        if let Some((stage, kind, message)) = transition_note(state) {
            session.push_activity(stage, kind, message);
        }
    }

    pub fn observe_tokens(&mut self, session: &mut PipelineSession, input: u64, output: u64) {
        // Saturating deltas: a counter that shrank (agent restart) yields
        // zero and re-baselines.
        let input_delta = input.saturating_sub(self.last_input_tokens);
        let output_delta = output.saturating_sub(self.last_output_tokens);
        self.last_input_tokens = input;
        self.last_output_tokens = output;
        if input_delta > 0 || output_delta > 0 {
            session.sync_tokens(input_delta, output_delta);
        }
    }

    pub fn observe_tool(&mut self, session: &mut PipelineSession, tool: &str) {
        if tool.is_empty() || self.last_tool.as_deref() == Some(tool) {
            return;
        }
        self.last_tool = Some(tool.to_string());
        session.record_tool_call(tool, None);
    }

    /// Classifies the newly appended portion of the grow-only message text
    /// and logs it when it is long enough to mean something.
    pub fn observe_content(&mut self, session: &mut PipelineSession, message: &str) {
        if message.len() < self.content_seen {
            // A shorter value means a new turn started; re-baseline.
            self.content_seen = message.len();
            return;
        }
        if message.len() == self.content_seen {
            return;
        }
        let appended = match message.get(self.content_seen..) {
            Some(suffix) => suffix,
            // The cursor landed mid-character: the text was replaced, not
            // grown. Re-baseline without logging.
            None => {
                self.content_seen = message.len();
                return;
            }
        };
        self.content_seen = message.len();

        let trimmed = appended.trim();
        if trimmed.chars().count() < MIN_CONTENT_CHARS {
            return;
        }
        let first_line = trimmed.lines().next().unwrap_or(trimmed);
        session.push_activity(
            classify_stage(first_line),
            classify_kind(first_line),
            first_line,
        );
    }
}

/// Hard-coded activity note for entering a specific state.
fn transition_note(state: AgentActivityState) -> Option<(Stage, ActivityKind, &'static str)> {
    match state {
        AgentActivityState::Thinking => Some((
            Stage::Plan,
            ActivityKind::Thought,
            "Thinking through the next step",
        )),
        AgentActivityState::Streaming => {
            Some((Stage::Execute, ActivityKind::Action, "Writing a response"))
        }
        AgentActivityState::Compacting => Some((
            Stage::Compact,
            ActivityKind::Action,
            "Compacting conversation context",
        )),
        AgentActivityState::Restarting => {
            Some((Stage::Intake, ActivityKind::Action, "Restarting the agent"))
        }
        _ => None,
    }
}
