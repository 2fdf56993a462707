//! Maps the raw agent activity state to a presentation mode and stage.
//!
//! Conservative rules: only the four in-progress states light up a stage;
//! anything unrecognized degrades to waiting with no stage.

use flowline_telemetry::AgentActivityState;
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Coarse presentation state derived from telemetry.
///
/// `Error` and `Complete` are part of the external contract but are not
/// produced by the current mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    Active,
    #[default]
    Waiting,
    Error,
    Complete,
}

/// The stage an in-progress activity state lights up, if any.
///
/// `Verify` and `Deliver` are never produced here; they are reachable only
/// through free-text classification in the bridge.
pub fn stage_for(state: AgentActivityState) -> Option<Stage> {
    match state {
        AgentActivityState::Thinking => Some(Stage::Plan),
        AgentActivityState::Streaming => Some(Stage::Execute),
        AgentActivityState::Compacting => Some(Stage::Compact),
        AgentActivityState::Restarting => Some(Stage::Intake),
        _ => None,
    }
}

pub fn mode_for(state: AgentActivityState) -> PipelineMode {
    if state.is_in_progress() {
        PipelineMode::Active
    } else {
        PipelineMode::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [AgentActivityState; 8] = [
        AgentActivityState::Idle,
        AgentActivityState::AwaitingInput,
        AgentActivityState::LoadingHistory,
        AgentActivityState::Thinking,
        AgentActivityState::Streaming,
        AgentActivityState::Compacting,
        AgentActivityState::Restarting,
        AgentActivityState::Unknown,
    ];

    #[test]
    fn in_progress_states_map_to_their_stage() {
        assert_eq!(stage_for(AgentActivityState::Thinking), Some(Stage::Plan));
        assert_eq!(
            stage_for(AgentActivityState::Streaming),
            Some(Stage::Execute)
        );
        assert_eq!(
            stage_for(AgentActivityState::Compacting),
            Some(Stage::Compact)
        );
        assert_eq!(
            stage_for(AgentActivityState::Restarting),
            Some(Stage::Intake)
        );
    }

    #[test]
    fn idle_like_states_map_to_no_stage() {
        assert_eq!(stage_for(AgentActivityState::Idle), None);
        assert_eq!(stage_for(AgentActivityState::AwaitingInput), None);
        assert_eq!(stage_for(AgentActivityState::LoadingHistory), None);
        assert_eq!(stage_for(AgentActivityState::Unknown), None);
    }

    #[test]
    fn mode_is_active_exactly_when_a_stage_resolves() {
        for state in ALL_STATES {
            let active = mode_for(state) == PipelineMode::Active;
            assert_eq!(
                active,
                stage_for(state).is_some(),
                "mode/stage disagree for {:?}",
                state
            );
        }
    }

    #[test]
    fn unknown_defaults_to_waiting() {
        assert_eq!(mode_for(AgentActivityState::Unknown), PipelineMode::Waiting);
    }
}
