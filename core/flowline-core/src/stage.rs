//! The fixed six-stage pipeline taxonomy.
//!
//! Stage order matters: particle flow and "next stage" logic walk it
//! monotonically. The set is closed and never extended at runtime.

use serde::{Deserialize, Serialize};

/// Fallback color for anything that cannot be resolved to a stage.
pub const NEUTRAL_COLOR: &str = "#94a3b8";

/// One phase of the visualized agent workflow, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Intake,
    Plan,
    Execute,
    Verify,
    Compact,
    Deliver,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 6] = [
        Stage::Intake,
        Stage::Plan,
        Stage::Execute,
        Stage::Verify,
        Stage::Compact,
        Stage::Deliver,
    ];

    /// Position in the pipeline order.
    pub fn index(&self) -> usize {
        match self {
            Stage::Intake => 0,
            Stage::Plan => 1,
            Stage::Execute => 2,
            Stage::Verify => 3,
            Stage::Compact => 4,
            Stage::Deliver => 5,
        }
    }

    /// The stage downstream of this one, if any.
    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    /// Identity color used for particles originating at this stage.
    pub fn color(&self) -> &'static str {
        match self {
            Stage::Intake => "#38bdf8",
            Stage::Plan => "#a78bfa",
            Stage::Execute => "#f59e0b",
            Stage::Verify => "#34d399",
            Stage::Compact => "#f472b6",
            Stage::Deliver => "#4ade80",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Intake => "Intake",
            Stage::Plan => "Plan",
            Stage::Execute => "Execute",
            Stage::Verify => "Verify",
            Stage::Compact => "Compact",
            Stage::Deliver => "Deliver",
        }
    }
}

/// Color for an optional stage; `None` resolves to the neutral fallback.
pub fn color_for(stage: Option<Stage>) -> &'static str {
    stage.map(|s| s.color()).unwrap_or(NEUTRAL_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_pipeline_order() {
        for (position, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), position);
        }
    }

    #[test]
    fn next_walks_the_order_and_stops_at_deliver() {
        assert_eq!(Stage::Intake.next(), Some(Stage::Plan));
        assert_eq!(Stage::Plan.next(), Some(Stage::Execute));
        assert_eq!(Stage::Execute.next(), Some(Stage::Verify));
        assert_eq!(Stage::Verify.next(), Some(Stage::Compact));
        assert_eq!(Stage::Compact.next(), Some(Stage::Deliver));
        assert_eq!(Stage::Deliver.next(), None);
    }

    #[test]
    fn colors_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for stage in Stage::ALL {
            assert!(seen.insert(stage.color()), "duplicate color for {:?}", stage);
        }
    }

    #[test]
    fn missing_stage_resolves_to_neutral_color() {
        assert_eq!(color_for(None), NEUTRAL_COLOR);
        assert_eq!(color_for(Some(Stage::Plan)), Stage::Plan.color());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Stage::Verify).expect("serialize"),
            "\"verify\""
        );
    }
}
