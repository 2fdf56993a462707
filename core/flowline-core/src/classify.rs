//! Keyword classification of free-form message text.
//!
//! This is a coarse heuristic, not a parser: an ordered list of
//! (needle-set, label) rules checked first-match-wins against the
//! lower-cased text. The default tables live here; the bridge takes the
//! classifier as a value so alternative strategies can be swapped in.

use once_cell::sync::Lazy;

use crate::activity::ActivityKind;
use crate::stage::Stage;

struct Rule<T> {
    needles: &'static [&'static str],
    label: T,
}

/// Ordered substring rules with a fallback label.
pub struct KeywordClassifier<T: Copy> {
    rules: Vec<Rule<T>>,
    fallback: T,
}

impl<T: Copy> KeywordClassifier<T> {
    pub fn new(rules: Vec<(&'static [&'static str], T)>, fallback: T) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(needles, label)| Rule { needles, label })
                .collect(),
            fallback,
        }
    }

    pub fn classify(&self, text: &str) -> T {
        let lowered = text.to_lowercase();
        for rule in &self.rules {
            if rule.needles.iter().any(|needle| lowered.contains(needle)) {
                return rule.label;
            }
        }
        self.fallback
    }
}

static STAGE_TABLE: Lazy<KeywordClassifier<Stage>> = Lazy::new(|| {
    KeywordClassifier::new(
        vec![
            (
                &["plan", "design", "approach", "outline", "think"][..],
                Stage::Plan,
            ),
            (&["test", "verify", "check", "review"][..], Stage::Verify),
            (&["compact", "summariz", "condens"][..], Stage::Compact),
            (
                &["done", "complete", "finish", "deliver", "ship"][..],
                Stage::Deliver,
            ),
            (
                &["read", "load", "fetch", "search", "look"][..],
                Stage::Intake,
            ),
        ],
        Stage::Execute,
    )
});

static KIND_TABLE: Lazy<KeywordClassifier<ActivityKind>> = Lazy::new(|| {
    KeywordClassifier::new(
        vec![
            (
                &["error", "fail", "panic", "exception"][..],
                ActivityKind::Error,
            ),
            (
                &["running", "invok", "calling", "tool"][..],
                ActivityKind::Tool,
            ),
            (
                &["think", "consider", "planning", "wonder"][..],
                ActivityKind::Thought,
            ),
            (
                &["done", "finish", "complete", "result"][..],
                ActivityKind::Result,
            ),
        ],
        ActivityKind::Action,
    )
});

/// Classifies text into the stage it most likely concerns.
pub fn classify_stage(text: &str) -> Stage {
    STAGE_TABLE.classify(text)
}

/// Classifies text into an activity kind.
pub fn classify_kind(text: &str) -> ActivityKind {
    KIND_TABLE.classify(text)
}
