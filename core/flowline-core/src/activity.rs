//! Bounded rolling activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Maximum number of retained entries; oldest are evicted first.
pub const MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Action,
    Thought,
    Tool,
    Result,
    Error,
}

/// An immutable, timestamped log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub id: u64,
    pub at: DateTime<Utc>,
    pub stage: Stage,
    pub kind: ActivityKind,
    pub message: String,
}

/// Append-only log, bounded at [`MAX_ENTRIES`].
///
/// Ids and timestamps are synthesized here so callers only provide the
/// classification and the message. The id sequence is session-scoped.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
    #[serde(skip)]
    next_id: u64,
}

impl ActivityLog {
    pub fn push(&mut self, stage: Stage, kind: ActivityKind, message: impl Into<String>) {
        self.next_id += 1;
        self.entries.push(ActivityEntry {
            id: self.next_id,
            at: Utc::now(),
            stage,
            kind,
            message: message.into(),
        });
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    /// Entries in append order, oldest first.
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
