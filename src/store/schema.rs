use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::module::GlobalScoreBridge;
use crate::session::result::SessionRecord;
use crate::session::score::ScoreDelta;

const SCHEMA_VERSION: u32 = 1;

/// Cap on stored session records; the oldest are dropped first.
pub const HISTORY_LIMIT: usize = 500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub global_correct: u32,
    #[serde(default)]
    pub global_incorrect: u32,
    #[serde(default)]
    pub sessions_completed: u32,
    #[serde(default)]
    pub last_practice_date: Option<String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            username: None,
            global_correct: 0,
            global_incorrect: 0,
            sessions_completed: 0,
            last_practice_date: None,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn global_total(&self) -> u32 {
        self.global_correct.saturating_add(self.global_incorrect)
    }

    pub fn record_session(&mut self, record: &SessionRecord) {
        self.sessions_completed = self.sessions_completed.saturating_add(1);
        self.last_practice_date = Some(record.timestamp.format("%Y-%m-%d").to_string());
    }
}

fn apply(counter: u32, delta: i32) -> u32 {
    counter.saturating_add_signed(delta)
}

impl GlobalScoreBridge for ProfileData {
    fn update_global_score(&mut self, delta: ScoreDelta) {
        self.global_correct = apply(self.global_correct, delta.correct);
        self.global_incorrect = apply(self.global_incorrect, delta.incorrect);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl SessionHistoryData {
    pub fn push(&mut self, record: SessionRecord) {
        self.sessions.push(record);
        if self.sessions.len() > HISTORY_LIMIT {
            let excess = self.sessions.len() - HISTORY_LIMIT;
            self.sessions.drain(..excess);
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

/// Everything persisted, bundled into one file for backup and transfer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub lingodrill_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub profile: ProfileData,
    pub session_history: SessionHistoryData,
}
