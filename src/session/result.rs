use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::module::{ModuleKind, ModuleSummary};
use crate::session::score::SessionScore;

/// One finished module run, as kept in the session history file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub module_id: String,
    pub mode: ModuleKind,
    pub correct: u32,
    pub incorrect: u32,
    #[serde(default)]
    pub item_count: usize,
    #[serde(default)]
    pub matched_pairs: usize,
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn from_summary(summary: &ModuleSummary) -> Self {
        Self::from_summary_at(summary, Utc::now())
    }

    pub fn from_summary_at(summary: &ModuleSummary, timestamp: DateTime<Utc>) -> Self {
        Self {
            module_id: summary.metadata.id.clone(),
            mode: summary.metadata.mode,
            correct: summary.score.correct,
            incorrect: summary.score.incorrect,
            item_count: summary.item_count,
            matched_pairs: summary.matched_pairs.len(),
            timestamp,
        }
    }

    pub fn accuracy(&self) -> f64 {
        SessionScore {
            correct: self.correct,
            incorrect: self.incorrect,
        }
        .accuracy()
    }
}
