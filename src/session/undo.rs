//! Undo strategies shared by the modes.
//!
//! `reverse` takes the last answer back out of the score (completion,
//! flashcard, sorting). `rewind` only moves the history pointer and freezes
//! scoring (quiz). The matching board reverses its last pair.

use tracing::debug;

use crate::session::history::{AnswerHistory, HistoryEntry};
use crate::session::matcher::{MatchedPair, MatchedPairs};
use crate::session::module::ModuleContext;
use crate::session::score::ScoreTracker;

/// Pop the newest answer and take its point back out of both tallies.
pub fn reverse(
    history: &mut AnswerHistory,
    tracker: &mut ScoreTracker,
    ctx: &mut ModuleContext<'_>,
) -> Option<HistoryEntry> {
    let entry = history.pop()?;
    let delta = tracker.reverse_last(entry.is_correct);
    debug!(
        target: "lingodrill::session",
        item = entry.item_index,
        correct = entry.is_correct,
        "reversed answer"
    );
    ctx.publish(delta, tracker.score());
    Some(entry)
}

/// Step the history pointer back and freeze scoring. Live counters stay as
/// they are; the shell is shown the score from before the undone answer.
pub fn rewind(
    history: &mut AnswerHistory,
    score_frozen: &mut bool,
    ctx: &mut ModuleContext<'_>,
) -> Option<HistoryEntry> {
    let entry = history.step_back()?.clone();
    *score_frozen = true;
    debug!(
        target: "lingodrill::session",
        item = entry.item_index,
        pointer = ?history.pointer(),
        "rewound answer"
    );
    ctx.display_score(entry.score_before);
    Some(entry)
}

/// Pop the newest matched pair and take its point back.
pub fn reverse_match(
    pairs: &mut MatchedPairs,
    tracker: &mut ScoreTracker,
    ctx: &mut ModuleContext<'_>,
) -> Option<MatchedPair> {
    let pair = pairs.pop()?;
    let delta = tracker.reverse_last(true);
    ctx.publish(delta, tracker.score());
    Some(pair)
}
