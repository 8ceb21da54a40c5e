use std::collections::HashMap;
use std::time::{Duration, Instant};

use rust_i18n::t;
use tracing::{debug, warn};

use crate::i18n::Language;
use crate::session::item::MatchingItem;
use crate::session::matcher::{MatchedPair, MatchedPairs, Resolution, SelectionMatcher, Side};
use crate::session::module::{
    self, Module, ModuleContext, ModuleData, ModuleInput, ModuleMetadata, ModuleSummary, Phase,
};
use crate::session::score::{ScoreTracker, SessionScore};
use crate::session::timer::{FeedbackTimers, TaskId};
use crate::session::undo;
use crate::session::view::{ModuleView, TileState, TileView, ViewBody, letter_key, number_key};

pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_SUMMARY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug, PartialEq, Eq)]
enum MatchingTask {
    ClearIncorrect { side: Side, id: String },
    ShowSummary,
}

/// Term/definition board. Pairs resolve as soon as one of each side is
/// selected; input is locked once the last pair lands and the summary is
/// shown after a short delay.
pub struct MatchingModule {
    data: ModuleData<MatchingItem>,
    language: Language,
    tracker: ScoreTracker,
    selection: SelectionMatcher,
    matched: MatchedPairs,
    definition_order: Vec<usize>,
    flagged: HashMap<(Side, String), TaskId>,
    feedback_active: bool,
    timers: FeedbackTimers<MatchingTask>,
    feedback_delay: Duration,
    summary_delay: Duration,
    phase: Phase,
    summary: Option<ModuleSummary>,
}

impl MatchingModule {
    pub fn new(data: ModuleData<MatchingItem>, language: Language) -> Self {
        let len = data.len();
        Self {
            definition_order: (0..len).collect(),
            data,
            language,
            tracker: ScoreTracker::new(),
            selection: SelectionMatcher::new(),
            matched: MatchedPairs::with_capacity(len),
            flagged: HashMap::new(),
            feedback_active: false,
            timers: FeedbackTimers::new(),
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            summary_delay: DEFAULT_SUMMARY_DELAY,
            phase: Phase::Active,
            summary: None,
        }
    }

    pub fn with_delays(mut self, feedback: Duration, summary: Duration) -> Self {
        self.feedback_delay = feedback;
        self.summary_delay = summary;
        self
    }

    pub fn matched_pairs(&self) -> &[MatchedPair] {
        self.matched.pairs()
    }

    pub fn selection(&self) -> &SelectionMatcher {
        &self.selection
    }

    pub fn is_feedback_active(&self) -> bool {
        self.feedback_active
    }

    pub fn is_flagged(&self, side: Side, id: &str) -> bool {
        self.flagged.contains_key(&(side, id.to_string()))
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn knows(&self, id: &str) -> bool {
        self.data.items.iter().any(|item| item.id == id)
    }

    pub fn handle_item_click(&mut self, side: Side, id: &str, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.feedback_active {
            return;
        }
        if !self.knows(id) {
            warn!(target: "lingodrill::session", id, "click on unknown matching item");
            return;
        }
        if self.matched.contains(id) {
            return;
        }
        if let Some(resolution) = self.selection.select(side, id) {
            self.resolve(resolution, ctx);
        }
        self.render(ctx);
    }

    fn resolve(&mut self, resolution: Resolution, ctx: &mut ModuleContext<'_>) {
        if resolution.is_match() {
            let pair = MatchedPair {
                term_id: resolution.term_id,
                definition_id: resolution.definition_id,
            };
            if !self.matched.push(pair) {
                warn!(target: "lingodrill::session", "matched pair rejected by the board");
                return;
            }
            let delta = self.tracker.record_correct();
            ctx.publish(delta, self.tracker.score());
        } else {
            let delta = self.tracker.record_incorrect();
            ctx.publish(delta, self.tracker.score());
            self.flag(Side::Term, resolution.term_id);
            self.flag(Side::Definition, resolution.definition_id);
        }

        if self.matched.is_complete() {
            debug!(
                target: "lingodrill::session",
                module = %self.data.metadata.id,
                "all pairs matched"
            );
            self.feedback_active = true;
            self.timers
                .schedule(self.summary_delay, MatchingTask::ShowSummary);
        }
    }

    /// Marks a tile incorrect until its own feedback delay elapses. A tile
    /// flagged again restarts the delay.
    fn flag(&mut self, side: Side, id: String) {
        if let Some(previous) = self.flagged.remove(&(side, id.clone())) {
            self.timers.cancel(previous);
        }
        let task = self.timers.schedule(
            self.feedback_delay,
            MatchingTask::ClearIncorrect {
                side,
                id: id.clone(),
            },
        );
        self.flagged.insert((side, id), task);
    }

    fn finish(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase == Phase::Summary {
            return;
        }
        self.phase = Phase::Summary;
        let summary = module::summarize(
            &self.data.metadata,
            self.tracker.score(),
            self.data.len(),
            self.matched.pairs().to_vec(),
        );
        ctx.callbacks.show_summary(&summary);
        self.summary = Some(summary);
        self.render(ctx);
    }

    fn tile_state(&self, side: Side, id: &str) -> TileState {
        if self.matched.contains(id) {
            TileState::Matched
        } else if self.is_flagged(side, id) {
            TileState::Incorrect
        } else if self.selection.selected(side) == Some(id) {
            TileState::Selected
        } else {
            TileState::Idle
        }
    }
}

impl Module for MatchingModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.data.metadata
    }

    fn init(&mut self, ctx: &mut ModuleContext<'_>) {
        self.timers.cancel_all();
        let items = std::mem::take(&mut self.data.items);
        self.data.items = ctx.shuffle_if_random(items);
        let len = self.data.len();
        self.definition_order = match ctx.random_order(len) {
            Some(order) => order,
            None => {
                let mut order: Vec<usize> = (0..len).collect();
                order.sort_by_cached_key(|&i| {
                    crate::session::answer::normalize(&self.data.items[i].definition)
                });
                order
            }
        };
        self.tracker.reset();
        self.selection.clear();
        self.matched = MatchedPairs::with_capacity(len);
        self.flagged.clear();
        self.feedback_active = false;
        self.phase = Phase::Active;
        self.summary = None;
        ctx.display_score(SessionScore::default());
        self.render(ctx);
    }

    fn render(&mut self, ctx: &mut ModuleContext<'_>) {
        module::present(self, self.data.len(), ctx);
    }

    fn update_text(&mut self, language: Language, ctx: &mut ModuleContext<'_>) {
        self.language = language;
        self.render(ctx);
    }

    fn handle_input(&mut self, input: ModuleInput, ctx: &mut ModuleContext<'_>) {
        if let ModuleInput::Select(side, id) = input {
            self.handle_item_click(side, &id, ctx);
        }
    }

    fn undo(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.feedback_active {
            return;
        }
        if undo::reverse_match(&mut self.matched, &mut self.tracker, ctx).is_some() {
            self.selection.clear();
            self.render(ctx);
        }
    }

    fn next(&mut self, _ctx: &mut ModuleContext<'_>) {}

    fn prev(&mut self, _ctx: &mut ModuleContext<'_>) {}

    fn tick(&mut self, now: Instant, ctx: &mut ModuleContext<'_>) {
        let due = self.timers.take_due(now);
        if due.is_empty() {
            return;
        }
        let mut dirty = false;
        for task in due {
            match task {
                MatchingTask::ClearIncorrect { side, id } => {
                    self.flagged.remove(&(side, id));
                    dirty = true;
                }
                MatchingTask::ShowSummary => self.finish(ctx),
            }
        }
        if dirty && self.phase == Phase::Active {
            self.render(ctx);
        }
    }

    fn session_score(&self) -> SessionScore {
        self.tracker.score()
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn view(&self) -> Option<ModuleView> {
        if let Some(summary) = &self.summary {
            return Some(module::summary_view(summary, self.language));
        }
        if self.data.is_empty() {
            return None;
        }
        let locale = self.language.code();
        let terms = self
            .data
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| TileView {
                key: number_key(i),
                id: item.id.clone(),
                text: item.term.clone(),
                state: self.tile_state(Side::Term, &item.id),
            })
            .collect();
        let definitions = self
            .definition_order
            .iter()
            .enumerate()
            .filter_map(|(slot, &i)| self.data.items.get(i).map(|item| (slot, item)))
            .map(|(slot, item)| TileView {
                key: letter_key(slot),
                id: item.id.clone(),
                text: item.definition.clone(),
                state: self.tile_state(Side::Definition, &item.id),
            })
            .collect();
        Some(ModuleView {
            title: self.data.metadata.name.clone(),
            kind: self.data.metadata.mode,
            progress: Some((self.matched.len(), self.data.len())),
            progress_label: None,
            body: ViewBody::Matching {
                terms_label: t!("matching.terms", locale = locale).to_string(),
                terms,
                definitions_label: t!("matching.definitions", locale = locale).to_string(),
                definitions,
            },
            keys_hint: t!("matching.keys", locale = locale).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::matcher::MatcherState;
    use crate::session::module::ModuleKind;
    use crate::session::score::ScoreDelta;
    use crate::session::testing::Harness;

    fn board(n: usize) -> MatchingModule {
        let items = (0..n)
            .map(|i| MatchingItem {
                id: format!("w{i}"),
                term: format!("term {i}"),
                definition: format!("definition {i}"),
            })
            .collect();
        let metadata = ModuleMetadata {
            id: "pairs".to_string(),
            name: "Pairs".to_string(),
            mode: ModuleKind::Matching,
        };
        MatchingModule::new(ModuleData::new(metadata, items), Language::En)
    }

    fn started(n: usize, h: &mut Harness) -> MatchingModule {
        let mut m = board(n);
        m.init(&mut h.ctx());
        m
    }

    fn later(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    fn pair(m: &mut MatchingModule, term: &str, definition: &str, h: &mut Harness) {
        m.handle_item_click(Side::Term, term, &mut h.ctx());
        m.handle_item_click(Side::Definition, definition, &mut h.ctx());
    }

    #[test]
    fn test_match_appends_and_scores() {
        let mut h = Harness::default();
        let mut m = started(3, &mut h);
        pair(&mut m, "w1", "w1", &mut h);
        assert_eq!(m.matched_pairs().len(), 1);
        assert_eq!(m.session_score(), SessionScore { correct: 1, incorrect: 0 });
        assert_eq!(m.selection().state(), MatcherState::Idle);
        assert_eq!(h.scores.deltas, vec![ScoreDelta::CORRECT]);
    }

    #[test]
    fn test_mismatch_flags_then_clears_after_delay() {
        let mut h = Harness::default();
        let mut m = started(3, &mut h);
        pair(&mut m, "w0", "w2", &mut h);
        assert!(m.matched_pairs().is_empty());
        assert_eq!(m.session_score(), SessionScore { correct: 0, incorrect: 1 });
        assert!(m.is_flagged(Side::Term, "w0"));
        assert!(m.is_flagged(Side::Definition, "w2"));
        assert_eq!(m.selection().state(), MatcherState::Idle);

        m.tick(Instant::now(), &mut h.ctx());
        assert!(m.is_flagged(Side::Term, "w0"));
        m.tick(later(600), &mut h.ctx());
        assert!(!m.is_flagged(Side::Term, "w0"));
        assert!(!m.is_flagged(Side::Definition, "w2"));
    }

    #[test]
    fn test_reflagged_tile_waits_for_its_latest_mismatch() {
        let mut h = Harness::default();
        let mut m = started(3, &mut h);
        m.feedback_delay = Duration::from_millis(100);
        pair(&mut m, "w0", "w1", &mut h);
        m.feedback_delay = Duration::from_secs(10);
        pair(&mut m, "w0", "w2", &mut h);
        assert_eq!(m.pending_timers(), 3);

        m.tick(later(1000), &mut h.ctx());
        assert!(m.is_flagged(Side::Term, "w0"));
        assert!(m.is_flagged(Side::Definition, "w2"));
        assert!(!m.is_flagged(Side::Definition, "w1"));

        m.tick(later(20_000), &mut h.ctx());
        assert!(!m.is_flagged(Side::Term, "w0"));
        assert!(!m.is_flagged(Side::Definition, "w2"));
        assert_eq!(m.pending_timers(), 0);
    }

    #[test]
    fn test_rejected_pair_is_not_scored() {
        let mut h = Harness::default();
        let mut m = started(2, &mut h);
        pair(&mut m, "w0", "w0", &mut h);
        m.resolve(
            Resolution {
                term_id: "w0".to_string(),
                definition_id: "w0".to_string(),
            },
            &mut h.ctx(),
        );
        assert_eq!(m.matched_pairs().len(), 1);
        assert_eq!(m.session_score(), SessionScore { correct: 1, incorrect: 0 });
        assert_eq!(h.scores.deltas, vec![ScoreDelta::CORRECT]);
    }

    #[test]
    fn test_term_reselection_replaces() {
        let mut h = Harness::default();
        let mut m = started(3, &mut h);
        m.handle_item_click(Side::Term, "w0", &mut h.ctx());
        m.handle_item_click(Side::Term, "w1", &mut h.ctx());
        assert_eq!(m.selection().selected(Side::Term), Some("w1"));
        m.handle_item_click(Side::Definition, "w1", &mut h.ctx());
        assert_eq!(m.matched_pairs().len(), 1);
        assert_eq!(m.session_score().incorrect, 0);
    }

    #[test]
    fn test_matched_items_are_disabled() {
        let mut h = Harness::default();
        let mut m = started(2, &mut h);
        pair(&mut m, "w0", "w0", &mut h);
        m.handle_item_click(Side::Term, "w0", &mut h.ctx());
        assert_eq!(m.selection().state(), MatcherState::Idle);
        m.handle_item_click(Side::Definition, "w0", &mut h.ctx());
        assert_eq!(m.selection().state(), MatcherState::Idle);
        assert_eq!(m.session_score(), SessionScore { correct: 1, incorrect: 0 });
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut h = Harness::default();
        let mut m = started(2, &mut h);
        m.handle_item_click(Side::Term, "nope", &mut h.ctx());
        assert_eq!(m.selection().state(), MatcherState::Idle);
    }

    #[test]
    fn test_summary_fires_once_after_all_pairs() {
        let mut h = Harness::default();
        let mut m = started(3, &mut h);
        pair(&mut m, "w2", "w2", &mut h);
        pair(&mut m, "w0", "w1", &mut h);
        pair(&mut m, "w0", "w0", &mut h);
        pair(&mut m, "w1", "w1", &mut h);
        assert!(m.is_feedback_active());
        assert!(h.shell.summaries.is_empty());

        // Locked while the completion delay runs.
        m.undo(&mut h.ctx());
        assert_eq!(m.matched_pairs().len(), 3);

        m.tick(later(2000), &mut h.ctx());
        m.tick(later(4000), &mut h.ctx());
        assert_eq!(h.shell.summaries.len(), 1);
        let summary = &h.shell.summaries[0];
        assert_eq!(summary.matched_pairs.len(), 3);
        assert_eq!(summary.score, SessionScore { correct: 3, incorrect: 1 });
        assert_eq!(m.phase(), Phase::Summary);
    }

    #[test]
    fn test_undo_pops_last_pair() {
        let mut h = Harness::default();
        let mut m = started(3, &mut h);
        pair(&mut m, "w0", "w0", &mut h);
        pair(&mut m, "w1", "w1", &mut h);
        m.undo(&mut h.ctx());
        assert_eq!(m.matched_pairs().len(), 1);
        assert_eq!(m.matched_pairs()[0].term_id, "w0");
        assert_eq!(m.session_score(), SessionScore { correct: 1, incorrect: 0 });
        assert_eq!(
            h.scores.deltas.last(),
            Some(&ScoreDelta { correct: -1, incorrect: 0 })
        );
        m.undo(&mut h.ctx());
        m.undo(&mut h.ctx());
        assert!(m.matched_pairs().is_empty());
        assert_eq!(m.session_score(), SessionScore::default());
    }

    #[test]
    fn test_reinit_cancels_pending_timers() {
        let mut h = Harness::default();
        let mut m = started(1, &mut h);
        pair(&mut m, "w0", "w0", &mut h);
        assert_eq!(m.pending_timers(), 1);
        m.init(&mut h.ctx());
        assert_eq!(m.pending_timers(), 0);
        m.tick(later(5000), &mut h.ctx());
        assert!(h.shell.summaries.is_empty());
        assert!(!m.is_feedback_active());
        assert_eq!(m.session_score(), SessionScore::default());
    }

    #[test]
    fn test_definitions_sorted_unless_random() {
        let mut h = Harness::default();
        let mut m = board(3);
        m.data.items[0].definition = "zebra".to_string();
        m.init(&mut h.ctx());
        match m.view().unwrap().body {
            ViewBody::Matching { definitions, .. } => {
                assert_eq!(definitions[2].id, "w0");
                assert_eq!(definitions[0].key, 'a');
            }
            other => panic!("unexpected body {other:?}"),
        }

        let mut h = Harness::random();
        let m = started(3, &mut h);
        // Items and definitions each shuffled through the shell.
        assert_eq!(h.shell.shuffle_calls, 2);
        match m.view().unwrap().body {
            ViewBody::Matching { terms, .. } => assert_eq!(terms[0].id, "w2"),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_empty_board_returns_to_menu() {
        let mut h = Harness::default();
        let _ = started(0, &mut h);
        assert_eq!(h.shell.menu_renders, 1);
        assert!(h.shell.views.is_empty());
    }
}
