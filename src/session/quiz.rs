use rust_i18n::t;
use tracing::debug;

use crate::i18n::Language;
use crate::session::history::{AnswerHistory, HistoryEntry};
use crate::session::item::QuizItem;
use crate::session::module::{
    self, Advance, ItemCursor, Module, ModuleContext, ModuleData, ModuleInput, ModuleMetadata,
    ModuleSummary, Phase,
};
use crate::session::score::{ScoreTracker, SessionScore};
use crate::session::undo;
use crate::session::view::{ChoiceState, ChoiceView, ModuleView, ViewBody, number_key};

/// Multiple-choice quiz.
///
/// Undo here rewinds the view rather than the score: the history pointer
/// steps back, the item reopens, and scoring stays frozen until the player
/// moves to another item.
pub struct QuizModule {
    data: ModuleData<QuizItem>,
    language: Language,
    tracker: ScoreTracker,
    history: AnswerHistory,
    cursor: ItemCursor,
    chosen: Vec<Option<usize>>,
    score_frozen: bool,
    tip_visible: bool,
    phase: Phase,
    summary: Option<ModuleSummary>,
}

impl QuizModule {
    pub fn new(data: ModuleData<QuizItem>, language: Language) -> Self {
        let len = data.len();
        Self {
            data,
            language,
            tracker: ScoreTracker::new(),
            history: AnswerHistory::new(),
            cursor: ItemCursor::new(len),
            chosen: vec![None; len],
            score_frozen: false,
            tip_visible: false,
            phase: Phase::Active,
            summary: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn history(&self) -> &AnswerHistory {
        &self.history
    }

    pub fn is_score_frozen(&self) -> bool {
        self.score_frozen
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.chosen.get(index).is_some_and(Option::is_some)
    }

    pub fn handle_answer(&mut self, choice: usize, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        let index = self.cursor.index();
        if self.is_answered(index) {
            return;
        }
        let item = &self.data.items[index];
        let Some(selected) = item.options.get(choice) else {
            return;
        };
        let is_correct = item.is_correct_option(choice);
        self.history.record(HistoryEntry {
            item_index: index,
            selected: selected.clone(),
            correct_answer: item.answer.clone(),
            is_correct,
            score_before: self.tracker.score(),
        });
        self.chosen[index] = Some(choice);

        if self.score_frozen {
            debug!(
                target: "lingodrill::session",
                item = index,
                "score frozen after undo, answer not counted"
            );
            ctx.display_score(self.tracker.score());
        } else {
            let delta = self.tracker.record(is_correct);
            ctx.publish(delta, self.tracker.score());
        }
        self.render(ctx);
    }

    fn finish(&mut self, ctx: &mut ModuleContext<'_>) {
        self.phase = Phase::Summary;
        let summary = module::summarize(
            &self.data.metadata,
            self.tracker.score(),
            self.data.len(),
            Vec::new(),
        );
        ctx.callbacks.show_summary(&summary);
        self.summary = Some(summary);
        self.render(ctx);
    }

    fn choices(&self, index: usize) -> Vec<ChoiceView> {
        let item = &self.data.items[index];
        let chosen = self.chosen[index];
        item.options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let state = match chosen {
                    None => ChoiceState::Open,
                    Some(_) if item.is_correct_option(i) => ChoiceState::Correct,
                    Some(c) if c == i => ChoiceState::Incorrect,
                    Some(_) => ChoiceState::Disabled,
                };
                ChoiceView {
                    key: number_key(i),
                    label: option.clone(),
                    state,
                }
            })
            .collect()
    }
}

impl Module for QuizModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.data.metadata
    }

    fn init(&mut self, ctx: &mut ModuleContext<'_>) {
        let items = std::mem::take(&mut self.data.items);
        self.data.items = ctx.shuffle_if_random(items);
        let len = self.data.len();
        self.tracker.reset();
        self.history.clear();
        self.cursor = ItemCursor::new(len);
        self.chosen = vec![None; len];
        self.score_frozen = false;
        self.tip_visible = false;
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
        match input {
            ModuleInput::Choose(choice) => self.handle_answer(choice, ctx),
            ModuleInput::ToggleTip if self.phase == Phase::Active => {
                self.tip_visible = !self.tip_visible;
                self.render(ctx);
            }
            _ => {}
        }
    }

    fn undo(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active {
            return;
        }
        let Some(entry) = undo::rewind(&mut self.history, &mut self.score_frozen, ctx) else {
            return;
        };
        self.cursor.jump(entry.item_index);
        if let Some(slot) = self.chosen.get_mut(entry.item_index) {
            *slot = None;
        }
        self.render(ctx);
    }

    fn next(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        if !self.is_answered(self.cursor.index()) {
            return;
        }
        match self.cursor.advance() {
            Advance::Moved => {
                self.score_frozen = false;
                self.tip_visible = false;
                self.render(ctx);
            }
            Advance::PastEnd => self.finish(ctx),
        }
    }

    fn prev(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.cursor.is_first() {
            return;
        }
        if self.is_answered(self.cursor.index()) {
            self.undo(ctx);
            return;
        }
        self.cursor.retreat();
        self.score_frozen = false;
        self.tip_visible = false;
        self.render(ctx);
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
        let index = self.cursor.index();
        let item = self.data.items.get(index)?;
        let feedback = self.chosen[index].map(|choice| {
            module::answer_feedback(
                item.is_correct_option(choice),
                &item.answer,
                item.explanation.as_ref(),
                self.language,
            )
        });
        Some(ModuleView {
            title: self.data.metadata.name.clone(),
            kind: self.data.metadata.mode,
            progress: Some((index + 1, self.data.len())),
            progress_label: Some(module::progress_label(index, self.data.len(), self.language)),
            body: ViewBody::Quiz {
                question: item.question.clone(),
                choices: self.choices(index),
                feedback,
                tip: module::tip_line(item.tip.as_ref(), self.tip_visible, self.language),
            },
            keys_hint: t!("quiz.keys", locale = self.language.code()).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::module::ModuleKind;
    use crate::session::score::ScoreDelta;
    use crate::session::testing::Harness;

    fn item(question: &str, answer: &str) -> QuizItem {
        QuizItem {
            question: question.to_string(),
            options: vec![answer.to_string(), "wrong".to_string()],
            answer: answer.to_string(),
            explanation: Some(format!("{question} means {answer}")),
            tip: Some("think".to_string()),
        }
    }

    fn quiz(n: usize) -> QuizModule {
        let items = (0..n).map(|i| item(&format!("q{i}"), &format!("A{i}"))).collect();
        let metadata = ModuleMetadata {
            id: "quiz-test".to_string(),
            name: "Quiz test".to_string(),
            mode: ModuleKind::Quiz,
        };
        QuizModule::new(ModuleData::new(metadata, items), Language::En)
    }

    fn started(n: usize, h: &mut Harness) -> QuizModule {
        let mut q = quiz(n);
        q.init(&mut h.ctx());
        q
    }

    #[test]
    fn test_init_resets_and_renders() {
        let mut h = Harness::default();
        let q = started(3, &mut h);
        assert_eq!(q.current_index(), 0);
        assert_eq!(q.session_score(), SessionScore::default());
        assert_eq!(h.last_display(), Some((0, 0, 0)));
        assert_eq!(h.shell.views.len(), 1);
        assert_eq!(h.shell.shuffle_calls, 0);
    }

    #[test]
    fn test_random_mode_shuffles_items() {
        let mut h = Harness::random();
        let q = started(3, &mut h);
        assert_eq!(h.shell.shuffle_calls, 1);
        match &q.view().unwrap().body {
            ViewBody::Quiz { question, .. } => assert_eq!(question, "q2"),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_correct_answer_scores_and_propagates() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.handle_answer(0, &mut h.ctx());
        assert_eq!(q.session_score(), SessionScore { correct: 1, incorrect: 0 });
        assert_eq!(h.scores.deltas, vec![ScoreDelta::CORRECT]);
        assert_eq!(h.last_display(), Some((1, 0, 1)));
        assert_eq!(h.shell.header_renders, 1);
    }

    #[test]
    fn test_answered_item_ignores_second_answer() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.handle_answer(1, &mut h.ctx());
        q.handle_answer(0, &mut h.ctx());
        assert_eq!(q.session_score(), SessionScore { correct: 0, incorrect: 1 });
        assert_eq!(q.history().len(), 1);
    }

    #[test]
    fn test_out_of_range_choice_is_ignored() {
        let mut h = Harness::default();
        let mut q = started(1, &mut h);
        q.handle_answer(7, &mut h.ctx());
        assert!(!q.is_answered(0));
        assert!(q.history().is_empty());
    }

    #[test]
    fn test_undo_freezes_instead_of_reversing() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.handle_answer(0, &mut h.ctx());
        q.undo(&mut h.ctx());
        assert!(q.is_score_frozen());
        assert!(!q.is_answered(0));
        // Live tally keeps the point; the shell is shown the pre-answer score.
        assert_eq!(q.session_score().correct, 1);
        assert_eq!(h.last_display(), Some((0, 0, 0)));
        assert_eq!(h.scores.deltas, vec![ScoreDelta::CORRECT]);

        // Re-answering while frozen does not count twice.
        q.handle_answer(0, &mut h.ctx());
        assert_eq!(q.session_score().correct, 1);
        assert_eq!(h.scores.deltas.len(), 1);
        assert_eq!(q.history().len(), 1);
        assert_eq!(q.history().pointer(), Some(0));
    }

    #[test]
    fn test_moving_on_unfreezes_scoring() {
        let mut h = Harness::default();
        let mut q = started(3, &mut h);
        q.handle_answer(0, &mut h.ctx());
        q.undo(&mut h.ctx());
        q.handle_answer(1, &mut h.ctx());
        q.next(&mut h.ctx());
        assert!(!q.is_score_frozen());
        q.handle_answer(0, &mut h.ctx());
        assert_eq!(q.session_score(), SessionScore { correct: 2, incorrect: 0 });
    }

    #[test]
    fn test_history_branch_overwrite() {
        let mut h = Harness::default();
        let mut q = started(3, &mut h);
        q.handle_answer(0, &mut h.ctx()); // x on q0
        q.next(&mut h.ctx());
        q.handle_answer(0, &mut h.ctx()); // y on q1
        q.undo(&mut h.ctx());
        assert_eq!(q.history().pointer(), Some(0));
        assert_eq!(q.current_index(), 1);
        q.handle_answer(1, &mut h.ctx()); // z overwrites y
        let selected: Vec<&str> = q
            .history()
            .entries()
            .iter()
            .map(|e| e.selected.as_str())
            .collect();
        assert_eq!(selected, vec!["A0", "wrong"]);
        assert_eq!(q.history().pointer(), Some(1));
    }

    #[test]
    fn test_undo_with_empty_history_is_noop() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        let views = h.shell.views.len();
        q.undo(&mut h.ctx());
        assert!(!q.is_score_frozen());
        assert_eq!(h.shell.views.len(), views);
    }

    #[test]
    fn test_next_blocked_until_answered() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.next(&mut h.ctx());
        assert_eq!(q.current_index(), 0);
        q.handle_answer(0, &mut h.ctx());
        q.next(&mut h.ctx());
        assert_eq!(q.current_index(), 1);
    }

    #[test]
    fn test_prev_at_first_item_is_noop() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.handle_answer(0, &mut h.ctx());
        q.prev(&mut h.ctx());
        assert_eq!(q.current_index(), 0);
        assert!(q.is_answered(0));
        assert!(!q.is_score_frozen());
    }

    #[test]
    fn test_prev_on_answered_item_undoes() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.handle_answer(0, &mut h.ctx());
        q.next(&mut h.ctx());
        q.handle_answer(1, &mut h.ctx());
        q.prev(&mut h.ctx());
        assert_eq!(q.current_index(), 1);
        assert!(!q.is_answered(1));
        assert!(q.is_score_frozen());
        // Now unanswered: a plain move back.
        q.prev(&mut h.ctx());
        assert_eq!(q.current_index(), 0);
        assert!(!q.is_score_frozen());
    }

    #[test]
    fn test_three_item_run_reaches_summary() {
        let mut h = Harness::default();
        let mut q = started(3, &mut h);
        q.handle_answer(1, &mut h.ctx());
        q.next(&mut h.ctx());
        q.handle_answer(0, &mut h.ctx());
        q.next(&mut h.ctx());
        q.next(&mut h.ctx());
        assert_eq!(q.current_index(), 2);
        assert_eq!(q.phase(), Phase::Active);
        q.handle_answer(0, &mut h.ctx());
        q.next(&mut h.ctx());
        assert_eq!(q.phase(), Phase::Summary);
        assert_eq!(h.shell.summaries.len(), 1);
        assert_eq!(
            h.shell.summaries[0].score,
            SessionScore { correct: 2, incorrect: 1 }
        );
        // Summary ignores further interaction.
        q.next(&mut h.ctx());
        q.undo(&mut h.ctx());
        assert_eq!(h.shell.summaries.len(), 1);
        assert_eq!(q.session_score(), SessionScore { correct: 2, incorrect: 1 });
    }

    #[test]
    fn test_summary_survives_language_change() {
        let mut h = Harness::default();
        let mut q = started(1, &mut h);
        q.handle_answer(0, &mut h.ctx());
        q.next(&mut h.ctx());
        q.update_text(Language::Es, &mut h.ctx());
        match &h.shell.last_view().unwrap().body {
            ViewBody::Summary { score, .. } => {
                assert_eq!(*score, SessionScore { correct: 1, incorrect: 0 })
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut h = Harness::default();
        let mut q = started(2, &mut h);
        q.handle_answer(1, &mut h.ctx());
        q.render(&mut h.ctx());
        q.render(&mut h.ctx());
        let n = h.shell.views.len();
        assert_eq!(h.shell.views[n - 1], h.shell.views[n - 2]);
    }

    #[test]
    fn test_update_text_keeps_state() {
        let mut h = Harness::default();
        let mut q = started(3, &mut h);
        q.handle_answer(0, &mut h.ctx());
        q.next(&mut h.ctx());
        let before = q.view().unwrap().keys_hint;
        q.update_text(Language::Es, &mut h.ctx());
        assert_eq!(q.current_index(), 1);
        assert_eq!(q.session_score().correct, 1);
        assert_eq!(q.history().len(), 1);
        assert_ne!(q.view().unwrap().keys_hint, before);
    }

    #[test]
    fn test_empty_module_returns_to_menu() {
        let mut h = Harness::default();
        let q = started(0, &mut h);
        assert_eq!(h.shell.menu_renders, 1);
        assert!(h.shell.views.is_empty());
        assert!(q.view().is_none());
    }

    #[test]
    fn test_answered_view_reveals_correct_option() {
        let mut h = Harness::default();
        let mut q = started(1, &mut h);
        q.handle_answer(1, &mut h.ctx());
        match q.view().unwrap().body {
            ViewBody::Quiz {
                choices, feedback, ..
            } => {
                assert_eq!(choices[0].state, ChoiceState::Correct);
                assert_eq!(choices[1].state, ChoiceState::Incorrect);
                assert!(feedback.is_some_and(|f| !f.correct));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
