use rust_i18n::t;

use crate::i18n::Language;
use crate::session::answer;
use crate::session::history::{AnswerHistory, HistoryEntry};
use crate::session::item::CompletionItem;
use crate::session::module::{
    self, Advance, ItemCursor, Module, ModuleContext, ModuleData, ModuleInput, ModuleMetadata,
    ModuleSummary, Phase,
};
use crate::session::score::{ScoreTracker, SessionScore};
use crate::session::undo;
use crate::session::view::{ModuleView, ViewBody};

/// Fill-in-the-blank. Undo takes the last answer's point back out of both
/// the session and the global tally.
pub struct CompletionModule {
    data: ModuleData<CompletionItem>,
    language: Language,
    tracker: ScoreTracker,
    history: AnswerHistory,
    cursor: ItemCursor,
    submitted: Vec<Option<String>>,
    draft: String,
    tip_visible: bool,
    phase: Phase,
    summary: Option<ModuleSummary>,
}

impl CompletionModule {
    pub fn new(data: ModuleData<CompletionItem>, language: Language) -> Self {
        let len = data.len();
        Self {
            data,
            language,
            tracker: ScoreTracker::new(),
            history: AnswerHistory::new(),
            cursor: ItemCursor::new(len),
            submitted: vec![None; len],
            draft: String::new(),
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

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.submitted.get(index).is_some_and(Option::is_some)
    }

    /// Check `input` against the current gap. Blank input is ignored.
    pub fn handle_answer(&mut self, input: &str, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() || answer::is_blank(input) {
            return;
        }
        let index = self.cursor.index();
        if self.is_answered(index) {
            return;
        }
        let item = &self.data.items[index];
        let given = input.trim().to_string();
        let is_correct = item.accepts(&given);
        self.history.record(HistoryEntry {
            item_index: index,
            selected: given.clone(),
            correct_answer: item.answer.clone(),
            is_correct,
            score_before: self.tracker.score(),
        });
        self.submitted[index] = Some(given);
        self.draft.clear();
        let delta = self.tracker.record(is_correct);
        ctx.publish(delta, self.tracker.score());
        self.render(ctx);
    }

    fn edit_draft(&mut self, edit: impl FnOnce(&mut String), ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.is_answered(self.cursor.index()) {
            return;
        }
        edit(&mut self.draft);
        self.render(ctx);
    }

    fn leave_item(&mut self) {
        self.draft.clear();
        self.tip_visible = false;
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
}

impl Module for CompletionModule {
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
        self.submitted = vec![None; len];
        self.leave_item();
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
            ModuleInput::Char(ch) if !ch.is_control() => {
                self.edit_draft(|draft| draft.push(ch), ctx)
            }
            ModuleInput::Backspace => self.edit_draft(
                |draft| {
                    draft.pop();
                },
                ctx,
            ),
            ModuleInput::Submit => {
                let draft = self.draft.clone();
                self.handle_answer(&draft, ctx);
            }
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
        let Some(entry) = undo::reverse(&mut self.history, &mut self.tracker, ctx) else {
            return;
        };
        self.cursor.jump(entry.item_index);
        if let Some(slot) = self.submitted.get_mut(entry.item_index) {
            *slot = None;
        }
        self.leave_item();
        self.render(ctx);
    }

    fn next(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        match self.cursor.advance() {
            Advance::Moved => {
                self.leave_item();
                self.render(ctx);
            }
            Advance::PastEnd => self.finish(ctx),
        }
    }

    fn prev(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active {
            return;
        }
        if self.cursor.retreat() {
            self.leave_item();
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
        let index = self.cursor.index();
        let item = self.data.items.get(index)?;
        let locale = self.language.code();
        let (draft, feedback) = match &self.submitted[index] {
            Some(given) => (
                given.clone(),
                Some(module::answer_feedback(
                    item.accepts(given),
                    &item.answer,
                    item.explanation.as_ref(),
                    self.language,
                )),
            ),
            None => (self.draft.clone(), None),
        };
        Some(ModuleView {
            title: self.data.metadata.name.clone(),
            kind: self.data.metadata.mode,
            progress: Some((index + 1, self.data.len())),
            progress_label: Some(module::progress_label(index, self.data.len(), self.language)),
            body: ViewBody::Completion {
                sentence: item.sentence.clone(),
                draft,
                placeholder: t!("completion.placeholder", locale = locale).to_string(),
                feedback,
                tip: module::tip_line(item.tip.as_ref(), self.tip_visible, self.language),
            },
            keys_hint: t!("completion.keys", locale = locale).to_string(),
        })
    }
}
