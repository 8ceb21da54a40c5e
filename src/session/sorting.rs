use rust_i18n::t;

use crate::i18n::Language;
use crate::session::history::{AnswerHistory, HistoryEntry};
use crate::session::item::SortingItem;
use crate::session::module::{
    self, Advance, ItemCursor, Module, ModuleContext, ModuleData, ModuleInput, ModuleMetadata,
    ModuleSummary, Phase,
};
use crate::session::score::{ScoreTracker, SessionScore};
use crate::session::undo;
use crate::session::view::{ChoiceState, ChoiceView, ModuleView, ViewBody, number_key};

/// Word bank for one item: tokens in display order plus the bank slots
/// placed so far, in placement order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Arrangement {
    bank: Vec<usize>,
    placed: Vec<usize>,
}

impl Arrangement {
    fn for_item(item: &SortingItem) -> Self {
        Self {
            bank: item.bank_order(),
            placed: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.placed.len() == self.bank.len()
    }

    fn tokens<'a>(&self, item: &'a SortingItem) -> Vec<&'a str> {
        self.placed
            .iter()
            .map(|&slot| item.answer[self.bank[slot]].as_str())
            .collect()
    }
}

/// Sentence builder: place every word from the bank, then check the order.
pub struct SortingModule {
    data: ModuleData<SortingItem>,
    language: Language,
    tracker: ScoreTracker,
    history: AnswerHistory,
    cursor: ItemCursor,
    arrangements: Vec<Arrangement>,
    checked: Vec<Option<bool>>,
    tip_visible: bool,
    phase: Phase,
    summary: Option<ModuleSummary>,
}

impl SortingModule {
    pub fn new(data: ModuleData<SortingItem>, language: Language) -> Self {
        let arrangements = data.items.iter().map(Arrangement::for_item).collect();
        let len = data.len();
        Self {
            data,
            language,
            tracker: ScoreTracker::new(),
            history: AnswerHistory::new(),
            cursor: ItemCursor::new(len),
            arrangements,
            checked: vec![None; len],
            tip_visible: false,
            phase: Phase::Active,
            summary: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).is_some_and(Option::is_some)
    }

    /// Tokens placed on the current item, in order.
    pub fn placed(&self) -> Vec<String> {
        let index = self.cursor.index();
        match (self.data.items.get(index), self.arrangements.get(index)) {
            (Some(item), Some(arrangement)) => arrangement
                .tokens(item)
                .into_iter()
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn editable(&self) -> bool {
        self.phase == Phase::Active
            && !self.data.is_empty()
            && !self.is_checked(self.cursor.index())
    }

    /// Move bank slot `slot` onto the answer line.
    pub fn pick(&mut self, slot: usize, ctx: &mut ModuleContext<'_>) {
        if !self.editable() {
            return;
        }
        let arrangement = &mut self.arrangements[self.cursor.index()];
        if slot >= arrangement.bank.len() || arrangement.placed.contains(&slot) {
            return;
        }
        arrangement.placed.push(slot);
        self.render(ctx);
    }

    /// Return the most recently placed word to the bank.
    pub fn unpick(&mut self, ctx: &mut ModuleContext<'_>) {
        if !self.editable() {
            return;
        }
        if self.arrangements[self.cursor.index()].placed.pop().is_some() {
            self.render(ctx);
        }
    }

    /// Check the arrangement; only possible once every word is placed.
    pub fn handle_answer(&mut self, ctx: &mut ModuleContext<'_>) {
        if !self.editable() {
            return;
        }
        let index = self.cursor.index();
        let item = &self.data.items[index];
        let arrangement = &self.arrangements[index];
        if !arrangement.is_full() {
            return;
        }
        let tokens = arrangement.tokens(item);
        let is_correct = item.accepts(&tokens);
        self.history.record(HistoryEntry {
            item_index: index,
            selected: tokens.join(" "),
            correct_answer: item.answer.join(" "),
            is_correct,
            score_before: self.tracker.score(),
        });
        self.checked[index] = Some(is_correct);
        let delta = self.tracker.record(is_correct);
        ctx.publish(delta, self.tracker.score());
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
}

impl Module for SortingModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.data.metadata
    }

    fn init(&mut self, ctx: &mut ModuleContext<'_>) {
        let items = std::mem::take(&mut self.data.items);
        self.data.items = ctx.shuffle_if_random(items);
        let len = self.data.len();
        self.arrangements = self.data.items.iter().map(Arrangement::for_item).collect();
        self.tracker.reset();
        self.history.clear();
        self.cursor = ItemCursor::new(len);
        self.checked = vec![None; len];
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
            ModuleInput::Pick(slot) => self.pick(slot, ctx),
            ModuleInput::Unpick => self.unpick(ctx),
            ModuleInput::Submit => self.handle_answer(ctx),
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
        if let Some(slot) = self.checked.get_mut(entry.item_index) {
            *slot = None;
        }
        if let Some(arrangement) = self.arrangements.get_mut(entry.item_index) {
            arrangement.placed.clear();
        }
        self.render(ctx);
    }

    fn next(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        match self.cursor.advance() {
            Advance::Moved => {
                self.tip_visible = false;
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
            self.tip_visible = false;
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
        let arrangement = self.arrangements.get(index)?;
        let locale = self.language.code();
        let bank = arrangement
            .bank
            .iter()
            .enumerate()
            .map(|(slot, &token)| ChoiceView {
                key: number_key(slot),
                label: item.answer[token].clone(),
                state: if arrangement.placed.contains(&slot) {
                    ChoiceState::Chosen
                } else {
                    ChoiceState::Open
                },
            })
            .collect();
        let feedback = self.checked[index].map(|correct| {
            module::answer_feedback(
                correct,
                &item.answer.join(" "),
                item.explanation.as_ref(),
                self.language,
            )
        });
        Some(ModuleView {
            title: self.data.metadata.name.clone(),
            kind: self.data.metadata.mode,
            progress: Some((index + 1, self.data.len())),
            progress_label: Some(module::progress_label(index, self.data.len(), self.language)),
            body: ViewBody::Sorting {
                prompt: item.prompt.clone(),
                bank_label: t!("sorting.bank", locale = locale).to_string(),
                bank,
                answer_label: t!("sorting.answer", locale = locale).to_string(),
                placed: arrangement
                    .tokens(item)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                feedback,
                tip: module::tip_line(item.tip.as_ref(), self.tip_visible, self.language),
            },
            keys_hint: t!("sorting.keys", locale = locale).to_string(),
        })
    }
}
