use rust_i18n::t;

use crate::i18n::Language;
use crate::session::history::{AnswerHistory, HistoryEntry};
use crate::session::item::FlashcardItem;
use crate::session::module::{
    self, Advance, ItemCursor, Module, ModuleContext, ModuleData, ModuleInput, ModuleMetadata,
    ModuleSummary, Phase,
};
use crate::session::score::{ScoreTracker, SessionScore};
use crate::session::undo;
use crate::session::view::{ModuleView, ViewBody};

const KNOWN: &str = "known";
const REVIEW: &str = "review";

pub struct FlashcardModule {
    data: ModuleData<FlashcardItem>,
    language: Language,
    tracker: ScoreTracker,
    history: AnswerHistory,
    cursor: ItemCursor,
    flipped: bool,
    marks: Vec<Option<bool>>,
    phase: Phase,
    summary: Option<ModuleSummary>,
}

impl FlashcardModule {
    pub fn new(data: ModuleData<FlashcardItem>, language: Language) -> Self {
        let len = data.len();
        Self {
            data,
            language,
            tracker: ScoreTracker::new(),
            history: AnswerHistory::new(),
            cursor: ItemCursor::new(len),
            flipped: false,
            marks: vec![None; len],
            phase: Phase::Active,
            summary: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn mark(&self, index: usize) -> Option<bool> {
        self.marks.get(index).copied().flatten()
    }

    pub fn flip(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        self.flipped = !self.flipped;
        self.render(ctx);
    }

    /// Self-assessment for the current card; each card counts once.
    pub fn handle_answer(&mut self, known: bool, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        let index = self.cursor.index();
        if self.mark(index).is_some() {
            return;
        }
        self.history.record(HistoryEntry {
            item_index: index,
            selected: if known { KNOWN } else { REVIEW }.to_string(),
            correct_answer: self.data.items[index].back.clone(),
            is_correct: known,
            score_before: self.tracker.score(),
        });
        self.marks[index] = Some(known);
        self.flipped = true;
        let delta = self.tracker.record(known);
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

impl Module for FlashcardModule {
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
        self.flipped = false;
        self.marks = vec![None; len];
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
            ModuleInput::Flip => self.flip(ctx),
            ModuleInput::Recall(known) => self.handle_answer(known, ctx),
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
        if let Some(slot) = self.marks.get_mut(entry.item_index) {
            *slot = None;
        }
        self.flipped = false;
        self.render(ctx);
    }

    fn next(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.phase != Phase::Active || self.data.is_empty() {
            return;
        }
        match self.cursor.advance() {
            Advance::Moved => {
                self.flipped = false;
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
            self.flipped = false;
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
        let card = self.data.items.get(index)?;
        let locale = self.language.code();
        let (side_label, face) = if self.flipped {
            (t!("flashcard.back", locale = locale), card.back.clone())
        } else {
            (t!("flashcard.front", locale = locale), card.front.clone())
        };
        let status = self.mark(index).map(|known| {
            if known {
                t!("flashcard.known", locale = locale).to_string()
            } else {
                t!("flashcard.review", locale = locale).to_string()
            }
        });
        let tip = if self.flipped {
            card.explanation.clone()
        } else {
            module::tip_line(card.tip.as_ref(), true, self.language)
        };
        Some(ModuleView {
            title: self.data.metadata.name.clone(),
            kind: self.data.metadata.mode,
            progress: Some((index + 1, self.data.len())),
            progress_label: Some(module::progress_label(index, self.data.len(), self.language)),
            body: ViewBody::Flashcard {
                side_label: side_label.to_string(),
                face,
                flipped: self.flipped,
                status,
                tip,
            },
            keys_hint: t!("flashcard.keys", locale = locale).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::module::ModuleKind;
    use crate::session::score::ScoreDelta;
    use crate::session::testing::Harness;

    fn deck(n: usize) -> FlashcardModule {
        let items = (0..n)
            .map(|i| FlashcardItem {
                front: format!("front {i}"),
                back: format!("back {i}"),
                explanation: None,
                tip: None,
            })
            .collect();
        let metadata = ModuleMetadata {
            id: "cards".to_string(),
            name: "Cards".to_string(),
            mode: ModuleKind::Flashcard,
        };
        FlashcardModule::new(ModuleData::new(metadata, items), Language::En)
    }

    fn face(m: &FlashcardModule) -> String {
        match m.view().unwrap().body {
            ViewBody::Flashcard { face, .. } => face,
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_flip_toggles_face() {
        let mut h = Harness::default();
        let mut m = deck(2);
        m.init(&mut h.ctx());
        assert_eq!(face(&m), "front 0");
        m.flip(&mut h.ctx());
        assert_eq!(face(&m), "back 0");
        m.flip(&mut h.ctx());
        assert_eq!(face(&m), "front 0");
    }

    #[test]
    fn test_card_scores_once() {
        let mut h = Harness::default();
        let mut m = deck(2);
        m.init(&mut h.ctx());
        m.handle_answer(true, &mut h.ctx());
        m.handle_answer(false, &mut h.ctx());
        assert_eq!(m.session_score(), SessionScore { correct: 1, incorrect: 0 });
        assert_eq!(m.mark(0), Some(true));
        assert!(m.is_flipped());
    }

    #[test]
    fn test_undo_reverses_mark() {
        let mut h = Harness::default();
        let mut m = deck(2);
        m.init(&mut h.ctx());
        m.handle_answer(false, &mut h.ctx());
        m.next(&mut h.ctx());
        m.undo(&mut h.ctx());
        assert_eq!(m.current_index(), 0);
        assert_eq!(m.mark(0), None);
        assert_eq!(m.session_score(), SessionScore::default());
        assert_eq!(
            h.scores.deltas,
            vec![ScoreDelta::INCORRECT, ScoreDelta { correct: 0, incorrect: -1 }]
        );
    }

    #[test]
    fn test_navigation_resets_flip_and_completes() {
        let mut h = Harness::default();
        let mut m = deck(2);
        m.init(&mut h.ctx());
        m.flip(&mut h.ctx());
        m.next(&mut h.ctx());
        assert!(!m.is_flipped());
        assert_eq!(m.current_index(), 1);
        m.prev(&mut h.ctx());
        m.prev(&mut h.ctx());
        assert_eq!(m.current_index(), 0);
        m.next(&mut h.ctx());
        m.next(&mut h.ctx());
        assert_eq!(m.phase(), Phase::Summary);
        assert_eq!(h.shell.summaries.len(), 1);
    }
}
