use std::time::Instant;

use rust_i18n::t;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::i18n::Language;
use crate::session::matcher::{MatchedPair, Side};
use crate::session::score::{ScoreDelta, SessionScore};
use crate::session::view::{Feedback, ModuleView, ViewBody};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Flashcard,
    Quiz,
    Completion,
    Sorting,
    Matching,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Flashcard,
        ModuleKind::Quiz,
        ModuleKind::Completion,
        ModuleKind::Sorting,
        ModuleKind::Matching,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Flashcard => "flashcard",
            ModuleKind::Quiz => "quiz",
            ModuleKind::Completion => "completion",
            ModuleKind::Sorting => "sorting",
            ModuleKind::Matching => "matching",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name.trim().to_ascii_lowercase())
    }

    pub fn display_name(self, language: Language) -> String {
        let locale = language.code();
        match self {
            ModuleKind::Flashcard => t!("mode.flashcard", locale = locale),
            ModuleKind::Quiz => t!("mode.quiz", locale = locale),
            ModuleKind::Completion => t!("mode.completion", locale = locale),
            ModuleKind::Sorting => t!("mode.sorting", locale = locale),
            ModuleKind::Matching => t!("mode.matching", locale = locale),
        }
        .to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub id: String,
    pub name: String,
    pub mode: ModuleKind,
}

/// A module's dataset. Owned by the running module and replaced wholesale
/// whenever the shell starts a different one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleData<T> {
    pub metadata: ModuleMetadata,
    pub items: Vec<T>,
}

impl<T> ModuleData<T> {
    pub fn new(metadata: ModuleMetadata, items: Vec<T>) -> Self {
        Self { metadata, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Capabilities the surrounding shell lends to a running module.
pub trait GameCallbacks {
    fn random_mode(&self) -> bool;
    /// A permutation of `0..len`.
    fn shuffle_order(&mut self, len: usize) -> Vec<usize>;
    fn update_session_score_display(&mut self, correct: u32, incorrect: u32, total: u32);
    fn render_menu(&mut self);
    fn show_summary(&mut self, summary: &ModuleSummary);
    fn render_header(&mut self);
    fn present(&mut self, view: ModuleView);
}

/// Persisted cross-session tally. Implementors keep their own counters from
/// going below zero; modules only ever send paired deltas.
pub trait GlobalScoreBridge {
    fn update_global_score(&mut self, delta: ScoreDelta);
}

pub struct ModuleContext<'a> {
    pub callbacks: &'a mut dyn GameCallbacks,
    pub scores: &'a mut dyn GlobalScoreBridge,
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        callbacks: &'a mut dyn GameCallbacks,
        scores: &'a mut dyn GlobalScoreBridge,
    ) -> Self {
        Self { callbacks, scores }
    }

    pub fn display_score(&mut self, score: SessionScore) {
        self.callbacks
            .update_session_score_display(score.correct, score.incorrect, score.total());
    }

    /// Forward a scoring delta to the global tally, then refresh both displays.
    pub fn publish(&mut self, delta: ScoreDelta, score: SessionScore) {
        if !delta.is_zero() {
            self.scores.update_global_score(delta);
            self.callbacks.render_header();
        }
        self.display_score(score);
    }

    /// Permutation from the shell when random mode is on, validated.
    pub fn random_order(&mut self, len: usize) -> Option<Vec<usize>> {
        if !self.callbacks.random_mode() {
            return None;
        }
        let order = self.callbacks.shuffle_order(len);
        if is_permutation(&order, len) {
            Some(order)
        } else {
            warn!(
                target: "lingodrill::session",
                len,
                "shuffle returned an invalid permutation, keeping original order"
            );
            None
        }
    }

    pub fn shuffle_if_random<T>(&mut self, items: Vec<T>) -> Vec<T> {
        match self.random_order(items.len()) {
            Some(order) => permute(items, &order),
            None => items,
        }
    }

    pub fn back_to_menu(&mut self) {
        self.callbacks.render_menu();
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in order {
        match seen.get_mut(i) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

fn permute<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

/// Interaction routed from the shell to whichever module is active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleInput {
    Choose(usize),
    Char(char),
    Backspace,
    Submit,
    Flip,
    Recall(bool),
    Pick(usize),
    Unpick,
    Select(Side, String),
    ToggleTip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Active,
    Summary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSummary {
    pub metadata: ModuleMetadata,
    pub score: SessionScore,
    pub item_count: usize,
    pub matched_pairs: Vec<MatchedPair>,
}

/// Lifecycle every game mode implements.
///
/// `init` resets all run state and renders. `render` projects the current
/// state through the shell and is idempotent. `update_text` swaps the display
/// language and re-renders without touching run state.
pub trait Module {
    fn metadata(&self) -> &ModuleMetadata;

    fn kind(&self) -> ModuleKind {
        self.metadata().mode
    }

    fn init(&mut self, ctx: &mut ModuleContext<'_>);
    fn render(&mut self, ctx: &mut ModuleContext<'_>);
    fn update_text(&mut self, language: Language, ctx: &mut ModuleContext<'_>);
    fn handle_input(&mut self, input: ModuleInput, ctx: &mut ModuleContext<'_>);
    fn undo(&mut self, ctx: &mut ModuleContext<'_>);
    fn next(&mut self, ctx: &mut ModuleContext<'_>);
    fn prev(&mut self, ctx: &mut ModuleContext<'_>);

    fn tick(&mut self, now: Instant, ctx: &mut ModuleContext<'_>) {
        let _ = (now, ctx);
    }

    fn session_score(&self) -> SessionScore;
    fn phase(&self) -> Phase;
    /// Current projection, `None` when there is nothing to show.
    fn view(&self) -> Option<ModuleView>;
}

/// The render guard shared by every mode: a module without items logs an
/// error and hands control back to the menu.
pub fn ensure_items(metadata: &ModuleMetadata, len: usize, ctx: &mut ModuleContext<'_>) -> bool {
    if len > 0 {
        return true;
    }
    error!(
        target: "lingodrill::session",
        module = %metadata.id,
        mode = metadata.mode.as_str(),
        "module data has no items, returning to menu"
    );
    ctx.back_to_menu();
    false
}

/// Shared render step: guard, then present either the summary or the live view.
pub fn present<M: Module + ?Sized>(module: &M, len: usize, ctx: &mut ModuleContext<'_>) {
    if !ensure_items(module.metadata(), len, ctx) {
        return;
    }
    if let Some(view) = module.view() {
        ctx.callbacks.present(view);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Moved,
    PastEnd,
}

/// Position into the item list, clamped to `[0, len - 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemCursor {
    index: usize,
    len: usize,
}

impl ItemCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Step forward; stepping off the last item reports `PastEnd` instead.
    pub fn advance(&mut self) -> Advance {
        if self.is_last() {
            Advance::PastEnd
        } else {
            self.index += 1;
            Advance::Moved
        }
    }

    pub fn retreat(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn jump(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }
}

pub fn summarize(
    metadata: &ModuleMetadata,
    score: SessionScore,
    item_count: usize,
    matched_pairs: Vec<MatchedPair>,
) -> ModuleSummary {
    ModuleSummary {
        metadata: metadata.clone(),
        score,
        item_count,
        matched_pairs,
    }
}

pub fn summary_view(summary: &ModuleSummary, language: Language) -> ModuleView {
    let locale = language.code();
    let score = summary.score;
    let mut lines = vec![
        summary.metadata.name.clone(),
        t!("summary.correct", locale = locale, count = score.correct).to_string(),
        t!("summary.incorrect", locale = locale, count = score.incorrect).to_string(),
        t!(
            "summary.accuracy",
            locale = locale,
            percent = format!("{:.0}", score.accuracy())
        )
        .to_string(),
    ];
    if summary.metadata.mode == ModuleKind::Matching {
        lines.push(
            t!(
                "summary.pairs",
                locale = locale,
                count = summary.matched_pairs.len(),
                total = summary.item_count
            )
            .to_string(),
        );
    }
    ModuleView {
        title: summary.metadata.name.clone(),
        kind: summary.metadata.mode,
        progress: None,
        progress_label: None,
        body: ViewBody::Summary {
            heading: t!("summary.title", locale = locale).to_string(),
            score,
            lines,
        },
        keys_hint: t!("summary.keys", locale = locale).to_string(),
    }
}

pub fn progress_label(index: usize, len: usize, language: Language) -> String {
    t!(
        "progress",
        locale = language.code(),
        current = index + 1,
        total = len
    )
    .to_string()
}

pub fn answer_feedback(
    correct: bool,
    answer: &str,
    explanation: Option<&String>,
    language: Language,
) -> Feedback {
    let locale = language.code();
    let message = if correct {
        t!("feedback.correct", locale = locale).to_string()
    } else {
        t!("feedback.incorrect", locale = locale, answer = answer).to_string()
    };
    Feedback {
        correct,
        message,
        explanation: explanation.cloned(),
    }
}

pub fn tip_line(tip: Option<&String>, visible: bool, language: Language) -> Option<String> {
    let tip = tip.filter(|_| visible)?;
    Some(t!("feedback.tip", locale = language.code(), tip = tip).to_string())
}
