//! Recording doubles for the shell and the global score store.

use crate::session::module::{GameCallbacks, GlobalScoreBridge, ModuleContext, ModuleSummary};
use crate::session::score::ScoreDelta;
use crate::session::view::ModuleView;

#[derive(Default)]
pub struct RecordingShell {
    pub random_mode: bool,
    /// Returned by `shuffle_order` when set, otherwise the order is reversed.
    pub fixed_order: Option<Vec<usize>>,
    pub shuffle_calls: usize,
    pub score_displays: Vec<(u32, u32, u32)>,
    pub menu_renders: usize,
    pub header_renders: usize,
    pub summaries: Vec<ModuleSummary>,
    pub views: Vec<ModuleView>,
}

impl RecordingShell {
    pub fn last_view(&self) -> Option<&ModuleView> {
        self.views.last()
    }
}

impl GameCallbacks for RecordingShell {
    fn random_mode(&self) -> bool {
        self.random_mode
    }

    fn shuffle_order(&mut self, len: usize) -> Vec<usize> {
        self.shuffle_calls += 1;
        self.fixed_order
            .clone()
            .unwrap_or_else(|| (0..len).rev().collect())
    }

    fn update_session_score_display(&mut self, correct: u32, incorrect: u32, total: u32) {
        self.score_displays.push((correct, incorrect, total));
    }

    fn render_menu(&mut self) {
        self.menu_renders += 1;
    }

    fn show_summary(&mut self, summary: &ModuleSummary) {
        self.summaries.push(summary.clone());
    }

    fn render_header(&mut self) {
        self.header_renders += 1;
    }

    fn present(&mut self, view: ModuleView) {
        self.views.push(view);
    }
}

#[derive(Default)]
pub struct RecordingScores {
    pub deltas: Vec<ScoreDelta>,
}

impl GlobalScoreBridge for RecordingScores {
    fn update_global_score(&mut self, delta: ScoreDelta) {
        self.deltas.push(delta);
    }
}

#[derive(Default)]
pub struct Harness {
    pub shell: RecordingShell,
    pub scores: RecordingScores,
}

impl Harness {
    pub fn random() -> Self {
        let mut harness = Self::default();
        harness.shell.random_mode = true;
        harness
    }

    pub fn ctx(&mut self) -> ModuleContext<'_> {
        ModuleContext::new(&mut self.shell, &mut self.scores)
    }

    pub fn last_display(&self) -> Option<(u32, u32, u32)> {
        self.shell.score_displays.last().copied()
    }
}
