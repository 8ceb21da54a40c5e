use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset::ModuleOptions;
use crate::dataset::catalog::Catalog;
use crate::i18n::Language;
use crate::session::module::{
    GameCallbacks, Module, ModuleContext, ModuleInput, ModuleSummary,
};
use crate::session::result::SessionRecord;
use crate::session::score::SessionScore;
use crate::session::view::ModuleView;
use crate::store::json_store::JsonStore;
use crate::store::schema::{ProfileData, SessionHistoryData};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Module,
    Summary,
}

/// The part of the app a running module can reach through `GameCallbacks`.
pub struct ShellState {
    pub screen: AppScreen,
    pub language: Language,
    pub random_mode: bool,
    pub view: Option<ModuleView>,
    pub session_score: SessionScore,
    pub last_summary: Option<ModuleSummary>,
    pending_summary: Option<ModuleSummary>,
    menu_requested: bool,
    header_dirty: bool,
    rng: SmallRng,
}

impl ShellState {
    pub fn new(language: Language, random_mode: bool, rng: SmallRng) -> Self {
        Self {
            screen: AppScreen::Menu,
            language,
            random_mode,
            view: None,
            session_score: SessionScore::default(),
            last_summary: None,
            pending_summary: None,
            menu_requested: false,
            header_dirty: false,
            rng,
        }
    }

    fn clear_module_state(&mut self) {
        self.view = None;
        self.session_score = SessionScore::default();
        self.pending_summary = None;
        self.menu_requested = false;
    }
}

impl GameCallbacks for ShellState {
    fn random_mode(&self) -> bool {
        self.random_mode
    }

    fn shuffle_order(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        order
    }

    fn update_session_score_display(&mut self, correct: u32, incorrect: u32, _total: u32) {
        self.session_score = SessionScore { correct, incorrect };
    }

    fn render_menu(&mut self) {
        self.menu_requested = true;
    }

    fn show_summary(&mut self, summary: &ModuleSummary) {
        self.pending_summary = Some(summary.clone());
    }

    fn render_header(&mut self) {
        self.header_dirty = true;
    }

    fn present(&mut self, view: ModuleView) {
        self.view = Some(view);
    }
}

pub struct App {
    pub shell: ShellState,
    pub module: Option<Box<dyn Module>>,
    pub active_id: Option<String>,
    pub catalog: Catalog,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    /// Where preference changes are written; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
    pub profile: ProfileData,
    pub history: SessionHistoryData,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, store: Option<JsonStore>, catalog: Catalog) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let (profile, history) = match store {
            Some(ref s) => {
                if s.check_interrupted_import() {
                    warn!(target: "lingodrill::store", "removed backups left by an interrupted import");
                }
                let profile = s.load_profile_or_reset();
                (profile, s.load_session_history())
            }
            None => (ProfileData::default(), SessionHistoryData::default()),
        };

        let mut app = Self {
            shell: ShellState::new(
                config.language(),
                config.random_mode,
                SmallRng::from_entropy(),
            ),
            module: None,
            active_id: None,
            menu: Menu::new(theme, &catalog, config.language()),
            catalog,
            theme,
            config,
            config_path: None,
            profile,
            history,
            store,
            should_quit: false,
        };
        if let Some(name) = app.config.username.clone() {
            app.set_username(&name);
        }
        app
    }

    pub fn language(&self) -> Language {
        self.shell.language
    }

    pub fn screen(&self) -> AppScreen {
        self.shell.screen
    }

    pub fn set_username(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || self.profile.username.as_deref() == Some(name) {
            return;
        }
        self.profile.username = Some(name.to_string());
        self.save_profile();
    }

    fn module_options(&self) -> ModuleOptions {
        ModuleOptions {
            feedback_delay: self.config.feedback_delay(),
            summary_delay: self.config.summary_delay(),
        }
    }

    /// Build a fresh module for the catalog entry at `index` and start it.
    pub fn start_module(&mut self, index: usize) -> bool {
        let Some(dataset) = self.catalog.get(index).cloned() else {
            return false;
        };
        let id = dataset.metadata().id.clone();
        info!(target: "lingodrill::app", module = %id, mode = dataset.kind().as_str(), "starting module");
        self.menu.selected = index;
        self.module = Some(dataset.into_module(self.language(), self.module_options()));
        self.active_id = Some(id);
        self.shell.clear_module_state();
        self.shell.screen = AppScreen::Module;
        self.with_module(|module, ctx| module.init(ctx));
        true
    }

    pub fn start_module_by_id(&mut self, id: &str) -> bool {
        match self.catalog.position(id) {
            Some(index) => self.start_module(index),
            None => {
                warn!(target: "lingodrill::app", module = id, "no module with that id");
                false
            }
        }
    }

    pub fn start_selected(&mut self) {
        self.start_module(self.menu.selected);
    }

    pub fn restart(&mut self) {
        if let Some(id) = self.active_id.clone() {
            self.start_module_by_id(&id);
        }
    }

    pub fn go_to_menu(&mut self) {
        self.module = None;
        self.shell.clear_module_state();
        self.shell.screen = AppScreen::Menu;
        self.save_data();
    }

    fn with_module(&mut self, f: impl FnOnce(&mut dyn Module, &mut ModuleContext<'_>)) {
        let Some(module) = self.module.as_mut() else {
            return;
        };
        let mut ctx = ModuleContext::new(&mut self.shell, &mut self.profile);
        f(module.as_mut(), &mut ctx);
        self.after_module_call();
    }

    fn after_module_call(&mut self) {
        if std::mem::take(&mut self.shell.menu_requested) {
            self.go_to_menu();
            return;
        }
        if let Some(summary) = self.shell.pending_summary.take() {
            self.finish_session(summary);
        }
        if std::mem::take(&mut self.shell.header_dirty) {
            self.save_profile();
        }
    }

    fn finish_session(&mut self, summary: ModuleSummary) {
        let record = SessionRecord::from_summary(&summary);
        info!(
            target: "lingodrill::app",
            module = %record.module_id,
            correct = record.correct,
            incorrect = record.incorrect,
            accuracy = format!("{:.0}%", record.accuracy()),
            "module finished"
        );
        self.profile.record_session(&record);
        self.history.push(record);
        self.shell.last_summary = Some(summary);
        self.shell.screen = AppScreen::Summary;
        self.save_data();
    }

    pub fn handle_input(&mut self, input: ModuleInput) {
        self.with_module(|module, ctx| module.handle_input(input, ctx));
    }

    pub fn undo(&mut self) {
        self.with_module(|module, ctx| module.undo(ctx));
    }

    pub fn next(&mut self) {
        self.with_module(|module, ctx| module.next(ctx));
    }

    pub fn prev(&mut self) {
        self.with_module(|module, ctx| module.prev(ctx));
    }

    pub fn tick(&mut self, now: Instant) {
        self.with_module(|module, ctx| module.tick(now, ctx));
    }

    pub fn toggle_language(&mut self) {
        let language = self.language().toggled();
        self.shell.language = language;
        self.config.set_language(language);
        self.menu.refresh(&self.catalog, language);
        self.save_config();
        self.with_module(|module, ctx| module.update_text(language, ctx));
    }

    pub fn toggle_random(&mut self) {
        self.config.random_mode = !self.config.random_mode;
        self.shell.random_mode = self.config.random_mode;
        self.save_config();
    }

    pub fn quit(&mut self) {
        self.module = None;
        self.save_data();
        self.should_quit = true;
    }

    fn save_config(&self) {
        let Some(ref path) = self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(target: "lingodrill::app", error = %e, "failed to save config");
        }
    }

    fn save_profile(&self) {
        if let Some(ref store) = self.store
            && let Err(e) = store.save_profile(&self.profile)
        {
            warn!(target: "lingodrill::store", error = %e, "failed to save profile");
        }
    }

    fn save_data(&self) {
        if let Some(ref store) = self.store {
            self.save_profile();
            if let Err(e) = store.save_session_history(&self.history) {
                warn!(target: "lingodrill::store", error = %e, "failed to save session history");
            }
        }
    }
}
