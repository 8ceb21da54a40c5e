use std::time::{Duration, Instant};

use lingodrill::app::{App, AppScreen};
use lingodrill::config::Config;
use lingodrill::dataset::catalog::Catalog;
use lingodrill::session::matcher::Side;
use lingodrill::session::module::{ModuleInput, ModuleKind};
use lingodrill::session::view::ViewBody;
use lingodrill::store::json_store::JsonStore;
use tempfile::TempDir;

fn app() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    (dir, App::new(Config::default(), Some(store), Catalog::bundled()))
}

fn type_answer(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_input(ModuleInput::Char(ch));
    }
    app.handle_input(ModuleInput::Submit);
}

fn place_words(app: &mut App, words: &[&str]) {
    for word in words {
        let Some(ViewBody::Sorting { bank, .. }) = app.shell.view.as_ref().map(|v| &v.body) else {
            panic!("expected a sorting view");
        };
        let slot = bank
            .iter()
            .position(|choice| choice.label == *word)
            .unwrap_or_else(|| panic!("word {word} not in bank"));
        app.handle_input(ModuleInput::Pick(slot));
    }
    app.handle_input(ModuleInput::Submit);
}

fn assert_finished(app: &App, correct: u32, incorrect: u32) {
    assert_eq!(app.screen(), AppScreen::Summary);
    let summary = app.shell.last_summary.as_ref().expect("summary recorded");
    assert_eq!(summary.score.correct, correct);
    assert_eq!(summary.score.incorrect, incorrect);
    let record = app.history.sessions.last().expect("history record");
    assert_eq!(record.correct, correct);
    assert_eq!(record.incorrect, incorrect);
}

#[test]
fn flashcard_run_reaches_summary() {
    let (_dir, mut app) = app();
    assert!(app.start_module_by_id("greetings-cards"));

    app.handle_input(ModuleInput::Flip);
    for known in [true, true, false, true, false] {
        app.handle_input(ModuleInput::Recall(known));
        app.next();
    }

    assert_finished(&app, 3, 2);
    assert_eq!(app.profile.global_correct, 3);
    assert_eq!(app.profile.global_incorrect, 2);
    assert_eq!(app.profile.sessions_completed, 1);
}

#[test]
fn quiz_undo_freezes_scoring_until_finish() {
    let (_dir, mut app) = app();
    assert!(app.start_module_by_id("colors-quiz"));

    // "blue" is wrong for the first question.
    app.handle_input(ModuleInput::Choose(0));
    app.undo();
    assert_eq!(app.shell.session_score.total(), 0);
    app.handle_input(ModuleInput::Choose(1));
    // The re-answer after undo is not counted.
    assert_eq!(app.shell.session_score.incorrect, 1);
    assert_eq!(app.shell.session_score.correct, 0);

    app.next();
    app.handle_input(ModuleInput::Choose(0));
    app.next();
    app.handle_input(ModuleInput::Choose(1));
    app.next();
    app.handle_input(ModuleInput::Choose(0));
    app.next();

    assert_finished(&app, 3, 1);
}

#[test]
fn completion_accepts_alternatives_and_reverses_on_undo() {
    let (_dir, mut app) = app();
    assert!(app.start_module_by_id("ser-estar"));

    type_answer(&mut app, "eres");
    assert_eq!(app.profile.global_incorrect, 1);
    app.undo();
    assert_eq!(app.profile.global_incorrect, 0);
    type_answer(&mut app, "  SOY ");
    app.next();
    type_answer(&mut app, "estamos");
    app.next();
    type_answer(&mut app, "esta");
    app.next();
    type_answer(&mut app, "son");
    app.next();

    assert_finished(&app, 4, 0);
    assert_eq!(app.profile.global_correct, 4);
}

#[test]
fn sorting_checks_word_order() {
    let (_dir, mut app) = app();
    assert!(app.start_module_by_id("word-order"));

    place_words(&mut app, &["Me", "gusta", "el", "café"]);
    app.next();
    place_words(&mut app, &["casa", "La", "es", "grande"]);
    app.next();
    place_words(&mut app, &["Vivimos", "en", "Madrid"]);
    app.next();

    assert_finished(&app, 2, 1);
}

#[test]
fn matching_board_shows_summary_after_delay() {
    let (_dir, mut app) = app();
    assert!(app.start_module_by_id("animals-pairs"));
    let start = Instant::now();

    app.handle_input(ModuleInput::Select(Side::Term, "1".into()));
    app.handle_input(ModuleInput::Select(Side::Definition, "2".into()));
    assert_eq!(app.shell.session_score.incorrect, 1);
    app.tick(start + Duration::from_secs(1));

    for id in ["1", "2", "3", "4", "5"] {
        app.handle_input(ModuleInput::Select(Side::Definition, id.into()));
        app.handle_input(ModuleInput::Select(Side::Term, id.into()));
    }
    assert_eq!(app.screen(), AppScreen::Module);

    app.tick(Instant::now() + Duration::from_secs(5));
    assert_finished(&app, 5, 1);
    let record = app.history.sessions.last().unwrap();
    assert_eq!(record.mode, ModuleKind::Matching);
    assert_eq!(record.matched_pairs, 5);
}

#[test]
fn finished_sessions_persist_across_restarts() {
    let dir = TempDir::new().unwrap();
    {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut app = App::new(Config::default(), Some(store), Catalog::bundled());
        assert!(app.start_module_by_id("colors-quiz"));
        for choice in [1, 0, 1, 0] {
            app.handle_input(ModuleInput::Choose(choice));
            app.next();
        }
        assert_eq!(app.screen(), AppScreen::Summary);
        app.quit();
    }

    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let app = App::new(Config::default(), Some(store), Catalog::bundled());
    assert_eq!(app.profile.sessions_completed, 1);
    assert_eq!(app.profile.global_correct, 4);
    assert_eq!(app.history.sessions.len(), 1);
    assert_eq!(app.history.sessions[0].module_id, "colors-quiz");
}

#[test]
fn restart_runs_the_same_module_again() {
    let (_dir, mut app) = app();
    assert!(app.start_module_by_id("greetings-cards"));
    for _ in 0..5 {
        app.handle_input(ModuleInput::Recall(true));
        app.next();
    }
    assert_eq!(app.screen(), AppScreen::Summary);

    app.restart();
    assert_eq!(app.screen(), AppScreen::Module);
    assert_eq!(app.active_id.as_deref(), Some("greetings-cards"));
    assert_eq!(app.shell.session_score.total(), 0);
    assert_eq!(app.profile.global_correct, 5);
}
