use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::AppScreen;
use crate::session::matcher::Side;
use crate::session::module::{ModuleInput, ModuleKind};
use crate::session::view::{ModuleView, ViewBody, index_for_letter_key, index_for_number_key};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if tx.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

/// What a key press asks the app to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Menu,
    ToggleLanguage,
    ToggleRandom,
    MenuUp,
    MenuDown,
    Start,
    StartAt(usize),
    Restart,
    Undo,
    Next,
    Prev,
    Input(ModuleInput),
}

pub fn command_for_key(screen: AppScreen, view: Option<&ModuleView>, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Some(Command::Quit),
        KeyCode::F(2) => return Some(Command::ToggleLanguage),
        _ => {}
    }

    match screen {
        AppScreen::Menu => menu_command(key),
        AppScreen::Summary => match key.code {
            KeyCode::Enter => Some(Command::Restart),
            KeyCode::Esc | KeyCode::Char('q') => Some(Command::Menu),
            _ => None,
        },
        AppScreen::Module => {
            match key.code {
                KeyCode::Esc => return Some(Command::Menu),
                KeyCode::Char('z') if ctrl => return Some(Command::Undo),
                KeyCode::Right | KeyCode::PageDown => return Some(Command::Next),
                KeyCode::Left | KeyCode::PageUp => return Some(Command::Prev),
                KeyCode::Tab => return Some(Command::Input(ModuleInput::ToggleTip)),
                _ => {}
            }
            if ctrl {
                return None;
            }
            view.and_then(|view| module_input(view, key.code))
                .map(Command::Input)
        }
    }
}

fn menu_command(key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::MenuUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::MenuDown),
        KeyCode::Enter => Some(Command::Start),
        KeyCode::Char('r') => Some(Command::ToggleRandom),
        KeyCode::Char(ch) => index_for_number_key(ch).map(Command::StartAt),
        _ => None,
    }
}

fn module_input(view: &ModuleView, code: KeyCode) -> Option<ModuleInput> {
    match view.kind {
        ModuleKind::Flashcard => match code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(ModuleInput::Flip),
            KeyCode::Char('y') => Some(ModuleInput::Recall(true)),
            KeyCode::Char('n') => Some(ModuleInput::Recall(false)),
            _ => None,
        },
        ModuleKind::Quiz => match code {
            KeyCode::Char(ch) => index_for_number_key(ch).map(ModuleInput::Choose),
            _ => None,
        },
        ModuleKind::Completion => match code {
            KeyCode::Char(ch) => Some(ModuleInput::Char(ch)),
            KeyCode::Backspace => Some(ModuleInput::Backspace),
            KeyCode::Enter => Some(ModuleInput::Submit),
            _ => None,
        },
        ModuleKind::Sorting => match code {
            KeyCode::Char(ch) => index_for_number_key(ch).map(ModuleInput::Pick),
            KeyCode::Backspace => Some(ModuleInput::Unpick),
            KeyCode::Enter => Some(ModuleInput::Submit),
            _ => None,
        },
        ModuleKind::Matching => {
            let KeyCode::Char(ch) = code else {
                return None;
            };
            let ViewBody::Matching {
                terms, definitions, ..
            } = &view.body
            else {
                return None;
            };
            if let Some(tile) = index_for_number_key(ch).and_then(|i| terms.get(i)) {
                return Some(ModuleInput::Select(Side::Term, tile.id.clone()));
            }
            index_for_letter_key(ch)
                .and_then(|i| definitions.get(i))
                .map(|tile| ModuleInput::Select(Side::Definition, tile.id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::view::{TileState, TileView};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view(kind: ModuleKind, body: ViewBody) -> ModuleView {
        ModuleView {
            title: "t".to_string(),
            kind,
            progress: None,
            progress_label: None,
            body,
            keys_hint: String::new(),
        }
    }

    fn tile(key: char, id: &str) -> TileView {
        TileView {
            key,
            id: id.to_string(),
            text: id.to_string(),
            state: TileState::Idle,
        }
    }

    #[test]
    fn test_global_keys_work_everywhere() {
        for screen in [AppScreen::Menu, AppScreen::Module, AppScreen::Summary] {
            assert_eq!(
                command_for_key(screen, None, press(KeyCode::F(2))),
                Some(Command::ToggleLanguage)
            );
            assert_eq!(
                command_for_key(screen, None, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
                Some(Command::Quit)
            );
        }
    }

    #[test]
    fn test_menu_number_starts_entry() {
        assert_eq!(
            command_for_key(AppScreen::Menu, None, press(KeyCode::Char('3'))),
            Some(Command::StartAt(2))
        );
        assert_eq!(
            command_for_key(AppScreen::Menu, None, press(KeyCode::Char('r'))),
            Some(Command::ToggleRandom)
        );
    }

    #[test]
    fn test_ctrl_z_is_undo_not_text() {
        let completion = view(
            ModuleKind::Completion,
            ViewBody::Completion {
                sentence: String::new(),
                draft: String::new(),
                placeholder: String::new(),
                feedback: None,
                tip: None,
            },
        );
        let undo = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(
            command_for_key(AppScreen::Module, Some(&completion), undo),
            Some(Command::Undo)
        );
        assert_eq!(
            command_for_key(AppScreen::Module, Some(&completion), press(KeyCode::Char('z'))),
            Some(Command::Input(ModuleInput::Char('z')))
        );
    }

    #[test]
    fn test_matching_keys_resolve_tile_ids() {
        let board = view(
            ModuleKind::Matching,
            ViewBody::Matching {
                terms_label: String::new(),
                terms: vec![tile('1', "7"), tile('2', "8")],
                definitions_label: String::new(),
                definitions: vec![tile('a', "8"), tile('b', "7")],
            },
        );
        assert_eq!(
            command_for_key(AppScreen::Module, Some(&board), press(KeyCode::Char('2'))),
            Some(Command::Input(ModuleInput::Select(Side::Term, "8".to_string())))
        );
        assert_eq!(
            command_for_key(AppScreen::Module, Some(&board), press(KeyCode::Char('b'))),
            Some(Command::Input(ModuleInput::Select(Side::Definition, "7".to_string())))
        );
        assert_eq!(
            command_for_key(AppScreen::Module, Some(&board), press(KeyCode::Char('9'))),
            None
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(command_for_key(AppScreen::Menu, None, key), None);
    }
}
