//! Render-ready projection of a module's state.
//!
//! Views are rebuilt from module fields on every render and never read back,
//! so rendering twice from the same state yields equal views.

use crate::session::module::ModuleKind;
use crate::session::score::SessionScore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleView {
    pub title: String,
    pub kind: ModuleKind,
    /// 1-based position and item count, absent on boards without a cursor.
    pub progress: Option<(usize, usize)>,
    pub progress_label: Option<String>,
    pub body: ViewBody,
    pub keys_hint: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub message: String,
    pub explanation: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceState {
    Open,
    Disabled,
    Chosen,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceView {
    pub key: char,
    pub label: String,
    pub state: ChoiceState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    Idle,
    Selected,
    Incorrect,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileView {
    pub key: char,
    pub id: String,
    pub text: String,
    pub state: TileState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewBody {
    Flashcard {
        side_label: String,
        face: String,
        flipped: bool,
        status: Option<String>,
        tip: Option<String>,
    },
    Quiz {
        question: String,
        choices: Vec<ChoiceView>,
        feedback: Option<Feedback>,
        tip: Option<String>,
    },
    Completion {
        sentence: String,
        draft: String,
        placeholder: String,
        feedback: Option<Feedback>,
        tip: Option<String>,
    },
    Sorting {
        prompt: String,
        bank_label: String,
        bank: Vec<ChoiceView>,
        answer_label: String,
        placed: Vec<String>,
        feedback: Option<Feedback>,
        tip: Option<String>,
    },
    Matching {
        terms_label: String,
        terms: Vec<TileView>,
        definitions_label: String,
        definitions: Vec<TileView>,
    },
    Summary {
        heading: String,
        score: SessionScore,
        lines: Vec<String>,
    },
}

/// How many choices the number row can address.
pub const NUMBER_KEYS: usize = 10;

/// Key label for the `index`-th numbered choice (1..9, then 0).
pub fn number_key(index: usize) -> char {
    match index {
        0..=8 => char::from(b'1' + index as u8),
        9 => '0',
        _ => ' ',
    }
}

/// Key label for the `index`-th lettered choice (a..z).
pub fn letter_key(index: usize) -> char {
    if index < 26 {
        char::from(b'a' + index as u8)
    } else {
        ' '
    }
}

pub fn index_for_number_key(key: char) -> Option<usize> {
    match key {
        '1'..='9' => Some(key as usize - '1' as usize),
        '0' => Some(9),
        _ => None,
    }
}

pub fn index_for_letter_key(key: char) -> Option<usize> {
    key.is_ascii_lowercase().then(|| key as usize - 'a' as usize)
}
