//! Dataset files: JSON documents describing one module and its items.

pub mod catalog;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::i18n::Language;
use crate::session::answer;
use crate::session::completion::CompletionModule;
use crate::session::flashcard::FlashcardModule;
use crate::session::item::{CompletionItem, FlashcardItem, MatchingItem, QuizItem, SortingItem};
use crate::session::matching::{self, MatchingModule};
use crate::session::module::{Module, ModuleData, ModuleKind, ModuleMetadata};
use crate::session::quiz::QuizModule;
use crate::session::sorting::SortingModule;
use crate::session::view::NUMBER_KEYS;

pub const BLANK_MARKER: &str = "___";

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset has an empty '{0}' field")]
    MissingField(&'static str),

    #[error("unknown module mode '{0}'")]
    UnknownMode(String),

    #[error("item {index} is invalid: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("duplicate matching id '{0}'")]
    DuplicateId(String),

    #[error("matching board has {count} pairs, at most {max} fit on the keys")]
    TooManyPairs { count: usize, max: usize },
}

impl DatasetError {
    fn item(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawDataset {
    id: String,
    name: String,
    mode: String,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// A parsed dataset, typed by its mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dataset {
    Flashcard(ModuleData<FlashcardItem>),
    Quiz(ModuleData<QuizItem>),
    Completion(ModuleData<CompletionItem>),
    Sorting(ModuleData<SortingItem>),
    Matching(ModuleData<MatchingItem>),
}

/// Knobs the shell passes down when building a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleOptions {
    pub feedback_delay: Duration,
    pub summary_delay: Duration,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            feedback_delay: matching::DEFAULT_FEEDBACK_DELAY,
            summary_delay: matching::DEFAULT_SUMMARY_DELAY,
        }
    }
}

impl Dataset {
    pub fn metadata(&self) -> &ModuleMetadata {
        match self {
            Dataset::Flashcard(data) => &data.metadata,
            Dataset::Quiz(data) => &data.metadata,
            Dataset::Completion(data) => &data.metadata,
            Dataset::Sorting(data) => &data.metadata,
            Dataset::Matching(data) => &data.metadata,
        }
    }

    pub fn kind(&self) -> ModuleKind {
        self.metadata().mode
    }

    pub fn len(&self) -> usize {
        match self {
            Dataset::Flashcard(data) => data.len(),
            Dataset::Quiz(data) => data.len(),
            Dataset::Completion(data) => data.len(),
            Dataset::Sorting(data) => data.len(),
            Dataset::Matching(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a fresh, uninitialized module for this dataset.
    pub fn into_module(self, language: Language, options: ModuleOptions) -> Box<dyn Module> {
        match self {
            Dataset::Flashcard(data) => Box::new(FlashcardModule::new(data, language)),
            Dataset::Quiz(data) => Box::new(QuizModule::new(data, language)),
            Dataset::Completion(data) => Box::new(CompletionModule::new(data, language)),
            Dataset::Sorting(data) => Box::new(SortingModule::new(data, language)),
            Dataset::Matching(data) => Box::new(
                MatchingModule::new(data, language)
                    .with_delays(options.feedback_delay, options.summary_delay),
            ),
        }
    }
}

pub fn load_file(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_dataset(&content)?;
    debug!(
        target: "lingodrill::dataset",
        path = %path.display(),
        id = %dataset.metadata().id,
        items = dataset.len(),
        "loaded dataset file"
    );
    Ok(dataset)
}

/// Parse a dataset document. An empty item list is accepted; the module
/// itself refuses to render without items.
pub fn parse_dataset(json: &str) -> Result<Dataset> {
    let raw: RawDataset = serde_json::from_str(json)?;
    if raw.id.trim().is_empty() {
        return Err(DatasetError::MissingField("id"));
    }
    if raw.name.trim().is_empty() {
        return Err(DatasetError::MissingField("name"));
    }
    let mode = ModuleKind::from_name(&raw.mode).ok_or_else(|| DatasetError::UnknownMode(raw.mode.clone()))?;
    let metadata = ModuleMetadata {
        id: raw.id.trim().to_string(),
        name: raw.name.trim().to_string(),
        mode,
    };
    let items = raw.items;

    Ok(match mode {
        ModuleKind::Flashcard => {
            let items = typed_items(items, check_flashcard)?;
            Dataset::Flashcard(ModuleData::new(metadata, items))
        }
        ModuleKind::Quiz => {
            let items = typed_items(items, check_quiz)?;
            Dataset::Quiz(ModuleData::new(metadata, items))
        }
        ModuleKind::Completion => {
            let items = typed_items(items, check_completion)?;
            Dataset::Completion(ModuleData::new(metadata, items))
        }
        ModuleKind::Sorting => {
            let items = typed_items(items, check_sorting)?;
            Dataset::Sorting(ModuleData::new(metadata, items))
        }
        ModuleKind::Matching => {
            let items = typed_items(items, check_matching)?;
            if items.len() > NUMBER_KEYS {
                return Err(DatasetError::TooManyPairs {
                    count: items.len(),
                    max: NUMBER_KEYS,
                });
            }
            let mut seen = HashSet::new();
            for item in &items {
                if !seen.insert(item.id.as_str()) {
                    return Err(DatasetError::DuplicateId(item.id.clone()));
                }
            }
            Dataset::Matching(ModuleData::new(metadata, items))
        }
    })
}

fn typed_items<T: DeserializeOwned>(
    values: Vec<serde_json::Value>,
    check: fn(&T) -> std::result::Result<(), String>,
) -> Result<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let item: T =
                serde_json::from_value(value).map_err(|e| DatasetError::item(index, e.to_string()))?;
            check(&item).map_err(|reason| DatasetError::item(index, reason))?;
            Ok(item)
        })
        .collect()
}

fn non_blank(value: &str, field: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("'{field}' is empty"))
    } else {
        Ok(())
    }
}

fn check_flashcard(item: &FlashcardItem) -> std::result::Result<(), String> {
    non_blank(&item.front, "front")?;
    non_blank(&item.back, "back")
}

fn check_quiz(item: &QuizItem) -> std::result::Result<(), String> {
    non_blank(&item.question, "question")?;
    if item.options.len() < 2 {
        return Err("a quiz item needs at least two options".to_string());
    }
    if item.options.len() > NUMBER_KEYS {
        return Err(format!("a quiz item takes at most {NUMBER_KEYS} options"));
    }
    let mut seen = HashSet::new();
    for option in &item.options {
        non_blank(option, "options")?;
        if !seen.insert(answer::normalize(option)) {
            return Err(format!("option '{option}' appears twice"));
        }
    }
    if item.answer_index().is_none() {
        return Err(format!("answer '{}' is not one of the options", item.answer));
    }
    Ok(())
}

fn check_completion(item: &CompletionItem) -> std::result::Result<(), String> {
    non_blank(&item.answer, "answer")?;
    if !item.sentence.contains(BLANK_MARKER) {
        return Err(format!("sentence has no '{BLANK_MARKER}' blank"));
    }
    Ok(())
}

fn check_sorting(item: &SortingItem) -> std::result::Result<(), String> {
    non_blank(&item.prompt, "prompt")?;
    if item.answer.is_empty() {
        return Err("'answer' has no tokens".to_string());
    }
    if item.answer.len() > NUMBER_KEYS {
        return Err(format!("a sentence takes at most {NUMBER_KEYS} tokens"));
    }
    item.answer.iter().try_for_each(|token| non_blank(token, "answer"))
}

fn check_matching(item: &MatchingItem) -> std::result::Result<(), String> {
    non_blank(&item.id, "id")?;
    non_blank(&item.term, "term")?;
    non_blank(&item.definition, "definition")
}
