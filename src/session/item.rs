use serde::{Deserialize, Deserializer, Serialize};

use crate::session::answer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardItem {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
}

impl QuizItem {
    pub fn is_correct_option(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| answer::equivalent(option, &self.answer))
    }

    pub fn answer_index(&self) -> Option<usize> {
        (0..self.options.len()).find(|&i| self.is_correct_option(i))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    /// Sentence with the gap written as `___`.
    pub sentence: String,
    pub answer: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
}

impl CompletionItem {
    pub fn accepts(&self, input: &str) -> bool {
        std::iter::once(&self.answer)
            .chain(self.alternatives.iter())
            .any(|candidate| answer::equivalent(candidate, input))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingItem {
    pub prompt: String,
    /// Tokens in their correct order.
    pub answer: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
}

impl SortingItem {
    pub fn accepts(&self, tokens: &[&str]) -> bool {
        tokens.len() == self.answer.len()
            && tokens
                .iter()
                .zip(&self.answer)
                .all(|(given, expected)| answer::equivalent(given, expected))
    }

    /// Word bank order: case-insensitive alphabetical, stable on ties.
    pub fn bank_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.answer.len()).collect();
        order.sort_by_cached_key(|&i| answer::normalize(&self.answer[i]));
        order
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingItem {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: String,
    pub term: String,
    pub definition: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn id_from_text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}
