use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Term,
    Definition,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatcherState {
    Idle,
    TermSelected(String),
    DefinitionSelected(String),
}

/// Outcome of a completed term + definition pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub term_id: String,
    pub definition_id: String,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        self.term_id == self.definition_id
    }
}

/// Two-slot selection buffer: at most one pending term and one pending
/// definition. Filling the second slot resolves the pair and empties both.
#[derive(Clone, Debug, Default)]
pub struct SelectionMatcher {
    term: Option<String>,
    definition: Option<String>,
}

impl SelectionMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MatcherState {
        match (&self.term, &self.definition) {
            (Some(id), None) => MatcherState::TermSelected(id.clone()),
            (None, Some(id)) => MatcherState::DefinitionSelected(id.clone()),
            _ => MatcherState::Idle,
        }
    }

    pub fn selected(&self, side: Side) -> Option<&str> {
        match side {
            Side::Term => self.term.as_deref(),
            Side::Definition => self.definition.as_deref(),
        }
    }

    pub fn clear(&mut self) {
        self.term = None;
        self.definition = None;
    }

    /// Select `id` on `side`, replacing any earlier pick on that side.
    pub fn select(&mut self, side: Side, id: &str) -> Option<Resolution> {
        match side {
            Side::Term => self.term = Some(id.to_string()),
            Side::Definition => self.definition = Some(id.to_string()),
        }
        if self.term.is_some() && self.definition.is_some() {
            let term_id = self.term.take()?;
            let definition_id = self.definition.take()?;
            return Some(Resolution {
                term_id,
                definition_id,
            });
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub term_id: String,
    pub definition_id: String,
}

/// Append-only (tail-pop for undo) set of resolved pairs, bounded by the
/// number of items on the board.
#[derive(Clone, Debug, Default)]
pub struct MatchedPairs {
    pairs: Vec<MatchedPair>,
    capacity: usize,
}

impl MatchedPairs {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.capacity > 0 && self.pairs.len() == self.capacity
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pairs.iter().any(|p| p.term_id == id)
    }

    /// Returns false (and leaves the set untouched) when the board is full or
    /// the id is already matched.
    pub fn push(&mut self, pair: MatchedPair) -> bool {
        if self.pairs.len() >= self.capacity || self.contains(&pair.term_id) {
            return false;
        }
        self.pairs.push(pair);
        true
    }

    pub fn pop(&mut self) -> Option<MatchedPair> {
        self.pairs.pop()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let matcher = SelectionMatcher::new();
        assert_eq!(matcher.state(), MatcherState::Idle);
    }

    #[test]
    fn test_second_term_replaces_first() {
        let mut matcher = SelectionMatcher::new();
        assert!(matcher.select(Side::Term, "1").is_none());
        assert!(matcher.select(Side::Term, "2").is_none());
        assert_eq!(matcher.state(), MatcherState::TermSelected("2".to_string()));
        assert_eq!(matcher.selected(Side::Term), Some("2"));
    }

    #[test]
    fn test_pair_resolves_and_returns_to_idle() {
        let mut matcher = SelectionMatcher::new();
        matcher.select(Side::Term, "1");
        let res = matcher.select(Side::Definition, "1");
        assert!(res.as_ref().is_some_and(Resolution::is_match));
        assert_eq!(matcher.state(), MatcherState::Idle);
    }

    #[test]
    fn test_definition_first_then_wrong_term_is_mismatch() {
        let mut matcher = SelectionMatcher::new();
        matcher.select(Side::Definition, "3");
        assert_eq!(
            matcher.state(),
            MatcherState::DefinitionSelected("3".to_string())
        );
        let res = matcher.select(Side::Term, "1");
        assert_eq!(
            res,
            Some(Resolution {
                term_id: "1".to_string(),
                definition_id: "3".to_string()
            })
        );
        assert!(!res.is_some_and(|r| r.is_match()));
        assert_eq!(matcher.state(), MatcherState::Idle);
    }

    #[test]
    fn test_at_most_one_selection_per_side_over_any_sequence() {
        let mut matcher = SelectionMatcher::new();
        let clicks = [
            (Side::Term, "a"),
            (Side::Term, "b"),
            (Side::Definition, "c"),
            (Side::Definition, "a"),
            (Side::Term, "a"),
            (Side::Term, "c"),
            (Side::Term, "b"),
            (Side::Definition, "b"),
        ];
        for (side, id) in clicks {
            matcher.select(side, id);
            // Either side holds at most one id by construction; both filled
            // never survives a call.
            assert!(
                !(matcher.selected(Side::Term).is_some()
                    && matcher.selected(Side::Definition).is_some())
            );
        }
    }

    #[test]
    fn test_matched_pairs_bounded_by_capacity() {
        let mut pairs = MatchedPairs::with_capacity(1);
        let pair = MatchedPair {
            term_id: "1".to_string(),
            definition_id: "1".to_string(),
        };
        assert!(pairs.push(pair.clone()));
        assert!(pairs.is_complete());
        assert!(!pairs.push(MatchedPair {
            term_id: "2".to_string(),
            definition_id: "2".to_string(),
        }));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.pop(), Some(pair));
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_matched_pairs_rejects_duplicate() {
        let mut pairs = MatchedPairs::with_capacity(3);
        let pair = MatchedPair {
            term_id: "1".to_string(),
            definition_id: "1".to_string(),
        };
        assert!(pairs.push(pair.clone()));
        assert!(!pairs.push(pair));
        assert_eq!(pairs.len(), 1);
    }
}
