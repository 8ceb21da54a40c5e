use crate::session::score::SessionScore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub item_index: usize,
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Session score as it stood before this answer was scored.
    pub score_before: SessionScore,
}

/// Pointer-addressed answer log with single-branch overwrite.
///
/// Stepping back moves the pointer without dropping entries. Recording while
/// the pointer sits behind the tail discards everything after the pointer
/// first, the same way an editor drops its redo stack on a fresh edit.
#[derive(Clone, Debug, Default)]
pub struct AnswerHistory {
    entries: Vec<HistoryEntry>,
    pointer: Option<usize>,
}

impl AnswerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry under the pointer, if any answer is still active.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.pointer.and_then(|p| self.entries.get(p))
    }

    /// Entries up to and including the pointer.
    pub fn active(&self) -> &[HistoryEntry] {
        match self.pointer {
            Some(p) => &self.entries[..=p],
            None => &[],
        }
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        let keep = self.pointer.map_or(0, |p| p + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        self.pointer = Some(self.entries.len() - 1);
    }

    /// Remove the tail entry outright.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        let entry = self.entries.pop()?;
        self.pointer = self.entries.len().checked_sub(1);
        Some(entry)
    }

    /// Move the pointer back one entry, keeping the entry in the log.
    /// Returns the entry that was stepped over.
    pub fn step_back(&mut self) -> Option<&HistoryEntry> {
        let p = self.pointer?;
        self.pointer = p.checked_sub(1);
        self.entries.get(p)
    }
}
