use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScore {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionScore {
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Percentage of answers that were correct; a run with no answers is 0%.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct as f64 / total as f64 * 100.0
    }
}

/// Signed change pushed to the cumulative score after every scoring event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreDelta {
    pub correct: i32,
    pub incorrect: i32,
}

impl ScoreDelta {
    pub const CORRECT: ScoreDelta = ScoreDelta {
        correct: 1,
        incorrect: 0,
    };
    pub const INCORRECT: ScoreDelta = ScoreDelta {
        correct: 0,
        incorrect: 1,
    };

    pub fn is_zero(&self) -> bool {
        self.correct == 0 && self.incorrect == 0
    }

    pub fn negated(self) -> Self {
        Self {
            correct: -self.correct,
            incorrect: -self.incorrect,
        }
    }
}

/// Sole arithmetic authority over a module run's tally.
#[derive(Clone, Debug, Default)]
pub struct ScoreTracker {
    score: SessionScore,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn reset(&mut self) {
        self.score = SessionScore::default();
    }

    pub fn record(&mut self, correct: bool) -> ScoreDelta {
        if correct {
            self.record_correct()
        } else {
            self.record_incorrect()
        }
    }

    pub fn record_correct(&mut self) -> ScoreDelta {
        self.score.correct += 1;
        ScoreDelta::CORRECT
    }

    pub fn record_incorrect(&mut self) -> ScoreDelta {
        self.score.incorrect += 1;
        ScoreDelta::INCORRECT
    }

    /// Undo the effect of an earlier `record(was_correct)`.
    ///
    /// Callers pair this with a prior record, so the counter is never at zero
    /// here; in release builds an unpaired call saturates and reports no change.
    pub fn reverse_last(&mut self, was_correct: bool) -> ScoreDelta {
        let counter = if was_correct {
            &mut self.score.correct
        } else {
            &mut self.score.incorrect
        };
        debug_assert!(*counter > 0, "reverse_last without a paired record");
        if *counter == 0 {
            return ScoreDelta::default();
        }
        *counter -= 1;
        if was_correct {
            ScoreDelta::CORRECT.negated()
        } else {
            ScoreDelta::INCORRECT.negated()
        }
    }
}
