use crate::dataset::{component_label, component_value, Dataset, WordRecord};
use rand::seq::SliceRandom;
use thiserror::Error;

/// Contract violation by the caller: an operation was invoked outside
/// the state it is valid in. Never produced by a merely wrong answer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The quiz is over; only `reset` is valid now.
    #[error("the quiz is already over")]
    Finished,

    /// No word is active yet; `advance` must be called first.
    #[error("no word is active; advance to the first word")]
    NoActiveWord,

    /// The active word was solved; it must be advanced past, not rebuilt.
    #[error("the current word is already solved; advance to the next one")]
    AlreadySolved,
}

/// What an `advance` call hands the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// A new word is active: show its meaning and repopulate the pickers.
    NextWord {
        meaning: String,
        prefix_options: Vec<String>,
        root_options: Vec<String>,
        suffix_options: Vec<String>,
    },
    /// Past the last word: show the final tally.
    GameOver { score: usize, total: usize },
}

/// Verdict on one assembled candidate. An incorrect build reveals the
/// expected parts (placeholder-normalized) and the story, but never the
/// assembled word itself; the item stays open for another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Correct {
        score: usize,
        story: String,
    },
    Incorrect {
        story: String,
        expected_prefix: String,
        expected_root: String,
        expected_suffix: String,
    },
}

/// Mutable progression state over one dataset.
///
/// Lifecycle: `start` shuffles a play order over the records and leaves
/// the session unstarted; the first `advance` activates the first word.
/// `attempt_build` verifies a candidate against the active word and, on
/// success, locks the word until the next `advance`. After the last
/// word, `advance` yields the game-over tally and the session only
/// accepts `reset`.
#[derive(Debug)]
pub struct QuizSession {
    dataset: Dataset,
    order: Vec<usize>,
    /// None before the first advance; `order.len()` once finished.
    position: Option<usize>,
    score: usize,
    attempt_locked: bool,
}

impl QuizSession {
    /// Take ownership of a loaded dataset and shuffle the play order.
    /// Fisher-Yates via `rand`, so every permutation is equally likely.
    pub fn start(dataset: Dataset) -> Self {
        let mut order: Vec<usize> = (0..dataset.records.len()).collect();
        order.shuffle(&mut rand::thread_rng());

        Self {
            dataset,
            order,
            position: None,
            score: 0,
            attempt_locked: false,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn attempt_locked(&self) -> bool {
        self.attempt_locked
    }

    pub fn is_finished(&self) -> bool {
        self.position == Some(self.order.len())
    }

    /// 1-based rank of the active word, if one is active.
    pub fn progress(&self) -> Option<usize> {
        match self.position {
            Some(p) if p < self.order.len() => Some(p + 1),
            _ => None,
        }
    }

    /// The active word's spelling, exposed only once it has been
    /// solved, so feedback and pronunciation cannot leak an answer.
    pub fn solved_word(&self) -> Option<&str> {
        if self.attempt_locked {
            self.current_record().map(|r| r.word.as_str())
        } else {
            None
        }
    }

    /// Activate the next word, or finish the quiz after the last one.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }

        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next);
        self.attempt_locked = false;

        if next == self.order.len() {
            return Ok(Advance::GameOver {
                score: self.score,
                total: self.order.len(),
            });
        }

        let record = &self.dataset.records[self.order[next]];
        Ok(Advance::NextWord {
            meaning: record.meaning.clone(),
            prefix_options: self.dataset.prefix_options.clone(),
            root_options: self.dataset.root_options.clone(),
            suffix_options: self.dataset.suffix_options.clone(),
        })
    }

    /// Assemble prefix + root + suffix (placeholder counts as empty for
    /// prefix and suffix) and compare it, case-sensitively, against the
    /// active word. A correct build scores once and locks the word; an
    /// incorrect build changes nothing and may be retried.
    pub fn attempt_build(
        &mut self,
        prefix: &str,
        root: &str,
        suffix: &str,
    ) -> Result<BuildOutcome, SessionError> {
        let record_index = match self.active_index() {
            Some(i) => i,
            None if self.is_finished() => return Err(SessionError::Finished),
            None => return Err(SessionError::NoActiveWord),
        };
        if self.attempt_locked {
            return Err(SessionError::AlreadySolved);
        }

        let record = &self.dataset.records[record_index];
        let built = format!(
            "{}{}{}",
            component_value(prefix),
            root,
            component_value(suffix)
        );

        if built == record.word {
            let story = record.story.clone();
            self.score += 1;
            self.attempt_locked = true;
            Ok(BuildOutcome::Correct {
                score: self.score,
                story,
            })
        } else {
            Ok(BuildOutcome::Incorrect {
                story: record.story.clone(),
                expected_prefix: component_label(&record.prefix),
                expected_root: record.root.clone(),
                expected_suffix: component_label(&record.suffix),
            })
        }
    }

    /// Back to unstarted over the same dataset, with a fresh shuffle.
    pub fn reset(&mut self) {
        self.order.shuffle(&mut rand::thread_rng());
        self.position = None;
        self.score = 0;
        self.attempt_locked = false;
    }

    fn active_index(&self) -> Option<usize> {
        match self.position {
            Some(p) if p < self.order.len() => Some(self.order[p]),
            _ => None,
        }
    }

    fn current_record(&self) -> Option<&WordRecord> {
        self.active_index().map(|i| &self.dataset.records[i])
    }
}
