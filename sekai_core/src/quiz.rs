//! Quiz session state machine.
//!
//! A session walks one module's question list:
//!
//! ```text
//! Presenting(i, selected?) --check--> Checked(i, selected, correct)
//! Checked(i, ..)           --next-->  Presenting(i + 1, none) | Finished(score, total)
//! ```
//!
//! Sessions are transient. Nothing here is persisted; an interrupted session
//! is simply dropped.

use crate::error::QuizError;
use crate::types::{LearnerProgress, Module, MultipleChoiceQuestion};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizState {
    Presenting {
        index: usize,
        selected: Option<String>,
    },
    Checked {
        index: usize,
        selected: String,
        correct: bool,
    },
    Finished {
        score: usize,
        total: usize,
    },
}

impl QuizState {
    fn name(&self) -> &'static str {
        match self {
            QuizState::Presenting { selected: None, .. } => "awaiting a selection",
            QuizState::Presenting { .. } => "presenting",
            QuizState::Checked { .. } => "checked",
            QuizState::Finished { .. } => "finished",
        }
    }
}

/// One pass through a module's quiz
#[derive(Clone, Debug)]
pub struct QuizSession<'a> {
    module: &'a Module,
    state: QuizState,
    score: usize,
}

impl<'a> QuizSession<'a> {
    /// Start at the first question. A module without questions starts finished.
    pub fn new(module: &'a Module) -> Self {
        let state = if module.questions.is_empty() {
            QuizState::Finished { score: 0, total: 0 }
        } else {
            QuizState::Presenting {
                index: 0,
                selected: None,
            }
        };

        tracing::debug!(
            "Starting quiz for module {} ({} questions)",
            module.number,
            module.questions.len()
        );

        Self {
            module,
            state,
            score: 0,
        }
    }

    pub fn module(&self) -> &'a Module {
        self.module
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.module.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished { .. })
    }

    /// The question being presented or checked
    pub fn current_question(&self) -> Option<&'a MultipleChoiceQuestion> {
        match &self.state {
            QuizState::Presenting { index, .. } | QuizState::Checked { index, .. } => {
                self.module.questions.get(*index)
            }
            QuizState::Finished { .. } => None,
        }
    }

    /// Choose an option for the current question. May be called again to
    /// change the choice until the answer is checked.
    pub fn select(&mut self, option: &str) -> Result<(), QuizError> {
        let QuizState::Presenting { index, .. } = self.state else {
            return Err(self.invalid("select"));
        };

        let question = &self.module.questions[index];
        if !question.options.iter().any(|o| o == option) {
            return Err(QuizError::UnknownOption(option.to_string()));
        }

        self.state = QuizState::Presenting {
            index,
            selected: Some(option.to_string()),
        };
        Ok(())
    }

    /// Check the selected option and return whether it was correct.
    ///
    /// Calling again before `next` returns the same result without rescoring.
    pub fn check(&mut self) -> Result<bool, QuizError> {
        match &self.state {
            QuizState::Checked { correct, .. } => Ok(*correct),
            QuizState::Presenting {
                index,
                selected: Some(selected),
            } => {
                let index = *index;
                let selected = selected.clone();
                let correct = selected == self.module.questions[index].answer;
                if correct {
                    self.score += 1;
                }

                tracing::debug!(
                    "Module {} question {}: '{}' is {}",
                    self.module.number,
                    index + 1,
                    selected,
                    if correct { "correct" } else { "incorrect" }
                );

                self.state = QuizState::Checked {
                    index,
                    selected,
                    correct,
                };
                Ok(correct)
            }
            _ => Err(self.invalid("check")),
        }
    }

    /// Move past a checked question
    pub fn next(&mut self) -> Result<(), QuizError> {
        let QuizState::Checked { index, .. } = self.state else {
            return Err(self.invalid("next"));
        };

        self.state = if index + 1 < self.total() {
            QuizState::Presenting {
                index: index + 1,
                selected: None,
            }
        } else {
            tracing::info!(
                "Quiz for module {} finished: {}/{}",
                self.module.number,
                self.score,
                self.total()
            );
            QuizState::Finished {
                score: self.score,
                total: self.total(),
            }
        };
        Ok(())
    }

    /// `"n/total"` with the current question counted from 1
    pub fn progress_text(&self) -> String {
        let position = match &self.state {
            QuizState::Presenting { index, .. } | QuizState::Checked { index, .. } => index + 1,
            QuizState::Finished { total, .. } => *total,
        };
        format!("{}/{}", position, self.total())
    }

    /// Feed a finished session back into the learner's progress.
    ///
    /// The level advances only when the quizzed module is the learner's
    /// current level, so retaking an earlier quiz never advances twice.
    /// Score does not matter. Returns whether the level advanced.
    pub fn apply_result(&self, progress: &mut LearnerProgress) -> bool {
        if !self.is_finished() {
            tracing::debug!("Quiz for module {} not finished; nothing to apply", self.module.number);
            return false;
        }

        if self.module.number == progress.current_level() {
            progress.complete_level();
            true
        } else {
            tracing::debug!(
                "Module {} is not the current level {}; level unchanged",
                self.module.number,
                progress.current_level()
            );
            false
        }
    }

    fn invalid(&self, op: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            op,
            state: self.state.name(),
        }
    }
}

/// Letter label for the option at `index`: A, B, C, ...
///
/// Past Z the label falls back to the 1-based position.
pub fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}
