use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("option appears more than once: {option}")]
    DuplicateOption { option: String },

    #[error("correct option is not one of the options: {option}")]
    CorrectOptionMissing { option: String },

    #[error("question set cannot be empty")]
    EmptySet,

    #[error("question id appears more than once: {id}")]
    DuplicateId { id: QuestionId },
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two options are given,
    /// an option repeats, or the correct option is not among the options.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_option = correct_option.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(QuestionError::DuplicateOption {
                    option: option.clone(),
                });
            }
        }

        if !seen.contains(correct_option.as_str()) {
            return Err(QuestionError::CorrectOptionMissing {
                option: correct_option,
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Exact comparison against the correct option.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_option == choice
    }
}

//
// ─── QUESTION SET ─────────────────────────────────────────────────────────────
//

/// Ordered, non-empty list of questions shared by every participant of a battle.
///
/// Cloning is cheap; the questions live behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Arc<[Question]>,
}

impl QuestionSet {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptySet` for an empty list and
    /// `QuestionError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        if questions.is_empty() {
            return Err(QuestionError::EmptySet);
        }
        let mut ids = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !ids.insert(question.id()) {
                return Err(QuestionError::DuplicateId { id: question.id() });
            }
        }
        Ok(Self {
            questions: questions.into(),
        })
    }

    /// The built-in balance-sheet basics set.
    #[must_use]
    pub fn financial_basics() -> Self {
        fn q(id: u64, prompt: &str, options: [&str; 4], correct: &str) -> Question {
            Question {
                id: QuestionId::new(id),
                prompt: prompt.to_owned(),
                options: options.iter().map(|o| (*o).to_owned()).collect(),
                correct_option: correct.to_owned(),
            }
        }

        let questions = vec![
            q(
                1,
                "What does a balance sheet show?",
                [
                    "Revenue and expenses",
                    "Assets, liabilities, and equity",
                    "Cash flow details",
                    "Market trends",
                ],
                "Assets, liabilities, and equity",
            ),
            q(
                2,
                "What is equity?",
                [
                    "Total debts of the company",
                    "Owners residual interest",
                    "Cash available for operations",
                    "Expenses incurred",
                ],
                "Owners residual interest",
            ),
            q(
                3,
                "Which section is not on a balance sheet?",
                ["Assets", "Liabilities", "Equity", "Revenue"],
                "Revenue",
            ),
        ];

        Self {
            questions: questions.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
