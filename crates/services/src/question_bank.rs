use std::path::Path;

use quiz_core::model::{Question, QuestionId, QuestionSet};
use serde::Deserialize;

use crate::error::QuestionBankError;

/// One entry of a question bank file.
///
/// ```json
/// { "id": 1, "question": "...", "options": ["a", "b"], "correctAnswer": "a" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionEntry {
    id: u64,
    question: String,
    options: Vec<String>,
    correct_answer: String,
}

/// Loads question sets from JSON.
pub struct QuestionBank;

impl QuestionBank {
    /// Parse and validate a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Json` for malformed input and
    /// `QuestionBankError::Question` when a question or the set is invalid.
    pub fn from_json_str(raw: &str) -> Result<QuestionSet, QuestionBankError> {
        let entries: Vec<QuestionEntry> = serde_json::from_str(raw)?;
        let questions = entries
            .into_iter()
            .map(|entry| {
                Question::new(
                    QuestionId::new(entry.id),
                    entry.question,
                    entry.options,
                    entry.correct_answer,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QuestionSet::new(questions)?)
    }

    /// Read a question bank file from disk.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Io` if the file cannot be read, otherwise
    /// the same errors as [`QuestionBank::from_json_str`].
    pub fn from_path(path: &Path) -> Result<QuestionSet, QuestionBankError> {
        let raw = std::fs::read_to_string(path)?;
        let set = Self::from_json_str(&raw)?;
        log::info!("loaded {} questions from {}", set.len(), path.display());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionError;

    #[test]
    fn parses_wire_shape() {
        let set = QuestionBank::from_json_str(
            r#"[
                {"id": 7, "question": "Cash is a", "options": ["asset", "liability"], "correctAnswer": "asset"},
                {"id": 8, "question": "Loans are", "options": ["asset", "liability"], "correctAnswer": "liability"}
            ]"#,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        let first = set.get(0).unwrap();
        assert_eq!(first.id(), QuestionId::new(7));
        assert!(first.is_correct("asset"));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let err = QuestionBank::from_json_str(
            r#"[{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": "c"}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            QuestionBankError::Question(QuestionError::CorrectOptionMissing { .. })
        ));
    }

    #[test]
    fn rejects_empty_bank() {
        let err = QuestionBank::from_json_str("[]").unwrap_err();
        assert!(matches!(err, QuestionBankError::Question(QuestionError::EmptySet)));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = QuestionBank::from_json_str("{").unwrap_err();
        assert!(matches!(err, QuestionBankError::Json(_)));
    }
}
