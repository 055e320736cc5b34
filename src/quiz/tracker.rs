// src/quiz/tracker.rs

//! Answer selection and question navigation for one attempt.

use crate::{error::AppError, models::submission::AnswerMap};

/// One selected option per question, keyed by question index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSelection {
    answers: AnswerMap,
}

impl AnswerSelection {
    /// Records `option` for `question`, replacing any earlier choice.
    pub fn select(
        &mut self,
        question: usize,
        option: usize,
        total_questions: usize,
        option_count: usize,
    ) -> Result<(), AppError> {
        if question >= total_questions {
            return Err(AppError::BadRequest(format!(
                "Question index {} out of range",
                question
            )));
        }
        if option >= option_count {
            return Err(AppError::BadRequest(format!(
                "Option index {} out of range",
                option
            )));
        }
        self.answers.insert(question, option);
        Ok(())
    }

    pub fn get(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    pub fn is_answered(&self, question: usize) -> bool {
        self.answers.contains_key(&question)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn as_map(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

/// Current question index, kept within `[0, total - 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Navigator {
    current: usize,
    total: usize,
}

impl Navigator {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.total
    }

    /// Moves forward one question. No-op on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Moves back one question. No-op on the first question.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_overwrites_previous_choice() {
        let mut answers = AnswerSelection::default();
        answers.select(0, 1, 5, 4).unwrap();
        answers.select(0, 3, 5, 4).unwrap();
        assert_eq!(answers.get(0), Some(3));
        assert_eq!(answers.answered_count(), 1);
    }

    #[test]
    fn selection_rejects_invalid_indices() {
        let mut answers = AnswerSelection::default();
        assert!(answers.select(5, 0, 5, 4).is_err());
        assert!(answers.select(0, 4, 5, 4).is_err());
        assert_eq!(answers.answered_count(), 0);
    }

    #[test]
    fn navigator_stays_in_bounds() {
        let mut nav = Navigator::new(3);
        assert!(!nav.previous());
        assert_eq!(nav.current(), 0);

        assert!(nav.next());
        assert!(nav.next());
        assert!(!nav.next());
        assert_eq!(nav.current(), 2);
        assert!(nav.is_last());

        assert!(nav.previous());
        nav.reset();
        assert_eq!(nav.current(), 0);
    }

    #[test]
    fn single_question_is_first_and_last() {
        let mut nav = Navigator::new(1);
        assert!(nav.is_first() && nav.is_last());
        assert!(!nav.next());
    }
}
