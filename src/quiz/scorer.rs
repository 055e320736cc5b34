// src/quiz/scorer.rs

use crate::models::{
    quiz::Question,
    submission::{AnswerMap, QuizResult},
};

/// Scores an attempt.
///
/// Pure: the same questions and answers always give the same result.
/// Unanswered questions count as wrong. The score is not rounded here.
pub fn score(questions: &[Question], answers: &AnswerMap, passing_score: i32) -> QuizResult {
    let total_questions = questions.len();

    let correct_answers = questions
        .iter()
        .enumerate()
        .filter(|(index, q)| answers.get(index) == Some(&q.correct_option))
        .count();

    let score = if total_questions == 0 {
        0.0
    } else {
        100.0 * correct_answers as f64 / total_questions as f64
    };

    // Exact comparison: correct / total >= passing / 100.
    let passed = correct_answers as i64 * 100 >= passing_score as i64 * total_questions as i64
        && (total_questions > 0 || passing_score <= 0);

    QuizResult {
        score,
        correct_answers,
        total_questions,
        passed,
    }
}
