// src/models/submission.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// Question index -> selected option index.
pub type AnswerMap = BTreeMap<usize, usize>;

/// Derived outcome of one attempt. Recomputed from answers + quiz, never stored on its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuizResult {
    /// 0-100, unrounded.
    pub score: f64,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub passed: bool,
}

/// Represents the 'quiz_results' table in the database.
/// One row per submit action; retakes add new rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub quiz_id: Uuid,
    pub score: f64,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub passed: bool,
    pub answers: Json<AnswerMap>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub quiz_id: Uuid,
    pub result: QuizResult,
    pub answers: AnswerMap,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}
