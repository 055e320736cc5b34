// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::models::course::Course;

/// A single multiple-choice question. Stored inside the quiz row as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i32,

    /// The text shown to the user.
    pub prompt: String,

    /// Ordered option labels.
    pub options: Vec<String>,

    /// Index into `options` of the correct answer.
    pub correct_option: usize,

    /// Shown after submission.
    pub explanation: Option<String>,
}

/// Represents the 'quizzes' table in the database.
/// At most one quiz exists per course.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Ordered question list, stored as a JSON array.
    pub questions: Json<Vec<Question>>,

    /// Optional time limit in minutes. No timer runs when absent.
    pub time_limit_minutes: Option<i32>,

    /// Percentage (0-100) required to pass.
    pub passing_score: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Quiz {
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Countdown length for an attempt, if this quiz is timed.
    /// Non-positive limits are treated as untimed.
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| minutes as u64 * 60)
    }

    pub fn public_questions(&self) -> Vec<PublicQuestion> {
        self.questions
            .iter()
            .map(|q| PublicQuestion {
                id: q.id,
                prompt: q.prompt.clone(),
                options: q.options.clone(),
            })
            .collect()
    }
}

/// DTO for sending a question to the client (excludes the answer and explanation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicQuestion {
    pub id: i32,
    pub prompt: String,
    pub options: Vec<String>,
}

/// DTO returned by the quiz loader.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizView {
    pub course: Course,
    pub quiz_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
    pub questions: Vec<PublicQuestion>,
}

impl QuizView {
    pub fn new(course: Course, quiz: &Quiz) -> Self {
        Self {
            course,
            quiz_id: quiz.id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            time_limit_minutes: quiz.time_limit_minutes,
            passing_score: quiz.passing_score,
            questions: quiz.public_questions(),
        }
    }
}

/// DTO for creating a quiz row.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuiz {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: i32,
}

fn validate_questions(questions: &[Question]) -> Result<(), validator::ValidationError> {
    if questions.is_empty() {
        return Err(validator::ValidationError::new("questions_cannot_be_empty"));
    }
    for q in questions {
        if q.options.len() < 2 {
            return Err(validator::ValidationError::new("question_needs_two_options"));
        }
        if q.correct_option >= q.options.len() {
            return Err(validator::ValidationError::new("correct_option_out_of_range"));
        }
    }
    Ok(())
}
