// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'enrollments' table: a user's membership in a course.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,

    /// Set once a passing quiz submission is recorded for this (user, course).
    pub completed: bool,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,

    pub enrolled_at: Option<chrono::DateTime<chrono::Utc>>,
}
