// src/quiz/recorder.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{
        quiz::Quiz,
        submission::{AnswerMap, NewSubmission, QuizResult},
    },
    store::QuizStore,
};

/// Notice shown next to the result when it could not be saved.
pub const SAVE_FAILED_NOTICE: &str =
    "Your result is shown below, but we could not save it. Please try again later.";

/// Notice shown when the result was saved but the course could not be marked complete.
pub const COMPLETION_FAILED_NOTICE: &str =
    "Your result was saved, but we could not mark the course as completed. Please try again later.";

/// What happened to a submission on the storage side.
/// Scoring never depends on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceOutcome {
    Recorded {
        submission_id: Uuid,
        enrollment_completed: bool,
    },
    /// The result row exists; updating the enrollment failed.
    CompletionFailed { submission_id: Uuid },
    /// No authenticated user; nothing was written.
    SkippedAnonymous,
    Failed,
}

impl PersistenceOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            PersistenceOutcome::Failed => Some(SAVE_FAILED_NOTICE),
            PersistenceOutcome::CompletionFailed { .. } => Some(COMPLETION_FAILED_NOTICE),
            _ => None,
        }
    }
}

/// Persists a submission and, for a passing one, completes the user's enrollment.
///
/// Storage errors are logged and folded into the outcome: `Failed` when the result
/// row could not be written, `CompletionFailed` when only the enrollment update failed.
pub async fn record_submission(
    store: &dyn QuizStore,
    user_id: Option<Uuid>,
    quiz: &Quiz,
    result: &QuizResult,
    answers: &AnswerMap,
) -> PersistenceOutcome {
    let Some(user_id) = user_id else {
        tracing::warn!(quiz_id = %quiz.id, "No authenticated user, quiz result not saved");
        return PersistenceOutcome::SkippedAnonymous;
    };

    let completed_at = Utc::now();

    let record = match store
        .insert_submission(NewSubmission {
            user_id,
            course_id: quiz.course_id,
            quiz_id: quiz.id,
            result: *result,
            answers: answers.clone(),
            completed_at,
        })
        .await
    {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(%user_id, quiz_id = %quiz.id, "Failed to save quiz result: {}", e);
            return PersistenceOutcome::Failed;
        }
    };

    tracing::info!(
        %user_id,
        quiz_id = %quiz.id,
        score = result.score,
        passed = result.passed,
        "Quiz result saved"
    );

    if !result.passed {
        return PersistenceOutcome::Recorded {
            submission_id: record.id,
            enrollment_completed: false,
        };
    }

    let enrollment = match store.find_enrollment(user_id, quiz.course_id).await {
        Ok(enrollment) => enrollment,
        Err(e) => {
            tracing::error!(
                %user_id,
                course_id = %quiz.course_id,
                "Failed to fetch enrollment: {}",
                e
            );
            return PersistenceOutcome::CompletionFailed {
                submission_id: record.id,
            };
        }
    };

    let Some(enrollment) = enrollment else {
        tracing::debug!(%user_id, course_id = %quiz.course_id, "No enrollment to complete");
        return PersistenceOutcome::Recorded {
            submission_id: record.id,
            enrollment_completed: false,
        };
    };

    if let Err(e) = store
        .mark_enrollment_completed(enrollment.id, completed_at)
        .await
    {
        tracing::error!(enrollment_id = %enrollment.id, "Failed to complete enrollment: {}", e);
        return PersistenceOutcome::CompletionFailed {
            submission_id: record.id,
        };
    }

    PersistenceOutcome::Recorded {
        submission_id: record.id,
        enrollment_completed: true,
    }
}
