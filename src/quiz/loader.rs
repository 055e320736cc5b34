// src/quiz/loader.rs

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{course::Course, quiz::Quiz},
    quiz::sample::sample_quiz,
    store::QuizStore,
};

/// Whether a course with no quiz gets the sample quiz on first access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    SeedSample,
    NoSeed,
}

/// Returns the course and its quiz, seeding the sample quiz when the course has none.
///
/// Lookup and seed failures become `AppError::QuizLoad`; a course that still has no
/// usable quiz becomes `AppError::QuizAbsent`.
pub async fn load_quiz(
    store: &dyn QuizStore,
    course_id: Uuid,
    policy: SeedPolicy,
) -> Result<(Course, Quiz), AppError> {
    let load_failed = |e: AppError| AppError::QuizLoad {
        course_id,
        message: e.to_string(),
    };

    let course = store
        .fetch_course(course_id)
        .await
        .map_err(load_failed)?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let quiz = match store
        .fetch_quiz_for_course(course_id)
        .await
        .map_err(load_failed)?
    {
        Some(quiz) => quiz,
        None if policy == SeedPolicy::SeedSample => {
            tracing::info!(%course_id, "No quiz for course, seeding sample quiz");
            store
                .insert_quiz(sample_quiz(course_id))
                .await
                .map_err(load_failed)?
        }
        None => return Err(AppError::QuizAbsent { course_id }),
    };

    if quiz.questions.is_empty() {
        return Err(AppError::QuizAbsent { course_id });
    }

    Ok((course, quiz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seeds_once_per_course() {
        let store = MemoryStore::new();
        let course = store.add_course("Rust").await;

        let (_, first) = load_quiz(&store, course.id, SeedPolicy::SeedSample)
            .await
            .unwrap();
        let (loaded_course, second) = load_quiz(&store, course.id, SeedPolicy::SeedSample)
            .await
            .unwrap();

        assert_eq!(loaded_course.id, course.id);
        assert_eq!(first.id, second.id);
        assert_eq!(first.total_questions(), 5);
        assert_eq!(store.quiz_count().await, 1);
    }

    #[tokio::test]
    async fn each_course_gets_its_own_quiz() {
        let store = MemoryStore::new();
        let a = store.add_course("A").await;
        let b = store.add_course("B").await;

        let (_, quiz_a) = load_quiz(&store, a.id, SeedPolicy::SeedSample).await.unwrap();
        let (_, quiz_b) = load_quiz(&store, b.id, SeedPolicy::SeedSample).await.unwrap();

        assert_ne!(quiz_a.id, quiz_b.id);
        assert_eq!(quiz_b.course_id, b.id);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let store = MemoryStore::new();
        let err = load_quiz(&store, Uuid::new_v4(), SeedPolicy::SeedSample)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_quiz_without_seeding_is_absent() {
        let store = MemoryStore::new();
        let course = store.add_course("Rust").await;
        let err = load_quiz(&store, course.id, SeedPolicy::NoSeed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuizAbsent { .. }));
    }

    #[tokio::test]
    async fn store_failure_is_a_load_error() {
        let store = MemoryStore::new();
        let course = store.add_course("Rust").await;
        store.fail_reads(true);

        let err = load_quiz(&store, course.id, SeedPolicy::SeedSample)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuizLoad { .. }));
    }

    #[tokio::test]
    async fn seed_failure_is_a_load_error() {
        let store = MemoryStore::new();
        let course = store.add_course("Rust").await;
        store.fail_writes(true);

        let err = load_quiz(&store, course.id, SeedPolicy::SeedSample)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuizLoad { .. }));
    }
}
