// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        course::{Course, Enrollment},
        post::{FeedPost, FollowState, ReactionKind, ReactionState},
        quiz::{NewQuiz, Quiz},
        submission::{NewSubmission, SubmissionRecord},
    },
    store::QuizStore,
};

/// `QuizStore` backed by Postgres. The schema comes from `migrations/`.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Logs the failing operation and wraps the error.
fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::InternalServerError(e.to_string())
    }
}

/// (join table, counter column) for a reaction kind.
fn reaction_columns(kind: ReactionKind) -> (&'static str, &'static str) {
    match kind {
        ReactionKind::Like => ("post_likes", "likes_count"),
        ReactionKind::Bookmark => ("post_bookmarks", "bookmarks_count"),
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn fetch_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError> {
        sqlx::query_as::<_, Course>(
            "SELECT id, title, description, created_at FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch course"))
    }

    async fn fetch_quiz_for_course(&self, course_id: Uuid) -> Result<Option<Quiz>, AppError> {
        sqlx::query_as::<_, Quiz>(
            r#"
            SELECT
                id, course_id, title, description, questions,
                time_limit_minutes, passing_score, created_at
            FROM quizzes
            WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch quiz"))
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let course_id = quiz.course_id;

        // A concurrent seed for the same course loses the race and reads the winner's row.
        sqlx::query(
            r#"
            INSERT INTO quizzes
                (id, course_id, title, description, questions, time_limit_minutes, passing_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (course_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(Json(&quiz.questions))
        .bind(quiz.time_limit_minutes)
        .bind(quiz.passing_score)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert quiz"))?;

        self.fetch_quiz_for_course(course_id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Quiz missing after insert".to_string()))
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<SubmissionRecord, AppError> {
        sqlx::query_as::<_, SubmissionRecord>(
            r#"
            INSERT INTO quiz_results
                (id, user_id, course_id, quiz_id, score, correct_answers,
                 total_questions, passed, answers, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id, user_id, course_id, quiz_id, score, correct_answers,
                total_questions, passed, answers, completed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(submission.user_id)
        .bind(submission.course_id)
        .bind(submission.quiz_id)
        .bind(submission.result.score)
        .bind(submission.result.correct_answers as i32)
        .bind(submission.result.total_questions as i32)
        .bind(submission.result.passed)
        .bind(Json(&submission.answers))
        .bind(submission.completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to insert quiz result"))
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, user_id, course_id, completed, completed_at, enrolled_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch enrollment"))
    }

    async fn mark_enrollment_completed(
        &self,
        enrollment_id: Uuid,
        completed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE enrollments SET completed = TRUE, completed_at = $2 WHERE id = $1")
            .bind(enrollment_id)
            .bind(completed_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to mark enrollment completed"))?;
        Ok(())
    }

    async fn list_posts(
        &self,
        viewer: Option<Uuid>,
        cursor: Option<chrono::DateTime<chrono::Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedPost>, AppError> {
        sqlx::query_as::<_, FeedPost>(
            r#"
            SELECT
                p.id, p.author_id, p.title, p.content, p.created_at,
                p.likes_count, p.bookmarks_count,
                EXISTS (
                    SELECT 1 FROM post_likes l WHERE l.post_id = p.id AND l.user_id = $1
                ) AS is_liked,
                EXISTS (
                    SELECT 1 FROM post_bookmarks b WHERE b.post_id = p.id AND b.user_id = $1
                ) AS is_bookmarked,
                EXISTS (
                    SELECT 1 FROM user_follows f
                    WHERE f.followee_id = p.author_id AND f.follower_id = $1
                ) AS follows_author
            FROM posts p
            WHERE p.deleted_at IS NULL
              AND ($2::TIMESTAMPTZ IS NULL OR p.created_at < $2)
            ORDER BY p.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(viewer)
        .bind(cursor)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list posts"))
    }

    async fn set_reaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
        active: bool,
    ) -> Result<ReactionState, AppError> {
        let (table, column) = reaction_columns(kind);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin reaction transaction"))?;

        let exists = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM posts WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let (mutate_sql, counter_sql) = if active {
            (
                format!(
                    "INSERT INTO {} (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                    table
                ),
                format!("UPDATE posts SET {0} = {0} + 1 WHERE id = $1", column),
            )
        } else {
            (
                format!("DELETE FROM {} WHERE user_id = $1 AND post_id = $2", table),
                format!("UPDATE posts SET {0} = GREATEST(0, {0} - 1) WHERE id = $1", column),
            )
        };

        let changed = sqlx::query(&mutate_sql)
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update reaction"))?
            .rows_affected();

        // Counter only moves when the join row actually changed.
        if changed > 0 {
            sqlx::query(&counter_sql)
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to update reaction counter"))?;
        }

        let count_sql = format!("SELECT {} FROM posts WHERE id = $1", column);
        let count = sqlx::query_scalar::<_, i32>(&count_sql)
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReactionState {
            post_id,
            kind,
            active,
            count,
        })
    }

    async fn set_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
        following: bool,
    ) -> Result<FollowState, AppError> {
        let sql = if following {
            r#"
            INSERT INTO user_follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#
        } else {
            "DELETE FROM user_follows WHERE follower_id = $1 AND followee_id = $2"
        };

        sqlx::query(sql)
            .bind(follower_id)
            .bind(followee_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update follow"))?;

        Ok(FollowState {
            user_id: followee_id,
            following,
        })
    }
}
