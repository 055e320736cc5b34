// src/store/memory.rs

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
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

#[derive(Default)]
struct Tables {
    courses: HashMap<Uuid, Course>,
    quizzes: HashMap<Uuid, Quiz>,
    results: Vec<SubmissionRecord>,
    enrollments: HashMap<Uuid, Enrollment>,
    posts: HashMap<Uuid, FeedPost>,
    likes: HashSet<(Uuid, Uuid)>,
    bookmarks: HashSet<(Uuid, Uuid)>,
    follows: HashSet<(Uuid, Uuid)>,
}

/// In-process `QuizStore`.
///
/// Used when no `DATABASE_URL` is configured and by the test suites.
/// Reads and writes can be switched to fail to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError("store unavailable".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError("store unavailable".to_string()));
        }
        Ok(())
    }

    pub async fn add_course(&self, title: &str) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            created_at: Some(Utc::now()),
        };
        self.tables
            .write()
            .await
            .courses
            .insert(course.id, course.clone());
        course
    }

    pub async fn add_enrollment(&self, user_id: Uuid, course_id: Uuid) -> Enrollment {
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            completed: false,
            completed_at: None,
            enrolled_at: Some(Utc::now()),
        };
        self.tables
            .write()
            .await
            .enrollments
            .insert(enrollment.id, enrollment.clone());
        enrollment
    }

    pub async fn add_post(&self, author_id: Uuid, title: &str, content: &str) -> FeedPost {
        let post = FeedPost {
            id: Uuid::new_v4(),
            author_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            likes_count: 0,
            bookmarks_count: 0,
            is_liked: false,
            is_bookmarked: false,
            follows_author: false,
        };
        self.tables.write().await.posts.insert(post.id, post.clone());
        post
    }

    pub async fn enrollment(&self, enrollment_id: Uuid) -> Option<Enrollment> {
        self.tables
            .read()
            .await
            .enrollments
            .get(&enrollment_id)
            .cloned()
    }

    pub async fn submissions(&self) -> Vec<SubmissionRecord> {
        self.tables.read().await.results.clone()
    }

    pub async fn quiz_count(&self) -> usize {
        self.tables.read().await.quizzes.len()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn fetch_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError> {
        self.check_read()?;
        Ok(self.tables.read().await.courses.get(&course_id).cloned())
    }

    async fn fetch_quiz_for_course(&self, course_id: Uuid) -> Result<Option<Quiz>, AppError> {
        self.check_read()?;
        Ok(self
            .tables
            .read()
            .await
            .quizzes
            .values()
            .find(|q| q.course_id == course_id)
            .cloned())
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.quizzes.values().find(|q| q.course_id == quiz.course_id) {
            return Ok(existing.clone());
        }

        let row = Quiz {
            id: Uuid::new_v4(),
            course_id: quiz.course_id,
            title: quiz.title,
            description: quiz.description,
            questions: Json(quiz.questions),
            time_limit_minutes: quiz.time_limit_minutes,
            passing_score: quiz.passing_score,
            created_at: Some(Utc::now()),
        };
        tables.quizzes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<SubmissionRecord, AppError> {
        self.check_write()?;
        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            user_id: submission.user_id,
            course_id: submission.course_id,
            quiz_id: submission.quiz_id,
            score: submission.result.score,
            correct_answers: submission.result.correct_answers as i32,
            total_questions: submission.result.total_questions as i32,
            passed: submission.result.passed,
            answers: Json(submission.answers),
            completed_at: submission.completed_at,
        };
        self.tables.write().await.results.push(record.clone());
        Ok(record)
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError> {
        self.check_read()?;
        Ok(self
            .tables
            .read()
            .await
            .enrollments
            .values()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn mark_enrollment_completed(
        &self,
        enrollment_id: Uuid,
        completed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError> {
        self.check_write()?;
        if let Some(enrollment) = self.tables.write().await.enrollments.get_mut(&enrollment_id) {
            enrollment.completed = true;
            enrollment.completed_at = Some(completed_at);
        }
        Ok(())
    }

    async fn list_posts(
        &self,
        viewer: Option<Uuid>,
        cursor: Option<chrono::DateTime<chrono::Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedPost>, AppError> {
        self.check_read()?;
        let tables = self.tables.read().await;

        let mut posts: Vec<FeedPost> = tables
            .posts
            .values()
            .filter(|p| cursor.is_none_or(|c| p.created_at < c))
            .cloned()
            .map(|mut p| {
                if let Some(viewer) = viewer {
                    p.is_liked = tables.likes.contains(&(viewer, p.id));
                    p.is_bookmarked = tables.bookmarks.contains(&(viewer, p.id));
                    p.follows_author = tables.follows.contains(&(viewer, p.author_id));
                }
                p
            })
            .collect();

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn set_reaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
        active: bool,
    ) -> Result<ReactionState, AppError> {
        self.check_write()?;
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if !tables.posts.contains_key(&post_id) {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let set = match kind {
            ReactionKind::Like => &mut tables.likes,
            ReactionKind::Bookmark => &mut tables.bookmarks,
        };
        let changed = if active {
            set.insert((user_id, post_id))
        } else {
            set.remove(&(user_id, post_id))
        };

        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Err(AppError::NotFound("Post not found".to_string()));
        };
        let counter = match kind {
            ReactionKind::Like => &mut post.likes_count,
            ReactionKind::Bookmark => &mut post.bookmarks_count,
        };
        if changed {
            *counter = if active { *counter + 1 } else { (*counter - 1).max(0) };
        }

        Ok(ReactionState {
            post_id,
            kind,
            active,
            count: *counter,
        })
    }

    async fn set_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
        following: bool,
    ) -> Result<FollowState, AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        if following {
            tables.follows.insert((follower_id, followee_id));
        } else {
            tables.follows.remove(&(follower_id, followee_id));
        }
        Ok(FollowState {
            user_id: followee_id,
            following,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reaction_counter_ignores_repeated_state() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let post = store.add_post(author, "hello", "world").await;

        let first = store
            .set_reaction(viewer, post.id, ReactionKind::Like, true)
            .await
            .unwrap();
        let again = store
            .set_reaction(viewer, post.id, ReactionKind::Like, true)
            .await
            .unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(again.count, 1);

        let removed = store
            .set_reaction(viewer, post.id, ReactionKind::Like, false)
            .await
            .unwrap();
        assert_eq!(removed.count, 0);
        assert!(!removed.active);
    }

    #[tokio::test]
    async fn list_posts_fills_viewer_flags() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let post = store.add_post(author, "hello", "world").await;

        store
            .set_reaction(viewer, post.id, ReactionKind::Bookmark, true)
            .await
            .unwrap();
        store.set_follow(viewer, author, true).await.unwrap();

        let seen = store.list_posts(Some(viewer), None, 10).await.unwrap();
        assert!(seen[0].is_bookmarked);
        assert!(seen[0].follows_author);
        assert!(!seen[0].is_liked);

        let anonymous = store.list_posts(None, None, 10).await.unwrap();
        assert!(!anonymous[0].is_bookmarked);
    }

    #[tokio::test]
    async fn insert_quiz_keeps_first_row_per_course() {
        let store = MemoryStore::new();
        let course = store.add_course("Rust").await;
        let mut quiz = crate::quiz::sample::sample_quiz(course.id);

        let first = store.insert_quiz(quiz.clone()).await.unwrap();
        quiz.title = "Other".to_string();
        let second = store.insert_quiz(quiz).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.quiz_count().await, 1);
    }
}
