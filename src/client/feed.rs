// src/client/feed.rs

//! Local feed state with optimistic like/bookmark/follow toggles.
//!
//! A toggle is applied to the local view first, then sent to the server.
//! On success the view takes the server's state; on failure the exact
//! previous state is put back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    client::ClientError,
    models::post::{FeedPost, FollowState, ReactionKind, ReactionState},
};

/// The server side of a feed toggle.
#[async_trait]
pub trait FeedRemote: Send + Sync {
    async fn set_reaction(
        &self,
        post_id: Uuid,
        kind: ReactionKind,
        active: bool,
    ) -> Result<ReactionState, ClientError>;

    async fn set_follow(&self, user_id: Uuid, following: bool) -> Result<FollowState, ClientError>;
}

/// A like/bookmark already applied locally and awaiting the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReaction {
    pub post_id: Uuid,
    pub kind: ReactionKind,
    pub target: bool,
    previous_active: bool,
    previous_count: i32,
}

/// A follow change already applied locally and awaiting the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFollow {
    pub author_id: Uuid,
    pub target: bool,
    previous: Vec<(Uuid, bool)>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedView {
    posts: Vec<FeedPost>,
}

fn reaction_fields(post: &mut FeedPost, kind: ReactionKind) -> (&mut bool, &mut i32) {
    match kind {
        ReactionKind::Like => (&mut post.is_liked, &mut post.likes_count),
        ReactionKind::Bookmark => (&mut post.is_bookmarked, &mut post.bookmarks_count),
    }
}

impl FeedView {
    pub fn new(posts: Vec<FeedPost>) -> Self {
        Self { posts }
    }

    pub fn posts(&self) -> &[FeedPost] {
        &self.posts
    }

    pub fn post(&self, post_id: Uuid) -> Option<&FeedPost> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Appends the next page, skipping posts already shown.
    pub fn extend(&mut self, page: Vec<FeedPost>) {
        for post in page {
            if self.post(post.id).is_none() {
                self.posts.push(post);
            }
        }
    }

    /// Flips a reaction locally. `None` if the post is not in the view.
    pub fn begin_reaction(&mut self, post_id: Uuid, kind: ReactionKind) -> Option<PendingReaction> {
        let post = self.posts.iter_mut().find(|p| p.id == post_id)?;
        let (active, count) = reaction_fields(post, kind);

        let pending = PendingReaction {
            post_id,
            kind,
            target: !*active,
            previous_active: *active,
            previous_count: *count,
        };

        *active = pending.target;
        *count = if pending.target {
            *count + 1
        } else {
            (*count - 1).max(0)
        };
        Some(pending)
    }

    /// Reconciles a pending reaction with the server's answer.
    pub fn settle_reaction(
        &mut self,
        pending: PendingReaction,
        outcome: Result<ReactionState, ClientError>,
    ) -> Result<ReactionState, ClientError> {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == pending.post_id) else {
            return outcome;
        };
        let (active, count) = reaction_fields(post, pending.kind);

        match &outcome {
            Ok(state) => {
                *active = state.active;
                *count = state.count;
            }
            Err(e) => {
                tracing::warn!(
                    post_id = %pending.post_id,
                    kind = ?pending.kind,
                    "Rolling back reaction: {}",
                    e
                );
                *active = pending.previous_active;
                *count = pending.previous_count;
            }
        }
        outcome
    }

    /// Flips following for every post by `author_id`.
    pub fn begin_follow(&mut self, author_id: Uuid) -> Option<PendingFollow> {
        let previous: Vec<(Uuid, bool)> = self
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .map(|p| (p.id, p.follows_author))
            .collect();
        let (_, currently) = *previous.first()?;

        let target = !currently;
        for post in self.posts.iter_mut().filter(|p| p.author_id == author_id) {
            post.follows_author = target;
        }

        Some(PendingFollow {
            author_id,
            target,
            previous,
        })
    }

    pub fn settle_follow(
        &mut self,
        pending: PendingFollow,
        outcome: Result<FollowState, ClientError>,
    ) -> Result<FollowState, ClientError> {
        match &outcome {
            Ok(state) => {
                for post in self.posts.iter_mut().filter(|p| p.author_id == pending.author_id) {
                    post.follows_author = state.following;
                }
            }
            Err(e) => {
                tracing::warn!(author_id = %pending.author_id, "Rolling back follow: {}", e);
                for (post_id, was_following) in &pending.previous {
                    if let Some(post) = self.posts.iter_mut().find(|p| p.id == *post_id) {
                        post.follows_author = *was_following;
                    }
                }
            }
        }
        outcome
    }

    async fn toggle_reaction(
        &mut self,
        remote: &dyn FeedRemote,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> Result<ReactionState, ClientError> {
        let Some(pending) = self.begin_reaction(post_id, kind) else {
            return Err(ClientError::Status {
                status: 404,
                message: "Post not in feed".to_string(),
            });
        };
        let outcome = remote.set_reaction(post_id, kind, pending.target).await;
        self.settle_reaction(pending, outcome)
    }

    pub async fn toggle_like(
        &mut self,
        remote: &dyn FeedRemote,
        post_id: Uuid,
    ) -> Result<ReactionState, ClientError> {
        self.toggle_reaction(remote, post_id, ReactionKind::Like).await
    }

    pub async fn toggle_bookmark(
        &mut self,
        remote: &dyn FeedRemote,
        post_id: Uuid,
    ) -> Result<ReactionState, ClientError> {
        self.toggle_reaction(remote, post_id, ReactionKind::Bookmark)
            .await
    }

    pub async fn toggle_follow(
        &mut self,
        remote: &dyn FeedRemote,
        author_id: Uuid,
    ) -> Result<FollowState, ClientError> {
        let Some(pending) = self.begin_follow(author_id) else {
            return Err(ClientError::Status {
                status: 404,
                message: "Author not in feed".to_string(),
            });
        };
        let outcome = remote.set_follow(author_id, pending.target).await;
        self.settle_follow(pending, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::Utc;

    use super::*;

    /// Answers like a server that holds `count` likes from other users.
    struct FakeRemote {
        fail: AtomicBool,
        others: i32,
    }

    impl FakeRemote {
        fn new(others: i32) -> Self {
            Self {
                fail: AtomicBool::new(false),
                others,
            }
        }

        fn check(&self) -> Result<(), ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl FeedRemote for FakeRemote {
        async fn set_reaction(
            &self,
            post_id: Uuid,
            kind: ReactionKind,
            active: bool,
        ) -> Result<ReactionState, ClientError> {
            self.check()?;
            Ok(ReactionState {
                post_id,
                kind,
                active,
                count: self.others + active as i32,
            })
        }

        async fn set_follow(
            &self,
            user_id: Uuid,
            following: bool,
        ) -> Result<FollowState, ClientError> {
            self.check()?;
            Ok(FollowState { user_id, following })
        }
    }

    fn post(author_id: Uuid, likes: i32) -> FeedPost {
        FeedPost {
            id: Uuid::new_v4(),
            author_id,
            title: "title".to_string(),
            content: "content".to_string(),
            created_at: Utc::now(),
            likes_count: likes,
            bookmarks_count: 0,
            is_liked: false,
            is_bookmarked: false,
            follows_author: false,
        }
    }

    #[test]
    fn begin_applies_change_before_server_answers() {
        let p = post(Uuid::new_v4(), 3);
        let mut view = FeedView::new(vec![p.clone()]);

        let pending = view.begin_reaction(p.id, ReactionKind::Like).unwrap();
        assert!(pending.target);
        assert!(view.post(p.id).unwrap().is_liked);
        assert_eq!(view.post(p.id).unwrap().likes_count, 4);
    }

    #[tokio::test]
    async fn success_takes_server_count() {
        let p = post(Uuid::new_v4(), 3);
        let mut view = FeedView::new(vec![p.clone()]);
        // The server has seen more likes than the local view.
        let remote = FakeRemote::new(7);

        let state = view.toggle_like(&remote, p.id).await.unwrap();
        assert_eq!(state.count, 8);
        assert_eq!(view.post(p.id).unwrap().likes_count, 8);
        assert!(view.post(p.id).unwrap().is_liked);
    }

    #[tokio::test]
    async fn failure_rolls_back_exactly() {
        let p = post(Uuid::new_v4(), 3);
        let mut view = FeedView::new(vec![p.clone()]);
        let remote = FakeRemote::new(3);
        remote.fail.store(true, Ordering::SeqCst);

        assert!(view.toggle_bookmark(&remote, p.id).await.is_err());
        assert!(view.toggle_like(&remote, p.id).await.is_err());

        assert_eq!(view.post(p.id).unwrap(), &p);
    }

    #[tokio::test]
    async fn follow_applies_to_every_post_by_author() {
        let author = Uuid::new_v4();
        let mut view = FeedView::new(vec![
            post(author, 0),
            post(Uuid::new_v4(), 0),
            post(author, 0),
        ]);
        let remote = FakeRemote::new(0);

        let state = view.toggle_follow(&remote, author).await.unwrap();
        assert!(state.following);
        let flags: Vec<bool> = view.posts().iter().map(|p| p.follows_author).collect();
        assert_eq!(flags, vec![true, false, true]);

        remote.fail.store(true, Ordering::SeqCst);
        assert!(view.toggle_follow(&remote, author).await.is_err());
        let flags: Vec<bool> = view.posts().iter().map(|p| p.follows_author).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[tokio::test]
    async fn unknown_post_is_an_error_without_remote_call() {
        let mut view = FeedView::default();
        let remote = FakeRemote::new(0);
        assert!(view.toggle_like(&remote, Uuid::new_v4()).await.is_err());
    }

    #[test]
    fn extend_skips_duplicates() {
        let p = post(Uuid::new_v4(), 0);
        let mut view = FeedView::new(vec![p.clone()]);
        view.extend(vec![p.clone(), post(Uuid::new_v4(), 0)]);
        assert_eq!(view.posts().len(), 2);
    }
}
