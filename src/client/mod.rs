// src/client/mod.rs

//! Typed HTTP client for the quiz and community endpoints.

pub mod feed;

use std::fmt;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::{
    models::{
        post::{FeedPost, FollowState, PostListParams, ReactionKind, ReactionState},
        quiz::QuizView,
    },
    quiz::attempt::AttemptSnapshot,
};

pub use feed::{FeedRemote, FeedView};

#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response (connect, timeout, decode).
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, message: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "request failed: {}", e),
            ClientError::Status { status, message } => write!(f, "{}: {}", status, message),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorize(request).send().await?;
        Ok(check(response).await?.json::<T>().await?)
    }

    pub async fn course_quiz(&self, course_id: Uuid) -> Result<QuizView, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/courses/{}/quiz", course_id))))
            .await
    }

    pub async fn start_attempt(&self, course_id: Uuid) -> Result<AttemptSnapshot, ClientError> {
        self.send(
            self.http
                .post(self.url(&format!("/api/courses/{}/quiz/attempts", course_id))),
        )
        .await
    }

    pub async fn attempt(&self, attempt_id: Uuid) -> Result<AttemptSnapshot, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/attempts/{}", attempt_id))))
            .await
    }

    pub async fn select_option(
        &self,
        attempt_id: Uuid,
        option_index: usize,
    ) -> Result<AttemptSnapshot, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/api/attempts/{}/answer", attempt_id)))
                .json(&json!({ "option_index": option_index })),
        )
        .await
    }

    async fn attempt_action(
        &self,
        attempt_id: Uuid,
        action: &str,
    ) -> Result<AttemptSnapshot, ClientError> {
        self.send(
            self.http
                .post(self.url(&format!("/api/attempts/{}/{}", attempt_id, action))),
        )
        .await
    }

    pub async fn next(&self, attempt_id: Uuid) -> Result<AttemptSnapshot, ClientError> {
        self.attempt_action(attempt_id, "next").await
    }

    pub async fn previous(&self, attempt_id: Uuid) -> Result<AttemptSnapshot, ClientError> {
        self.attempt_action(attempt_id, "previous").await
    }

    pub async fn submit(&self, attempt_id: Uuid) -> Result<AttemptSnapshot, ClientError> {
        self.attempt_action(attempt_id, "submit").await
    }

    pub async fn retake(&self, attempt_id: Uuid) -> Result<AttemptSnapshot, ClientError> {
        self.attempt_action(attempt_id, "retake").await
    }

    pub async fn delete_attempt(&self, attempt_id: Uuid) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/attempts/{}", attempt_id)));
        check(self.authorize(request).send().await?).await?;
        Ok(())
    }

    pub async fn list_posts(&self, params: &PostListParams) -> Result<Vec<FeedPost>, ClientError> {
        self.send(self.http.get(self.url("/api/community/posts")).query(params))
            .await
    }
}

/// Turns a non-success response into `ClientError::Status`, keeping the server's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl FeedRemote for ApiClient {
    async fn set_reaction(
        &self,
        post_id: Uuid,
        kind: ReactionKind,
        active: bool,
    ) -> Result<ReactionState, ClientError> {
        let segment = match kind {
            ReactionKind::Like => "like",
            ReactionKind::Bookmark => "bookmark",
        };
        let url = self.url(&format!("/api/community/posts/{}/{}", post_id, segment));
        let request = if active {
            self.http.put(url)
        } else {
            self.http.delete(url)
        };
        self.send(request).await
    }

    async fn set_follow(&self, user_id: Uuid, following: bool) -> Result<FollowState, ClientError> {
        let url = self.url(&format!("/api/community/users/{}/follow", user_id));
        let request = if following {
            self.http.put(url)
        } else {
            self.http.delete(url)
        };
        self.send(request).await
    }
}
