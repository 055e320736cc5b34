// src/quiz/registry.rs

use std::{
    collections::HashMap,
    ops::ControlFlow,
    sync::{Arc, Weak},
};

use tokio::{
    sync::{Mutex, RwLock},
    time::{Duration, Instant},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::quiz::Quiz,
    quiz::{
        attempt::{AttemptSnapshot, QuizAttempt, QuizPhase, SubmitTrigger},
        recorder::record_submission,
        timer::{Tick, TimerHandle, spawn_periodic, spawn_ticker},
    },
    store::QuizStore,
};

/// How often the sweeper started from `main` looks for stale attempts.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// How long attempts stay in memory without being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Completed attempts are dropped this long after their last use.
    pub completed_grace: Duration,
    /// Unfinished attempts without a running countdown are dropped after this much inactivity.
    pub idle_ttl: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            completed_grace: Duration::from_secs(15 * 60),
            idle_ttl: Duration::from_secs(2 * 60 * 60),
        }
    }
}

/// An attempt plus the ticker driving its countdown.
struct LiveAttempt {
    attempt: QuizAttempt,
    timer: Option<TimerHandle>,
    touched: Instant,
}

impl LiveAttempt {
    fn touch(&mut self) {
        self.touched = Instant::now();
    }

    /// Attempts owned by a user only accept that user; anonymous ones accept anyone.
    fn authorize(&self, viewer: Option<Uuid>) -> Result<(), AppError> {
        match self.attempt.user_id() {
            Some(owner) if viewer != Some(owner) => Err(AppError::Forbidden(
                "This attempt belongs to another user".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn is_stale(&self, now: Instant, retention: &RetentionPolicy) -> bool {
        let idle = now.saturating_duration_since(self.touched);
        match self.attempt.phase() {
            QuizPhase::Completed => idle >= retention.completed_grace,
            // A running countdown ends the attempt on its own.
            _ if self.timer.is_some() => false,
            _ => idle >= retention.idle_ttl,
        }
    }
}

type SharedAttempt = Arc<Mutex<LiveAttempt>>;

/// Attempts currently held by the service, keyed by attempt id.
///
/// Each attempt is locked on its own; one user's submission never blocks another's.
/// Stale attempts are removed by `sweep`, see `RetentionPolicy`.
#[derive(Clone)]
pub struct AttemptRegistry {
    attempts: Arc<RwLock<HashMap<Uuid, SharedAttempt>>>,
    store: Arc<dyn QuizStore>,
    retention: RetentionPolicy,
}

impl AttemptRegistry {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self::with_retention(store, RetentionPolicy::default())
    }

    pub fn with_retention(store: Arc<dyn QuizStore>, retention: RetentionPolicy) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            store,
            retention,
        }
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.attempts.read().await.is_empty()
    }

    async fn get(&self, attempt_id: Uuid) -> Result<SharedAttempt, AppError> {
        self.attempts
            .read()
            .await
            .get(&attempt_id)
            .cloned()
            .ok_or(AppError::NotFound("Attempt not found".to_string()))
    }

    /// Creates an attempt, starts it and arms its timer when the quiz is timed.
    pub async fn start(
        &self,
        quiz: Arc<Quiz>,
        user_id: Option<Uuid>,
    ) -> Result<AttemptSnapshot, AppError> {
        let mut attempt = QuizAttempt::new(quiz, user_id);
        attempt.start()?;
        let attempt_id = attempt.id();

        tracing::info!(
            %attempt_id,
            quiz_id = %attempt.quiz().id,
            timed = attempt.is_timed(),
            "Quiz attempt started"
        );

        let shared = Arc::new(Mutex::new(LiveAttempt {
            attempt,
            timer: None,
            touched: Instant::now(),
        }));

        let snapshot = {
            let mut live = shared.lock().await;
            self.arm_timer(&shared, &mut live);
            live.attempt.snapshot()
        };

        self.attempts.write().await.insert(attempt_id, shared);
        Ok(snapshot)
    }

    pub async fn snapshot(
        &self,
        attempt_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<AttemptSnapshot, AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;
        live.touch();
        Ok(live.attempt.snapshot())
    }

    pub async fn select_option(
        &self,
        attempt_id: Uuid,
        viewer: Option<Uuid>,
        option: usize,
    ) -> Result<AttemptSnapshot, AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;
        live.touch();
        live.attempt.select_option(option)?;
        Ok(live.attempt.snapshot())
    }

    pub async fn next(
        &self,
        attempt_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<AttemptSnapshot, AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;
        live.touch();
        live.attempt.next()?;
        Ok(live.attempt.snapshot())
    }

    pub async fn previous(
        &self,
        attempt_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<AttemptSnapshot, AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;
        live.touch();
        live.attempt.previous()?;
        Ok(live.attempt.snapshot())
    }

    /// User-initiated submission.
    pub async fn submit(
        &self,
        attempt_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<AttemptSnapshot, AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;
        finish_submission(self.store.as_ref(), &mut live, SubmitTrigger::User).await
    }

    pub async fn retake(
        &self,
        attempt_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<AttemptSnapshot, AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;
        live.touch();
        live.attempt.retake()?;
        self.arm_timer(&shared, &mut live);

        tracing::info!(%attempt_id, "Quiz attempt retaken");
        Ok(live.attempt.snapshot())
    }

    /// Drops the attempt. Its timer, if any, is cancelled with it.
    pub async fn remove(&self, attempt_id: Uuid, viewer: Option<Uuid>) -> Result<(), AppError> {
        let shared = self.get(attempt_id).await?;
        let mut live = shared.lock().await;
        live.authorize(viewer)?;

        self.attempts.write().await.remove(&attempt_id);
        if let Some(timer) = live.timer.take() {
            timer.cancel();
        }
        Ok(())
    }

    /// Removes attempts that outlived the retention policy. Returns how many were removed.
    ///
    /// Attempts locked by an in-flight request are skipped until the next sweep.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();

        attempts.retain(|attempt_id, shared| match shared.try_lock() {
            Ok(mut live) if live.is_stale(now, &self.retention) => {
                if let Some(timer) = live.timer.take() {
                    timer.cancel();
                }
                tracing::debug!(%attempt_id, phase = ?live.attempt.phase(), "Evicting attempt");
                false
            }
            _ => true,
        });

        before - attempts.len()
    }

    /// Runs `sweep` every `period` until the returned handle is dropped.
    pub fn spawn_sweeper(&self, period: Duration) -> TimerHandle {
        let registry = self.clone();
        spawn_periodic(period, move || {
            let registry = registry.clone();
            async move {
                let evicted = registry.sweep().await;
                if evicted > 0 {
                    tracing::info!(evicted, "Evicted stale quiz attempts");
                }
                ControlFlow::Continue(())
            }
        })
    }

    /// Replaces the attempt's ticker with a fresh one when its countdown is running.
    fn arm_timer(&self, shared: &SharedAttempt, live: &mut LiveAttempt) {
        if let Some(old) = live.timer.take() {
            old.cancel();
        }
        if !live.attempt.is_timed() {
            return;
        }

        let weak: Weak<Mutex<LiveAttempt>> = Arc::downgrade(shared);
        let store = self.store.clone();

        live.timer = Some(spawn_ticker(move || {
            let weak = weak.clone();
            let store = store.clone();
            async move {
                let Some(shared) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                let mut live = shared.lock().await;
                match live.attempt.tick() {
                    Tick::Running(_) => ControlFlow::Continue(()),
                    Tick::Expired => {
                        let attempt_id = live.attempt.id();
                        tracing::info!(%attempt_id, "Quiz time expired, submitting");
                        let forced = finish_submission(
                            store.as_ref(),
                            &mut live,
                            SubmitTrigger::TimerExpired,
                        )
                        .await;
                        if let Err(e) = forced {
                            tracing::error!(%attempt_id, "Forced submission failed: {}", e);
                        }
                        ControlFlow::Break(())
                    }
                    Tick::Stopped => ControlFlow::Break(()),
                }
            }
        }));
    }
}

/// Scores, stops the timer, records the result and completes the attempt.
async fn finish_submission(
    store: &dyn QuizStore,
    live: &mut LiveAttempt,
    trigger: SubmitTrigger,
) -> Result<AttemptSnapshot, AppError> {
    let result = live.attempt.begin_submit(trigger)?;

    if let Some(timer) = live.timer.take() {
        timer.cancel();
    }

    let outcome = record_submission(
        store,
        live.attempt.user_id(),
        live.attempt.quiz(),
        &result,
        live.attempt.answers(),
    )
    .await;

    live.attempt.complete(outcome);
    live.touch();

    tracing::info!(
        attempt_id = %live.attempt.id(),
        score = result.score,
        passed = result.passed,
        ?trigger,
        "Quiz attempt completed"
    );
    Ok(live.attempt.snapshot())
}
