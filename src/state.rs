use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;

use crate::{
    config::Config,
    quiz::{
        loader::SeedPolicy,
        registry::{AttemptRegistry, RetentionPolicy},
    },
    store::QuizStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub attempts: AttemptRegistry,
    pub config: Config,
}

impl AppState {
    /// Builds the state around a single store instance shared by every handler.
    pub fn new(store: Arc<dyn QuizStore>, config: Config) -> Self {
        let retention = RetentionPolicy {
            completed_grace: Duration::from_secs(config.attempt_completed_grace_secs),
            idle_ttl: Duration::from_secs(config.attempt_idle_ttl_secs),
        };
        Self {
            attempts: AttemptRegistry::with_retention(store.clone(), retention),
            store,
            config,
        }
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        if self.config.seed_sample_quiz {
            SeedPolicy::SeedSample
        } else {
            SeedPolicy::NoSeed
        }
    }
}

impl FromRef<AppState> for Arc<dyn QuizStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for AttemptRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
