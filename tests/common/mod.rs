// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use course_quiz::{
    config::Config, routes, state::AppState, store::MemoryStore, utils::jwt::sign_jwt,
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

pub fn test_config(seed_sample_quiz: bool) -> Config {
    Config {
        database_url: None,
        jwt_secret: TEST_SECRET.to_string(),
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        seed_sample_quiz,
        attempt_idle_ttl_secs: 600,
        attempt_completed_grace_secs: 60,
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
}

/// Spawns the app on a random port backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(true)).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), config);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, store }
}

pub fn token_for(user_id: Uuid) -> String {
    sign_jwt(user_id, TEST_SECRET, 600).unwrap()
}
