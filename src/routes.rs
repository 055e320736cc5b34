// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{community, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges the quiz and community sub-routers.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, live attempts, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let course_routes = Router::new()
        .route("/{course_id}/quiz", get(quiz::get_course_quiz))
        .route("/{course_id}/quiz/attempts", post(quiz::start_attempt))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    // The owner is fixed when the attempt starts; every action checks the caller against it.
    let attempt_routes = Router::new()
        .route(
            "/{attempt_id}",
            get(quiz::get_attempt).delete(quiz::delete_attempt),
        )
        .route("/{attempt_id}/answer", put(quiz::select_option))
        .route("/{attempt_id}/next", post(quiz::next_question))
        .route("/{attempt_id}/previous", post(quiz::previous_question))
        .route("/{attempt_id}/submit", post(quiz::submit_attempt))
        .route("/{attempt_id}/retake", post(quiz::retake_attempt))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let community_routes = Router::new()
        .route(
            "/posts",
            get(community::list_posts).layer(middleware::from_fn_with_state(
                state.clone(),
                optional_auth_middleware,
            )),
        )
        // Protected community routes
        .merge(
            Router::new()
                .route(
                    "/posts/{id}/like",
                    put(community::like_post).delete(community::unlike_post),
                )
                .route(
                    "/posts/{id}/bookmark",
                    put(community::bookmark_post).delete(community::unbookmark_post),
                )
                .route(
                    "/users/{id}/follow",
                    put(community::follow_user).delete(community::unfollow_user),
                )
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/attempts", attempt_routes)
        .nest("/api/community", community_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
