// tests/quiz_tests.rs

mod common;

use course_quiz::{
    client::{ApiClient, ClientError},
    quiz::{attempt::QuizPhase, recorder::PersistenceOutcome},
};
use uuid::Uuid;

use common::{spawn_app, spawn_app_with, test_config, token_for};

#[tokio::test]
async fn unknown_route_is_404() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .get(format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn loading_a_course_quiz_seeds_it_once() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address);

    let first = client.course_quiz(course.id).await.unwrap();
    let second = client.course_quiz(course.id).await.unwrap();

    assert_eq!(first.quiz_id, second.quiz_id);
    assert_eq!(first.course.id, course.id);
    assert_eq!(first.questions.len(), 5);
    assert_eq!(first.passing_score, 70);
    assert_eq!(app.store.quiz_count().await, 1);
}

#[tokio::test]
async fn quiz_payload_hides_answers() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;

    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/api/courses/{}/quiz", app.address, course.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let question = &body["questions"][0];
    assert!(question.get("correct_option").is_none());
    assert!(question.get("explanation").is_none());
}

#[tokio::test]
async fn absent_quiz_is_an_empty_state() {
    let app = spawn_app_with(test_config(false)).await;
    let course = app.store.add_course("Empty").await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/courses/{}/quiz", app.address, course.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "quiz_absent");
    assert_eq!(body["recovery"]["action"], "return_to_course");
}

#[tokio::test]
async fn load_failure_offers_return_to_course() {
    let app = spawn_app().await;
    let course = app.store.add_course("Broken").await;
    app.store.fail_reads(true);

    let response = reqwest::Client::new()
        .get(format!("{}/api/courses/{}/quiz", app.address, course.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "quiz_load_failed");
    assert_eq!(
        body["recovery"]["href"],
        format!("/courses/{}", course.id)
    );
}

#[tokio::test]
async fn passing_attempt_completes_enrollment() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let user_id = Uuid::new_v4();
    let enrollment = app.store.add_enrollment(user_id, course.id).await;
    let client = ApiClient::new(&app.address).with_token(token_for(user_id));

    let attempt = client.start_attempt(course.id).await.unwrap();
    assert_eq!(attempt.phase, QuizPhase::InProgress);
    assert_eq!(attempt.remaining_secs, Some(600));
    let id = attempt.attempt_id;

    // Sample quiz answers, in order.
    for option in [0, 1, 2, 1, 3] {
        client.select_option(id, option).await.unwrap();
        client.next(id).await.unwrap();
    }

    let done = client.submit(id).await.unwrap();
    assert_eq!(done.phase, QuizPhase::Completed);

    let result = done.result.unwrap();
    assert_eq!(result.score, 100.0);
    assert_eq!(result.correct_answers, 5);
    assert!(result.passed);
    assert_eq!(
        done.certificate_href,
        Some(format!("/courses/{}/certificate", course.id))
    );
    assert_eq!(done.review.len(), 5);

    assert!(app.store.enrollment(enrollment.id).await.unwrap().completed);
    let saved = app.store.submissions().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].user_id, user_id);
}

#[tokio::test]
async fn three_of_five_fails_then_retake_resets() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address).with_token(token_for(Uuid::new_v4()));

    let id = client.start_attempt(course.id).await.unwrap().attempt_id;
    for option in [0, 1, 2, 0, 0] {
        client.select_option(id, option).await.unwrap();
        client.next(id).await.unwrap();
    }

    let done = client.submit(id).await.unwrap();
    let result = done.result.unwrap();
    assert_eq!(result.score, 60.0);
    assert!(!result.passed);
    assert!(done.certificate_href.is_none());

    let retaken = client.retake(id).await.unwrap();
    assert_eq!(retaken.phase, QuizPhase::InProgress);
    assert!(retaken.answers.is_empty());
    assert_eq!(retaken.current_index, 0);
    assert!(retaken.result.is_none());
    assert_eq!(retaken.quiz_id, done.quiz_id);
    assert_eq!(app.store.quiz_count().await, 1);
}

#[tokio::test]
async fn navigation_is_bounded() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address);

    let id = client.start_attempt(course.id).await.unwrap().attempt_id;

    let at_start = client.previous(id).await.unwrap();
    assert_eq!(at_start.current_index, 0);
    assert!(!at_start.can_go_previous);

    let err = client.next(id).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));

    let err = client.submit(id).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
}

#[tokio::test]
async fn storage_failure_still_shows_result() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address).with_token(token_for(Uuid::new_v4()));

    let id = client.start_attempt(course.id).await.unwrap().attempt_id;
    for option in [0, 1, 2, 1, 3] {
        client.select_option(id, option).await.unwrap();
        client.next(id).await.unwrap();
    }

    app.store.fail_writes(true);
    let done = client.submit(id).await.unwrap();

    assert_eq!(done.phase, QuizPhase::Completed);
    assert_eq!(done.result.unwrap().score, 100.0);
    assert_eq!(done.persistence, Some(PersistenceOutcome::Failed));
    assert!(done.notice.is_some());
}

#[tokio::test]
async fn anonymous_attempt_is_scored_but_not_saved() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address);

    let id = client.start_attempt(course.id).await.unwrap().attempt_id;
    for option in [0, 1, 2, 1, 3] {
        client.select_option(id, option).await.unwrap();
        client.next(id).await.unwrap();
    }

    let done = client.submit(id).await.unwrap();
    assert!(done.result.unwrap().passed);
    assert_eq!(done.persistence, Some(PersistenceOutcome::SkippedAnonymous));
    assert!(done.notice.is_none());
    assert!(app.store.submissions().await.is_empty());
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address).with_token("not-a-token");

    let err = client.start_attempt(course.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 401, .. }));
}

#[tokio::test]
async fn deleted_attempt_is_gone() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let client = ApiClient::new(&app.address);

    let id = client.start_attempt(course.id).await.unwrap().attempt_id;
    client.delete_attempt(id).await.unwrap();

    let err = client.attempt(id).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn another_user_cannot_submit_an_attempt() {
    let app = spawn_app().await;
    let course = app.store.add_course("Web Basics").await;
    let owner_id = Uuid::new_v4();
    let enrollment = app.store.add_enrollment(owner_id, course.id).await;
    let owner = ApiClient::new(&app.address).with_token(token_for(owner_id));
    let other = ApiClient::new(&app.address).with_token(token_for(Uuid::new_v4()));
    let anonymous = ApiClient::new(&app.address);

    let id = owner.start_attempt(course.id).await.unwrap().attempt_id;
    for option in [0, 1, 2, 1, 3] {
        owner.select_option(id, option).await.unwrap();
        owner.next(id).await.unwrap();
    }

    for client in [&other, &anonymous] {
        let err = client.submit(id).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 403, .. }));
        let err = client.attempt(id).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 403, .. }));
    }
    assert!(app.store.submissions().await.is_empty());
    assert!(!app.store.enrollment(enrollment.id).await.unwrap().completed);

    let done = owner.submit(id).await.unwrap();
    assert!(done.result.unwrap().passed);
    assert!(app.store.enrollment(enrollment.id).await.unwrap().completed);
}
