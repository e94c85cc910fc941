//! HTTP-level integration tests for the registration endpoints: public
//! register/unregister/check, per-event uniqueness, the capacity guard,
//! and admin record management.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, create_test_user, delete_auth, get, get_auth, login_user,
    post_json, put_json_auth, registration_body, seed_event, STUDENT_ROLE_ID,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_embeds_the_event(pool: PgPool) {
    let event = seed_event(&pool, "Welcome Fair", 100).await;
    let app = common::build_test_app(pool);

    let body = registration_body(event.id, "jordan@test.edu", "STU-1001");
    let response = post_json(&app, "/api/registrations", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["email"], "jordan@test.edu");
    assert_eq!(json["data"]["student_id"], "STU-1001");
    assert_eq!(json["data"]["event"]["id"], event.id);
    assert_eq!(json["data"]["event"]["title"], "Welcome Fair");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_on_same_event_rejected(pool: PgPool) {
    let event = seed_event(&pool, "Popular Event", 100).await;
    let app = common::build_test_app(pool);

    let first = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "same@test.edu", "STU-1"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Same email, different student ID: still a duplicate.
    let second = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "same@test.edu", "STU-2"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(second).await;
    assert_eq!(json["success"], false);
    assert!(json["errors"]["email"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_student_id_on_same_event_rejected(pool: PgPool) {
    let event = seed_event(&pool, "Popular Event", 100).await;
    let app = common::build_test_app(pool);

    let first = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "a@test.edu", "STU-7"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "b@test.edu", "STU-7"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(second).await;
    assert!(json["errors"]["student_id"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn same_student_may_register_for_different_events(pool: PgPool) {
    let first_event = seed_event(&pool, "Morning Talk", 50).await;
    let second_event = seed_event(&pool, "Evening Talk", 50).await;
    let app = common::build_test_app(pool);

    for event_id in [first_event.id, second_event.id] {
        let response = post_json(
            &app,
            "/api/registrations",
            registration_body(event_id, "busy@test.edu", "STU-BUSY"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn full_event_rejects_registration(pool: PgPool) {
    let event = seed_event(&pool, "Tiny Venue", 1).await;
    let app = common::build_test_app(pool);

    let first = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "got-in@test.edu", "STU-IN"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "too-late@test.edu", "STU-OUT"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let json = body_json(second).await;
    assert_eq!(json["success"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_for_unknown_event_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        &app,
        "/api/registrations",
        registration_body(777, "ghost@test.edu", "STU-G"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_bad_email_format(pool: PgPool) {
    let event = seed_event(&pool, "Strict Event", 10).await;
    let app = common::build_test_app(pool);

    let mut body = registration_body(event.id, "not-an-email", "STU-X");
    body["email"] = serde_json::json!("not-an-email");
    let response = post_json(&app, "/api/registrations", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Unregister and check
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unregister_then_check_reports_not_registered(pool: PgPool) {
    let event = seed_event(&pool, "Changeable Plans", 10).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "undecided@test.edu", "STU-U"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let key = serde_json::json!({ "event_id": event.id, "student_id": "STU-U" });

    let response = post_json(&app, "/api/registrations/check", key.clone()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_registered"], true);

    let response = post_json(&app, "/api/registrations/unregister", key.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(&app, "/api/registrations/check", key.clone()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_registered"], false);
    assert!(json["data"]["registration"].is_null());

    // The freed spot can be taken again.
    let response = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "undecided@test.edu", "STU-U"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unregister_without_registration_is_404(pool: PgPool) {
    let event = seed_event(&pool, "Empty Event", 10).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/registrations/unregister",
        serde_json::json!({ "event_id": event.id, "student_id": "STU-NOBODY" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_is_idempotent(pool: PgPool) {
    let event = seed_event(&pool, "Stable Event", 10).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "steady@test.edu", "STU-S"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let key = serde_json::json!({ "event_id": event.id, "student_id": "STU-S" });
    for _ in 0..2 {
        let response = post_json(&app, "/api/registrations/check", key.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["is_registered"], true);
        assert_eq!(json["data"]["registration"]["student_id"], "STU-S");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_unknown_event_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        &app,
        "/api/registrations/check",
        serde_json::json!({ "event_id": 12345, "student_id": "STU-Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin record management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_lists_registrations_for_event(pool: PgPool) {
    let event = seed_event(&pool, "Tracked Event", 50).await;
    let app = common::build_test_app(pool.clone());
    let token = admin_token(&pool, &app).await;

    for i in 0..2 {
        let body = registration_body(event.id, &format!("r{i}@test.edu"), &format!("STU-{i}"));
        let response = post_json(&app, "/api/registrations", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        &app,
        &format!("/api/events/{}/registrations", event.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["total_registrations"], 2);
    assert_eq!(json["data"]["registrations"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["event"]["id"], event.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn registration_listing_requires_admin(pool: PgPool) {
    let event = seed_event(&pool, "Private List", 50).await;
    let (_user, password) =
        create_test_user(&pool, "Peek", "peek@test.edu", STUDENT_ROLE_ID).await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/events/{}/registrations", event.id);

    let anon = get(&app, &uri).await;
    assert_eq!(anon.status(), StatusCode::UNAUTHORIZED);

    let login_json = login_user(&app, "peek@test.edu", &password, "student").await;
    let student = login_json["access_token"].as_str().unwrap();
    let response = get_auth(&app, &uri, student).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_update_rechecks_uniqueness(pool: PgPool) {
    let event = seed_event(&pool, "Edited Event", 50).await;
    let app = common::build_test_app(pool.clone());
    let token = admin_token(&pool, &app).await;

    let first = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "one@test.edu", "STU-ONE"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "two@test.edu", "STU-TWO"),
    )
    .await;
    let second_id = body_json(second).await["data"]["id"].as_i64().unwrap();

    // Renaming the second onto the first's email collides.
    let response = put_json_auth(
        &app,
        &format!("/api/registrations/{second_id}"),
        serde_json::json!({ "email": "one@test.edu" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // A fresh email is fine, and no-op on the row's own values is allowed.
    let response = put_json_auth(
        &app,
        &format!("/api/registrations/{second_id}"),
        serde_json::json!({ "email": "corrected@test.edu", "student_id": "STU-TWO" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "corrected@test.edu");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_deletes_a_registration(pool: PgPool) {
    let event = seed_event(&pool, "Culled Event", 50).await;
    let app = common::build_test_app(pool.clone());
    let token = admin_token(&pool, &app).await;

    let response = post_json(
        &app,
        "/api/registrations",
        registration_body(event.id, "gone@test.edu", "STU-GONE"),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(&app, &format!("/api/registrations/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, &format!("/api/registrations/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let check = post_json(
        &app,
        "/api/registrations/check",
        serde_json::json!({ "event_id": event.id, "student_id": "STU-GONE" }),
    )
    .await;
    let json = body_json(check).await;
    assert_eq!(json["data"]["is_registered"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_unknown_registration_is_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = admin_token(&pool, &app).await;

    let response = delete_auth(&app, "/api/registrations/8080", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
