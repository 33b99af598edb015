use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::Schedule;
use http_body_util::BodyExt; // For `collect`
use serde_json::json;
use server::auth;
use server::routes::create_router;
use sqlx::SqlitePool;
use tower::ServiceExt; // For `oneshot`

const ENCODED: &str = "Monday|Practice scales|Tune guitar;Tuesday|Learn chord";

/// Helper function to set up a fresh, in-memory database for each test.
async fn setup_test_db_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory SQLite");

    // The schema here MUST match the one in `database.rs` exactly.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner TEXT NOT NULL,
            goal_name TEXT NOT NULL,
            objective TEXT NOT NULL,
            deadline DATE NOT NULL,
            dedication TEXT NOT NULL,
            is_manual BOOLEAN NOT NULL,
            schedule_data TEXT NOT NULL,
            total_tasks INTEGER NOT NULL,
            progress TEXT NOT NULL,
            completed_tasks INTEGER NOT NULL,
            progress_percentage INTEGER NOT NULL,
            is_completed BOOLEAN NOT NULL,
            created_at TIMESTAMP NOT NULL,
            last_updated TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create schedules table in test DB");

    pool
}

fn bearer(user: &str) -> String {
    format!("Bearer {}", auth::issue_token(user))
}

fn create_request(user: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/schedules")
        .header("Content-Type", "application/json")
        .header("Authorization", bearer(user))
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn full_create_payload() -> serde_json::Value {
    json!({
        "goalName": "Learn guitar",
        "objective": "Play one full song",
        "deadline": "2026-03-01",
        "dedication": "moderate",
        "isManual": true,
        "scheduleData": ENCODED,
        // Deliberately wrong; the server recomputes the count itself.
        "totalTasks": 99
    })
}

/// Creates a schedule for `user` and returns the stored record.
async fn create_schedule_for(app: &axum::Router, user: &str) -> Schedule {
    let response = app
        .clone()
        .oneshot(create_request(user, &full_create_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_routes_require_bearer_token() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);

    // No Authorization header at all.
    let request = Request::builder()
        .method("GET")
        .uri("/api/schedules")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A token with a forged signature.
    let request = Request::builder()
        .method("GET")
        .uri("/api/schedules")
        .header("Authorization", "Bearer user-a.deadbeef")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error_response["error"], "Unauthorized");
}

#[tokio::test]
async fn test_create_and_list_schedules() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);

    // Act: Create a new schedule via POST request
    let response = app
        .clone()
        .oneshot(create_request("user-a", &full_create_payload()))
        .await
        .unwrap();

    // Assert: Created, with the count recomputed from the encoded schedule
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let created: Schedule = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.goal_name, "Learn guitar");
    assert_eq!(created.total_tasks, 3);
    assert_eq!(created.completed_tasks, 0);
    assert_eq!(created.progress_percentage, 0);
    assert!(!created.is_completed);
    assert!(created.progress.is_empty());

    // Act: List schedules via GET request
    let list_request = Request::builder()
        .method("GET")
        .uri("/api/schedules")
        .header("Authorization", bearer("user-a"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(list_request).await.unwrap();

    // Assert: The list contains the new schedule
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let schedules: Vec<Schedule> = serde_json::from_slice(&body).unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].id, created.id);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);

    let first = create_schedule_for(&app, "user-a").await;
    let second = create_schedule_for(&app, "user-a").await;

    let list_request = Request::builder()
        .method("GET")
        .uri("/api/schedules")
        .header("Authorization", bearer("user-a"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(list_request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let schedules: Vec<Schedule> = serde_json::from_slice(&body).unwrap();

    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0].id, second.id);
    assert_eq!(schedules[1].id, first.id);
}

#[tokio::test]
async fn test_create_schedule_missing_field() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);

    let mut payload = full_create_payload();
    payload.as_object_mut().unwrap().remove("objective");

    let response = app
        .oneshot(create_request("user-a", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error_response["error"], "Please provide all required fields.");
}

#[tokio::test]
async fn test_create_schedule_with_no_tasks_is_rejected() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool.clone());

    let mut payload = full_create_payload();
    // Days that all decode to zero non-empty tasks.
    payload["scheduleData"] = json!("Monday| ;Tuesday|");

    let response = app
        .oneshot(create_request("user-a", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No record was created.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schedules")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn test_progress_update_flow() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);
    let created = create_schedule_for(&app, "user-a").await;

    // Act: 2 of 3 tasks done
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/schedules/{}/progress", created.id))
        .header("Content-Type", "application/json")
        .header("Authorization", bearer("user-a"))
        .body(Body::from(
            json!({ "progress": [[true, true], [false]] }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let updated: Schedule = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.completed_tasks, 2);
    assert_eq!(updated.progress_percentage, 67);
    assert!(!updated.is_completed);

    // Act: all tasks done
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/schedules/{}/progress", created.id))
        .header("Content-Type", "application/json")
        .header("Authorization", bearer("user-a"))
        .body(Body::from(
            json!({ "progress": [[true, true], [true]] }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let updated: Schedule = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.completed_tasks, 3);
    assert_eq!(updated.progress_percentage, 100);
    assert!(updated.is_completed);

    // Assert: the stored record reflects the last update
    let get_request = Request::builder()
        .method("GET")
        .uri(format!("/api/schedules/{}", created.id))
        .header("Authorization", bearer("user-a"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(get_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let fetched: Schedule = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched.progress, vec![vec![true, true], vec![true]]);
    assert!(fetched.is_completed);
}

#[tokio::test]
async fn test_progress_update_requires_progress() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);
    let created = create_schedule_for(&app, "user-a").await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/schedules/{}/progress", created.id))
        .header("Content-Type", "application/json")
        .header("Authorization", bearer("user-a"))
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error_response["error"], "Progress data is required.");
}

#[tokio::test]
async fn test_cross_owner_access_is_not_found() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);
    let created = create_schedule_for(&app, "user-a").await;

    // GET as another owner
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/schedules/{}", created.id))
        .header("Authorization", bearer("user-b"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // PUT progress as another owner
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/schedules/{}/progress", created.id))
        .header("Content-Type", "application/json")
        .header("Authorization", bearer("user-b"))
        .body(Body::from(json!({ "progress": [[true]] }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // DELETE as another owner
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/schedules/{}", created.id))
        .header("Authorization", bearer("user-b"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The schedule still exists for its owner.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/schedules/{}", created.id))
        .header("Authorization", bearer("user-a"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_schedule() {
    let pool = setup_test_db_pool().await;
    let app = create_router(pool);
    let created = create_schedule_for(&app, "user-a").await;

    // Act: Send a DELETE request for the created schedule
    let delete_request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/schedules/{}", created.id))
        .header("Authorization", bearer("user-a"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(delete_request).await.unwrap();

    // Assert: The delete was confirmed
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let confirmation: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(confirmation["message"], "Schedule deleted successfully.");

    // Assert: The schedule is gone
    let get_request = Request::builder()
        .method("GET")
        .uri(format!("/api/schedules/{}", created.id))
        .header("Authorization", bearer("user-a"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(get_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
