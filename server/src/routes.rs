// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use sqlx::SqlitePool;

/// Creates and configures the application router.
/// Every route requires a bearer credential; the handlers extract the owner
/// and scope all reads and writes to it.
pub fn create_router(pool: SqlitePool) -> Router {
    Router::new()
        // Associates the `POST /api/schedules` route with the `create_schedule` handler
        .route("/api/schedules", post(handlers::create_schedule))
        // Associates the `GET /api/schedules` route with the `list_schedules` handler
        .route("/api/schedules", get(handlers::list_schedules))
        // Associates the `GET /api/schedules/{id}` route with the `get_schedule` handler
        .route("/api/schedules/{id}", get(handlers::get_schedule))
        // Associates the `PUT /api/schedules/{id}/progress` route with the `update_schedule_progress` handler
        .route(
            "/api/schedules/{id}/progress",
            put(handlers::update_schedule_progress),
        )
        // Associates the `DELETE /api/schedules/{id}` route with the `delete_schedule` handler
        .route("/api/schedules/{id}", delete(handlers::delete_schedule))
        // Adds the database pool to the application state
        .with_state(pool)
}
