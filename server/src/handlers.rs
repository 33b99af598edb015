// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthUser;
use crate::database;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use common::{
    CreateSchedulePayload, Dedication, Goal, NewSchedule, Schedule, UpdateProgressPayload, codec,
};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Handler for listing the authenticated user's schedules, newest first.
pub async fn list_schedules(
    AuthUser(owner): AuthUser,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let schedules = database::get_user_schedules_from_db(&pool, &owner).await?;
    info!("Successfully retrieved {} schedules.", schedules.len());
    Ok(Json(schedules))
}

/// Handler for creating a new schedule.
///
/// All validation happens before any storage access. The client may send its
/// own `totalTasks`; the count stored is the one recomputed here from the
/// encoded schedule, so creation is the single authoritative counting point.
pub async fn create_schedule(
    AuthUser(owner): AuthUser,
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateSchedulePayload>,
) -> Result<(StatusCode, Json<Schedule>), AppError> {
    debug!("Received request to create schedule for owner: {owner}");

    let goal_name = payload.goal_name.as_deref().map(str::trim).unwrap_or("");
    let objective = payload.objective.as_deref().map(str::trim).unwrap_or("");
    let deadline_raw = payload.deadline.as_deref().map(str::trim).unwrap_or("");
    let dedication_raw = payload.dedication.as_deref().map(str::trim).unwrap_or("");
    let schedule_data = payload
        .schedule_data
        .as_deref()
        .map(str::trim)
        .unwrap_or("");

    if goal_name.is_empty()
        || objective.is_empty()
        || deadline_raw.is_empty()
        || dedication_raw.is_empty()
        || schedule_data.is_empty()
    {
        error!("Validation failed: a required schedule field is missing or empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Please provide all required fields.",
        ));
    }

    let deadline: NaiveDate = deadline_raw.parse().map_err(|_| {
        error!("Validation failed: deadline {deadline_raw} is not a valid date.");
        AppError::new(
            StatusCode::BAD_REQUEST,
            "Deadline must be a valid date (YYYY-MM-DD).",
        )
    })?;

    let dedication = Dedication::parse(dedication_raw).ok_or_else(|| {
        error!("Validation failed: unknown dedication level {dedication_raw}.");
        AppError::new(
            StatusCode::BAD_REQUEST,
            "Dedication must be one of: casual, moderate, intense.",
        )
    })?;

    let total_tasks = codec::total_tasks(schedule_data) as i64;
    if total_tasks == 0 {
        error!("Validation failed: schedule decodes to zero tasks.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Schedule must contain at least one task.",
        ));
    }

    let new_schedule = NewSchedule {
        goal: Goal {
            goal_name: goal_name.to_string(),
            objective: objective.to_string(),
            deadline,
            dedication,
            is_manual: payload.is_manual,
        },
        schedule_data: schedule_data.to_string(),
        total_tasks,
    };

    let schedule = database::create_schedule_in_db(&pool, &owner, new_schedule).await?;

    info!("Schedule created successfully with ID: {}", schedule.id);

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// Handler for fetching one schedule by ID.
#[allow(clippy::uninlined_format_args)]
pub async fn get_schedule(
    AuthUser(owner): AuthUser,
    State(pool): State<SqlitePool>,
    Path(schedule_id): Path<i64>,
) -> Result<Json<Schedule>, AppError> {
    match database::get_schedule_from_db(&pool, schedule_id, &owner).await? {
        Some(schedule) => Ok(Json(schedule)),
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Schedule with ID {} not found.", schedule_id),
        )),
    }
}

/// Handler for replacing a schedule's progress grid.
/// The grid is validated into `bool[][]` here; the store recomputes and
/// persists the derived statistics.
#[allow(clippy::uninlined_format_args)]
pub async fn update_schedule_progress(
    AuthUser(owner): AuthUser,
    State(pool): State<SqlitePool>,
    Path(schedule_id): Path<i64>,
    Json(payload): Json<UpdateProgressPayload>,
) -> Result<Json<Schedule>, AppError> {
    debug!("Received progress update for schedule {}", schedule_id);

    let progress_value = payload.progress.ok_or_else(|| {
        error!("Validation failed: progress data is missing.");
        AppError::new(StatusCode::BAD_REQUEST, "Progress data is required.")
    })?;

    let new_progress: Vec<Vec<bool>> = serde_json::from_value(progress_value).map_err(|_| {
        error!("Validation failed: progress is not an array of arrays of booleans.");
        AppError::new(
            StatusCode::BAD_REQUEST,
            "Progress must be an array of arrays of booleans.",
        )
    })?;

    match database::update_schedule_progress_in_db(&pool, schedule_id, &owner, new_progress).await?
    {
        Some(schedule) => {
            info!(
                "Progress updated for schedule {}: {}%",
                schedule.id, schedule.progress_percentage
            );
            Ok(Json(schedule))
        }
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Schedule with ID {} not found.", schedule_id),
        )),
    }
}

/// Handler for deleting a schedule by ID.
#[allow(clippy::uninlined_format_args)]
pub async fn delete_schedule(
    AuthUser(owner): AuthUser,
    State(pool): State<SqlitePool>,
    Path(schedule_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Attempting to delete schedule with ID: {}", schedule_id);

    let deleted = database::delete_schedule_in_db(&pool, schedule_id, &owner).await?;

    if deleted {
        info!("Schedule with ID {} deleted successfully.", schedule_id);
        Ok(Json(serde_json::json!({
            "message": "Schedule deleted successfully."
        })))
    } else {
        error!("Schedule with ID {} not found for deletion.", schedule_id);
        Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Schedule with ID {} not found.", schedule_id),
        ))
    }
}

// --- Custom Error Handling ---
// Transforms internal errors (validation, auth, missing rows, storage
// failures) into the appropriate HTTP responses.

/// Our custom error type for the application.
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    /// 401 for a missing or undecodable bearer credential.
    pub(crate) fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

/// Allows converting an `anyhow::Error` (coming from `database.rs`)
/// into our `AppError`. Storage failures are opaque to clients; the cause
/// is only logged.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal server error: {:?}", err);
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred.".to_string(),
        }
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
