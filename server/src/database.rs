// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use common::progress;
use common::{NewSchedule, Schedule};
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::{debug, info};

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures the `schedules` table has the correct schema.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

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
    .context("Failed to create 'schedules' table")?;

    info!("'schedules' table is ready.");

    Ok(pool)
}

/// Inserts a new schedule for the given owner. Progress starts as an empty
/// grid with zeroed derived fields; `total_tasks` was computed from the
/// encoded schedule by the caller and is stored as-is, never re-derived.
pub async fn create_schedule_in_db(
    pool: &SqlitePool,
    owner: &str,
    new: NewSchedule,
) -> Result<Schedule> {
    let now = Utc::now();
    let empty_progress: Vec<Vec<bool>> = Vec::new();

    debug!(
        "Insert values: owner={}, goal_name={}, total_tasks={}",
        owner, new.goal.goal_name, new.total_tasks
    );

    let id = sqlx::query(
        "INSERT INTO schedules (owner, goal_name, objective, deadline, dedication, is_manual, schedule_data, total_tasks, progress, completed_tasks, progress_percentage, is_completed, created_at, last_updated) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, 0, ?, ?)",
    )
    .bind(owner)
    .bind(&new.goal.goal_name)
    .bind(&new.goal.objective)
    .bind(new.goal.deadline)
    .bind(new.goal.dedication)
    .bind(new.goal.is_manual)
    .bind(&new.schedule_data)
    .bind(new.total_tasks)
    .bind(Json(&empty_progress))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to insert schedule into DB")?
    .last_insert_rowid();

    Ok(Schedule {
        id,
        owner: owner.to_string(),
        goal_name: new.goal.goal_name,
        objective: new.goal.objective,
        deadline: new.goal.deadline,
        dedication: new.goal.dedication,
        is_manual: new.goal.is_manual,
        schedule_data: new.schedule_data,
        total_tasks: new.total_tasks,
        progress: empty_progress,
        completed_tasks: 0,
        progress_percentage: 0,
        is_completed: false,
        created_at: now,
        last_updated: now,
    })
}

/// Retrieves all schedules belonging to the owner, newest-created first.
pub async fn get_user_schedules_from_db(pool: &SqlitePool, owner: &str) -> Result<Vec<Schedule>> {
    let schedules = sqlx::query_as::<_, Schedule>(
        "SELECT * FROM schedules WHERE owner = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
    .context("Failed to retrieve schedules from DB")?;

    Ok(schedules)
}

/// Retrieves one schedule by id, scoped to the owner. A schedule owned by
/// someone else comes back as `None`, the same as one that does not exist.
pub async fn get_schedule_from_db(
    pool: &SqlitePool,
    schedule_id: i64,
    owner: &str,
) -> Result<Option<Schedule>> {
    let schedule =
        sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = ? AND owner = ?")
            .bind(schedule_id)
            .bind(owner)
            .fetch_optional(pool)
            .await
            .context("Failed to retrieve schedule from DB")?;

    Ok(schedule)
}

/// Replaces a schedule's progress grid. Derived fields always go through the
/// aggregator here, so the stored statistics cannot drift from the grid.
/// Returns `None` when the id is absent or owned by a different user.
///
/// There is no optimistic concurrency: two concurrent updates on the same
/// schedule race and the last write wins.
#[allow(clippy::uninlined_format_args)]
pub async fn update_schedule_progress_in_db(
    pool: &SqlitePool,
    schedule_id: i64,
    owner: &str,
    new_progress: Vec<Vec<bool>>,
) -> Result<Option<Schedule>> {
    let stats = progress::aggregate(&new_progress);
    let now = Utc::now();

    debug!(
        "Updating progress for schedule {}: completed={}, percentage={}",
        schedule_id, stats.completed_tasks, stats.progress_percentage
    );

    let result = sqlx::query(
        "UPDATE schedules SET progress = ?, completed_tasks = ?, progress_percentage = ?, is_completed = ?, last_updated = ? \
         WHERE id = ? AND owner = ?",
    )
    .bind(Json(&new_progress))
    .bind(stats.completed_tasks)
    .bind(stats.progress_percentage)
    .bind(stats.is_completed)
    .bind(now)
    .bind(schedule_id)
    .bind(owner)
    .execute(pool)
    .await
    .context(format!(
        "Failed to update progress for schedule with ID: {}",
        schedule_id
    ))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_schedule_from_db(pool, schedule_id, owner).await
}

/// Hard deletes a schedule, scoped to the owner.
/// Returns true if a row was removed, false if no owned schedule matched.
#[allow(clippy::uninlined_format_args)]
pub async fn delete_schedule_in_db(
    pool: &SqlitePool,
    schedule_id: i64,
    owner: &str,
) -> Result<bool> {
    debug!("Attempting to delete schedule with ID: {}", schedule_id);
    let result = sqlx::query("DELETE FROM schedules WHERE id = ? AND owner = ?")
        .bind(schedule_id)
        .bind(owner)
        .execute(pool)
        .await
        .context(format!("Failed to delete schedule with ID: {}", schedule_id))?;

    let rows_affected = result.rows_affected();
    info!(
        "Deleted {} rows for schedule ID: {}",
        rows_affected, schedule_id
    );

    Ok(rows_affected > 0)
}
