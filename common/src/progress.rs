// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::{Deserialize, Serialize};

/// Completion statistics derived from a progress grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub completed_tasks: i64,
    pub progress_percentage: i64,
    pub is_completed: bool,
}

/// Computes completion statistics from a progress grid (outer index = day,
/// inner index = task, `true` = completed).
///
/// The percentage denominator is the live grid's entry count, not the
/// `total_tasks` persisted at creation. Rounding is half-up; an empty grid
/// is 0%.
///
/// The store must run every progress update through this function and persist
/// its output, so the stored derived fields can never drift from the grid.
pub fn aggregate(progress: &[Vec<bool>]) -> ProgressStats {
    let total: usize = progress.iter().map(|day| day.len()).sum();
    let completed: usize = progress
        .iter()
        .map(|day| day.iter().filter(|done| **done).count())
        .sum();

    let progress_percentage = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as i64
    };

    ProgressStats {
        completed_tasks: completed as i64,
        progress_percentage,
        is_completed: progress_percentage == 100,
    }
}
