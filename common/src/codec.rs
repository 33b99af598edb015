// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::{Deserialize, Serialize};

/// One day of a schedule: a free-text label (e.g. "Monday, March 1") and its
/// ordered task descriptions. Day order is the author's chronological order,
/// not necessarily sorted dates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub label: String,
    pub tasks: Vec<String>,
}

/// Encodes a day/task grid into the flat wire format:
/// `"<label>|<task1>|...|<taskN>"` per day, days joined with `;`.
///
/// Whitespace-only tasks are skipped, and a day left with no tasks is omitted
/// entirely; an omitted day is indistinguishable from one that never existed,
/// which keeps `decode(encode(grid))` stable on well-formed input.
///
/// The format has no escaping: labels and tasks must not contain `|` or `;`.
/// The authoring surface enforces that; by the time a string reaches this
/// module the delimiters are structure.
pub fn encode(days: &[Day]) -> String {
    days.iter()
        .filter_map(|day| {
            let tasks: Vec<&str> = day
                .tasks
                .iter()
                .map(|task| task.trim())
                .filter(|task| !task.is_empty())
                .collect();
            if tasks.is_empty() {
                None
            } else {
                Some(format!("{}|{}", day.label.trim(), tasks.join("|")))
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Decodes the flat wire format back into a day/task grid.
///
/// Empty segments are discarded. Within a segment the first `|`-separated
/// element is the label and the remaining non-empty elements are tasks; a
/// segment with no non-empty task yields no day, mirroring the encoder's
/// omission rule.
pub fn decode(encoded: &str) -> Vec<Day> {
    encoded
        .split(';')
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            let mut parts = segment.split('|');
            let label = parts.next()?.trim().to_string();
            let tasks: Vec<String> = parts
                .map(str::trim)
                .filter(|task| !task.is_empty())
                .map(str::to_string)
                .collect();
            if tasks.is_empty() {
                None
            } else {
                Some(Day { label, tasks })
            }
        })
        .collect()
}

/// Counts the tasks in an encoded schedule: the sum of non-empty task counts
/// over the decoded days. This is the definition used when a schedule is
/// created; the stored `total_tasks` is never re-derived afterwards.
pub fn total_tasks(encoded: &str) -> usize {
    decode(encoded).iter().map(|day| day.tasks.len()).sum()
}
