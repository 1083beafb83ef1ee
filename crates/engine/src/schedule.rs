// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron schedule arithmetic.
//!
//! Expressions are accepted in the common 5-field form (minute resolution,
//! Sunday = 0 or 7), in the 6/7-field form with seconds and years, or as an
//! `@hourly`-style macro. 5-field expressions are rewritten into the
//! seconds-first dialect understood by the `cron` crate.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Most instants a single window may contain before the calculator refuses
/// to enumerate it.
pub const MAX_MISSED_RUNS: usize = 100;

/// Errors from parsing a schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("schedule is empty")]
    Empty,
    #[error("unparseable schedule {expr:?}: {reason}")]
    Invalid { expr: String, reason: String },
}

/// A parsed cron schedule
#[derive(Clone)]
pub struct CronSchedule {
    expr: String,
    inner: cron::Schedule,
}

impl fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CronSchedule").field(&self.expr).finish()
    }
}

/// Instants due within one reconcile window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleWindow {
    /// Unprocessed instants at or before `now`, oldest first
    pub missed: Vec<DateTime<Utc>>,
    /// First instant strictly after `now`
    pub next_after_now: Option<DateTime<Utc>>,
    /// The window held more than [`MAX_MISSED_RUNS`] instants; `missed` is empty
    pub too_many_missed: bool,
}

impl ScheduleWindow {
    /// The only missed instant that may actually start a job
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.missed.last().copied()
    }
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError::Empty);
        }
        let normalized = normalize(trimmed);
        let inner = cron::Schedule::from_str(&normalized).map_err(|e| ScheduleError::Invalid {
            expr: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            expr: trimmed.to_string(),
            inner,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// First instant strictly after `after`
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.inner.after(&after).find(|t| *t > after)
    }

    /// Enumerate the instants in `(earliest_after, now]`.
    ///
    /// With a deadline, instants older than `now - deadline` are never
    /// reported; an instant exactly at the cutoff still is. If the window
    /// holds more than [`MAX_MISSED_RUNS`] reportable instants, enumeration
    /// stops and `too_many_missed` is set.
    pub fn next_instants(
        &self,
        earliest_after: DateTime<Utc>,
        now: DateTime<Utc>,
        deadline: Option<Duration>,
    ) -> ScheduleWindow {
        let mut window = ScheduleWindow {
            next_after_now: self.next_after(now),
            ..ScheduleWindow::default()
        };
        if earliest_after >= now {
            return window;
        }

        let cutoff = deadline.and_then(|deadline| {
            chrono::Duration::from_std(deadline)
                .ok()
                .and_then(|d| now.checked_sub_signed(d))
        });
        // Schedules have whole-second resolution, so starting one second
        // before the cutoff cannot skip an instant at the cutoff.
        let iter_from = match cutoff.and_then(|c| c.checked_sub_signed(chrono::Duration::seconds(1))) {
            Some(before_cutoff) => earliest_after.max(before_cutoff),
            None => earliest_after,
        };

        for instant in self.inner.after(&iter_from) {
            if instant <= earliest_after || cutoff.is_some_and(|c| instant < c) {
                continue;
            }
            if instant > now {
                break;
            }
            if window.missed.len() == MAX_MISSED_RUNS {
                window.missed.clear();
                window.too_many_missed = true;
                break;
            }
            window.missed.push(instant);
        }
        window
    }
}

/// Rewrite a 5-field expression into the seconds-first dialect.
///
/// Other forms pass through unchanged.
fn normalize(expr: &str) -> String {
    if expr.starts_with('@') {
        return expr.to_string();
    }
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return fields.join(" ");
    }
    format!(
        "0 {} {} {} {} {}",
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        shift_weekdays(fields[4])
    )
}

/// Shift numeric weekdays from Sunday = 0 (or 7) to Sunday = 1.
fn shift_weekdays(field: &str) -> String {
    field
        .split(',')
        .map(|item| {
            let (base, step) = match item.split_once('/') {
                Some((base, step)) => (base, Some(step)),
                None => (item, None),
            };
            let shifted = match base.split_once('-') {
                // Sunday = 7 wraps to the front of the week
                Some((lo, "7")) if step.is_none() => match shift_day(lo) {
                    Some(lo) => format!("{lo}-7,1"),
                    None => base.to_string(),
                },
                Some((lo, hi)) => match (shift_day(lo), shift_range_end(hi)) {
                    (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
                    _ => base.to_string(),
                },
                None => shift_day(base).unwrap_or_else(|| base.to_string()),
            };
            match step {
                Some(step) => format!("{shifted}/{step}"),
                None => shifted,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn shift_day(day: &str) -> Option<String> {
    match day.parse::<u8>().ok()? {
        7 => Some("1".to_string()),
        n @ 0..=6 => Some((n + 1).to_string()),
        _ => None,
    }
}

fn shift_range_end(day: &str) -> Option<String> {
    match day {
        "7" => Some("7".to_string()),
        _ => shift_day(day),
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
