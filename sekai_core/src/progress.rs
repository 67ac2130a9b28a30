//! Learner progress operations.
//!
//! All mutations are total and only ever grow the record:
//! - `complete_level` bumps the level by one, with no ceiling
//! - `complete_project` inserts an id (idempotent, no catalog check)
//! - `register_activity` marks the local calendar day of an instant

use crate::types::{DayKey, DayStatus, LearnerProgress};
use chrono::{DateTime, Days, TimeZone};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Level given to a learner record created without configuration
pub const DEFAULT_STARTING_LEVEL: u32 = 1;

/// Trailing window used by the activity strip
pub const DEFAULT_ACTIVITY_WINDOW_DAYS: u32 = 7;

impl LearnerProgress {
    /// Create a fresh learner record
    pub fn new(starting_level: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            current_level: starting_level,
            completed_projects: BTreeSet::new(),
            activity_days: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn completed_projects(&self) -> &BTreeSet<String> {
        &self.completed_projects
    }

    pub fn activity_days(&self) -> &BTreeSet<DayKey> {
        &self.activity_days
    }

    pub fn is_project_completed(&self, id: &str) -> bool {
        self.completed_projects.contains(id)
    }

    /// Advance one level and return the new level.
    ///
    /// Unbounded: advancing past the last module in the catalog is allowed.
    pub fn complete_level(&mut self) -> u32 {
        self.current_level = self.current_level.saturating_add(1);
        tracing::debug!("Learner {} advanced to level {}", self.id, self.current_level);
        self.current_level
    }

    /// Mark a project completed. Returns `false` if it already was.
    pub fn complete_project(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        let inserted = self.completed_projects.insert(id.clone());
        if inserted {
            tracing::debug!("Learner {} completed project {}", self.id, id);
        }
        inserted
    }

    /// Record activity on the calendar day of `instant`, in the instant's own
    /// time zone. Pass a `DateTime<Local>` to key by the learner's local date.
    ///
    /// Returns `false` if the day was already recorded.
    pub fn register_activity<Tz: TimeZone>(&mut self, instant: &DateTime<Tz>) -> bool {
        let day = DayKey::new(instant.date_naive());
        let inserted = self.activity_days.insert(day);
        if inserted {
            tracing::debug!("Learner {} active on {}", self.id, day);
        }
        inserted
    }

    /// The `window_days` calendar days ending on the day of `instant`, oldest first
    pub fn recent_activity<Tz: TimeZone>(
        &self,
        instant: &DateTime<Tz>,
        window_days: u32,
    ) -> Vec<DayStatus> {
        let today = instant.date_naive();

        (0..window_days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(|date| {
                if self.activity_days.contains(&DayKey::new(date)) {
                    DayStatus::Active
                } else {
                    DayStatus::Inactive
                }
            })
            .collect()
    }

    pub fn total_active_days(&self) -> usize {
        self.activity_days.len()
    }
}

impl Default for LearnerProgress {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_LEVEL)
    }
}
