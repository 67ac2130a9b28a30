//! Progress rules: lock/unlock/completion status for catalog entities.
//!
//! Everything here is a pure function of a catalog entity and the learner's
//! progress. Nothing is stored.
//!
//! Module, quiz and final-review gating all compare the learner's level with
//! module numbers:
//! - a module (and its quiz) is current when its number equals the level
//! - a chapter's final review is available only at exactly `last + 1`
//! - a project unlocks once the level reaches its prerequisite

use crate::types::{Chapter, LearnerProgress, Module, Project};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCategory {
    Completed,
    Unlocked,
    Locked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Finished,
    Current,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Completed,
    Available,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalReviewStatus {
    Completed,
    Available,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    Available,
    Unavailable,
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectCategory::Completed => "completed",
            ProjectCategory::Unlocked => "unlocked",
            ProjectCategory::Locked => "locked",
        })
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleStatus::Finished => "finished",
            ModuleStatus::Current => "current",
            ModuleStatus::Unavailable => "unavailable",
        })
    }
}

impl fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuizStatus::Completed => "completed",
            QuizStatus::Available => "available",
            QuizStatus::Unavailable => "unavailable",
        })
    }
}

impl fmt::Display for FinalReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FinalReviewStatus::Completed => "completed",
            FinalReviewStatus::Available => "available",
            FinalReviewStatus::Unavailable => "unavailable",
        })
    }
}

impl fmt::Display for ChapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChapterStatus::Available => "available",
            ChapterStatus::Unavailable => "unavailable",
        })
    }
}

/// Categorize a single project. Completion is checked before the prerequisite.
pub fn project_category(project: &Project, progress: &LearnerProgress) -> ProjectCategory {
    if progress.is_project_completed(&project.id) {
        ProjectCategory::Completed
    } else if project.level_prerequisite <= progress.current_level() {
        ProjectCategory::Unlocked
    } else {
        ProjectCategory::Locked
    }
}

/// Projects split into their three buckets, each in display order
#[derive(Clone, Debug, Default)]
pub struct ProjectBoard<'a> {
    /// Easiest first
    pub completed: Vec<&'a Project>,
    /// Easiest first
    pub unlocked: Vec<&'a Project>,
    /// Hardest first
    pub locked: Vec<&'a Project>,
}

/// Bucket every project and order each bucket by difficulty.
///
/// Sorting is stable, so projects of equal difficulty keep catalog order.
pub fn categorize_projects<'a>(
    projects: &'a [Project],
    progress: &LearnerProgress,
) -> ProjectBoard<'a> {
    let mut board = ProjectBoard::default();

    for project in projects {
        match project_category(project, progress) {
            ProjectCategory::Completed => board.completed.push(project),
            ProjectCategory::Unlocked => board.unlocked.push(project),
            ProjectCategory::Locked => board.locked.push(project),
        }
    }

    board.completed.sort_by(|a, b| by_difficulty(a, b));
    board.unlocked.sort_by(|a, b| by_difficulty(a, b));
    board.locked.sort_by(|a, b| by_difficulty(b, a));

    for id in progress.completed_projects() {
        if !projects.iter().any(|p| &p.id == id) {
            tracing::debug!("Completed project '{}' is not in the catalog", id);
        }
    }

    board
}

fn by_difficulty(a: &Project, b: &Project) -> Ordering {
    a.difficulty.rank().cmp(&b.difficulty.rank())
}

pub fn module_status(module: &Module, level: u32) -> ModuleStatus {
    match module.number.cmp(&level) {
        Ordering::Less => ModuleStatus::Finished,
        Ordering::Equal => ModuleStatus::Current,
        Ordering::Greater => ModuleStatus::Unavailable,
    }
}

/// A quiz is gated on its own module's number
pub fn quiz_status(module: &Module, level: u32) -> QuizStatus {
    match module.number.cmp(&level) {
        Ordering::Less => QuizStatus::Completed,
        Ordering::Equal => QuizStatus::Available,
        Ordering::Greater => QuizStatus::Unavailable,
    }
}

/// Final review gating.
///
/// With `last` the chapter's highest module number: `Available` at exactly
/// `last + 1`, `Completed` beyond that, `Unavailable` below it or when the
/// chapter has no modules. A learner jumping two levels at once skips
/// `Available` entirely.
pub fn final_review_status(chapter: &Chapter, level: u32) -> FinalReviewStatus {
    let Some(last) = chapter.last_module_number() else {
        return FinalReviewStatus::Unavailable;
    };
    let review_level = u64::from(last) + 1;

    match u64::from(level).cmp(&review_level) {
        Ordering::Greater => FinalReviewStatus::Completed,
        Ordering::Equal => FinalReviewStatus::Available,
        Ordering::Less => FinalReviewStatus::Unavailable,
    }
}

pub fn chapter_status(chapter: &Chapter, level: u32) -> ChapterStatus {
    match chapter.first_module_number() {
        Some(first) if level >= first => ChapterStatus::Available,
        _ => ChapterStatus::Unavailable,
    }
}
