//! Core domain types for the SwiSekai learning core.
//!
//! This module defines the fundamental types used throughout the system:
//! - Content blocks and quiz questions
//! - Modules, chapters, projects and the catalog that holds them
//! - The learner's persistent progress record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Content Blocks
// ============================================================================

/// One unit of lesson content.
///
/// Serialized through the tagged `{ type, content }` record of
/// [`crate::codec::BlockRecord`]; the heading level lives in the tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "crate::codec::BlockRecord", into = "crate::codec::BlockRecord")]
pub enum ContentBlock {
    Explanation { text: String },
    Snippet { code: String },
    FillBlank { prose: String, answer: String },
    Heading { level: HeadingLevel, text: String },
    OrderedList { items: Vec<String> },
    UnorderedList { items: Vec<String> },
    /// Older schema generation; the catalog lifts these into `Module::questions`.
    MultipleChoice(MultipleChoiceQuestion),
}

impl ContentBlock {
    /// Identity used for list diffing.
    ///
    /// Two blocks with the same payload share an identity, so this must not be
    /// used as a content key.
    pub fn id(&self) -> String {
        match self {
            ContentBlock::Explanation { text } => format!("exp-{}", text),
            ContentBlock::Snippet { code } => format!("snip-{}", code),
            ContentBlock::FillBlank { prose, .. } => format!("fb-{}", prose),
            ContentBlock::Heading { level, text } => format!("h{}-{}", level.get(), text),
            ContentBlock::OrderedList { items } => format!("ol-{}", items.concat()),
            ContentBlock::UnorderedList { items } => format!("ul-{}", items.concat()),
            ContentBlock::MultipleChoice(q) => format!("mc-{}", q.question),
        }
    }
}

/// Heading level, always within 1..=6
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&level)
            .then_some(HeadingLevel(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// A multiple-choice quiz question.
///
/// `answer` is expected to equal exactly one of `options`; violations are
/// reported by [`Catalog::validate`] rather than rejected at load time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

// ============================================================================
// Curriculum
// ============================================================================

/// One numbered lesson
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub id: String,
    pub name: String,
    /// Level identifier consumed by the rules engine
    pub number: u32,
    pub blocks: Vec<ContentBlock>,
    pub questions: Vec<MultipleChoiceQuestion>,
}

/// An ordered group of modules plus its final review
#[derive(Clone, Debug, PartialEq)]
pub struct Chapter {
    pub name: String,
    /// Sorted ascending by `Module::number`
    pub modules: Vec<Module>,
    pub final_review_blocks: Vec<ContentBlock>,
}

impl Chapter {
    pub fn first_module_number(&self) -> Option<u32> {
        self.modules.iter().map(|m| m.number).min()
    }

    pub fn last_module_number(&self) -> Option<u32> {
        self.modules.iter().map(|m| m.number).max()
    }
}

/// Project difficulty, ordered Easy < Medium < Hard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn rank(self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hands-on project gated on a minimum level
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub blocks: Vec<ContentBlock>,
    pub level_prerequisite: u32,
    pub difficulty: Difficulty,
    pub description: String,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete, read-only curriculum.
///
/// Built once by [`crate::catalog::build`]; there is no mutation API, so a
/// shared reference can be handed to any number of readers.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub(crate) chapters: Vec<Chapter>,
    pub(crate) projects: Vec<Project>,
}

// ============================================================================
// Learner Progress
// ============================================================================

/// A calendar date in the learner's local time zone, rendered `YYYY-MM-DD`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        DayKey(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, Self::FORMAT).map(DayKey)
    }
}

impl TryFrom<String> for DayKey {
    type Error = chrono::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(value: DayKey) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Whether the learner opened the app on a given day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Active,
    Inactive,
}

/// The learner's persistent progress record.
///
/// Every field only grows: the level never decreases and the project and
/// activity sets have no removal API. Mutations live in [`crate::progress`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProgress {
    pub(crate) id: Uuid,
    pub(crate) current_level: u32,
    #[serde(default)]
    pub(crate) completed_projects: BTreeSet<String>,
    #[serde(default)]
    pub(crate) activity_days: BTreeSet<DayKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_bounds() {
        assert!(HeadingLevel::new(0).is_none());
        assert_eq!(HeadingLevel::new(1).map(HeadingLevel::get), Some(1));
        assert_eq!(HeadingLevel::new(6).map(HeadingLevel::get), Some(6));
        assert!(HeadingLevel::new(7).is_none());
    }

    #[test]
    fn test_block_identity_collides_on_equal_payload() {
        let a = ContentBlock::Explanation {
            text: "same".into(),
        };
        let b = ContentBlock::Explanation {
            text: "same".into(),
        };
        assert_eq!(a.id(), "exp-same");
        assert_eq!(a.id(), b.id());

        let list = ContentBlock::OrderedList {
            items: vec!["a".into(), "b".into()],
        };
        assert_eq!(list.id(), "ol-ab");

        let heading = ContentBlock::Heading {
            level: HeadingLevel::new(2).unwrap(),
            text: "Intro".into(),
        };
        assert_eq!(heading.id(), "h2-Intro");
    }

    #[test]
    fn test_difficulty_order_and_parse() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" Medium ".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_day_key_format() {
        let key = DayKey::new(NaiveDate::from_ymd_opt(2025, 8, 3).unwrap());
        assert_eq!(key.to_string(), "2025-08-03");
        assert_eq!("2025-08-03".parse::<DayKey>().unwrap(), key);
        assert!("08/03/2025".parse::<DayKey>().is_err());
    }
}
