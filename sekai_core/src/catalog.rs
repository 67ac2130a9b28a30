//! Curriculum catalog assembly.
//!
//! [`build`] turns already-ordered chapter records and the mandatory project
//! records into a read-only [`Catalog`]. A chapter that fails to decode is
//! skipped and reported as a [`Diagnostic`]; a bad or missing project set
//! aborts the build.

use crate::error::{LoadError, SchemaError};
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ============================================================================
// Source Records
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterRecord {
    chapter_name: String,
    #[serde(default)]
    modules: Vec<ModuleRecord>,
    #[serde(default)]
    final_review: FinalReviewRecord,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinalReviewRecord {
    #[serde(default)]
    content_blocks: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ModuleRecord {
    id: String,
    module_name: String,
    module_number: u32,
    #[serde(default)]
    content_blocks: Vec<ContentBlock>,
    #[serde(default)]
    multiple_choice: Vec<MultipleChoiceQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRecord {
    id: String,
    project_name: String,
    #[serde(default)]
    content_blocks: Vec<ContentBlock>,
    level_prerequisite: u32,
    project_difficulty: Difficulty,
    #[serde(default)]
    project_description: String,
}

/// A chapter record that was skipped during [`build`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Position of the chapter in the loader's ordered input
    pub chapter_index: usize,
    /// File name or other label supplied by the loader
    pub source_name: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_name {
            Some(name) => write!(f, "chapter {} ({}): {}", self.chapter_index, name, self.message),
            None => write!(f, "chapter {}: {}", self.chapter_index, self.message),
        }
    }
}

// ============================================================================
// Build
// ============================================================================

/// Build the catalog from ordered chapter records and project records.
///
/// Chapters are kept in the order received. An empty `project_records`
/// slice means no project data was supplied.
pub fn build(
    chapter_records: &[Value],
    project_records: &[Value],
) -> Result<(Catalog, Vec<Diagnostic>), LoadError> {
    if project_records.is_empty() {
        return Err(LoadError::MissingMandatoryProjects);
    }

    let projects = project_records
        .iter()
        .enumerate()
        .map(|(index, value)| {
            decode_project(value).map_err(|source| LoadError::MalformedProject { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut chapters = Vec::with_capacity(chapter_records.len());
    let mut diagnostics = Vec::new();

    for (index, value) in chapter_records.iter().enumerate() {
        match decode_chapter(value) {
            Ok(chapter) => chapters.push(chapter),
            Err(e) => {
                tracing::warn!("Skipping chapter {}: {}", index, e);
                diagnostics.push(Diagnostic {
                    chapter_index: index,
                    source_name: None,
                    message: e.to_string(),
                });
            }
        }
    }

    let catalog = Catalog { chapters, projects };
    tracing::info!(
        "Built catalog: {} chapters, {} modules, {} projects ({} chapters skipped)",
        catalog.chapters.len(),
        catalog.module_count(),
        catalog.projects.len(),
        diagnostics.len()
    );

    Ok((catalog, diagnostics))
}

fn decode_chapter(value: &Value) -> Result<Chapter, SchemaError> {
    let record: ChapterRecord =
        ChapterRecord::deserialize(value).map_err(|e| SchemaError::Record(e.to_string()))?;

    let mut modules: Vec<Module> = record.modules.into_iter().map(module_from_record).collect();
    modules.sort_by_key(|m| m.number);

    Ok(Chapter {
        final_review_blocks: current_blocks(record.final_review.content_blocks, &record.chapter_name),
        name: record.chapter_name,
        modules,
    })
}

fn module_from_record(record: ModuleRecord) -> Module {
    let mut questions = record.multiple_choice;
    let mut blocks = Vec::with_capacity(record.content_blocks.len());

    for block in record.content_blocks {
        match block {
            ContentBlock::MultipleChoice(q) => questions.push(q),
            other => blocks.push(other),
        }
    }

    Module {
        id: record.id,
        name: record.module_name,
        number: record.module_number,
        blocks,
        questions,
    }
}

fn decode_project(value: &Value) -> Result<Project, SchemaError> {
    let record: ProjectRecord =
        ProjectRecord::deserialize(value).map_err(|e| SchemaError::Record(e.to_string()))?;

    Ok(Project {
        blocks: current_blocks(record.content_blocks, &record.project_name),
        id: record.id,
        name: record.project_name,
        level_prerequisite: record.level_prerequisite,
        difficulty: record.project_difficulty,
        description: record.project_description,
    })
}

/// Legacy question blocks only have a home inside modules
fn current_blocks(blocks: Vec<ContentBlock>, owner: &str) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .filter(|block| {
            let legacy = matches!(block, ContentBlock::MultipleChoice(_));
            if legacy {
                tracing::warn!("Dropping legacy multipleChoice block outside a module in '{}'", owner);
            }
            !legacy
        })
        .collect()
}

// ============================================================================
// Queries
// ============================================================================

impl Catalog {
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// All modules in canonical order: chapter order, then module order
    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.chapters.iter().flat_map(|c| c.modules.iter())
    }

    pub fn module_count(&self) -> usize {
        self.chapters.iter().map(|c| c.modules.len()).sum()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn module_by_number(&self, number: u32) -> Option<&Module> {
        self.modules().find(|m| m.number == number)
    }

    pub fn module_by_id(&self, id: &str) -> Option<&Module> {
        self.modules().find(|m| m.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn chapter_of_module(&self, number: u32) -> Option<&Chapter> {
        self.chapters
            .iter()
            .find(|c| c.modules.iter().any(|m| m.number == number))
    }

    pub fn last_module_number(&self) -> Option<u32> {
        self.modules().map(|m| m.number).max()
    }

    /// Validate the catalog for data-quality problems
    ///
    /// Returns a list of findings, or empty Vec if clean. Nothing here is
    /// fatal; the catalog stays usable either way.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut numbers: BTreeMap<u32, &str> = BTreeMap::new();
        for chapter in &self.chapters {
            if chapter.name.is_empty() {
                errors.push("Chapter has empty name".to_string());
            }

            for module in &chapter.modules {
                if module.id.is_empty() {
                    errors.push(format!("Module {} has empty ID", module.number));
                }
                if module.name.is_empty() {
                    errors.push(format!("Module {} has empty name", module.number));
                }
                if let Some(existing) = numbers.insert(module.number, &module.id) {
                    errors.push(format!(
                        "Module number {} used by both '{}' and '{}'",
                        module.number, existing, module.id
                    ));
                }

                for q in &module.questions {
                    if q.options.len() < 2 {
                        errors.push(format!(
                            "Module {}: question '{}' has fewer than 2 options",
                            module.number, q.question
                        ));
                    }
                    let matches = q.options.iter().filter(|o| **o == q.answer).count();
                    if matches != 1 {
                        errors.push(format!(
                            "Module {}: answer '{}' to '{}' matches {} options (expected 1)",
                            module.number, q.answer, q.question, matches
                        ));
                    }
                }
            }
        }

        let ordered: Vec<u32> = numbers.keys().copied().collect();
        for pair in ordered.windows(2) {
            if pair[1] != pair[0] + 1 {
                errors.push(format!(
                    "Gap in module numbering between {} and {}",
                    pair[0], pair[1]
                ));
            }
        }

        let mut project_ids = HashSet::new();
        let last = self.last_module_number();
        for project in &self.projects {
            if project.id.is_empty() {
                errors.push(format!("Project '{}' has empty ID", project.name));
            }
            if !project_ids.insert(project.id.as_str()) {
                errors.push(format!("Duplicate project ID '{}'", project.id));
            }
            if let Some(last) = last {
                // Reaching level `last + 1` is the furthest the modules can take a learner
                if u64::from(project.level_prerequisite) > u64::from(last) + 1 {
                    errors.push(format!(
                        "Project '{}' requires level {} but the last module is {}",
                        project.id, project.level_prerequisite, last
                    ));
                }
            }
        }

        errors
    }
}
