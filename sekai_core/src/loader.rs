//! Curriculum file discovery.
//!
//! A content directory holds one file per chapter (`chapter_<n>.yaml`, `.yml`
//! or `.json`) and a mandatory `projects` file. Chapter files are ordered by
//! the first integer embedded in their name before being handed to
//! [`crate::catalog::build`].

use crate::catalog::{self, Diagnostic};
use crate::error::{LoadError, SchemaError};
use crate::{Catalog, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

const CHAPTER_PREFIX: &str = "chapter";
const PROJECTS_STEM: &str = "projects";
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Load every chapter and the project set from `dir`
///
/// Chapter files that cannot be parsed become diagnostics alongside chapters
/// that fail to decode. A missing projects file is fatal.
pub fn load_catalog_dir(dir: &Path) -> Result<(Catalog, Vec<Diagnostic>)> {
    let chapter_files = discover_chapter_files(dir)?;
    tracing::debug!("Found {} chapter files in {:?}", chapter_files.len(), dir);

    let mut records = Vec::new();
    // File position for each entry in `records`
    let mut origins = Vec::new();
    let mut diagnostics = Vec::new();

    for (position, path) in chapter_files.iter().enumerate() {
        match read_chapter_records(path) {
            Ok(values) => {
                for value in values {
                    records.push(value);
                    origins.push(position);
                }
            }
            Err(e) => {
                tracing::warn!("Skipping chapter file {:?}: {}", path, e);
                diagnostics.push(Diagnostic {
                    chapter_index: position,
                    source_name: Some(file_label(path)),
                    message: e.to_string(),
                });
            }
        }
    }

    let projects = read_project_records(dir)?;
    let (catalog, build_diagnostics) = catalog::build(&records, &projects)?;

    for mut diagnostic in build_diagnostics {
        let position = origins[diagnostic.chapter_index];
        diagnostic.chapter_index = position;
        diagnostic.source_name = Some(file_label(&chapter_files[position]));
        diagnostics.push(diagnostic);
    }
    diagnostics.sort_by_key(|d| d.chapter_index);

    Ok((catalog, diagnostics))
}

/// Chapter files in `dir`, sorted by embedded number (unnumbered last, by name)
pub fn discover_chapter_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_known_extension(path))
        .filter(|path| {
            file_stem(path)
                .to_ascii_lowercase()
                .starts_with(CHAPTER_PREFIX)
        })
        .collect();

    files.sort_by_key(|path| {
        let stem = file_stem(path);
        let number = embedded_number(&stem);
        (number.is_none(), number, stem)
    });

    Ok(files)
}

/// First run of ASCII digits in `name`, if any
fn embedded_number(name: &str) -> Option<u64> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// A chapter file holds one chapter record, or `{ chapters: [...] }`
fn read_chapter_records(path: &Path) -> Result<Vec<Value>> {
    let value = read_value(path)?;
    match value {
        Value::Object(mut map) if map.contains_key("chapters") => match map.remove("chapters") {
            Some(Value::Array(chapters)) => Ok(chapters),
            _ => Err(SchemaError::MissingField("chapters").into()),
        },
        other => Ok(vec![other]),
    }
}

/// The projects file may be a bare sequence or `{ projects: [...] }`
fn read_project_records(dir: &Path) -> Result<Vec<Value>> {
    let path = EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", PROJECTS_STEM, ext)))
        .find(|p| p.is_file())
        .ok_or(LoadError::MissingMandatoryProjects)?;

    match read_value(&path)? {
        Value::Array(projects) => Ok(projects),
        Value::Object(mut map) => match map.remove("projects") {
            Some(Value::Array(projects)) => Ok(projects),
            _ => Err(SchemaError::MissingField("projects").into()),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(SchemaError::Record(format!("{:?} is not a project list", path)).into()),
    }
}

fn read_value(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = if extension(path) == "json" {
        serde_json::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };
    Ok(value)
}

fn has_known_extension(path: &Path) -> bool {
    EXTENSIONS.contains(&extension(path).as_str())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
