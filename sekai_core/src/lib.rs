#![forbid(unsafe_code)]

//! Content and progression core for the SwiSekai learning application.
//!
//! This crate provides:
//! - Domain types (content blocks, modules, chapters, projects, learner progress)
//! - The tagged-record content block codec
//! - Catalog assembly and curriculum file loading
//! - Learner progress operations and persistence
//! - The progress rules engine and the quiz session state machine

pub mod types;
pub mod error;
pub mod codec;
pub mod catalog;
pub mod loader;
pub mod config;
pub mod logging;
pub mod progress;
pub mod state;
pub mod rules;
pub mod quiz;

// Re-export commonly used types
pub use error::{Error, LoadError, QuizError, Result, SchemaError};
pub use types::*;
pub use catalog::Diagnostic;
pub use config::Config;
pub use loader::load_catalog_dir;
pub use quiz::{QuizSession, QuizState};
pub use rules::{
    categorize_projects, chapter_status, final_review_status, module_status, project_category,
    quiz_status, ChapterStatus, FinalReviewStatus, ModuleStatus, ProjectBoard, ProjectCategory,
    QuizStatus,
};
