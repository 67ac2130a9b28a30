//! Error types for the sekai_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sekai_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed content block record
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Fatal catalog construction failure
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Quiz operation not valid for the session's current state
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Learner state management error
    #[error("State error: {0}")]
    State(String),
}

/// A block (or chapter) record that does not match the wire grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown content block type '{0}'")]
    UnknownType(String),

    /// Required field absent, or present with the wrong primitive shape
    #[error("missing or malformed field '{0}'")]
    MissingField(&'static str),

    #[error("record is not an object")]
    NotAnObject,

    /// A structural record (chapter, module, project) failed to deserialize
    #[error("malformed record: {0}")]
    Record(String),
}

/// Catalog construction failures that abort the whole load
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no project records supplied; projects are mandatory")]
    MissingMandatoryProjects,

    #[error("project record {index} is malformed: {source}")]
    MalformedProject {
        index: usize,
        #[source]
        source: SchemaError,
    },
}

/// Quiz state machine misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("'{op}' is not valid while the quiz is {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },

    #[error("'{0}' is not one of the current question's options")]
    UnknownOption(String),

    #[error("no module numbered {0}")]
    UnknownModule(u32),
}
