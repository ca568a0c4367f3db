use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {}", .issues.join("; "))]
    Validation { issues: Vec<String> },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Index {index} is out of range for {len} sections")]
    Range { index: usize, len: usize },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn section_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Section",
            id: id.into(),
        }
    }

    pub fn version_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Version",
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
