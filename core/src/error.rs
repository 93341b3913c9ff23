use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkforceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("{field} must be unique: '{value}' already exists")]
    UniquenessViolation { field: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WorkforceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type WorkforceResult<T> = Result<T, WorkforceError>;
