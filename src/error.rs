use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Failures raised by the vote and citizen services. Every variant is turned
/// into a failure reply at the controller boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("storage failure: {0}")]
    Storage(#[source] RepositoryError),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] argon2::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Authentication(_) => FailureKind::Authentication,
            Self::InvalidState(_) => FailureKind::InvalidState,
            Self::Storage(_) | Self::Hashing(_) | Self::Task(_) => FailureKind::Internal,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // A duplicate key is a problem with the caller's input.
            RepositoryError::Conflict(message) => Self::Validation(message),
            other => Self::Storage(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NotFound,
    Authentication,
    InvalidState,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_surface_as_validation_errors() {
        let err = ServiceError::from(RepositoryError::Conflict("vote 1 already exists".into()));
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), "vote 1 already exists");
    }

    #[test]
    fn backend_failures_are_internal() {
        let err = ServiceError::from(RepositoryError::Database(DbErr::Custom("down".into())));
        assert_eq!(err.kind(), FailureKind::Internal);
        assert!(err.to_string().starts_with("storage failure"));
    }
}
