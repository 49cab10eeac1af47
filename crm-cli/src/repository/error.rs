//! Repository error taxonomy

use thiserror::Error;

use crate::schema::MappingError;

/// Errors returned by repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Caller input rejected before any store call
    #[error("invalid input: {0}")]
    InvalidInput(#[from] MappingError),
    #[error("invalid record id '{0}'")]
    InvalidId(String),
    /// The store rejected the whole request (`success == false`)
    #[error("{message}")]
    Store { message: String },
    /// A batch write in which no record succeeded
    #[error("{operation} failed{}", format_failures(.failures))]
    BatchFailed {
        operation: String,
        failures: Vec<String>,
    },
    /// The store reported success but returned no record
    #[error("{operation} succeeded but the store returned no record")]
    MissingData { operation: String },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

fn format_failures(failures: &[String]) -> String {
    if failures.is_empty() {
        String::new()
    } else {
        format!(": {}", failures.join("; "))
    }
}

impl RepositoryError {
    /// Whether the request was rejected before reaching the store
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RepositoryError::InvalidInput(_) | RepositoryError::InvalidId(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failed_display() {
        let err = RepositoryError::BatchFailed {
            operation: "create deal".to_string(),
            failures: vec!["Value: must be positive".to_string(), "Invalid".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "create deal failed: Value: must be positive; Invalid"
        );

        let err = RepositoryError::BatchFailed {
            operation: "delete deal".to_string(),
            failures: vec![],
        };
        assert_eq!(err.to_string(), "delete deal failed");
    }

    #[test]
    fn test_caller_errors() {
        assert!(RepositoryError::InvalidId("x".to_string()).is_caller_error());
        assert!(
            !RepositoryError::Store {
                message: "down".to_string()
            }
            .is_caller_error()
        );
    }
}
